//! Taxonomy Store: where taxonomy data comes from.
//!
//! Default: `EmbeddedTaxonomyStore` (compiled into the binary).
//! Optional: `FileTaxonomyStore`, enabled by `TAXONOMY_PATH`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::taxonomy::{Taxonomy, TaxonomyError, TaxonomyRegistry};

const EMBEDDED_TAXONOMY: &str = include_str!("../../data/taxonomy.json");

#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    /// Where the data comes from, for logs.
    fn source(&self) -> String;

    async fn load(&self) -> Result<Taxonomy, TaxonomyError>;
}

pub struct EmbeddedTaxonomyStore;

#[async_trait]
impl TaxonomyStore for EmbeddedTaxonomyStore {
    fn source(&self) -> String {
        "embedded".to_string()
    }

    async fn load(&self) -> Result<Taxonomy, TaxonomyError> {
        Taxonomy::from_json(EMBEDDED_TAXONOMY)
    }
}

pub struct FileTaxonomyStore {
    path: PathBuf,
}

impl FileTaxonomyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TaxonomyStore for FileTaxonomyStore {
    fn source(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Taxonomy, TaxonomyError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| TaxonomyError::Io {
                path: self.source(),
                source,
            })?;
        Taxonomy::from_json(&json)
    }
}

/// Loads the embedded taxonomy and, when `extra_path` is set, the file
/// taxonomy on top of it. The file taxonomy becomes the default version.
pub async fn load_registry(extra_path: Option<&Path>) -> Result<TaxonomyRegistry, TaxonomyError> {
    let embedded = load_logged(&EmbeddedTaxonomyStore).await?;
    let mut registry = TaxonomyRegistry::new(embedded);

    if let Some(path) = extra_path {
        let from_file = load_logged(&FileTaxonomyStore::new(path)).await?;
        registry.insert(from_file, true);
    }

    info!(
        default_version = registry.default_version(),
        "Taxonomy registry ready"
    );
    Ok(registry)
}

async fn load_logged(store: &dyn TaxonomyStore) -> Result<Taxonomy, TaxonomyError> {
    let taxonomy = store.load().await?;
    info!(
        source = %store.source(),
        version = taxonomy.version(),
        skills = taxonomy.skills().len(),
        forms = taxonomy.form_count(),
        "Taxonomy loaded"
    );
    Ok(taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_embedded_taxonomy_loads() {
        let taxonomy = EmbeddedTaxonomyStore.load().await.unwrap();
        assert!(!taxonomy.skills().is_empty());
        assert!(taxonomy.index_of("react").is_some());
        assert!(taxonomy.index_of("nodejs").is_some());
        assert!(taxonomy.index_of("aws").is_some());
    }

    #[tokio::test]
    async fn test_file_store_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"version": "custom-7", "skills": [{{"id": "zig", "name": "Zig", "category": "language"}}]}}"#
        )
        .unwrap();

        let taxonomy = FileTaxonomyStore::new(file.path()).load().await.unwrap();
        assert_eq!(taxonomy.version(), "custom-7");
        assert!(taxonomy.index_of("zig").is_some());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileTaxonomyStore::new(dir.path().join("missing.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, TaxonomyError::Io { .. }));
    }

    #[tokio::test]
    async fn test_load_registry_makes_file_taxonomy_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"version": "custom-8", "skills": [{{"id": "zig", "name": "Zig", "category": "language"}}]}}"#
        )
        .unwrap();

        let registry = load_registry(Some(file.path())).await.unwrap();
        assert_eq!(registry.default_version(), "custom-8");
        assert_eq!(registry.iter().count(), 2);
    }

    #[tokio::test]
    async fn test_load_registry_without_file_uses_embedded() {
        let registry = load_registry(None).await.unwrap();
        let embedded = EmbeddedTaxonomyStore.load().await.unwrap();
        assert_eq!(registry.default_version(), embedded.version());
    }
}
