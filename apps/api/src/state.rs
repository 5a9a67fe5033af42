use std::sync::Arc;

use crate::config::Config;
use crate::scan::classifier::SectionClassifier;
use crate::scan::error::ScanError;
use crate::scan::pipeline::ScanEngine;
use crate::taxonomy::TaxonomyRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only after startup; every request shares the same taxonomies.
    pub taxonomies: Arc<TaxonomyRegistry>,
    /// Pluggable section classifier. Default: HeadingClassifier.
    pub classifier: Arc<dyn SectionClassifier>,
}

impl AppState {
    /// Engine for the requested taxonomy version, or the default one.
    pub fn engine(&self, taxonomy_version: Option<&str>) -> Result<ScanEngine, ScanError> {
        let taxonomy = self.taxonomies.resolve(taxonomy_version)?;
        Ok(ScanEngine::new(
            taxonomy,
            Arc::clone(&self.classifier),
            self.config.weights,
        ))
    }
}
