//! Reference skill taxonomy: canonical skills, synonyms and abbreviations,
//! indexed for greedy longest-phrase lookup.
//!
//! A `Taxonomy` is built once at startup, wrapped in `Arc`, and shared
//! read-only by every request. Nothing here takes a lock.

pub mod store;
pub mod trie;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::document::Token;
use crate::models::skill::{FormKind, SkillTerm};
use crate::scan::normalizer::phrase_tokens;
use crate::taxonomy::trie::{PhraseEntry, PhraseTrie};

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid taxonomy JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("taxonomy '{version}' contains no skills")]
    Empty { version: String },

    #[error("skill '{skill}' has a form with no matchable characters")]
    BlankForm { skill: String },

    #[error("skill id '{0}' appears more than once")]
    DuplicateId(String),

    #[error("form '{form}' is claimed by both '{first}' and '{second}'")]
    DuplicateForm {
        form: String,
        first: String,
        second: String,
    },

    #[error("taxonomy version '{0}' is not loaded")]
    UnknownVersion(String),
}

/// On-disk shape of a taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyFile {
    pub version: String,
    pub skills: Vec<SkillTerm>,
}

/// One recognized skill mention inside a token slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Index into `Taxonomy::skills`.
    pub skill: usize,
    pub kind: FormKind,
    /// Matched tokens joined by single spaces, lower-cased.
    pub surface: String,
    /// Index of the first matched token within the scanned slice.
    pub token_index: usize,
    pub token_len: usize,
    /// Byte offset of the first matched token in its document.
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    version: String,
    skills: Vec<SkillTerm>,
    /// Tokenized forms per skill, parallel to `skills`.
    forms: Vec<Vec<Vec<String>>>,
    index: PhraseTrie,
}

impl Taxonomy {
    /// Validates and indexes a taxonomy file.
    ///
    /// Every form is tokenized with the document tokenizer. A form that two
    /// different skills claim is rejected; repeats within one skill collapse.
    pub fn from_file(file: TaxonomyFile) -> Result<Self, TaxonomyError> {
        if file.skills.is_empty() {
            return Err(TaxonomyError::Empty {
                version: file.version,
            });
        }

        let mut ids = HashSet::with_capacity(file.skills.len());
        let mut forms = Vec::with_capacity(file.skills.len());
        let mut index = PhraseTrie::new();

        for (skill_idx, skill) in file.skills.iter().enumerate() {
            if !ids.insert(skill.id.as_str()) {
                return Err(TaxonomyError::DuplicateId(skill.id.clone()));
            }

            let mut skill_forms: Vec<Vec<String>> = Vec::new();
            for (form, kind) in skill.forms() {
                let tokens = phrase_tokens(form);
                if tokens.is_empty() {
                    return Err(TaxonomyError::BlankForm {
                        skill: skill.id.clone(),
                    });
                }

                let entry = PhraseEntry {
                    skill: skill_idx,
                    kind,
                };
                if let Some(existing) = index.insert(&tokens, entry) {
                    if existing.skill != skill_idx {
                        return Err(TaxonomyError::DuplicateForm {
                            form: form.to_string(),
                            first: file.skills[existing.skill].id.clone(),
                            second: skill.id.clone(),
                        });
                    }
                }
                if !skill_forms.contains(&tokens) {
                    skill_forms.push(tokens);
                }
            }
            forms.push(skill_forms);
        }

        Ok(Self {
            version: file.version,
            skills: file.skills,
            forms,
            index,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        Self::from_file(serde_json::from_str(json)?)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn skills(&self) -> &[SkillTerm] {
        &self.skills
    }

    pub fn skill(&self, idx: usize) -> &SkillTerm {
        &self.skills[idx]
    }

    #[cfg(test)]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.skills.iter().position(|s| s.id == id)
    }

    /// Tokenized forms of a skill, canonical name first.
    pub fn forms(&self, idx: usize) -> &[Vec<String>] {
        &self.forms[idx]
    }

    pub fn form_count(&self) -> usize {
        self.index.len()
    }

    /// Scans a token slice left to right. At each position the longest form
    /// starting there wins and its tokens are consumed; otherwise the scan
    /// advances one token.
    pub fn scan(&self, tokens: &[Token]) -> Vec<Occurrence> {
        let mut found = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let hit = self
                .index
                .longest_prefix(tokens[i..].iter().map(|t| t.norm.as_str()));

            match hit {
                Some((len, entry)) => {
                    let surface = tokens[i..i + len]
                        .iter()
                        .map(|t| t.norm.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    found.push(Occurrence {
                        skill: entry.skill,
                        kind: entry.kind,
                        surface,
                        token_index: i,
                        token_len: len,
                        offset: tokens[i].offset,
                    });
                    i += len;
                }
                None => i += 1,
            }
        }

        found
    }
}

/// Loaded taxonomies keyed by version, plus the one used when a request
/// names none.
#[derive(Debug, Clone)]
pub struct TaxonomyRegistry {
    default_version: String,
    versions: BTreeMap<String, Arc<Taxonomy>>,
}

impl TaxonomyRegistry {
    pub fn new(default: Taxonomy) -> Self {
        let default_version = default.version().to_string();
        let mut versions = BTreeMap::new();
        versions.insert(default_version.clone(), Arc::new(default));
        Self {
            default_version,
            versions,
        }
    }

    /// Adds a taxonomy, replacing any loaded under the same version.
    pub fn insert(&mut self, taxonomy: Taxonomy, make_default: bool) {
        let version = taxonomy.version().to_string();
        if make_default {
            self.default_version = version.clone();
        }
        self.versions.insert(version, Arc::new(taxonomy));
    }

    pub fn default_version(&self) -> &str {
        &self.default_version
    }

    /// Returns the requested version, or the default when `version` is `None`.
    pub fn resolve(&self, version: Option<&str>) -> Result<Arc<Taxonomy>, TaxonomyError> {
        let version = version.unwrap_or(&self.default_version);
        self.versions
            .get(version)
            .cloned()
            .ok_or_else(|| TaxonomyError::UnknownVersion(version.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Taxonomy>> {
        self.versions.values()
    }
}
