use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Language,
    Framework,
    Library,
    Database,
    Cloud,
    Devops,
    Tool,
    Data,
    Practice,
    SoftSkill,
}

/// A canonical skill from the reference taxonomy, with every accepted
/// alternate spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTerm {
    pub id: String,
    pub name: String,
    pub category: SkillCategory,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub abbreviations: Vec<String>,
}

impl SkillTerm {
    /// Name first, then synonyms, then abbreviations.
    pub fn forms(&self) -> impl Iterator<Item = (&str, FormKind)> {
        std::iter::once((self.name.as_str(), FormKind::Canonical))
            .chain(self.synonyms.iter().map(|s| (s.as_str(), FormKind::Synonym)))
            .chain(
                self.abbreviations
                    .iter()
                    .map(|s| (s.as_str(), FormKind::Abbreviation)),
            )
    }
}

/// How a surface form relates to its skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Canonical,
    Synonym,
    Abbreviation,
}
