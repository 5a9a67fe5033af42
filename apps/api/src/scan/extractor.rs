//! Skill Extractor: required skills of a job description, in first-appearance
//! order.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::analysis::{Section, SectionLabel};
use crate::models::document::{NormalizedDocument, Token};
use crate::models::skill::SkillTerm;
use crate::taxonomy::Taxonomy;

/// Sections whose skills count as requirements.
const REQUIREMENT_LABELS: &[SectionLabel] = &[SectionLabel::Skills, SectionLabel::Requirements];

/// A skill the job description asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredSkill {
    pub skill: SkillTerm,
    /// First surface form the JD used, lower-cased.
    pub jd_form: String,
    /// Byte offsets of every mention in the normalized JD text.
    pub jd_locations: Vec<usize>,
    /// Index into the taxonomy the skill came from.
    #[serde(skip)]
    pub index: usize,
}

/// Extracts required skills from the JD's Skills and Requirements sections.
/// Falls back to the whole document when it has no such section with
/// content, or when those sections name no known skill.
///
/// Each section is scanned on its own so a phrase never spans two sections.
/// A skill mentioned several times appears once, at its first mention.
pub fn extract_required(
    taxonomy: &Taxonomy,
    jd: &NormalizedDocument,
    sections: &[Section],
) -> Vec<RequiredSkill> {
    let targeted: Vec<&[Token]> = sections
        .iter()
        .filter(|s| REQUIREMENT_LABELS.contains(&s.label) && s.has_content())
        .map(|s| s.tokens(jd))
        .collect();

    let required = collect(taxonomy, &targeted);
    if required.is_empty() {
        collect(taxonomy, &[jd.tokens.as_slice()])
    } else {
        required
    }
}

fn collect(taxonomy: &Taxonomy, scopes: &[&[Token]]) -> Vec<RequiredSkill> {
    let mut required: Vec<RequiredSkill> = Vec::new();
    let mut position: HashMap<usize, usize> = HashMap::new();

    for tokens in scopes {
        for occurrence in taxonomy.scan(tokens) {
            match position.get(&occurrence.skill) {
                Some(&at) => required[at].jd_locations.push(occurrence.offset),
                None => {
                    position.insert(occurrence.skill, required.len());
                    required.push(RequiredSkill {
                        skill: taxonomy.skill(occurrence.skill).clone(),
                        jd_form: occurrence.surface,
                        jd_locations: vec![occurrence.offset],
                        index: occurrence.skill,
                    });
                }
            }
        }
    }

    required
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Document;
    use crate::scan::classifier::{HeadingClassifier, SectionClassifier};
    use crate::scan::normalizer::normalize;
    use crate::taxonomy::tests::sample_taxonomy;

    fn extract(jd: &str) -> Vec<RequiredSkill> {
        let taxonomy = sample_taxonomy();
        let doc = normalize(&Document::job_description(jd), 50_000).unwrap();
        let sections = HeadingClassifier::new().classify(&doc);
        extract_required(&taxonomy, &doc, &sections)
    }

    fn ids(required: &[RequiredSkill]) -> Vec<&str> {
        required.iter().map(|r| r.skill.id.as_str()).collect()
    }

    #[test]
    fn test_falls_back_to_whole_document() {
        let required = extract("Looking for a React + Node developer with AWS experience.");
        assert_eq!(ids(&required), vec!["react", "nodejs", "aws"]);
        assert_eq!(required[1].jd_form, "node");
    }

    #[test]
    fn test_prefers_requirement_sections() {
        let required = extract(
            "About us\nWe run Kubernetes everywhere.\n\nRequirements\n- Rust\n- Amazon Web Services\n\nNice words about Java culture",
        );
        // "Nice words about Java culture" sits under Requirements as trailing content
        assert_eq!(ids(&required), vec!["rust", "aws", "java"]);
        assert_eq!(required[1].jd_form, "amazon web services");
    }

    #[test]
    fn test_skills_heading_counts_as_requirements() {
        let required = extract("Overview\nMongoDB shop.\n\nSkills: Rust, k8s");
        assert_eq!(ids(&required), vec!["rust", "kubernetes"]);
    }

    #[test]
    fn test_duplicates_collapse_to_first_appearance() {
        let required = extract("AWS, Rust and more AWS. Also aws.");
        assert_eq!(ids(&required), vec!["aws", "rust"]);
        assert_eq!(required[0].jd_locations.len(), 3);
        assert!(required[0].jd_locations.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_skill_free_requirements_fall_back_to_whole_document() {
        let required = extract(
            "Overview\nOur team ships React and AWS daily.\n\nRequirements\n- Curiosity\n- Kindness",
        );
        assert_eq!(ids(&required), vec!["react", "aws"]);
    }

    #[test]
    fn test_skill_phrase_on_heading_like_line_stays_required() {
        let required = extract("Requirements\n- Rust\nStrong Kubernetes experience\n- AWS");
        assert_eq!(ids(&required), vec!["rust", "kubernetes", "aws"]);
    }

    #[test]
    fn test_no_skills_yields_empty() {
        assert!(extract("We value kindness and curiosity.").is_empty());
    }
}
