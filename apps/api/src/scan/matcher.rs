//! Skill Matcher: decides, per required skill, how the resume covers it.
//!
//! Precedence: Exact > Synonym > Partial > Missing.
//! - Exact: the resume uses the same surface form as the job description.
//! - Synonym: the resume uses another taxonomy form of the same skill.
//! - Partial: a form only loosely matches ("React.js" for "React",
//!   "microservice" for "Microservices"). Verb endings never count, so
//!   "reacted" is not React.
//! - Missing: none of the above.

use std::collections::HashMap;

use crate::models::analysis::{MatchKind, MatchResult};
use crate::models::document::{NormalizedDocument, Token};
use crate::scan::extractor::RequiredSkill;
use crate::taxonomy::Taxonomy;

/// Shortest form that may match as a prefix of a longer resume token.
const MIN_PREFIX_LEN: usize = 3;
/// Shortest word whose plural ending is stripped before comparison.
const MIN_STEM_LEN: usize = 5;

/// Produces one `MatchResult` per required skill, in the same order.
///
/// Every resume line is scanned, heading lines included, so a skill is found
/// wherever the classifier put it. The result depends only on its inputs, so
/// repeated calls agree.
pub fn match_skills(
    taxonomy: &Taxonomy,
    required: &[RequiredSkill],
    resume: &NormalizedDocument,
) -> Vec<MatchResult> {
    let scopes: Vec<&[Token]> = resume
        .lines
        .iter()
        .map(|line| resume.line_tokens(line))
        .filter(|tokens| !tokens.is_empty())
        .collect();

    // skill index -> (surface, offset) of every taxonomy hit in the resume
    let mut found: HashMap<usize, Vec<(String, usize)>> = HashMap::new();
    for tokens in &scopes {
        for occurrence in taxonomy.scan(tokens) {
            found
                .entry(occurrence.skill)
                .or_default()
                .push((occurrence.surface, occurrence.offset));
        }
    }

    required
        .iter()
        .map(|req| {
            let hits = found.get(&req.index).map(Vec::as_slice).unwrap_or(&[]);
            match_one(taxonomy, req, hits, &scopes)
        })
        .collect()
}

fn match_one(
    taxonomy: &Taxonomy,
    req: &RequiredSkill,
    hits: &[(String, usize)],
    scopes: &[&[Token]],
) -> MatchResult {
    let exact: Vec<usize> = hits
        .iter()
        .filter(|(surface, _)| *surface == req.jd_form)
        .map(|(_, offset)| *offset)
        .collect();

    let (match_kind, matched_form, mut locations) = if !exact.is_empty() {
        (MatchKind::Exact, Some(req.jd_form.clone()), exact)
    } else if let Some((surface, _)) = hits.first() {
        (
            MatchKind::Synonym,
            Some(surface.clone()),
            hits.iter().map(|(_, offset)| *offset).collect(),
        )
    } else {
        let loose = find_loose(taxonomy.forms(req.index), scopes);
        match loose.first() {
            Some((surface, _)) => (
                MatchKind::Partial,
                Some(surface.clone()),
                loose.iter().map(|(_, offset)| *offset).collect(),
            ),
            None => (MatchKind::Missing, None, Vec::new()),
        }
    };

    locations.sort_unstable();
    locations.dedup();

    MatchResult {
        skill: req.skill.clone(),
        jd_form: req.jd_form.clone(),
        present_in_resume: match_kind != MatchKind::Missing,
        match_kind,
        matched_form,
        locations,
    }
}

/// Every position where some form of the skill loosely matches, as
/// `(resume surface, offset)`. One hit per starting token.
fn find_loose(forms: &[Vec<String>], scopes: &[&[Token]]) -> Vec<(String, usize)> {
    let mut hits = Vec::new();

    for tokens in scopes {
        for start in 0..tokens.len() {
            let matched = forms.iter().find(|form| {
                start + form.len() <= tokens.len()
                    && form
                        .iter()
                        .zip(&tokens[start..])
                        .all(|(want, got)| loosely_equal(&got.norm, want))
            });

            if let Some(form) = matched {
                let surface = tokens[start..start + form.len()]
                    .iter()
                    .map(|t| t.norm.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                hits.push((surface, tokens[start].offset));
            }
        }
    }

    hits
}

/// Loose token comparison: equal, a dotted or "js" variant of the form
/// ("react.js", "reactjs"), or the same word stem.
fn loosely_equal(token: &str, form: &str) -> bool {
    if token == form {
        return true;
    }

    if form.len() >= MIN_PREFIX_LEN {
        if let Some(rest) = token.strip_prefix(form) {
            if rest == "js" || rest.starts_with(|c: char| !c.is_alphanumeric()) {
                return true;
            }
        }
    }

    match (stem(token), stem(form)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Strips a plural ending from an alphabetic word ("services", "libraries").
/// Returns `None` for words too short or not purely alphabetic.
fn stem(word: &str) -> Option<String> {
    if word.len() < MIN_STEM_LEN || !word.chars().all(char::is_alphabetic) {
        return None;
    }

    if let Some(base) = word.strip_suffix("ies") {
        return Some(format!("{base}y"));
    }
    if !word.ends_with("ss") {
        if let Some(base) = word.strip_suffix('s') {
            return Some(base.to_string());
        }
    }
    Some(word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Document;
    use crate::scan::classifier::{HeadingClassifier, SectionClassifier};
    use crate::scan::extractor::extract_required;
    use crate::scan::normalizer::normalize;
    use crate::taxonomy::tests::sample_taxonomy;

    fn run(jd: &str, resume: &str) -> Vec<MatchResult> {
        let taxonomy = sample_taxonomy();
        let classifier = HeadingClassifier::new();

        let jd_doc = normalize(&Document::job_description(jd), 50_000).unwrap();
        let jd_sections = classifier.classify(&jd_doc);
        let required = extract_required(&taxonomy, &jd_doc, &jd_sections);

        let resume_doc = normalize(&Document::resume(resume), 50_000).unwrap();
        match_skills(&taxonomy, &required, &resume_doc)
    }

    fn kinds(matches: &[MatchResult]) -> Vec<(&str, MatchKind)> {
        matches
            .iter()
            .map(|m| (m.skill.id.as_str(), m.match_kind))
            .collect()
    }

    #[test]
    fn test_react_node_aws_scenario() {
        let matches = run(
            "Looking for a React + Node developer with AWS experience.",
            "React, Node.js, Express, MongoDB.",
        );
        assert_eq!(
            kinds(&matches),
            vec![
                ("react", MatchKind::Exact),
                ("nodejs", MatchKind::Synonym),
                ("aws", MatchKind::Missing),
            ]
        );
        assert_eq!(matches[1].jd_form, "node");
        assert_eq!(matches[1].matched_form.as_deref(), Some("node.js"));
        assert!(!matches[2].present_in_resume);
        assert!(matches[2].locations.is_empty());
        assert!(matches[2].matched_form.is_none());
    }

    #[test]
    fn test_abbreviation_counts_as_synonym() {
        let matches = run("Kubernetes required", "Ran k8s in production");
        assert_eq!(kinds(&matches), vec![("kubernetes", MatchKind::Synonym)]);
    }

    #[test]
    fn test_dotted_variant_is_partial() {
        let matches = run("We use React daily", "Built UIs in React.js");
        assert_eq!(kinds(&matches), vec![("react", MatchKind::Partial)]);
        assert_eq!(matches[0].matched_form.as_deref(), Some("react.js"));
        assert!(matches[0].present_in_resume);
    }

    #[test]
    fn test_singular_plural_is_partial() {
        let matches = run("Strong microservices background.", "Split the monolith into a microservice");
        assert_eq!(kinds(&matches), vec![("microservices", MatchKind::Partial)]);
    }

    #[test]
    fn test_longer_phrase_does_not_count_as_exact() {
        // "React Native" is a different skill; "react" is only loosely present
        let matches = run("React", "Shipped React Native apps");
        assert_eq!(kinds(&matches), vec![("react", MatchKind::Partial)]);
    }

    #[test]
    fn test_java_is_not_found_inside_javascript() {
        let matches = run("Java", "JavaScript everywhere");
        assert_eq!(kinds(&matches), vec![("java", MatchKind::Missing)]);
    }

    #[test]
    fn test_exact_wins_over_synonym() {
        let matches = run("Node", "node.js at work and node at home");
        assert_eq!(kinds(&matches), vec![("nodejs", MatchKind::Exact)]);
        assert_eq!(matches[0].locations.len(), 1);
    }

    #[test]
    fn test_one_result_per_required_skill_in_order() {
        let matches = run("Rust, AWS, Rust, k8s, AWS", "Rust");
        let ids: Vec<&str> = matches.iter().map(|m| m.skill.id.as_str()).collect();
        assert_eq!(ids, vec!["rust", "aws", "kubernetes"]);
    }

    #[test]
    fn test_matching_is_idempotent() {
        let jd = "Requirements\n- React\n- Amazon Web Services\n- Microservices";
        let resume = "Experience\n- Built microservice on AWS with React.js";
        assert_eq!(run(jd, resume), run(jd, resume));
    }

    #[test]
    fn test_verb_forms_are_not_partial_matches() {
        let matches = run("React, Express", "Reacted quickly to outages and expressed concerns");
        assert_eq!(
            kinds(&matches),
            vec![("react", MatchKind::Missing), ("express", MatchKind::Missing)]
        );
    }

    #[test]
    fn test_skill_on_heading_like_line_is_found() {
        let matches = run(
            "Requirements\n- React\n- Kubernetes",
            "React, Node.js\nKubernetes experience",
        );
        assert_eq!(
            kinds(&matches),
            vec![("react", MatchKind::Exact), ("kubernetes", MatchKind::Exact)]
        );
    }

    #[test]
    fn test_stem_rules() {
        assert_eq!(stem("services").as_deref(), Some("service"));
        assert_eq!(stem("libraries").as_deref(), Some("library"));
        assert_eq!(stem("testing").as_deref(), Some("testing"));
        assert_eq!(stem("reacted").as_deref(), Some("reacted"));
        assert_eq!(stem("express").as_deref(), Some("express"));
        assert_eq!(stem("k8s"), None);
        assert_eq!(stem("node.js"), None);
    }

    #[test]
    fn test_loosely_equal_rules() {
        assert!(loosely_equal("vue.js", "vue"));
        assert!(loosely_equal("reactjs", "react"));
        assert!(!loosely_equal("javascript", "java"));
        assert!(!loosely_equal("go.mod", "go"));
    }
}
