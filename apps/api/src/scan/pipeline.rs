//! Compatibility pipeline: normalize → classify → extract → match → score →
//! feedback.
//!
//! Each stage consumes the previous stage's output by reference and produces
//! a new value; nothing is mutated after it is produced. The deadline is
//! checked before every stage.
//!
//! Everything here is synchronous and CPU-bound. Handlers call it through
//! `tokio::task::spawn_blocking`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::analysis::{AnalysisResult, MatchSummary, Section};
use crate::models::document::{Document, NormalizedDocument};
use crate::scan::classifier::SectionClassifier;
use crate::scan::error::{ScanError, Stage};
use crate::scan::extractor::{extract_required, RequiredSkill};
use crate::scan::feedback;
use crate::scan::matcher::match_skills;
use crate::scan::normalizer::normalize;
use crate::scan::scoring::{self, ScoringWeights};
use crate::taxonomy::Taxonomy;

// ────────────────────────────────────────────────────────────────────────────
// Deadline and options
// ────────────────────────────────────────────────────────────────────────────

/// Wall-clock budget for one request, started when the request arrives.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget: Some(budget),
        }
    }

    #[cfg(test)]
    pub fn unbounded() -> Self {
        Self {
            started: Instant::now(),
            budget: None,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Fails with `Timeout` once the budget is spent. A zero budget fails
    /// before any work starts.
    pub fn check(&self, stage: Stage) -> Result<(), ScanError> {
        let Some(budget) = self.budget else {
            return Ok(());
        };
        let elapsed = self.started.elapsed();
        if elapsed >= budget {
            let elapsed_ms = elapsed.as_millis() as u64;
            warn!(
                stage = %stage,
                elapsed_ms,
                budget_ms = budget.as_millis() as u64,
                "Scan deadline exceeded"
            );
            return Err(ScanError::Timeout { stage, elapsed_ms });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub max_input_bytes: usize,
    pub deadline: Deadline,
}

/// Result of extracting requirements from a job description alone.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementsPreview {
    pub sections: Vec<Section>,
    pub required_skills: Vec<RequiredSkill>,
}

// ────────────────────────────────────────────────────────────────────────────
// ScanEngine
// ────────────────────────────────────────────────────────────────────────────

/// One taxonomy version, one classifier and one set of weights. Cheap to
/// clone; built per request from `AppState`.
#[derive(Clone)]
pub struct ScanEngine {
    taxonomy: Arc<Taxonomy>,
    classifier: Arc<dyn SectionClassifier>,
    weights: ScoringWeights,
}

impl ScanEngine {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        classifier: Arc<dyn SectionClassifier>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            taxonomy,
            classifier,
            weights,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Runs the full pipeline. The same inputs always produce the same result.
    pub fn analyze(
        &self,
        resume_text: &str,
        jd_text: &str,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisResult, ScanError> {
        let deadline = &options.deadline;

        deadline.check(Stage::Normalize)?;
        let t = Instant::now();
        let resume = normalize(&Document::resume(resume_text), options.max_input_bytes)?;
        let jd = normalize(&Document::job_description(jd_text), options.max_input_bytes)?;
        stage_done(Stage::Normalize, t);

        deadline.check(Stage::Classify)?;
        let t = Instant::now();
        let resume_sections = self.classifier.classify(&resume);
        let jd_sections = self.classifier.classify(&jd);
        stage_done(Stage::Classify, t);

        deadline.check(Stage::Extract)?;
        let t = Instant::now();
        let required = self.extract(&jd, &jd_sections)?;
        stage_done(Stage::Extract, t);

        deadline.check(Stage::Match)?;
        let t = Instant::now();
        let matches = match_skills(&self.taxonomy, &required, &resume);
        stage_done(Stage::Match, t);

        deadline.check(Stage::Score)?;
        let t = Instant::now();
        let breakdown = scoring::score(&matches, &resume, &resume_sections, &self.weights)?;
        stage_done(Stage::Score, t);

        deadline.check(Stage::Feedback)?;
        let t = Instant::now();
        let feedback = feedback::generate(&breakdown, &matches);
        stage_done(Stage::Feedback, t);

        let summary = MatchSummary::from_matches(&matches);
        info!(
            taxonomy = self.taxonomy.version(),
            score = breakdown.total_score,
            required = matches.len(),
            exact = summary.exact,
            synonym = summary.synonym,
            partial = summary.partial,
            missing = summary.missing,
            elapsed_ms = deadline.elapsed_ms(),
            "Scan complete"
        );

        Ok(AnalysisResult {
            score: breakdown.total_score,
            breakdown,
            matches,
            feedback,
            summary,
        })
    }

    /// Normalizes, classifies and extracts a job description without a
    /// resume. Fails with `InsufficientData` when no skill is found.
    pub fn preview_requirements(
        &self,
        jd_text: &str,
        options: &AnalyzeOptions,
    ) -> Result<RequirementsPreview, ScanError> {
        let deadline = &options.deadline;

        deadline.check(Stage::Normalize)?;
        let jd = normalize(&Document::job_description(jd_text), options.max_input_bytes)?;

        deadline.check(Stage::Classify)?;
        let sections = self.classifier.classify(&jd);

        deadline.check(Stage::Extract)?;
        let required_skills = self.extract(&jd, &sections)?;

        Ok(RequirementsPreview {
            sections,
            required_skills,
        })
    }

    fn extract(
        &self,
        jd: &NormalizedDocument,
        sections: &[Section],
    ) -> Result<Vec<RequiredSkill>, ScanError> {
        let required = extract_required(&self.taxonomy, jd, sections);
        if required.is_empty() {
            return Err(ScanError::InsufficientData);
        }
        Ok(required)
    }
}

fn stage_done(stage: Stage, started: Instant) {
    debug!(
        stage = %stage,
        elapsed_us = started.elapsed().as_micros() as u64,
        "Stage complete"
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{MatchKind, Severity};
    use crate::models::document::DocumentKind;
    use crate::scan::classifier::HeadingClassifier;
    use crate::taxonomy::tests::sample_taxonomy;

    const JD: &str = "Looking for a React + Node developer with AWS experience.";
    const RESUME: &str = "React, Node.js, Express, MongoDB.";

    fn engine() -> ScanEngine {
        ScanEngine::new(
            Arc::new(sample_taxonomy()),
            Arc::new(HeadingClassifier::new()),
            ScoringWeights::default(),
        )
    }

    fn options() -> AnalyzeOptions {
        AnalyzeOptions {
            max_input_bytes: 50_000,
            deadline: Deadline::unbounded(),
        }
    }

    #[test]
    fn test_react_node_aws_scenario() {
        let result = engine().analyze(RESUME, JD, &options()).unwrap();

        let kinds: Vec<(&str, MatchKind)> = result
            .matches
            .iter()
            .map(|m| (m.skill.id.as_str(), m.match_kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("react", MatchKind::Exact),
                ("nodejs", MatchKind::Synonym),
                ("aws", MatchKind::Missing),
            ]
        );
        assert_eq!(result.score, 43);
        assert_eq!(result.summary.match_percent, 66);

        assert_eq!(result.feedback[0].severity, Severity::Critical);
        assert_eq!(result.feedback[0].message, "Add AWS to your Skills section");
    }

    #[test]
    fn test_adding_missing_skill_raises_score() {
        let before = engine().analyze(RESUME, JD, &options()).unwrap();
        let after = engine()
            .analyze("React, Node.js, Express, MongoDB, AWS.", JD, &options())
            .unwrap();
        assert!(after.score > before.score);
        assert_eq!(after.score, 63);
        assert!(after
            .feedback
            .iter()
            .all(|f| f.severity != Severity::Critical));
    }

    #[test]
    fn test_score_equals_breakdown_total() {
        let result = engine().analyze(RESUME, JD, &options()).unwrap();
        let sum: u32 = result
            .breakdown
            .components
            .iter()
            .map(|c| c.points_awarded)
            .sum();
        assert_eq!(result.score, result.breakdown.total_score);
        assert_eq!(sum, result.score);
    }

    #[test]
    fn test_feedback_is_ordered_by_severity() {
        let result = engine()
            .analyze(
                "Summary\nJava developer\n\nSkills\nReact.js, k8s",
                "Requirements\n- Kubernetes\n- React\n- Rust\n- Java",
                &options(),
            )
            .unwrap();
        for pair in result.feedback.windows(2) {
            assert!(pair[0].severity <= pair[1].severity);
        }
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let a = engine().analyze(RESUME, JD, &options()).unwrap();
        let b = engine().analyze(RESUME, JD, &options()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_empty_resume_is_rejected() {
        let err = engine().analyze("  \n ", JD, &options()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::EmptyInput {
                kind: DocumentKind::Resume
            }
        ));
    }

    #[test]
    fn test_oversized_job_description_is_rejected() {
        let opts = AnalyzeOptions {
            max_input_bytes: 40,
            ..options()
        };
        let err = engine().analyze(RESUME, JD, &opts).unwrap_err();
        assert!(matches!(
            err,
            ScanError::InputTooLarge {
                kind: DocumentKind::JobDescription,
                ..
            }
        ));
    }

    #[test]
    fn test_job_description_without_skills_is_insufficient() {
        let err = engine()
            .analyze(RESUME, "We value kindness.", &options())
            .unwrap_err();
        assert!(matches!(err, ScanError::InsufficientData));
    }

    #[test]
    fn test_zero_budget_times_out_before_normalizing() {
        let opts = AnalyzeOptions {
            max_input_bytes: 50_000,
            deadline: Deadline::after(Duration::ZERO),
        };
        let err = engine().analyze(RESUME, JD, &opts).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Timeout {
                stage: Stage::Normalize,
                ..
            }
        ));
    }

    #[test]
    fn test_preview_requirements() {
        let preview = engine()
            .preview_requirements("About us\nFintech.\n\nRequirements\n- Rust\n- AWS", &options())
            .unwrap();
        let ids: Vec<&str> = preview
            .required_skills
            .iter()
            .map(|r| r.skill.id.as_str())
            .collect();
        assert_eq!(ids, vec!["rust", "aws"]);
        assert_eq!(preview.sections.len(), 2);
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let result = engine().analyze(RESUME, JD, &options()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
