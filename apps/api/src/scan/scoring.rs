//! Scoring Engine: fixed, documented weighted formula.
//!
//! Algorithm:
//! 1. skill coverage  = W_skills   × Σ credit / required   (Exact 1, Synonym 1, Partial ½, Missing 0)
//! 2. completeness    = W_sections × Σ weight of present sections (Experience .40, Skills .35, Education .25)
//! 3. clarity         = W_clarity  × clarity fraction (see `clarity`)
//! 4. total           = floor(Σ raw), clamped to [0, 100]
//! 5. each component gets floor(raw); the points lost to rounding go to the
//!    components with the largest fractional parts, so Σ awarded == total

use serde::{Deserialize, Serialize};

use crate::models::analysis::{
    MatchKind, MatchResult, ScoreBreakdown, ScoreCategory, ScoreComponent, Section, SectionLabel,
    Shortfall,
};
use crate::models::document::NormalizedDocument;
use crate::scan::clarity::{self, ClarityReport};
use crate::scan::error::ScanError;

/// Sections a resume is expected to have, with their share of the
/// completeness component.
const SECTION_WEIGHTS: &[(SectionLabel, f64)] = &[
    (SectionLabel::Experience, 0.40),
    (SectionLabel::Skills, 0.35),
    (SectionLabel::Education, 0.25),
];

const EPSILON: f64 = 1e-9;

/// Points per component. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skill_coverage: u32,
    pub section_completeness: u32,
    pub clarity: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill_coverage: 60,
            section_completeness: 25,
            clarity: 15,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> u32 {
        self.skill_coverage + self.section_completeness + self.clarity
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.total() != 100 {
            return Err(ScanError::Configuration(format!(
                "score weights must sum to 100, got {} ({} + {} + {})",
                self.total(),
                self.skill_coverage,
                self.section_completeness,
                self.clarity
            )));
        }
        Ok(())
    }
}

/// Scores a resume against its match results.
///
/// Fails with `InsufficientData` when there is nothing to score against.
pub fn score(
    matches: &[MatchResult],
    resume: &NormalizedDocument,
    sections: &[Section],
    weights: &ScoringWeights,
) -> Result<ScoreBreakdown, ScanError> {
    if matches.is_empty() {
        return Err(ScanError::InsufficientData);
    }
    weights.validate()?;

    let credit: f64 = matches.iter().map(|m| m.match_kind.credit()).sum();
    let coverage_raw = weights.skill_coverage as f64 * credit / matches.len() as f64;

    let present: Vec<SectionLabel> = SECTION_WEIGHTS
        .iter()
        .map(|(label, _)| *label)
        .filter(|label| sections.iter().any(|s| s.label == *label && s.has_content()))
        .collect();
    let completeness_share: f64 = SECTION_WEIGHTS
        .iter()
        .filter(|(label, _)| present.contains(label))
        .map(|(_, share)| share)
        .sum();
    let completeness_raw = weights.section_completeness as f64 * completeness_share;

    let report = clarity::assess(resume, sections);
    let clarity_raw = weights.clarity as f64 * report.fraction();

    let possible = [
        weights.skill_coverage,
        weights.section_completeness,
        weights.clarity,
    ];
    let awarded = allocate(&[coverage_raw, completeness_raw, clarity_raw], &possible);
    let total_score = awarded.iter().sum();

    let components = vec![
        ScoreComponent {
            category: ScoreCategory::SkillCoverage,
            points_awarded: awarded[0],
            points_possible: possible[0],
            explanation: explain_coverage(matches),
        },
        ScoreComponent {
            category: ScoreCategory::SectionCompleteness,
            points_awarded: awarded[1],
            points_possible: possible[1],
            explanation: explain_completeness(&present),
        },
        ScoreComponent {
            category: ScoreCategory::Clarity,
            points_awarded: awarded[2],
            points_possible: possible[2],
            explanation: report.explain(),
        },
    ];

    Ok(ScoreBreakdown {
        total_score,
        components,
        shortfalls: collect_shortfalls(&present, awarded[2], possible[2], &report),
    })
}

/// Largest-remainder rounding: floors every raw value, then hands the
/// points lost to rounding to the largest fractional parts until the sum
/// reaches floor(Σ raw). Never exceeds `possible`.
fn allocate(raw: &[f64], possible: &[u32]) -> Vec<u32> {
    let sum: f64 = raw.iter().sum();
    let cap: u32 = possible.iter().sum::<u32>().min(100);
    let total = ((sum + EPSILON).floor().max(0.0) as u32).min(cap);

    let mut awarded: Vec<u32> = raw
        .iter()
        .zip(possible)
        .map(|(r, p)| ((r + EPSILON).floor().max(0.0) as u32).min(*p))
        .collect();

    let mut order: Vec<usize> = (0..raw.len()).collect();
    order.sort_by(|&a, &b| {
        let frac = |i: usize| raw[i] - raw[i].floor();
        frac(b).total_cmp(&frac(a)).then(a.cmp(&b))
    });

    let mut remaining = total.saturating_sub(awarded.iter().sum());
    while remaining > 0 {
        let mut placed = false;
        for &i in &order {
            if remaining == 0 {
                break;
            }
            if awarded[i] < possible[i] {
                awarded[i] += 1;
                remaining -= 1;
                placed = true;
            }
        }
        // every component is full
        if !placed {
            break;
        }
    }

    awarded
}

fn collect_shortfalls(
    present: &[SectionLabel],
    clarity_awarded: u32,
    clarity_possible: u32,
    report: &ClarityReport,
) -> Vec<Shortfall> {
    let mut out: Vec<Shortfall> = SECTION_WEIGHTS
        .iter()
        .filter(|(label, _)| !present.contains(label))
        .map(|(label, _)| Shortfall::MissingSection { section: *label })
        .collect();

    if clarity_awarded * 2 < clarity_possible {
        out.push(Shortfall::LowClarity {
            points_awarded: clarity_awarded,
            points_possible: clarity_possible,
        });
    }
    out.extend(report.shortfalls());
    out
}

fn explain_coverage(matches: &[MatchResult]) -> String {
    let names = |kind: MatchKind| {
        matches
            .iter()
            .filter(|m| m.match_kind == kind)
            .map(|m| m.skill.name.as_str())
            .collect::<Vec<_>>()
    };

    let covered = matches.iter().filter(|m| m.present_in_resume).count();
    let mut parts = vec![format!(
        "{covered} of {} required skills found",
        matches.len()
    )];

    for (kind, label) in [
        (MatchKind::Exact, "exact"),
        (MatchKind::Synonym, "synonym"),
        (MatchKind::Partial, "partial, half credit"),
        (MatchKind::Missing, "missing"),
    ] {
        let listed = names(kind);
        if !listed.is_empty() {
            parts.push(format!("{label}: {}", listed.join(", ")));
        }
    }

    format!("{}.", parts.join("; "))
}

fn explain_completeness(present: &[SectionLabel]) -> String {
    let missing: Vec<&str> = SECTION_WEIGHTS
        .iter()
        .filter(|(label, _)| !present.contains(label))
        .map(|(label, _)| label.as_str())
        .collect();
    let found: Vec<&str> = present.iter().map(|l| l.as_str()).collect();

    match (found.is_empty(), missing.is_empty()) {
        (_, true) => format!("All key sections present: {}.", found.join(", ")),
        (true, false) => format!("No key sections found; missing {}.", missing.join(", ")),
        (false, false) => format!(
            "Present: {}; missing {}.",
            found.join(", "),
            missing.join(", ")
        ),
    }
}
