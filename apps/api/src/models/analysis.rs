use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::document::{NormalizedDocument, Token};
use crate::models::skill::SkillTerm;

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
    Certifications,
    Requirements,
    Responsibilities,
    Unclassified,
}

impl SectionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::Summary => "Summary",
            SectionLabel::Skills => "Skills",
            SectionLabel::Experience => "Experience",
            SectionLabel::Education => "Education",
            SectionLabel::Projects => "Projects",
            SectionLabel::Certifications => "Certifications",
            SectionLabel::Requirements => "Requirements",
            SectionLabel::Responsibilities => "Responsibilities",
            SectionLabel::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled, contiguous span of a `NormalizedDocument`.
///
/// Heading tokens are never part of a section, so sections of one document
/// never share a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub label: SectionLabel,
    /// Heading text as written, if the section was opened by a heading.
    pub heading: Option<String>,
    /// Line indices, end exclusive.
    pub line_start: usize,
    pub line_end: usize,
    /// Token indices, end exclusive.
    pub token_start: usize,
    pub token_end: usize,
    /// Byte offsets into the normalized text, end exclusive.
    pub byte_start: usize,
    pub byte_end: usize,
}

impl Section {
    pub fn tokens<'d>(&self, doc: &'d NormalizedDocument) -> &'d [Token] {
        &doc.tokens[self.token_start..self.token_end]
    }

    #[cfg(test)]
    pub fn text<'d>(&self, doc: &'d NormalizedDocument) -> &'d str {
        &doc.text[self.byte_start..self.byte_end]
    }

    #[cfg(test)]
    pub fn token_count(&self) -> usize {
        self.token_end - self.token_start
    }

    pub fn has_content(&self) -> bool {
        self.token_end > self.token_start
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Matching
// ────────────────────────────────────────────────────────────────────────────

/// Strength of evidence that the resume covers a required skill.
/// Declared strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Synonym,
    Partial,
    Missing,
}

impl MatchKind {
    /// Fraction of a skill's coverage credit this kind earns.
    pub fn credit(&self) -> f64 {
        match self {
            MatchKind::Exact | MatchKind::Synonym => 1.0,
            MatchKind::Partial => 0.5,
            MatchKind::Missing => 0.0,
        }
    }
}

/// Outcome for one required skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub skill: SkillTerm,
    /// Surface form the job description used, lower-cased.
    pub jd_form: String,
    pub present_in_resume: bool,
    pub match_kind: MatchKind,
    /// Resume surface form that produced the match, lower-cased.
    pub matched_form: Option<String>,
    /// Byte offsets into the normalized resume text, ascending.
    pub locations: Vec<usize>,
}

/// Counts behind the "skill match %" headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub exact: usize,
    pub synonym: usize,
    pub partial: usize,
    pub missing: usize,
    pub match_percent: u32,
}

impl MatchSummary {
    pub fn from_matches(matches: &[MatchResult]) -> Self {
        let count = |kind: MatchKind| matches.iter().filter(|m| m.match_kind == kind).count();
        let credit: f64 = matches.iter().map(|m| m.match_kind.credit()).sum();
        let match_percent = if matches.is_empty() {
            0
        } else {
            ((credit / matches.len() as f64) * 100.0 + 1e-9).floor() as u32
        };

        Self {
            exact: count(MatchKind::Exact),
            synonym: count(MatchKind::Synonym),
            partial: count(MatchKind::Partial),
            missing: count(MatchKind::Missing),
            match_percent,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    SkillCoverage,
    SectionCompleteness,
    Clarity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub category: ScoreCategory,
    pub points_awarded: u32,
    pub points_possible: u32,
    pub explanation: String,
}

/// A structural weakness found while scoring, kept machine-readable so the
/// feedback stage does not have to re-derive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shortfall {
    MissingSection {
        section: SectionLabel,
    },
    LowClarity {
        points_awarded: u32,
        points_possible: u32,
    },
    SparseBullets {
        bullet_percent: u32,
    },
    LengthOutOfBounds {
        word_count: usize,
        min_words: usize,
        max_words: usize,
    },
    TableOrImageMarkers {
        lines: usize,
    },
    UnquantifiedBullets {
        unquantified: usize,
        total: usize,
    },
    VagueVerbs {
        verbs: Vec<String>,
    },
}

/// Invariant: `total_score` equals the sum of `points_awarded`, and every
/// component awards at most its `points_possible`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total_score: u32,
    pub components: Vec<ScoreComponent>,
    #[serde(default)]
    pub shortfalls: Vec<Shortfall>,
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback
// ────────────────────────────────────────────────────────────────────────────

/// Declared most severe first; the derived `Ord` drives feedback ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub severity: Severity,
    pub message: String,
    /// Taxonomy id of the skill this item is about, if any.
    pub related_skill: Option<String>,
}

/// Whole result of one analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    pub matches: Vec<MatchResult>,
    pub feedback: Vec<FeedbackItem>,
    pub summary: MatchSummary,
}
