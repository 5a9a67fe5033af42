//! Clarity heuristics for the resume: bullet density, length bounds,
//! quantified bullets and table/image markers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::analysis::{Section, SectionLabel, Shortfall};
use crate::models::document::{Line, NormalizedDocument};

/// Heuristic weights within the clarity component. Sum to 1.0.
const BULLET_DENSITY_WEIGHT: f64 = 0.35;
const LENGTH_WEIGHT: f64 = 0.25;
const QUANTIFIED_WEIGHT: f64 = 0.20;
const NO_MARKERS_WEIGHT: f64 = 0.20;

/// Share of content lines that should be bullets for full credit.
pub const TARGET_BULLET_DENSITY: f64 = 0.5;
/// Share of bullets that should carry a metric for full credit.
pub const TARGET_QUANTIFIED_RATIO: f64 = 0.5;
pub const MIN_WORDS: usize = 150;
pub const MAX_WORDS: usize = 1000;

/// Sections whose lines are judged for bullets. Falls back to every section.
const CONTENT_LABELS: &[SectionLabel] = &[SectionLabel::Experience, SectionLabel::Projects];

const VAGUE_VERBS: &[&str] = &[
    "improved",
    "enhanced",
    "helped",
    "worked on",
    "assisted",
    "supported",
    "participated",
    "involved",
    "responsible for",
];

static QUANTIFIED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9%$€£]|\[LOW_METRICS\]").expect("valid quantified regex"));

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(image|img|table|figure|photo|chart)[^\]]*\]|<\s*(img|table)\b|!\[[^\]]*\]\(")
        .expect("valid marker regex")
});

static VAGUE: Lazy<Regex> = Lazy::new(|| {
    let alternatives = VAGUE_VERBS
        .iter()
        .map(|v| regex::escape(v).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({alternatives})\b")).expect("valid vague verb regex")
});

/// Raw clarity measurements of one resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClarityReport {
    pub content_lines: usize,
    pub bullet_lines: usize,
    pub quantified_bullets: usize,
    pub word_count: usize,
    /// Lines carrying table or image markup.
    pub marker_lines: usize,
    /// Vague verbs found in unquantified bullets, first appearance order.
    pub vague_verbs: Vec<String>,
}

impl ClarityReport {
    pub fn bullet_density(&self) -> f64 {
        if self.content_lines == 0 {
            0.0
        } else {
            self.bullet_lines as f64 / self.content_lines as f64
        }
    }

    pub fn quantified_ratio(&self) -> f64 {
        if self.bullet_lines == 0 {
            0.0
        } else {
            self.quantified_bullets as f64 / self.bullet_lines as f64
        }
    }

    pub fn length_in_bounds(&self) -> bool {
        (MIN_WORDS..=MAX_WORDS).contains(&self.word_count)
    }

    /// Weighted clarity in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        let density = (self.bullet_density() / TARGET_BULLET_DENSITY).min(1.0);
        let quantified = (self.quantified_ratio() / TARGET_QUANTIFIED_RATIO).min(1.0);
        let length = if self.length_in_bounds() { 1.0 } else { 0.0 };
        let no_markers = if self.marker_lines == 0 { 1.0 } else { 0.0 };

        BULLET_DENSITY_WEIGHT * density
            + LENGTH_WEIGHT * length
            + QUANTIFIED_WEIGHT * quantified
            + NO_MARKERS_WEIGHT * no_markers
    }

    /// Structural weaknesses found by the individual heuristics.
    pub fn shortfalls(&self) -> Vec<Shortfall> {
        let mut out = Vec::new();

        if self.bullet_density() < TARGET_BULLET_DENSITY {
            out.push(Shortfall::SparseBullets {
                bullet_percent: percent(self.bullet_density()),
            });
        }
        if !self.length_in_bounds() {
            out.push(Shortfall::LengthOutOfBounds {
                word_count: self.word_count,
                min_words: MIN_WORDS,
                max_words: MAX_WORDS,
            });
        }
        if self.marker_lines > 0 {
            out.push(Shortfall::TableOrImageMarkers {
                lines: self.marker_lines,
            });
        }
        if self.bullet_lines > 0 && self.quantified_ratio() < TARGET_QUANTIFIED_RATIO {
            out.push(Shortfall::UnquantifiedBullets {
                unquantified: self.bullet_lines - self.quantified_bullets,
                total: self.bullet_lines,
            });
        }
        if !self.vague_verbs.is_empty() {
            out.push(Shortfall::VagueVerbs {
                verbs: self.vague_verbs.clone(),
            });
        }

        out
    }

    /// One-line summary naming each measurement.
    pub fn explain(&self) -> String {
        let markers = match self.marker_lines {
            0 => "no table or image markers".to_string(),
            n => format!("table or image markers on {n} line(s)"),
        };
        format!(
            "{}% of {} content lines are bullets; {} words (target {}-{}); {} of {} bullets quantified; {}.",
            percent(self.bullet_density()),
            self.content_lines,
            self.word_count,
            MIN_WORDS,
            MAX_WORDS,
            self.quantified_bullets,
            self.bullet_lines,
            markers,
        )
    }
}

/// Measures a classified resume.
pub fn assess(doc: &NormalizedDocument, sections: &[Section]) -> ClarityReport {
    let targeted: Vec<&Section> = sections
        .iter()
        .filter(|s| CONTENT_LABELS.contains(&s.label) && s.has_content())
        .collect();
    let scope: Vec<&Section> = if targeted.is_empty() {
        sections.iter().collect()
    } else {
        targeted
    };

    let content: Vec<&Line> = doc
        .lines
        .iter()
        .filter(|line| scope.iter().any(|s| holds_line(s, line)))
        .collect();

    let mut bullet_lines = 0;
    let mut quantified_bullets = 0;
    let mut vague_verbs: Vec<String> = Vec::new();

    for line in content.iter().filter(|l| l.is_bullet) {
        bullet_lines += 1;
        let body = bullet_body(&line.text);
        if QUANTIFIED.is_match(body) {
            quantified_bullets += 1;
            continue;
        }
        for found in VAGUE.find_iter(body) {
            let verb = found
                .as_str()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            if !vague_verbs.contains(&verb) {
                vague_verbs.push(verb);
            }
        }
    }

    let marker_lines = doc.lines.iter().filter(|l| has_marker(&l.text)).count();

    ClarityReport {
        content_lines: content.len(),
        bullet_lines,
        quantified_bullets,
        word_count: doc.word_count(),
        marker_lines,
        vague_verbs,
    }
}

/// A line belongs to a section when any of its tokens falls inside it.
/// Heading lines without inline content therefore never count.
fn holds_line(section: &Section, line: &Line) -> bool {
    line.tokens.start < section.token_end && line.tokens.end > section.token_start
}

/// Bullet text without its marker, so "1. Helped" does not count as a metric.
fn bullet_body(text: &str) -> &str {
    let rest = text.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < text.len() {
        return rest
            .strip_prefix(". ")
            .or_else(|| rest.strip_prefix(") "))
            .unwrap_or(text);
    }
    text.char_indices()
        .nth(1)
        .map(|(i, _)| &text[i..])
        .unwrap_or("")
}

fn has_marker(text: &str) -> bool {
    MARKER.is_match(text) || text.matches('|').count() >= 2
}

fn percent(ratio: f64) -> u32 {
    (ratio * 100.0 + 1e-9).floor() as u32
}
