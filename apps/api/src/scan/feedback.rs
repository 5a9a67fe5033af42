//! Feedback Generator: turns match results and scoring shortfalls into
//! actionable suggestions.
//!
//! Output is ordered Critical, then Warning, then Info. Within a tier, skill
//! items keep the order the job description introduced them, followed by
//! structural items.

use crate::models::analysis::{
    FeedbackItem, MatchKind, MatchResult, ScoreBreakdown, SectionLabel, Severity, Shortfall,
};

pub fn generate(breakdown: &ScoreBreakdown, matches: &[MatchResult]) -> Vec<FeedbackItem> {
    let mut items: Vec<FeedbackItem> = matches.iter().filter_map(skill_item).collect();
    items.extend(breakdown.shortfalls.iter().map(structural_item));

    // stable: keeps appearance order inside each tier
    items.sort_by_key(|item| item.severity);
    items
}

fn skill_item(m: &MatchResult) -> Option<FeedbackItem> {
    let name = &m.skill.name;
    let (severity, message) = match m.match_kind {
        MatchKind::Exact => return None,
        MatchKind::Missing => (
            Severity::Critical,
            format!("Add {name} to your Skills section"),
        ),
        MatchKind::Partial => (
            Severity::Warning,
            match &m.matched_form {
                Some(found) => format!(
                    "Make {name} explicit rather than implied (the resume only shows \"{found}\")"
                ),
                None => format!("Make {name} explicit rather than implied"),
            },
        ),
        MatchKind::Synonym => (
            Severity::Info,
            format!(
                "Use the job description's wording \"{}\" for {name} (the resume says \"{}\")",
                m.jd_form,
                m.matched_form.as_deref().unwrap_or(name.as_str())
            ),
        ),
    };

    Some(FeedbackItem {
        severity,
        message,
        related_skill: Some(m.skill.id.clone()),
    })
}

fn structural_item(shortfall: &Shortfall) -> FeedbackItem {
    let (severity, message) = match shortfall {
        Shortfall::MissingSection { section } => {
            let severity = match section {
                SectionLabel::Skills | SectionLabel::Experience => Severity::Warning,
                _ => Severity::Info,
            };
            (severity, format!("Add a clearly headed {section} section"))
        }
        Shortfall::LowClarity {
            points_awarded,
            points_possible,
        } => (
            Severity::Warning,
            format!(
                "Clarity scored {points_awarded} of {points_possible}; tighten formatting using the suggestions below"
            ),
        ),
        Shortfall::TableOrImageMarkers { lines } => (
            Severity::Warning,
            format!("Remove tables and images ({lines} line(s)); use plain text instead"),
        ),
        Shortfall::SparseBullets { bullet_percent } => (
            Severity::Info,
            format!(
                "Use bullet points for achievements; only {bullet_percent}% of experience lines are bullets"
            ),
        ),
        Shortfall::LengthOutOfBounds {
            word_count,
            min_words,
            max_words,
        } => (
            Severity::Info,
            format!("Resume has {word_count} words; aim for {min_words}-{max_words}"),
        ),
        Shortfall::UnquantifiedBullets {
            unquantified,
            total,
        } => (
            Severity::Info,
            format!(
                "Quantify your impact: {unquantified} of {total} bullets have no number, percentage or [LOW_METRICS] tag"
            ),
        ),
        Shortfall::VagueVerbs { verbs } => (
            Severity::Info,
            format!(
                "Rephrase bullets using vague verbs ({}) with a concrete action and outcome",
                verbs.join(", ")
            ),
        ),
    };

    FeedbackItem {
        severity,
        message,
        related_skill: None,
    }
}
