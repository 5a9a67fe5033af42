//! Section Classifier: pluggable, trait-based partitioning of a normalized
//! document into labeled sections.
//!
//! Default: `HeadingClassifier` (keyword headings, deterministic).
//! `AppState` holds an `Arc<dyn SectionClassifier>`, so a learned model can
//! replace the heuristic without touching scoring or feedback.

use crate::models::analysis::{Section, SectionLabel};
use crate::models::document::{Line, NormalizedDocument, Token};
use crate::scan::normalizer::phrase_tokens;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implementations must never fail: a document they cannot make sense of
/// becomes a single `Unclassified` section.
pub trait SectionClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn classify(&self, doc: &NormalizedDocument) -> Vec<Section>;
}

// ────────────────────────────────────────────────────────────────────────────
// HeadingClassifier: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Heading keywords, matched case-insensitively against whole tokens.
const HEADING_KEYWORDS: &[(&str, SectionLabel)] = &[
    ("summary", SectionLabel::Summary),
    ("professional summary", SectionLabel::Summary),
    ("profile", SectionLabel::Summary),
    ("objective", SectionLabel::Summary),
    ("about me", SectionLabel::Summary),
    ("about us", SectionLabel::Summary),
    ("about the role", SectionLabel::Summary),
    ("overview", SectionLabel::Summary),
    ("skills", SectionLabel::Skills),
    ("technical skills", SectionLabel::Skills),
    ("core competencies", SectionLabel::Skills),
    ("competencies", SectionLabel::Skills),
    ("technologies", SectionLabel::Skills),
    ("tech stack", SectionLabel::Skills),
    ("toolkit", SectionLabel::Skills),
    ("experience", SectionLabel::Experience),
    ("work experience", SectionLabel::Experience),
    ("professional experience", SectionLabel::Experience),
    ("employment", SectionLabel::Experience),
    ("employment history", SectionLabel::Experience),
    ("work history", SectionLabel::Experience),
    ("career history", SectionLabel::Experience),
    ("education", SectionLabel::Education),
    ("academic background", SectionLabel::Education),
    ("academics", SectionLabel::Education),
    ("qualifications and education", SectionLabel::Education),
    ("projects", SectionLabel::Projects),
    ("personal projects", SectionLabel::Projects),
    ("side projects", SectionLabel::Projects),
    ("portfolio", SectionLabel::Projects),
    ("certifications", SectionLabel::Certifications),
    ("licenses and certifications", SectionLabel::Certifications),
    ("requirements", SectionLabel::Requirements),
    ("qualifications", SectionLabel::Requirements),
    ("required skills", SectionLabel::Requirements),
    ("preferred skills", SectionLabel::Requirements),
    ("preferred qualifications", SectionLabel::Requirements),
    ("minimum qualifications", SectionLabel::Requirements),
    ("what you'll need", SectionLabel::Requirements),
    ("what we're looking for", SectionLabel::Requirements),
    ("nice to have", SectionLabel::Requirements),
    ("must have", SectionLabel::Requirements),
    ("responsibilities", SectionLabel::Responsibilities),
    ("key responsibilities", SectionLabel::Responsibilities),
    ("what you'll do", SectionLabel::Responsibilities),
    ("the role", SectionLabel::Responsibilities),
];

/// Longest head (before any colon) that can still be a heading.
const MAX_HEADING_TOKENS: usize = 5;
/// Words allowed in front of a keyword ("Relevant Work Experience").
const MAX_MODIFIER_TOKENS: usize = 2;
/// The only words that may precede a keyword. "Kubernetes experience" is a
/// line of content, not a heading.
const HEADING_MODIFIERS: &[&str] = &[
    "relevant",
    "work",
    "professional",
    "technical",
    "key",
    "core",
    "additional",
    "other",
    "selected",
    "recent",
    "related",
    "academic",
    "notable",
    "previous",
    "my",
    "our",
    "your",
];

struct Keyword {
    tokens: Vec<String>,
    label: SectionLabel,
}

/// Keyword-heading classifier.
///
/// A line is a heading when its head (the text before the first `:`, or the
/// whole line when there is no colon) is at most five words long and ends
/// with a heading keyword preceded by at most two modifiers such as
/// "relevant" or "technical". Bullets and
/// colon-less lines ending in `.` or `,` are never headings. Text after the
/// colon stays in the new section ("Skills: Rust, Go").
///
/// When several keywords fit one line, the longest wins, so "Required
/// Skills" opens Requirements rather than Skills. Content before the first
/// heading is Summary; a document with no headings at all is one
/// Unclassified section.
pub struct HeadingClassifier {
    keywords: Vec<Keyword>,
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

struct HeadingMatch {
    label: SectionLabel,
    heading: String,
    /// First token index of inline content after the colon.
    content_start: usize,
}

impl HeadingClassifier {
    pub fn new() -> Self {
        let keywords = HEADING_KEYWORDS
            .iter()
            .map(|(phrase, label)| Keyword {
                tokens: phrase_tokens(phrase),
                label: *label,
            })
            .collect();
        Self { keywords }
    }

    fn match_heading(&self, doc: &NormalizedDocument, line: &Line) -> Option<HeadingMatch> {
        if line.is_bullet {
            return None;
        }

        let tokens = doc.line_tokens(line);
        let (head, heading_text, content_start): (&[Token], &str, usize) =
            match line.text.find(':') {
                Some(colon) => {
                    let colon_offset = line.start + colon;
                    let head_len = tokens.iter().take_while(|t| t.offset < colon_offset).count();
                    (
                        &tokens[..head_len],
                        line.text[..colon].trim(),
                        line.tokens.start + head_len,
                    )
                }
                None => {
                    if line.text.ends_with('.') || line.text.ends_with(',') {
                        return None;
                    }
                    (tokens, line.text.as_str(), line.tokens.end)
                }
            };

        if head.is_empty() || head.len() > MAX_HEADING_TOKENS {
            return None;
        }

        let best = self
            .keywords
            .iter()
            .filter(|k| ends_with_keyword(head, &k.tokens))
            .max_by_key(|k| (k.tokens.len(), k.tokens.iter().map(String::len).sum::<usize>()))?;

        Some(HeadingMatch {
            label: best.label,
            heading: heading_text.to_string(),
            content_start,
        })
    }
}

fn ends_with_keyword(head: &[Token], keyword: &[String]) -> bool {
    if keyword.len() > head.len() || head.len() - keyword.len() > MAX_MODIFIER_TOKENS {
        return false;
    }
    let (modifiers, tail) = head.split_at(head.len() - keyword.len());
    tail.iter().zip(keyword).all(|(t, k)| t.norm == *k)
        && modifiers
            .iter()
            .all(|t| HEADING_MODIFIERS.contains(&t.norm.as_str()))
}

impl SectionClassifier for HeadingClassifier {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn classify(&self, doc: &NormalizedDocument) -> Vec<Section> {
        let headings: Vec<Option<HeadingMatch>> = doc
            .lines
            .iter()
            .map(|line| self.match_heading(doc, line))
            .collect();

        if headings.iter().all(Option::is_none) {
            return vec![span(
                doc,
                SectionLabel::Unclassified,
                None,
                0,
                doc.lines.len(),
                0,
            )];
        }

        let mut sections = Vec::new();
        // (label, heading, first line, first token)
        let mut open: Option<(SectionLabel, Option<String>, usize, usize)> = None;

        for (line_idx, heading) in headings.into_iter().enumerate() {
            let Some(found) = heading else {
                continue;
            };

            match open.take() {
                Some((label, text, line_start, token_start)) => sections.push(span(
                    doc,
                    label,
                    text,
                    line_start,
                    line_idx,
                    token_start,
                )),
                None if line_idx > 0 => {
                    sections.push(span(doc, SectionLabel::Summary, None, 0, line_idx, 0))
                }
                None => {}
            }
            open = Some((found.label, Some(found.heading), line_idx, found.content_start));
        }

        if let Some((label, text, line_start, token_start)) = open {
            sections.push(span(doc, label, text, line_start, doc.lines.len(), token_start));
        }

        sections
    }
}

/// Builds a section covering lines `[line_start, line_end)`, with tokens
/// starting at `token_start`.
fn span(
    doc: &NormalizedDocument,
    label: SectionLabel,
    heading: Option<String>,
    line_start: usize,
    line_end: usize,
    token_start: usize,
) -> Section {
    let token_end = if line_end < doc.lines.len() {
        doc.lines[line_end].tokens.start
    } else {
        doc.tokens.len()
    };
    let token_end = token_end.max(token_start);

    let (byte_start, byte_end) = if token_end > token_start {
        (doc.tokens[token_start].offset, doc.tokens[token_end - 1].end())
    } else {
        let at = doc
            .lines
            .get(line_start)
            .map(|l| l.start + l.text.len())
            .unwrap_or(doc.text.len());
        (at, at)
    };

    Section {
        label,
        heading,
        line_start,
        line_end,
        token_start,
        token_end,
        byte_start,
        byte_end,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
