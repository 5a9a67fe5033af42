use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Which side of the comparison a document is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    JobDescription,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::JobDescription => "job_description",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw text handed to the pipeline by the ingestion layer.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub raw_text: &'a str,
    pub kind: DocumentKind,
}

impl<'a> Document<'a> {
    pub fn resume(raw_text: &'a str) -> Self {
        Self {
            raw_text,
            kind: DocumentKind::Resume,
        }
    }

    pub fn job_description(raw_text: &'a str) -> Self {
        Self {
            raw_text,
            kind: DocumentKind::JobDescription,
        }
    }
}

/// A single word-like token.
///
/// `text` keeps the original casing for display; `norm` is the lower-cased
/// copy every matcher compares against. `offset` is a byte offset into
/// `NormalizedDocument::text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub norm: String,
    pub offset: usize,
    pub line: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// One non-blank line of the cleaned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// Byte offset of the first character of the line.
    pub start: usize,
    pub paragraph: usize,
    pub is_bullet: bool,
    /// Indices into `NormalizedDocument::tokens`.
    pub tokens: Range<usize>,
}

/// Cleaned, tokenized form of a `Document`. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub kind: DocumentKind,
    pub text: String,
    pub lines: Vec<Line>,
    pub tokens: Vec<Token>,
    pub paragraph_count: usize,
}

impl NormalizedDocument {
    pub fn line_tokens(&self, line: &Line) -> &[Token] {
        &self.tokens[line.tokens.clone()]
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}
