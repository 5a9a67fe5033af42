//! Document Normalizer: cleans raw text and splits it into lines, paragraphs
//! and tokens.
//!
//! Cleaning steps, in order:
//! 1. `\r\n` and lone `\r` become `\n`; tabs and no-break spaces become spaces;
//!    curly apostrophes become `'`
//! 2. zero-width characters and every other control character are dropped
//! 3. runs of whitespace inside a line collapse to one space, lines are trimmed
//! 4. runs of blank lines collapse to a single blank line (a paragraph break)
//!
//! The same input always yields a byte-identical `NormalizedDocument`.

use crate::models::document::{Document, Line, NormalizedDocument, Token};
use crate::scan::error::ScanError;

/// Leading markers that make a line a bullet. Numbered items ("1.", "2)")
/// are detected separately.
const BULLET_MARKERS: &[char] = &[
    '•', '·', '▪', '◦', '●', '○', '■', '□', '‣', '⁃', '-', '*', '–', '—', '>',
];

/// Cleans and tokenizes a document.
///
/// Fails with `InputTooLarge` when the raw text exceeds `max_input_bytes`
/// and with `EmptyInput` when nothing but whitespace is left after cleaning.
pub fn normalize(
    document: &Document<'_>,
    max_input_bytes: usize,
) -> Result<NormalizedDocument, ScanError> {
    let size = document.raw_text.len();
    if size > max_input_bytes {
        return Err(ScanError::InputTooLarge {
            kind: document.kind,
            size,
            limit: max_input_bytes,
        });
    }

    let text = clean_text(document.raw_text);
    if text.is_empty() {
        return Err(ScanError::EmptyInput {
            kind: document.kind,
        });
    }

    let mut lines = Vec::new();
    let mut tokens = Vec::new();
    let mut paragraph = 0usize;
    let mut offset = 0usize;
    let mut previous_blank = false;

    for raw_line in text.split('\n') {
        let line_start = offset;
        offset += raw_line.len() + 1;

        if raw_line.is_empty() {
            previous_blank = true;
            continue;
        }
        if previous_blank {
            paragraph += 1;
            previous_blank = false;
        }

        let line_index = lines.len();
        let token_start = tokens.len();
        for (local, word) in tokenize(raw_line) {
            tokens.push(Token {
                text: word.to_string(),
                norm: word.to_lowercase(),
                offset: line_start + local,
                line: line_index,
            });
        }

        lines.push(Line {
            text: raw_line.to_string(),
            start: line_start,
            paragraph,
            is_bullet: is_bullet_line(raw_line),
            tokens: token_start..tokens.len(),
        });
    }

    Ok(NormalizedDocument {
        kind: document.kind,
        text,
        lines,
        tokens,
        paragraph_count: paragraph + 1,
    })
}

/// Applies the cleaning steps and returns the cleaned text. Blank input
/// yields an empty string.
pub fn clean_text(raw: &str) -> String {
    let mut unified = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                unified.push('\n');
            }
            '\n' => unified.push('\n'),
            '\t' | '\u{00A0}' | '\u{2007}' | '\u{202F}' => unified.push(' '),
            '\u{2018}' | '\u{2019}' => unified.push('\''),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
            c if c.is_control() => {}
            c => unified.push(c),
        }
    }

    let mut out = String::with_capacity(unified.len());
    let mut pending_blank = false;

    for line in unified.split('\n') {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if pending_blank {
                out.push('\n');
            }
        }
        pending_blank = false;
        out.push_str(&collapsed);
    }

    out
}

/// Splits a line into word-like tokens, returning `(byte offset, slice)`.
///
/// A token is a run of alphanumerics plus `+ # . _ '`. Leading punctuation is
/// dropped except a single `.` directly before a letter or digit (".NET");
/// trailing `. ' _` are dropped so "MongoDB." becomes "MongoDB" while "C++"
/// and "C#" survive. Runs with no alphanumeric character are discarded.
pub fn tokenize(line: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, c) in line.char_indices() {
        if is_word_char(c) {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(start) = run_start.take() {
            push_trimmed(&mut out, start, &line[start..i]);
        }
    }
    if let Some(start) = run_start {
        push_trimmed(&mut out, start, &line[start..]);
    }

    out
}

/// Tokenizes a taxonomy or heading phrase into lower-cased tokens, using the
/// same rules as document text so both sides compare equal.
pub fn phrase_tokens(phrase: &str) -> Vec<String> {
    tokenize(phrase)
        .into_iter()
        .map(|(_, word)| word.to_lowercase())
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '_' | '\'')
}

fn push_trimmed<'a>(out: &mut Vec<(usize, &'a str)>, start: usize, run: &'a str) {
    let trimmed = run.trim_end_matches(['.', '\'', '_']);
    let lead = trimmed
        .char_indices()
        .find(|&(i, c)| {
            c.is_alphanumeric()
                || (c == '.' && trimmed[i + 1..].starts_with(char::is_alphanumeric))
        })
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let word = &trimmed[lead..];

    if word.chars().any(char::is_alphanumeric) {
        out.push((start + lead, word));
    }
}

fn is_bullet_line(line: &str) -> bool {
    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if BULLET_MARKERS.contains(&first) {
        return chars.next() == Some(' ');
    }

    // "1. ", "12) "
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && digits <= 2 {
        let rest = &line[digits..];
        return rest.starts_with(". ") || rest.starts_with(") ");
    }

    false
}
