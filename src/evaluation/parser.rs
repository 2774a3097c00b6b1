//! Turns free-form model output into a bounded score and a short reason.
//!
//! # Grammar
//!
//! ```text
//! reply    := json-snippet | prose
//! literal  := ["-"] (digits ["." digits] | "." digits) [scale]
//! scale    := "/" digits ["." digits] | "%"
//! label    := ("score" | "rating") [":" | "=" | "*" | quote]*
//! ```
//!
//! Directly after a `score` label, `0,85` is read as `0.85`.
//!
//! Selection, in order:
//!
//! 1. A JSON object carrying a numeric `score` (else `rating`) field.
//! 2. The first literal directly preceded by a `score` label, else the first one preceded
//!    by a `rating` label. A bare labelled value in `[2, 10]` is read as out of ten and a
//!    whole number in `(10, 100]` as out of a hundred. Anything else, such as a `1.1`
//!    overshoot, is taken as is and clamped.
//! 3. The first literal whose scaled value lies in `[0, 1]`.
//!
//! Literals glued to letters (`llama3`, `10px`), dotted runs (`1.2.3`) and dates
//! (`1/2/2024`) are never scores. The chosen value is clamped to `[0, 1]`.
//!
//! The reason is the text after a `reason:`/`explanation:` label, else the text
//! following the score, else the text preceding it.

use serde_json::Value;
use thiserror::Error;

use super::types::clamp_score;
use crate::constants::MAX_REASON_CHARS;

const SCORE_LABELS: [&str; 2] = ["score", "rating"];
const REASON_LABELS: [&str; 2] = ["reason", "explanation"];

/// Substituted when the model gives a score but no explanation.
pub const FALLBACK_REASON: &str = "No explanation provided";

/// Score and reason extracted from a model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVerdict {
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("model response was empty")]
    Empty,

    #[error("model response contained no usable score")]
    NoScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScoreLabel {
    Score,
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NumericLiteral {
    value: f64,
    scale: Option<f64>,
    start: usize,
    end: usize,
    label: Option<ScoreLabel>,
}

impl NumericLiteral {
    fn normalized(&self) -> f64 {
        match self.scale {
            Some(scale) => self.value / scale,
            None if self.label.is_some() => normalize_labelled(self.value),
            None => self.value,
        }
    }
}

/// Parses a model reply.
pub fn parse_response(text: &str) -> Result<ParsedVerdict, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    if let Some(verdict) = parse_json_snippet(text) {
        return Ok(verdict);
    }

    let literals = scan_literals(text);
    let chosen = literals
        .iter()
        .find(|l| l.label == Some(ScoreLabel::Score))
        .or_else(|| literals.iter().find(|l| l.label == Some(ScoreLabel::Rating)))
        .or_else(|| {
            literals
                .iter()
                .find(|l| (0.0..=1.0).contains(&l.normalized()))
        })
        .ok_or(ParseError::NoScore)?;

    // An explicit but empty reason label means "no explanation", not "look elsewhere".
    let reason = match labelled_reason(text) {
        Some(body) => normalize_reason(body),
        None => reason_around(text, chosen).and_then(normalize_reason),
    }
    .unwrap_or_else(|| FALLBACK_REASON.to_string());

    Ok(ParsedVerdict {
        score: clamp_score(chosen.normalized()),
        reason,
    })
}

fn normalize_labelled(value: f64) -> f64 {
    if (2.0..=10.0).contains(&value) {
        value / 10.0
    } else if value > 10.0 && value <= 100.0 && value.fract() == 0.0 {
        value / 100.0
    } else {
        value
    }
}

fn parse_json_snippet(text: &str) -> Option<ParsedVerdict> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    let value: Value = serde_json::from_str(&text[start..=end]).ok()?;
    let object = value.as_object()?;

    let raw = SCORE_LABELS.iter().find_map(|label| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(label))
            .and_then(|(_, v)| {
                v.as_f64()
                    .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            })
    })?;

    let reason = object
        .iter()
        .find(|(key, _)| REASON_LABELS.iter().any(|l| key.eq_ignore_ascii_case(l)))
        .and_then(|(_, v)| v.as_str())
        .and_then(normalize_reason)
        .unwrap_or_else(|| FALLBACK_REASON.to_string());

    Some(ParsedVerdict {
        score: clamp_score(normalize_labelled(raw)),
        reason,
    })
}

#[inline]
fn digit_at(bytes: &[u8], i: usize) -> bool {
    bytes.get(i).is_some_and(u8::is_ascii_digit)
}

fn starts_number(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'0'..=b'9' => true,
        b'.' => digit_at(bytes, i + 1),
        b'-' => {
            digit_at(bytes, i + 1) || (bytes.get(i + 1) == Some(&b'.') && digit_at(bytes, i + 2))
        }
        _ => false,
    }
}

/// Advances past a word, version, or date run; always makes progress.
fn skip_word(bytes: &[u8], from: usize) -> usize {
    let mut j = from;
    while bytes.get(j).is_some_and(|b| {
        b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b'/')
    }) {
        j += 1;
    }
    j.max(from + 1)
}

fn skip_spaces(bytes: &[u8], from: usize) -> usize {
    let mut j = from;
    while bytes.get(j) == Some(&b' ') {
        j += 1;
    }
    j
}

/// Reads an optional `/N` or `%` suffix. `None` marks a date-like run.
fn scan_scale(bytes: &[u8], from: usize) -> Option<(Option<f64>, usize)> {
    let mut j = skip_spaces(bytes, from);
    match bytes.get(j) {
        Some(b'%') => Some((Some(100.0), j + 1)),
        Some(b'/') => {
            j = skip_spaces(bytes, j + 1);
            let den_start = j;
            while digit_at(bytes, j) {
                j += 1;
            }
            if j == den_start {
                return Some((None, from));
            }
            if bytes.get(j) == Some(&b'.') && digit_at(bytes, j + 1) {
                j += 1;
                while digit_at(bytes, j) {
                    j += 1;
                }
                if bytes.get(j) == Some(&b'.') && digit_at(bytes, j + 1) {
                    return None;
                }
            }
            if bytes.get(j) == Some(&b'/') {
                return None;
            }
            let den: f64 = std::str::from_utf8(&bytes[den_start..j])
                .ok()?
                .parse()
                .ok()?;
            if den == 0.0 {
                return None;
            }
            Some((Some(den), j))
        }
        _ => Some((None, from)),
    }
}

fn scan_literals(text: &str) -> Vec<NumericLiteral> {
    let bytes = text.as_bytes();
    let mut literals = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !starts_number(bytes, i) {
            i += 1;
            continue;
        }

        if i > 0 && (bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'_') {
            i = skip_word(bytes, i);
            continue;
        }

        let start = i;
        let label = score_label(&text[..start]);
        let mut j = i;
        if bytes[j] == b'-' {
            j += 1;
        }
        while digit_at(bytes, j) {
            j += 1;
        }
        let comma_decimal = label == Some(ScoreLabel::Score)
            && j > start
            && bytes.get(j) == Some(&b',')
            && digit_at(bytes, j + 1);
        if (bytes.get(j) == Some(&b'.') || comma_decimal) && digit_at(bytes, j + 1) {
            j += 1;
            while digit_at(bytes, j) {
                j += 1;
            }
        }

        let dotted = bytes.get(j) == Some(&b'.') && digit_at(bytes, j + 1);
        let glued = bytes.get(j).is_some_and(u8::is_ascii_alphabetic);
        if dotted || glued {
            i = skip_word(bytes, j);
            continue;
        }

        let Ok(value) = text[start..j].replacen(',', ".", 1).parse::<f64>() else {
            i = j.max(start + 1);
            continue;
        };

        let Some((scale, end)) = scan_scale(bytes, j) else {
            i = skip_word(bytes, j);
            continue;
        };

        literals.push(NumericLiteral {
            value,
            scale,
            start,
            end,
            label,
        });
        i = end.max(start + 1);
    }

    literals
}

fn trim_label_separators(text: &str) -> &str {
    text.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, ':' | '=' | '*' | '"' | '\'' | '(')
    })
}

fn ends_with_label(text: &str, labels: &[&str]) -> Option<usize> {
    labels.iter().find_map(|label| {
        let cut = text.len().checked_sub(label.len())?;
        let tail = text.get(cut..)?;
        let standalone = !text[..cut].ends_with(|c: char| c.is_alphabetic());
        (tail.eq_ignore_ascii_case(label) && standalone).then_some(cut)
    })
}

fn score_label(prefix: &str) -> Option<ScoreLabel> {
    let prefix = trim_label_separators(prefix);
    if ends_with_label(prefix, &SCORE_LABELS[..1]).is_some() {
        Some(ScoreLabel::Score)
    } else if ends_with_label(prefix, &SCORE_LABELS[1..]).is_some() {
        Some(ScoreLabel::Rating)
    } else {
        None
    }
}

fn starts_with_label(text: &str, labels: &[&str]) -> bool {
    labels
        .iter()
        .any(|l| text.get(..l.len()).is_some_and(|h| h.eq_ignore_ascii_case(l)))
}

/// Text after the first `reason:` style label, up to a following score line.
fn labelled_reason(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();

    for label in REASON_LABELS {
        let mut from = 0;
        while let Some(pos) = lower[from..].find(label) {
            let at = from + pos;
            let after = at + label.len();
            from = after;

            if lower[..at].ends_with(|c: char| c.is_alphabetic()) {
                continue;
            }

            let rest = &lower[after..];
            let skipped = rest.len() - rest.trim_start_matches([' ', '*']).len();
            if lower[after + skipped..].starts_with(':') {
                let body = &text[after + skipped + 1..];
                return Some(cut_at_score_line(body));
            }
        }
    }

    None
}

fn cut_at_score_line(body: &str) -> &str {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if offset > 0 {
            let head = line.trim_start_matches(|c: char| c.is_whitespace() || c == '*');
            if starts_with_label(head, &SCORE_LABELS) {
                return &body[..offset];
            }
        }
        offset += line.len();
    }
    body
}

fn reason_around<'a>(text: &'a str, literal: &NumericLiteral) -> Option<&'a str> {
    let after = text[literal.end..].trim_start_matches(|c: char| {
        c.is_whitespace()
            || matches!(c, '.' | ',' | ';' | ':' | '-' | '–' | '—' | ')' | ']' | '*' | '|')
    });
    if !after.is_empty() {
        return Some(after);
    }

    let before = trim_label_separators(&text[..literal.start]);
    let before = match ends_with_label(before, &SCORE_LABELS) {
        Some(cut) => &before[..cut],
        None => before,
    };
    let before = before
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));

    (!before.is_empty()).then_some(before)
}

fn normalize_reason(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = collapsed.trim_matches('*').trim();

    if collapsed.is_empty() {
        return None;
    }

    Some(collapsed.chars().take(MAX_REASON_CHARS).collect())
}
