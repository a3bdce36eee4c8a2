//! Result classification for display
//!
//! Turns the ordered result strings returned by the engine into display text
//! plus an error flag. Errors reported by the backend as Prolog error terms are
//! reduced to a readable fragment where the term has a known shape.

use crate::types::ClassifiedOutput;

/// Prefix the backend puts on a result that reports a program-level error
pub const ERROR_MARKER: &str = "ERROR:";

const SYNTAX_ERROR: &str = "syntax_error(";
const TYPE_ERROR: &str = "type_error(";
const TYPE_ERROR_CONTEXT: &str = "),context(";

/// Classify the results of one evaluation
///
/// Pure and total: the same input always yields the same output, and
/// unrecognized error shapes come back verbatim.
pub fn classify(results: &[String]) -> ClassifiedOutput {
    match results {
        [] => ClassifiedOutput::none(),
        [single] if single.starts_with(ERROR_MARKER) => {
            ClassifiedOutput::error(format_error(single))
        }
        [single] => ClassifiedOutput::success(single.clone()),
        many => ClassifiedOutput::success(many.join("\n")),
    }
}

/// Extract a readable message from a backend error term
///
/// Only the first marker found decides the shape: text containing
/// `syntax_error(` never falls through to the type error extraction.
pub fn format_error(error_text: &str) -> String {
    if let Some(pos) = error_text.find(SYNTAX_ERROR) {
        return syntax_error_span(error_text, pos + SYNTAX_ERROR.len())
            .map(str::to_owned)
            .unwrap_or_else(|| error_text.to_owned());
    }

    if let Some(pos) = error_text.find(TYPE_ERROR)
        && let Some(span) = type_error_span(error_text, pos + TYPE_ERROR.len())
    {
        return describe_type_error(span);
    }

    error_text.to_owned()
}

// The end marker is searched over the whole string, so a `),` sitting before
// `start` yields no span rather than trying the bare `)` fallback.
fn syntax_error_span(text: &str, start: usize) -> Option<&str> {
    let end = text.rfind("),").or_else(|| text.rfind(')'))?;
    (end > start).then(|| &text[start..end])
}

fn type_error_span(text: &str, start: usize) -> Option<&str> {
    let end = match text.find(TYPE_ERROR_CONTEXT) {
        Some(end) => end,
        None => start + text[start..].find("))")?,
    };
    (end > start).then(|| &text[start..end])
}

fn describe_type_error(span: &str) -> String {
    if let Some((expected, got)) = span.split_once(',') {
        let (expected, got) = (expected.trim(), got.trim());
        if !expected.is_empty() && !got.is_empty() {
            return format!("Type error: Expected {expected}, got {got}");
        }
    }
    format!("Type error: {span}")
}
