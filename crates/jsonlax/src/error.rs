//! Error types for scanning and encoding.

use thiserror::Error;

/// A syntax error produced while scanning a JSON text.
///
/// `start` and `end` are code-point offsets into `source` with
/// `start <= end <= source.chars().count()`; `end == start` marks a point
/// diagnostic. `lineno` and `colno` are 1-based and refer to `start`.
///
/// The first syntax error aborts the scan; there is no recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Short description of what went wrong, e.g. "Unterminated string".
    pub message: &'static str,
    /// Label for the scanned text, usually a file path.
    pub filename: String,
    /// 1-based line of the error position.
    pub lineno: usize,
    /// 1-based column (in code points) of the error position.
    pub colno: usize,
    /// Code-point offset of the start of the offending range.
    pub start: usize,
    /// Code-point offset one past the end of the offending range.
    pub end: usize,
    /// The full scanned text, for callers that render context lines.
    pub source: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, line {}, column {})",
            self.message, self.filename, self.lineno, self.colno
        )
    }
}

impl std::error::Error for SyntaxError {}

impl SyntaxError {
    /// Builds a diagnostic for the byte range `start..end` of `source`.
    ///
    /// Byte offsets are converted to code-point offsets; offsets that do
    /// not fall on a character boundary round up to the enclosing
    /// character, so any `start <= end <= source.len()` is acceptable.
    pub(crate) fn report(
        message: &'static str,
        filename: &str,
        source: &str,
        start: usize,
        end: usize,
    ) -> Self {
        let end = end.max(start);
        let mut cp = 0usize;
        let mut start_cp = None;
        let mut end_cp = None;
        let mut lineno = 1usize;
        let mut colno = 1usize;
        let mut prev_cr = false;
        for (byte_idx, ch) in source.char_indices() {
            if start_cp.is_none() && byte_idx >= start {
                start_cp = Some(cp);
            }
            if end_cp.is_none() && byte_idx >= end {
                end_cp = Some(cp);
            }
            if start_cp.is_some() && end_cp.is_some() {
                break;
            }
            if start_cp.is_none() {
                match ch {
                    '\n' => {
                        if !prev_cr {
                            lineno += 1;
                        }
                        colno = 1;
                        prev_cr = false;
                    }
                    '\r' => {
                        lineno += 1;
                        colno = 1;
                        prev_cr = true;
                    }
                    _ => {
                        colno += 1;
                        prev_cr = false;
                    }
                }
            }
            cp += 1;
        }
        Self {
            message,
            filename: filename.to_string(),
            lineno,
            colno,
            start: start_cp.unwrap_or(cp),
            end: end_cp.unwrap_or(cp),
            source: source.to_string(),
        }
    }

    /// Point-diagnostic convenience: `end = start`.
    pub(crate) fn report_at(
        message: &'static str,
        filename: &str,
        source: &str,
        start: usize,
    ) -> Self {
        Self::report(message, filename, source, start, start)
    }
}

/// An error produced while encoding a [`Value`](crate::Value).
///
/// All variants abort the encode; partial output is discarded. The only
/// in-situ recovery is `skipkeys`, which drops unserialisable mapping keys
/// before this error would be raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A container was reached again while it was still being emitted.
    #[error("Unexpected circular reference")]
    CircularReference,
    /// A non-finite number without `allow_nan_and_infinity`.
    #[error("{0} is not allowed")]
    NotAllowed(&'static str),
    /// A value with no JSON representation, e.g. a signaling NaN.
    #[error("{0} is not JSON serializable")]
    NotSerializable(&'static str),
    /// A non-string mapping key without `allow_non_str_keys` or `skipkeys`.
    #[error("Keys must be str, not {0}")]
    InvalidKey(&'static str),
    /// The tree nests deeper than [`RECURSION_LIMIT`](crate::RECURSION_LIMIT).
    #[error("Value is too deeply nested")]
    TooDeeplyNested,
}

#[cfg(test)]
mod tests {
    use super::SyntaxError;

    #[test]
    fn offsets_are_code_points() {
        // "ä" is two bytes; a byte range after it must shrink to one code point.
        let err = SyntaxError::report("Expecting value", "<test>", "ä x", 3, 4);
        assert_eq!(err.start, 2);
        assert_eq!(err.end, 3);
        assert_eq!(err.colno, 3);
    }

    #[test]
    fn line_and_column_track_newlines() {
        let err = SyntaxError::report_at("Expecting value", "<test>", "[\n  1,\n  !\n]", 9);
        assert_eq!(err.lineno, 3);
        assert_eq!(err.colno, 3);
        assert_eq!(err.start, err.end);
    }

    #[test]
    fn crlf_counts_as_one_line_break() {
        let err = SyntaxError::report_at("Expecting value", "<test>", "1\r\n2\r\nx", 6);
        assert_eq!(err.lineno, 3);
        assert_eq!(err.colno, 1);
    }

    #[test]
    fn end_of_input_positions_clamp_to_length() {
        let err = SyntaxError::report_at("Expecting value", "<test>", "tru", 3);
        assert_eq!(err.start, 3);
        assert_eq!(err.end, 3);
        assert_eq!(err.colno, 4);
    }

    #[test]
    fn display_includes_location() {
        let err = SyntaxError::report_at("Expecting value", "data.json", "", 0);
        assert_eq!(err.to_string(), "Expecting value (data.json, line 1, column 1)");
    }
}
