//! The shared string codec: unescaping for the scanner, escaping for the
//! encoder.
//!
//! Both escape variants return the input unchanged (borrowed) when no
//! character needs escaping, and size the output in a first pass so the
//! escaped form is built with a single allocation. Neither writes the
//! surrounding quotes; the caller does.

use std::borrow::Cow;

use crate::error::SyntaxError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Decodes a JSON string literal.
///
/// `end` is the byte index immediately after the opening quote; the
/// returned index is immediately after the closing quote. Borrows from
/// `source` when the literal contains no escapes.
pub(crate) fn unescape<'s>(
    filename: &str,
    source: &'s str,
    allow_surrogates: bool,
    end: usize,
) -> Result<(Cow<'s, str>, usize), SyntaxError> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let begin = end - 1;
    let mut decoded: Option<String> = None;
    let mut idx = end;

    loop {
        // Find the end of the string or the next escape.
        let mut next = idx;
        while next < len {
            let b = bytes[next];
            if b == b'"' || b == b'\\' {
                break;
            }
            if b <= 0x1f {
                if b == b'\n' || b == b'\r' {
                    return Err(SyntaxError::report(
                        "Unterminated string",
                        filename,
                        source,
                        begin,
                        next,
                    ));
                }
                return Err(SyntaxError::report(
                    "Unescaped control character",
                    filename,
                    source,
                    next,
                    next + 1,
                ));
            }
            next += 1;
        }
        if next >= len {
            return Err(SyntaxError::report(
                "Unterminated string",
                filename,
                source,
                begin,
                next,
            ));
        }

        if bytes[next] == b'"' {
            return Ok(match decoded {
                None => (Cow::Borrowed(&source[end..next]), next + 1),
                Some(mut buf) => {
                    buf.push_str(&source[idx..next]);
                    (Cow::Owned(buf), next + 1)
                }
            });
        }

        // Backslash: switch to owned decoding.
        let buf = decoded.get_or_insert_with(String::new);
        buf.push_str(&source[idx..next]);
        let esc = next + 1;
        if esc >= len {
            return Err(SyntaxError::report_at(
                "Expecting escaped character",
                filename,
                source,
                esc,
            ));
        }
        match bytes[esc] {
            b'"' => {
                buf.push('"');
                idx = esc + 1;
            }
            b'\\' => {
                buf.push('\\');
                idx = esc + 1;
            }
            b'/' => {
                buf.push('/');
                idx = esc + 1;
            }
            b'b' => {
                buf.push('\u{8}');
                idx = esc + 1;
            }
            b'f' => {
                buf.push('\u{c}');
                idx = esc + 1;
            }
            b'n' => {
                buf.push('\n');
                idx = esc + 1;
            }
            b'r' => {
                buf.push('\r');
                idx = esc + 1;
            }
            b't' => {
                buf.push('\t');
                idx = esc + 1;
            }
            b'\n' | b'\r' => {
                return Err(SyntaxError::report_at(
                    "Expecting escaped character",
                    filename,
                    source,
                    esc,
                ));
            }
            b'u' => {
                let hex_start = esc + 1;
                let c = parse_hex4(filename, source, hex_start)?;
                let after = hex_start + 4;
                if (0xD800..=0xDBFF).contains(&c) {
                    // A high surrogate may be followed by an escaped low
                    // surrogate forming one supplementary code point.
                    if after + 2 < len && bytes[after] == b'\\' && bytes[after + 1] == b'u' {
                        let c2 = parse_hex4(filename, source, after + 2)?;
                        if (0xDC00..=0xDFFF).contains(&c2) {
                            let joined = 0x10000 + ((c - 0xD800) << 10) + (c2 - 0xDC00);
                            buf.push(char::from_u32(joined).unwrap_or(char::REPLACEMENT_CHARACTER));
                            idx = after + 6;
                        } else if allow_surrogates {
                            // Keep scanning at the second escape; it is
                            // decoded independently on the next pass.
                            buf.push(char::REPLACEMENT_CHARACTER);
                            idx = after;
                        } else {
                            return Err(SyntaxError::report(
                                "Surrogates are not allowed",
                                filename,
                                source,
                                hex_start - 2,
                                after,
                            ));
                        }
                    } else if allow_surrogates {
                        buf.push(char::REPLACEMENT_CHARACTER);
                        idx = after;
                    } else {
                        return Err(SyntaxError::report(
                            "Surrogates are not allowed",
                            filename,
                            source,
                            hex_start - 2,
                            after,
                        ));
                    }
                } else if (0xDC00..=0xDFFF).contains(&c) {
                    if !allow_surrogates {
                        return Err(SyntaxError::report(
                            "Surrogates are not allowed",
                            filename,
                            source,
                            hex_start - 2,
                            after,
                        ));
                    }
                    buf.push(char::REPLACEMENT_CHARACTER);
                    idx = after;
                } else {
                    buf.push(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER));
                    idx = after;
                }
            }
            _ => {
                let ch_len = source[esc..].chars().next().map_or(1, char::len_utf8);
                return Err(SyntaxError::report(
                    "Invalid backslash escape",
                    filename,
                    source,
                    esc - 1,
                    esc + ch_len,
                ));
            }
        }
    }
}

/// Decodes exactly four hex digits starting at `start`.
fn parse_hex4(filename: &str, source: &str, start: usize) -> Result<u32, SyntaxError> {
    let bytes = source.as_bytes();
    if start + 4 > bytes.len() {
        return Err(SyntaxError::report(
            "Expecting 4 hex digits",
            filename,
            source,
            start,
            bytes.len(),
        ));
    }
    let mut c = 0u32;
    for i in 0..4 {
        let d = match bytes[start + i] {
            b @ b'0'..=b'9' => u32::from(b - b'0'),
            b @ b'a'..=b'f' => u32::from(b - b'a') + 10,
            b @ b'A'..=b'F' => u32::from(b - b'A') + 10,
            _ => {
                return Err(SyntaxError::report(
                    "Expecting 4 hex digits",
                    filename,
                    source,
                    start,
                    start + 4,
                ));
            }
        };
        c = (c << 4) | d;
    }
    Ok(c)
}

fn push_unit_escape(out: &mut String, unit: u16) {
    out.push_str("\\u");
    out.push(HEX_DIGITS[(unit >> 12 & 0xf) as usize] as char);
    out.push(HEX_DIGITS[(unit >> 8 & 0xf) as usize] as char);
    out.push(HEX_DIGITS[(unit >> 4 & 0xf) as usize] as char);
    out.push(HEX_DIGITS[(unit & 0xf) as usize] as char);
}

/// Escapes `s` into ASCII-only JSON string content.
///
/// Every non-ASCII character becomes `\uXXXX`; supplementary code points
/// split into a UTF-16 surrogate pair.
pub(crate) fn escape_ascii(s: &str) -> Cow<'_, str> {
    let mut output_size = 0usize;
    for ch in s.chars() {
        output_size += match ch {
            '\\' | '"' | '\u{8}' | '\u{c}' | '\n' | '\r' | '\t' => 2,
            c if (' '..='~').contains(&c) => 1,
            c if c as u32 >= 0x10000 => 12,
            _ => 6,
        };
    }
    if output_size == s.len() {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(output_size);
    let mut units = [0u16; 2];
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (' '..='~').contains(&c) => out.push(c),
            c => {
                for unit in c.encode_utf16(&mut units) {
                    push_unit_escape(&mut out, *unit);
                }
            }
        }
    }
    Cow::Owned(out)
}

/// Escapes `s` into JSON string content, preserving non-ASCII characters.
///
/// Only the mandatory set and C0 controls are escaped.
pub(crate) fn escape_unicode(s: &str) -> Cow<'_, str> {
    let mut output_size = 0usize;
    for ch in s.chars() {
        output_size += match ch {
            '\\' | '"' | '\u{8}' | '\u{c}' | '\n' | '\r' | '\t' => 2,
            c if (c as u32) <= 0x1f => 6,
            c => c.len_utf8(),
        };
    }
    if output_size == s.len() {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(output_size);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) <= 0x1f => {
                out.push_str("\\u00");
                out.push(HEX_DIGITS[(c as usize >> 4) & 0xf] as char);
                out.push(HEX_DIGITS[c as usize & 0xf] as char);
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Whether `s` is an identifier: a letter or `_` followed by letters,
/// digits or `_`.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
