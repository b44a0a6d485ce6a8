//! The scanner: UTF-8 text in, [`Value`] tree out.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use num_bigint::BigInt;

use crate::RECURSION_LIMIT;
use crate::error::SyntaxError;
use crate::key::{DuplicateKey, Key};
use crate::number::match_number;
use crate::options::ScannerOptions;
use crate::strings::{is_identifier, unescape};
use crate::value::{BigNumber, Object, Value};

/// Scans permissive JSON texts into [`Value`] trees.
///
/// A scanner is configured once and can be reused for any number of
/// texts; each [`scan`](Scanner::scan) call is independent.
///
/// # Examples
///
/// ```
/// use jsonlax::{Scanner, ScannerOptions, Value};
///
/// let scanner = Scanner::new(ScannerOptions::default());
/// let value = scanner.scan("<doc>", "[1, 2, 3]")?;
/// assert!(matches!(value, Value::Array(ref items) if items.len() == 3));
/// # Ok::<(), jsonlax::SyntaxError>(())
/// ```
#[derive(Debug, Default)]
pub struct Scanner {
    options: ScannerOptions,
}

impl Scanner {
    /// Creates a scanner with the given options.
    #[must_use]
    pub fn new(options: ScannerOptions) -> Self {
        Self { options }
    }

    /// Scans `text` into a value tree.
    ///
    /// `filename` labels the text in diagnostics; it is not opened or
    /// otherwise interpreted.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] describing the first offending token.
    /// The whole text must be one JSON value; trailing non-whitespace
    /// fails with "Expecting end of file".
    pub fn scan(&self, filename: &str, text: &str) -> Result<Value, SyntaxError> {
        debug!("scan: filename={filename:?} len={}", text.len());
        let mut run = ScanRun {
            opts: &self.options,
            filename,
            text,
            bytes: text.as_bytes(),
            memo: HashSet::new(),
            depth: 0,
        };
        if text.starts_with('\u{feff}') {
            return Err(run.err("Unexpected UTF-8 BOM", 0, 3));
        }
        let mut idx = 0;
        run.skip_comments(&mut idx)?;
        let (value, next_idx) = run.scan_value(idx)?;
        idx = next_idx;
        run.skip_comments(&mut idx)?;
        if idx < text.len() {
            return Err(run.err_at("Expecting end of file", idx));
        }
        Ok(value)
    }
}

/// Per-call state: the borrowed text, the key intern memo and the
/// recursion depth. All of it is released when the call returns.
struct ScanRun<'a> {
    opts: &'a ScannerOptions,
    filename: &'a str,
    text: &'a str,
    bytes: &'a [u8],
    memo: HashSet<Arc<str>>,
    depth: usize,
}

impl<'a> ScanRun<'a> {
    fn err(&self, message: &'static str, start: usize, end: usize) -> SyntaxError {
        SyntaxError::report(message, self.filename, self.text, start, end)
    }

    fn err_at(&self, message: &'static str, start: usize) -> SyntaxError {
        SyntaxError::report_at(message, self.filename, self.text, start)
    }

    /// Consumes whitespace and, per policy, comments starting at `*idx`.
    ///
    /// An unterminated block comment is reported as such even when
    /// comments are disallowed entirely.
    fn skip_comments(&self, idx: &mut usize) -> Result<(), SyntaxError> {
        let bytes = self.bytes;
        let len = bytes.len();
        let mut i = *idx;
        loop {
            while i < len && matches!(bytes[i], b' ' | b'\t' | b'\n' | b'\r') {
                i += 1;
            }
            let comment_idx = i;
            if i + 1 < len && bytes[i] == b'/' && bytes[i + 1] == b'/' {
                i += 2;
                while i < len && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
            } else if i + 1 < len && bytes[i] == b'/' && bytes[i + 1] == b'*' {
                i += 2;
                loop {
                    if i + 1 >= len {
                        return Err(if self.opts.allow_comments {
                            self.err("Unterminated comment", comment_idx, len)
                        } else {
                            self.err("Comments are not allowed", comment_idx, len)
                        });
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        break;
                    }
                    i += 1;
                }
                i += 2;
            } else {
                break;
            }
            if !self.opts.allow_comments {
                return Err(self.err("Comments are not allowed", comment_idx, i));
            }
        }
        *idx = i;
        Ok(())
    }

    /// Reads one value of any kind starting at `idx`; returns it with the
    /// index of the first byte after it.
    fn scan_value(&mut self, idx: usize) -> Result<(Value, usize), SyntaxError> {
        let bytes = self.bytes;
        if idx >= bytes.len() {
            return Err(self.err_at("Expecting value", idx));
        }
        let rest = &bytes[idx..];
        match bytes[idx] {
            b'"' => self.scan_string(idx),
            b'{' => {
                if self.depth >= RECURSION_LIMIT {
                    return Err(self.err_at("Object is too deeply nested", idx));
                }
                self.depth += 1;
                let result = self.parse_object(idx + 1);
                self.depth -= 1;
                result
            }
            b'[' => {
                if self.depth >= RECURSION_LIMIT {
                    return Err(self.err_at("Array is too deeply nested", idx));
                }
                self.depth += 1;
                let result = self.parse_array(idx + 1);
                self.depth -= 1;
                result
            }
            b'n' if rest.starts_with(b"null") => Ok((Value::Null, idx + 4)),
            b't' if rest.starts_with(b"true") => Ok((self.make_bool(true), idx + 4)),
            b'f' if rest.starts_with(b"false") => Ok((self.make_bool(false), idx + 5)),
            b'N' if rest.starts_with(b"NaN") => {
                if !self.opts.allow_nan_and_infinity {
                    return Err(self.err("NaN is not allowed", idx, idx + 3));
                }
                Ok((self.make_non_finite(f64::NAN), idx + 3))
            }
            b'I' if rest.starts_with(b"Infinity") => {
                if !self.opts.allow_nan_and_infinity {
                    return Err(self.err("Infinity is not allowed", idx, idx + 8));
                }
                Ok((self.make_non_finite(f64::INFINITY), idx + 8))
            }
            b'-' if rest.starts_with(b"-Infinity") => {
                if !self.opts.allow_nan_and_infinity {
                    return Err(self.err("-Infinity is not allowed", idx, idx + 9));
                }
                Ok((self.make_non_finite(f64::NEG_INFINITY), idx + 9))
            }
            _ => self.scan_number(idx),
        }
    }

    fn make_bool(&self, value: bool) -> Value {
        match &self.opts.bool_hook {
            Some(hook) => hook(value),
            None => Value::Bool(value),
        }
    }

    fn make_non_finite(&self, value: f64) -> Value {
        if self.opts.use_decimal {
            return Value::BigNumber(if value.is_nan() {
                BigNumber::Nan { signaling: false }
            } else {
                BigNumber::Infinity {
                    negative: value < 0.0,
                }
            });
        }
        match &self.opts.float_hook {
            Some(hook) => hook(value),
            None => Value::Float(value),
        }
    }

    fn scan_string(&mut self, idx: usize) -> Result<(Value, usize), SyntaxError> {
        let text = self.text;
        let (decoded, next_idx) =
            unescape(self.filename, text, self.opts.allow_surrogates, idx + 1)?;
        let value = match &self.opts.str_hook {
            Some(hook) => hook(decoded.into_owned()),
            None => Value::Str(decoded.into_owned()),
        };
        Ok((value, next_idx))
    }

    fn scan_number(&mut self, idx: usize) -> Result<(Value, usize), SyntaxError> {
        let Some(m) = match_number(self.bytes, idx) else {
            return Err(self.err_at("Expecting value", idx));
        };
        let slice = &self.text[idx..m.end];
        let value = if m.is_float {
            if self.opts.use_decimal {
                let dec = slice
                    .parse()
                    .map_err(|_| self.err("Number is too big", idx, m.end))?;
                Value::BigNumber(BigNumber::Finite(dec))
            } else {
                match slice.parse::<f64>() {
                    Ok(f) if f.is_finite() => match &self.opts.float_hook {
                        Some(hook) => hook(f),
                        None => Value::Float(f),
                    },
                    // Out-of-range literals overflow to infinity.
                    _ => return Err(self.err("Big numbers require decimal", idx, m.end)),
                }
            }
        } else {
            let n: BigInt = slice
                .parse()
                .map_err(|_| self.err("Number is too big", idx, m.end))?;
            match &self.opts.int_hook {
                Some(hook) => hook(n),
                None => Value::Int(n),
            }
        };
        Ok((value, m.end))
    }

    /// Interns a key so equal texts share one allocation per scan.
    fn intern(&mut self, text: &str) -> Arc<str> {
        if !self.opts.cache_keys {
            return Arc::from(text);
        }
        if let Some(existing) = self.memo.get(text) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(text);
        self.memo.insert(Arc::clone(&interned));
        interned
    }

    /// Reads an object key at `idx`: a string literal or, by policy, an
    /// unquoted identifier. Returns the text and the index after it.
    fn scan_key(&mut self, idx: usize) -> Result<(Cow<'a, str>, usize), SyntaxError> {
        let text = self.text;
        if self.bytes[idx] == b'"' {
            return unescape(self.filename, text, self.opts.allow_surrogates, idx + 1);
        }
        let Some(first) = text[idx..].chars().next() else {
            return Err(self.err_at("Expecting key", idx));
        };
        if first.is_ascii() && !first.is_ascii_alphabetic() && first != '_' {
            return Err(self.err_at("Expecting key", idx));
        }
        let mut next_idx = idx;
        for (off, c) in text[idx..].char_indices() {
            if off > 0 && c.is_ascii() && !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            next_idx = idx + off + c.len_utf8();
        }
        let key = &text[idx..next_idx];
        if !is_identifier(key) {
            return Err(self.err_at("Expecting key", idx));
        }
        if !self.opts.allow_unquoted_keys {
            return Err(self.err("Unquoted keys are not allowed", idx, next_idx));
        }
        Ok((Cow::Borrowed(key), next_idx))
    }

    /// Reads an object; `idx` is the index after the opening brace.
    fn parse_object(&mut self, mut idx: usize) -> Result<(Value, usize), SyntaxError> {
        let bytes = self.bytes;
        let len = bytes.len();
        let obj_idx = idx - 1;
        let use_pairs = self.opts.mapping_hook.is_some();
        let mut map = Object::new();
        let mut pairs: Vec<(Key, Value)> = Vec::new();

        self.skip_comments(&mut idx)?;

        if idx >= len || bytes[idx] != b'}' {
            loop {
                if idx >= len {
                    return Err(self.err("Unterminated object", obj_idx, idx));
                }

                let key_idx = idx;
                let (key_text, next_idx) = self.scan_key(idx)?;
                let duplicate = if use_pairs {
                    pairs.iter().any(|(k, _)| k.as_str() == Some(&*key_text))
                } else {
                    map.contains_key(&*key_text)
                };
                let key = if !duplicate {
                    Key::Str(self.intern(&key_text))
                } else if self.opts.allow_duplicate_keys {
                    Key::Duplicate(DuplicateKey::new(&*key_text))
                } else {
                    return Err(self.err_at("Duplicate keys are not allowed", key_idx));
                };

                let colon_idx = next_idx;
                idx = next_idx;
                self.skip_comments(&mut idx)?;
                if idx >= len || bytes[idx] != b':' {
                    return Err(self.err_at("Expecting colon", colon_idx));
                }
                idx += 1;
                self.skip_comments(&mut idx)?;

                let (value, next_idx) = self.scan_value(idx)?;
                if use_pairs {
                    pairs.push((key, value));
                } else {
                    map.insert(key, value);
                }

                let mut comma_idx = next_idx;
                idx = next_idx;
                self.skip_comments(&mut idx)?;

                if idx >= len {
                    return Err(self.err("Unterminated object", obj_idx, idx));
                }
                if bytes[idx] == b',' {
                    comma_idx = idx;
                    idx += 1;
                    self.skip_comments(&mut idx)?;
                } else if bytes[idx] == b'}' {
                    break;
                } else if idx == comma_idx {
                    return Err(self.err_at("Expecting comma", comma_idx));
                } else if !self.opts.allow_missing_commas {
                    return Err(self.err_at("Missing commas are not allowed", comma_idx));
                }

                if idx < len && bytes[idx] == b'}' {
                    if !self.opts.allow_trailing_comma {
                        return Err(self.err("Trailing comma is not allowed", comma_idx, comma_idx + 1));
                    }
                    break;
                }
            }
        }

        let value = if let Some(hook) = &self.opts.mapping_hook {
            hook(pairs)
        } else {
            Value::Object(map)
        };
        Ok((value, idx + 1))
    }

    /// Reads an array; `idx` is the index after the opening bracket.
    fn parse_array(&mut self, mut idx: usize) -> Result<(Value, usize), SyntaxError> {
        let bytes = self.bytes;
        let len = bytes.len();
        let arr_idx = idx - 1;
        let mut items = Vec::new();

        self.skip_comments(&mut idx)?;

        if idx >= len || bytes[idx] != b']' {
            loop {
                if idx >= len {
                    return Err(self.err("Unterminated array", arr_idx, idx));
                }

                let (value, next_idx) = self.scan_value(idx)?;
                items.push(value);

                let mut comma_idx = next_idx;
                idx = next_idx;
                self.skip_comments(&mut idx)?;

                if idx >= len {
                    return Err(self.err("Unterminated array", arr_idx, idx));
                }
                if bytes[idx] == b',' {
                    comma_idx = idx;
                    idx += 1;
                    self.skip_comments(&mut idx)?;
                } else if bytes[idx] == b']' {
                    break;
                } else if idx == comma_idx {
                    return Err(self.err_at("Expecting comma", comma_idx));
                } else if !self.opts.allow_missing_commas {
                    return Err(self.err_at("Missing commas are not allowed", comma_idx));
                }

                if idx < len && bytes[idx] == b']' {
                    if !self.opts.allow_trailing_comma {
                        return Err(self.err("Trailing comma is not allowed", comma_idx, comma_idx + 1));
                    }
                    break;
                }
            }
        }

        let value = if let Some(hook) = &self.opts.sequence_hook {
            hook(items)
        } else {
            Value::Array(items)
        };
        Ok((value, idx + 1))
    }
}
