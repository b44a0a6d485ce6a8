//! The encoder: [`Value`] tree in, UTF-8 text out.

use std::borrow::Cow;
use std::collections::HashSet;
use std::ptr;

use log::debug;

use crate::RECURSION_LIMIT;
use crate::error::EncodeError;
use crate::key::Key;
use crate::options::EncoderOptions;
use crate::strings::{escape_ascii, escape_unicode, is_identifier};
use crate::value::{Array, BigNumber, Object, Value};

/// Encodes [`Value`] trees as permissive JSON text.
///
/// An encoder is configured once and can be reused; every
/// [`encode`](Encoder::encode) call writes into a fresh buffer and the
/// tree is never mutated.
///
/// # Examples
///
/// ```
/// use jsonlax::{Encoder, EncoderOptions, Value};
///
/// let encoder = Encoder::new(EncoderOptions::default());
/// let text = encoder.encode(&Value::Array(vec![Value::Null, Value::from(true)]))?;
/// assert_eq!(text, "[null, true]");
/// # Ok::<(), jsonlax::EncodeError>(())
/// ```
#[derive(Debug, Default)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    /// Creates an encoder with the given options.
    #[must_use]
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Encodes `value`, appending `end` exactly once.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] for non-finite numbers without
    /// `allow_nan_and_infinity`, non-string keys without
    /// `allow_non_str_keys` or `skipkeys`, signaling NaN decimals,
    /// re-entered containers, and trees nested deeper than
    /// [`RECURSION_LIMIT`]. Partial output is discarded.
    pub fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        debug!("encode: indent={:?}", self.options.indent);
        let mut run = EncodeRun {
            opts: &self.options,
            markers: HashSet::new(),
            indent_cache: vec!["\n".to_string()],
            depth: 0,
        };
        let mut out = String::new();
        run.encode_value(&mut out, value, 0)?;
        out.push_str(&self.options.end);
        Ok(out)
    }
}

/// Per-call state: the circular-reference markers, the indent cache and
/// the recursion depth. All of it is released when the call returns.
///
/// The indent cache holds `"\n" + indent * k` at position `2k` and
/// `item_separator + "\n" + indent * k` at position `2k - 1`, grown
/// lazily on first descent to a new depth; its length is always odd.
struct EncodeRun<'a> {
    opts: &'a EncoderOptions,
    markers: HashSet<usize>,
    indent_cache: Vec<String>,
    depth: usize,
}

impl EncodeRun<'_> {
    fn encode_value(
        &mut self,
        out: &mut String,
        value: &Value,
        indent_level: usize,
    ) -> Result<(), EncodeError> {
        let opts = self.opts;
        if let Some(hook) = &opts.hook {
            let transformed = hook(value);
            return self.encode_term(out, &transformed, indent_level);
        }
        self.encode_term(out, value, indent_level)
    }

    fn encode_term(
        &mut self,
        out: &mut String,
        value: &Value,
        indent_level: usize,
    ) -> Result<(), EncodeError> {
        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Str(s) => self.write_string(out, s),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(f) => {
                let repr = self.float_repr(*f)?;
                out.push_str(&repr);
            }
            Value::BigNumber(n) => self.write_big_number(out, n)?,
            Value::Array(arr) => {
                if self.depth >= RECURSION_LIMIT {
                    return Err(EncodeError::TooDeeplyNested);
                }
                self.depth += 1;
                let result = self.encode_array(out, arr, indent_level);
                self.depth -= 1;
                result?;
            }
            Value::Object(map) => {
                if self.depth >= RECURSION_LIMIT {
                    return Err(EncodeError::TooDeeplyNested);
                }
                self.depth += 1;
                let result = self.encode_mapping(out, map, indent_level);
                self.depth -= 1;
                result?;
            }
        }
        Ok(())
    }

    fn write_string(&self, out: &mut String, s: &str) {
        out.push('"');
        let escaped = if self.opts.ensure_ascii {
            escape_ascii(s)
        } else {
            escape_unicode(s)
        };
        out.push_str(&escaped);
        out.push('"');
    }

    fn float_repr(&self, f: f64) -> Result<Cow<'static, str>, EncodeError> {
        if f.is_finite() {
            // Shortest representation that round-trips; integral floats
            // keep their ".0" so they re-scan as floats.
            return Ok(Cow::Owned(format!("{f:?}")));
        }
        let repr = if f.is_nan() {
            "NaN"
        } else if f > 0.0 {
            "Infinity"
        } else {
            "-Infinity"
        };
        if !self.opts.allow_nan_and_infinity {
            return Err(EncodeError::NotAllowed(repr));
        }
        Ok(Cow::Borrowed(repr))
    }

    fn write_big_number(&self, out: &mut String, n: &BigNumber) -> Result<(), EncodeError> {
        match n {
            BigNumber::Finite(d) => out.push_str(&d.to_string()),
            BigNumber::Nan { signaling: true } => {
                return Err(EncodeError::NotSerializable("sNaN"));
            }
            BigNumber::Nan { signaling: false } => {
                if !self.opts.allow_nan_and_infinity {
                    return Err(EncodeError::NotAllowed("NaN"));
                }
                out.push_str("NaN");
            }
            BigNumber::Infinity { negative } => {
                let repr = if *negative { "-Infinity" } else { "Infinity" };
                if !self.opts.allow_nan_and_infinity {
                    return Err(EncodeError::NotAllowed(repr));
                }
                out.push_str(repr);
            }
        }
        Ok(())
    }

    /// Decides whether a container's items go one per line.
    fn is_indented<'v>(
        &self,
        indent_level: usize,
        mut children: impl Iterator<Item = &'v Value>,
    ) -> bool {
        if self.opts.indent.is_none() || indent_level >= self.opts.max_indent_level {
            false
        } else if self.opts.indent_leaves {
            true
        } else {
            children.any(|v| matches!(v, Value::Array(_) | Value::Object(_)))
        }
    }

    /// Grows the indent cache so entries for `level` exist.
    fn ensure_indent(&mut self, level: usize) {
        let indent = self.opts.indent.as_deref().unwrap_or_default();
        while self.indent_cache.len() < 2 * level + 1 {
            let newline_indent =
                format!("{}{indent}", self.indent_cache[self.indent_cache.len() - 1]);
            let separator_indent = format!("{}{newline_indent}", self.opts.item_separator);
            self.indent_cache.push(separator_indent);
            self.indent_cache.push(newline_indent);
        }
    }

    fn enter(&mut self, value: usize) -> Result<(), EncodeError> {
        if self.opts.check_circular && !self.markers.insert(value) {
            return Err(EncodeError::CircularReference);
        }
        Ok(())
    }

    fn leave(&mut self, value: usize) {
        if self.opts.check_circular {
            self.markers.remove(&value);
        }
    }

    fn encode_array(
        &mut self,
        out: &mut String,
        arr: &Array,
        indent_level: usize,
    ) -> Result<(), EncodeError> {
        if arr.is_empty() {
            out.push_str("[]");
            return Ok(());
        }
        let ident = ptr::from_ref(arr) as usize;
        self.enter(ident)?;
        out.push('[');

        let indented = self.is_indented(indent_level, arr.iter());
        let mut level = indent_level;
        if indented {
            level += 1;
            self.ensure_indent(level);
            out.push_str(&self.indent_cache[2 * level]);
        }
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                if indented {
                    out.push_str(&self.indent_cache[2 * level - 1]);
                } else {
                    out.push_str(&self.opts.long_item_separator);
                }
            }
            self.encode_value(out, item, level)?;
        }
        self.leave(ident);

        if indented {
            if self.opts.trailing_comma {
                out.push_str(&self.opts.item_separator);
            }
            out.push_str(&self.indent_cache[2 * indent_level]);
        }
        out.push(']');
        Ok(())
    }

    fn encode_mapping(
        &mut self,
        out: &mut String,
        map: &Object,
        indent_level: usize,
    ) -> Result<(), EncodeError> {
        if map.is_empty() {
            out.push_str("{}");
            return Ok(());
        }
        let ident = ptr::from_ref(map) as usize;
        self.enter(ident)?;
        out.push('{');

        let indented = self.is_indented(indent_level, map.values());
        let mut level = indent_level;
        if indented {
            level += 1;
            self.ensure_indent(level);
            out.push_str(&self.indent_cache[2 * level]);
        }

        let mut first = true;
        if self.opts.sort_keys {
            let mut items: Vec<(Cow<'_, str>, &Value)> = Vec::with_capacity(map.len());
            for (key, value) in map {
                if let Some(text) = self.key_text(key)? {
                    items.push((text, value));
                }
            }
            items.sort_by(|a, b| a.0.cmp(&b.0));
            for (text, value) in items {
                self.write_key_value(out, &mut first, &text, value, level, indented)?;
            }
        } else {
            for (key, value) in map {
                let Some(text) = self.key_text(key)? else {
                    continue;
                };
                self.write_key_value(out, &mut first, &text, value, level, indented)?;
            }
        }
        self.leave(ident);

        if indented {
            if self.opts.trailing_comma {
                out.push_str(&self.opts.item_separator);
            }
            out.push_str(&self.indent_cache[2 * indent_level]);
        }
        out.push('}');
        Ok(())
    }

    /// Coerces a key to text per policy; `None` means the pair is dropped.
    fn key_text<'k>(&self, key: &'k Key) -> Result<Option<Cow<'k, str>>, EncodeError> {
        match key {
            Key::Str(s) => Ok(Some(Cow::Borrowed(s))),
            Key::Duplicate(d) => Ok(Some(Cow::Borrowed(d.as_str()))),
            Key::Int(n) if self.opts.allow_non_str_keys => Ok(Some(Cow::Owned(n.to_string()))),
            Key::Float(f) if self.opts.allow_non_str_keys => {
                let repr = self.float_repr(*f)?;
                Ok(Some(Cow::Owned(repr.into_owned())))
            }
            Key::Bool(b) if self.opts.allow_non_str_keys => {
                Ok(Some(Cow::Borrowed(if *b { "true" } else { "false" })))
            }
            Key::Null if self.opts.allow_non_str_keys => Ok(Some(Cow::Borrowed("null"))),
            _ if self.opts.skipkeys => Ok(None),
            other => Err(EncodeError::InvalidKey(other.type_name())),
        }
    }

    fn write_key_value(
        &mut self,
        out: &mut String,
        first: &mut bool,
        text: &str,
        value: &Value,
        level: usize,
        indented: bool,
    ) -> Result<(), EncodeError> {
        if *first {
            *first = false;
        } else if indented {
            out.push_str(&self.indent_cache[2 * level - 1]);
        } else {
            out.push_str(&self.opts.long_item_separator);
        }
        let unquoted = !self.opts.quoted_keys
            && is_identifier(text)
            && (!self.opts.ensure_ascii || text.is_ascii());
        if unquoted {
            out.push_str(text);
        } else {
            self.write_string(out, text);
        }
        out.push_str(&self.opts.key_separator);
        self.encode_value(out, value, level)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Encoder, EncoderOptions};
    use crate::error::EncodeError;
    use crate::key::{DuplicateKey, Key};
    use crate::value::{BigNumber, Object, Value};

    fn encode(value: &Value) -> Result<String, EncodeError> {
        Encoder::new(EncoderOptions::default()).encode(value)
    }

    fn encode_with(options: EncoderOptions, value: &Value) -> Result<String, EncodeError> {
        Encoder::new(options).encode(value)
    }

    fn int(n: i64) -> Value {
        Value::from(n)
    }

    fn obj(pairs: &[(&str, Value)]) -> Value {
        let mut map = Object::new();
        for (k, v) in pairs {
            map.insert(Key::from(*k), v.clone());
        }
        Value::Object(map)
    }

    #[test]
    fn compact_by_default() {
        let value = obj(&[
            ("a", int(1)),
            ("b", Value::Array(vec![int(1), int(2)])),
            ("c", obj(&[])),
        ]);
        assert_eq!(encode(&value).unwrap(), r#"{"a": 1, "b": [1, 2], "c": {}}"#);
    }

    #[test]
    fn scalars() {
        assert_eq!(encode(&Value::Null).unwrap(), "null");
        assert_eq!(encode(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(encode(&int(-7)).unwrap(), "-7");
        assert_eq!(encode(&Value::Float(1.0)).unwrap(), "1.0");
        assert_eq!(encode(&Value::Float(-2.5)).unwrap(), "-2.5");
        assert_eq!(encode(&Value::from("hi")).unwrap(), "\"hi\"");
        assert_eq!(encode(&Value::Array(vec![])).unwrap(), "[]");
    }

    #[test]
    fn indented_output_matches_python_layout() {
        let value = obj(&[("ä", Value::Array(vec![int(1), int(2)]))]);
        let text = encode_with(
            EncoderOptions {
                ensure_ascii: true,
                indent: Some("  ".to_string()),
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, "{\n  \"\\u00e4\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn indent_leaves_off_keeps_leaf_containers_inline() {
        let value = obj(&[("a", Value::Array(vec![int(1), int(2)]))]);
        let text = encode_with(
            EncoderOptions {
                indent: Some("  ".to_string()),
                indent_leaves: false,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, "{\n  \"a\": [1, 2]\n}");
    }

    #[test]
    fn max_indent_level_flattens_deeper_output() {
        let value = Value::Array(vec![Value::Array(vec![int(1), int(2)])]);
        let text = encode_with(
            EncoderOptions {
                indent: Some("  ".to_string()),
                max_indent_level: 1,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, "[\n  [1, 2]\n]");
    }

    #[test]
    fn trailing_comma_only_when_indented() {
        let value = Value::Array(vec![int(1), int(2)]);
        let text = encode_with(
            EncoderOptions {
                indent: Some("  ".to_string()),
                trailing_comma: true,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, "[\n  1,\n  2,\n]");

        let text = encode_with(
            EncoderOptions {
                trailing_comma: true,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, "[1, 2]");
    }

    #[test]
    fn sort_keys_orders_by_text() {
        let value = obj(&[("b", int(2)), ("a", int(1)), ("c", int(3))]);
        let text = encode_with(
            EncoderOptions {
                sort_keys: true,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, r#"{"a": 1, "b": 2, "c": 3}"#);
    }

    #[test]
    fn unquoted_keys_respect_identifier_and_ascii_rules() {
        let value = obj(&[("valid_key", int(1)), ("invalid-key", int(2)), ("ä", int(3))]);
        let text = encode_with(
            EncoderOptions {
                quoted_keys: false,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, r#"{valid_key: 1, "invalid-key": 2, ä: 3}"#);

        let text = encode_with(
            EncoderOptions {
                quoted_keys: false,
                ensure_ascii: true,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, r#"{valid_key: 1, "invalid-key": 2, "\u00e4": 3}"#);
    }

    #[test]
    fn duplicate_keys_round_trip_through_the_encoder() {
        let mut map = Object::new();
        map.insert(Key::from("x"), int(1));
        map.insert(Key::Duplicate(DuplicateKey::new("x")), int(2));
        assert_eq!(encode(&Value::Object(map)).unwrap(), r#"{"x": 1, "x": 2}"#);
    }

    #[rstest]
    #[case(f64::NAN, "NaN")]
    #[case(f64::INFINITY, "Infinity")]
    #[case(f64::NEG_INFINITY, "-Infinity")]
    fn non_finite_needs_the_flag(#[case] f: f64, #[case] repr: &'static str) {
        assert_eq!(encode(&Value::Float(f)).unwrap_err(), EncodeError::NotAllowed(repr));
        let text = encode_with(
            EncoderOptions {
                allow_nan_and_infinity: true,
                ..EncoderOptions::default()
            },
            &Value::Float(f),
        )
        .unwrap();
        assert_eq!(text, repr);
    }

    #[test]
    fn big_numbers() {
        let value = Value::BigNumber(BigNumber::Finite("1.5".parse().unwrap()));
        assert_eq!(encode(&value).unwrap(), "1.5");

        let nan = Value::BigNumber(BigNumber::Nan { signaling: false });
        assert_eq!(encode(&nan).unwrap_err(), EncodeError::NotAllowed("NaN"));
        let text = encode_with(
            EncoderOptions {
                allow_nan_and_infinity: true,
                ..EncoderOptions::default()
            },
            &nan,
        )
        .unwrap();
        assert_eq!(text, "NaN");

        // A signaling NaN has no representation regardless of the flag.
        let snan = Value::BigNumber(BigNumber::Nan { signaling: true });
        let err = encode_with(
            EncoderOptions {
                allow_nan_and_infinity: true,
                ..EncoderOptions::default()
            },
            &snan,
        )
        .unwrap_err();
        assert_eq!(err, EncodeError::NotSerializable("sNaN"));
    }

    #[test]
    fn non_str_keys_are_policy_gated() {
        let mut map = Object::new();
        map.insert(Key::Int(7.into()), Value::from("seven"));
        let value = Value::Object(map);

        assert_eq!(encode(&value).unwrap_err(), EncodeError::InvalidKey("int"));

        let text = encode_with(
            EncoderOptions {
                allow_non_str_keys: true,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, r#"{"7": "seven"}"#);

        let text = encode_with(
            EncoderOptions {
                skipkeys: true,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, "{}");
    }

    #[test]
    fn skipped_keys_leave_no_stray_separator() {
        let mut map = Object::new();
        map.insert(Key::Null, int(1));
        map.insert(Key::from("kept"), int(2));
        let text = encode_with(
            EncoderOptions {
                skipkeys: true,
                ..EncoderOptions::default()
            },
            &Value::Object(map),
        )
        .unwrap();
        assert_eq!(text, r#"{"kept": 2}"#);
    }

    #[test]
    fn scalar_key_coercions() {
        let mut map = Object::new();
        map.insert(Key::Bool(true), int(1));
        map.insert(Key::Null, int(2));
        map.insert(Key::Float(1.5), int(3));
        let text = encode_with(
            EncoderOptions {
                allow_non_str_keys: true,
                ..EncoderOptions::default()
            },
            &Value::Object(map),
        )
        .unwrap();
        assert_eq!(text, r#"{"true": 1, "null": 2, "1.5": 3}"#);
    }

    #[test]
    fn ensure_ascii_switches_escape_variant() {
        let value = Value::from("grüße\n");
        assert_eq!(encode(&value).unwrap(), "\"grüße\\n\"");
        let text = encode_with(
            EncoderOptions {
                ensure_ascii: true,
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, "\"gr\\u00fc\\u00dfe\\n\"");
    }

    #[test]
    fn end_is_appended_once() {
        let text = encode_with(
            EncoderOptions {
                end: "\n".to_string(),
                ..EncoderOptions::default()
            },
            &int(1),
        )
        .unwrap();
        assert_eq!(text, "1\n");
    }

    #[test]
    fn custom_separators() {
        let value = obj(&[("a", int(1)), ("b", int(2))]);
        let text = encode_with(
            EncoderOptions {
                long_item_separator: ",".to_string(),
                key_separator: ":".to_string(),
                ..EncoderOptions::default()
            },
            &value,
        )
        .unwrap();
        assert_eq!(text, r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn hook_transforms_every_value() {
        let options = EncoderOptions {
            hook: Some(Box::new(|v| match v {
                Value::Int(n) => Value::Str(format!("#{n}")),
                other => other.clone(),
            })),
            ..EncoderOptions::default()
        };
        let value = Value::Array(vec![int(1), Value::from("x"), int(2)]);
        assert_eq!(
            encode_with(options, &value).unwrap(),
            r##"["#1", "x", "#2"]"##
        );
    }

    #[test]
    fn deep_trees_fail_gracefully() {
        let mut value = Value::Null;
        for _ in 0..crate::RECURSION_LIMIT + 10 {
            value = Value::Array(vec![value]);
        }
        assert_eq!(encode(&value).unwrap_err(), EncodeError::TooDeeplyNested);
    }
}
