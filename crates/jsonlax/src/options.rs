//! Configuration for the scanner and the encoder.
#![allow(clippy::struct_excessive_bools)]

use std::fmt;

use num_bigint::BigInt;

use crate::key::Key;
use crate::value::Value;

/// Transform applied to every scanned `true`/`false`.
pub type BoolHook = Box<dyn Fn(bool) -> Value>;
/// Transform applied to every scanned integer.
pub type IntHook = Box<dyn Fn(BigInt) -> Value>;
/// Transform applied to every scanned float, including `NaN` and the
/// infinities (unless `use_decimal` routes those through [`BigNumber`]).
///
/// [`BigNumber`]: crate::BigNumber
pub type FloatHook = Box<dyn Fn(f64) -> Value>;
/// Transform applied to every scanned string value. Keys are not passed
/// through this hook; they stay text so the object can index them.
pub type StrHook = Box<dyn Fn(String) -> Value>;
/// Builds the value for a scanned array from its elements.
pub type SequenceHook = Box<dyn Fn(Vec<Value>) -> Value>;
/// Builds the value for a scanned object from its key/value pairs, in
/// source order. When set, the scanner collects pairs instead of an
/// [`Object`](crate::Object), preserving every duplicate.
pub type MappingHook = Box<dyn Fn(Vec<(Key, Value)>) -> Value>;
/// Transform applied to every value before it is encoded.
pub type EncodeHook = Box<dyn Fn(&Value) -> Value>;

/// Configuration options for the JSON scanner.
///
/// Each `allow_*` flag admits one permissive feature; with all of them off
/// the scanner accepts exactly RFC 8259 JSON. A hook set to `None` is the
/// identity producer for that variant and costs nothing on the hot path.
///
/// # Examples
///
/// ```rust
/// use jsonlax::{Scanner, ScannerOptions};
///
/// let scanner = Scanner::new(ScannerOptions {
///     allow_comments: true,
///     allow_unquoted_keys: true,
///     ..ScannerOptions::default()
/// });
/// assert!(scanner.scan("<doc>", "{a: 1} // done").is_ok());
/// ```
pub struct ScannerOptions {
    /// Whether to allow `//` line comments and `/* */` block comments
    /// anywhere whitespace is allowed.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_comments: bool,

    /// Whether an object may contain the same key more than once.
    ///
    /// Repeated occurrences are preserved as
    /// [`DuplicateKey`](crate::DuplicateKey) entries.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_duplicate_keys: bool,

    /// Whether whitespace may separate items where JSON requires a comma.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_missing_commas: bool,

    /// Whether the literals `NaN`, `Infinity` and `-Infinity` are values.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_nan_and_infinity: bool,

    /// Whether unpaired `\uXXXX` surrogate escapes are accepted.
    ///
    /// Rust strings cannot hold a lone surrogate, so an accepted unpaired
    /// escape decodes to U+FFFD. With the flag off it is a syntax error.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_surrogates: bool,

    /// Whether a comma may follow the last item of an array or object.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_trailing_comma: bool,

    /// Whether object keys may be unquoted identifiers.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_unquoted_keys: bool,

    /// Whether identical keys across one scan share storage.
    ///
    /// The intern table lives for a single `scan` call; the produced tree
    /// is the same either way.
    ///
    /// # Default
    ///
    /// `true`
    pub cache_keys: bool,

    /// Whether float literals (and, with `allow_nan_and_infinity`, the
    /// non-finite literals) become [`BigNumber`](crate::BigNumber) values
    /// instead of `f64`.
    ///
    /// # Default
    ///
    /// `false`
    pub use_decimal: bool,

    /// See [`BoolHook`].
    pub bool_hook: Option<BoolHook>,
    /// See [`FloatHook`].
    pub float_hook: Option<FloatHook>,
    /// See [`IntHook`].
    pub int_hook: Option<IntHook>,
    /// See [`MappingHook`].
    pub mapping_hook: Option<MappingHook>,
    /// See [`SequenceHook`].
    pub sequence_hook: Option<SequenceHook>,
    /// See [`StrHook`].
    pub str_hook: Option<StrHook>,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            allow_comments: false,
            allow_duplicate_keys: false,
            allow_missing_commas: false,
            allow_nan_and_infinity: false,
            allow_surrogates: false,
            allow_trailing_comma: false,
            allow_unquoted_keys: false,
            cache_keys: true,
            use_decimal: false,
            bool_hook: None,
            float_hook: None,
            int_hook: None,
            mapping_hook: None,
            sequence_hook: None,
            str_hook: None,
        }
    }
}

impl fmt::Debug for ScannerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerOptions")
            .field("allow_comments", &self.allow_comments)
            .field("allow_duplicate_keys", &self.allow_duplicate_keys)
            .field("allow_missing_commas", &self.allow_missing_commas)
            .field("allow_nan_and_infinity", &self.allow_nan_and_infinity)
            .field("allow_surrogates", &self.allow_surrogates)
            .field("allow_trailing_comma", &self.allow_trailing_comma)
            .field("allow_unquoted_keys", &self.allow_unquoted_keys)
            .field("cache_keys", &self.cache_keys)
            .field("use_decimal", &self.use_decimal)
            .field("bool_hook", &self.bool_hook.is_some())
            .field("float_hook", &self.float_hook.is_some())
            .field("int_hook", &self.int_hook.is_some())
            .field("mapping_hook", &self.mapping_hook.is_some())
            .field("sequence_hook", &self.sequence_hook.is_some())
            .field("str_hook", &self.str_hook.is_some())
            .finish()
    }
}

/// Configuration options for the JSON encoder.
///
/// The defaults produce compact single-line JSON with `", "` between items
/// and `": "` after keys. Setting `indent` switches containers to one item
/// per line; `item_separator` is then used between lines and
/// `long_item_separator` only inside containers that stay on one line.
pub struct EncoderOptions {
    /// Whether non-finite numbers are written as `NaN`, `Infinity` and
    /// `-Infinity` instead of failing.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_nan_and_infinity: bool,

    /// Whether integer, float, boolean and null keys are coerced to their
    /// scalar text. When `false`, such keys fail with
    /// [`EncodeError::InvalidKey`](crate::EncodeError::InvalidKey) unless
    /// `skipkeys` drops them.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_non_str_keys: bool,

    /// Kept for parity with [`ScannerOptions::allow_surrogates`]; encoder
    /// input is always well-formed UTF-8, so this has no effect.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_surrogates: bool,

    /// Whether containers are tracked while being emitted so re-entry
    /// fails with
    /// [`EncodeError::CircularReference`](crate::EncodeError::CircularReference).
    ///
    /// # Default
    ///
    /// `true`
    pub check_circular: bool,

    /// Text appended exactly once after the encoded value.
    ///
    /// # Default
    ///
    /// `""`
    pub end: String,

    /// Whether every non-ASCII character is written as a `\uXXXX` escape.
    ///
    /// # Default
    ///
    /// `false`
    pub ensure_ascii: bool,

    /// Text prepended once per nesting level, or `None` for single-line
    /// output.
    ///
    /// # Default
    ///
    /// `None`
    pub indent: Option<String>,

    /// Whether containers holding only leaves are still indented. When
    /// `false`, a container is only indented if one of its children is
    /// itself an array or object.
    ///
    /// # Default
    ///
    /// `true`
    pub indent_leaves: bool,

    /// Separator between items in indented containers (the newline and
    /// indent follow it).
    ///
    /// # Default
    ///
    /// `","`
    pub item_separator: String,

    /// Separator between a key and its value.
    ///
    /// # Default
    ///
    /// `": "`
    pub key_separator: String,

    /// Separator between items in containers that are not indented.
    ///
    /// # Default
    ///
    /// `", "`
    pub long_item_separator: String,

    /// Nesting level at which indentation stops; deeper containers are
    /// written on one line.
    ///
    /// # Default
    ///
    /// `usize::MAX`
    pub max_indent_level: usize,

    /// Whether keys are always quoted. When `false`, a key that is a valid
    /// identifier (and pure ASCII if `ensure_ascii` is set) is written
    /// bare.
    ///
    /// # Default
    ///
    /// `true`
    pub quoted_keys: bool,

    /// Whether mapping keys that cannot be serialised are silently
    /// dropped instead of failing.
    ///
    /// # Default
    ///
    /// `false`
    pub skipkeys: bool,

    /// Whether mapping entries are emitted sorted by key text instead of
    /// in insertion order.
    ///
    /// # Default
    ///
    /// `false`
    pub sort_keys: bool,

    /// Whether indented containers get an `item_separator` after their
    /// last item.
    ///
    /// # Default
    ///
    /// `false`
    pub trailing_comma: bool,

    /// See [`EncodeHook`].
    pub hook: Option<EncodeHook>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            allow_nan_and_infinity: false,
            allow_non_str_keys: false,
            allow_surrogates: false,
            check_circular: true,
            end: String::new(),
            ensure_ascii: false,
            indent: None,
            indent_leaves: true,
            item_separator: ",".to_string(),
            key_separator: ": ".to_string(),
            long_item_separator: ", ".to_string(),
            max_indent_level: usize::MAX,
            quoted_keys: true,
            skipkeys: false,
            sort_keys: false,
            trailing_comma: false,
            hook: None,
        }
    }
}

impl fmt::Debug for EncoderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderOptions")
            .field("allow_nan_and_infinity", &self.allow_nan_and_infinity)
            .field("allow_non_str_keys", &self.allow_non_str_keys)
            .field("allow_surrogates", &self.allow_surrogates)
            .field("check_circular", &self.check_circular)
            .field("end", &self.end)
            .field("ensure_ascii", &self.ensure_ascii)
            .field("indent", &self.indent)
            .field("indent_leaves", &self.indent_leaves)
            .field("item_separator", &self.item_separator)
            .field("key_separator", &self.key_separator)
            .field("long_item_separator", &self.long_item_separator)
            .field("max_indent_level", &self.max_indent_level)
            .field("quoted_keys", &self.quoted_keys)
            .field("skipkeys", &self.skipkeys)
            .field("sort_keys", &self.sort_keys)
            .field("trailing_comma", &self.trailing_comma)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
