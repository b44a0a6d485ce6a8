//! A permissive, configurable JSON codec.
//!
//! jsonlax reads and writes a superset of JSON. The [`Scanner`] turns a
//! UTF-8 text into a [`Value`] tree and reports syntax errors with the
//! filename, line, column and code-point span of the offending token. The
//! [`Encoder`] turns a tree back into text with configurable escaping,
//! indentation, key ordering and separators.
//!
//! All permissive features are off by default; each one is a flag on
//! [`ScannerOptions`] or [`EncoderOptions`]:
//!
//! - `//` and `/* */` comments
//! - trailing and missing commas
//! - unquoted identifier keys
//! - `NaN`, `Infinity` and `-Infinity`
//! - duplicate object keys, preserved via [`DuplicateKey`]
//!
//! # Examples
//!
//! ```
//! use jsonlax::{Scanner, ScannerOptions};
//!
//! let scanner = Scanner::new(ScannerOptions {
//!     allow_comments: true,
//!     allow_trailing_comma: true,
//!     ..ScannerOptions::default()
//! });
//! let value = scanner.scan("<config>", "/* retry policy */ {\"attempts\": 3,}")?;
//! assert!(value.is_object());
//! # Ok::<(), jsonlax::SyntaxError>(())
//! ```
//!
//! ```
//! use jsonlax::{Encoder, EncoderOptions, Value};
//!
//! let encoder = Encoder::new(EncoderOptions {
//!     indent: Some("  ".to_string()),
//!     ..EncoderOptions::default()
//! });
//! let text = encoder.encode(&Value::Array(vec![Value::from(1i64), Value::from("two")]))?;
//! assert_eq!(text, "[\n  1,\n  \"two\"\n]");
//! # Ok::<(), jsonlax::EncodeError>(())
//! ```

mod encoder;
mod error;
mod key;
mod number;
mod options;
mod scanner;
mod strings;
mod value;

pub use bigdecimal::BigDecimal;
pub use num_bigint::BigInt;

pub use encoder::Encoder;
pub use error::{EncodeError, SyntaxError};
pub use key::{DuplicateKey, Key};
pub use options::{
    BoolHook, EncodeHook, EncoderOptions, FloatHook, IntHook, MappingHook, ScannerOptions,
    SequenceHook, StrHook,
};
pub use scanner::Scanner;
pub use value::{Array, BigNumber, Object, Value};

/// Maximum container nesting depth for both scanning and encoding.
///
/// Inputs nested deeper than this fail with "Object is too deeply nested"
/// or "Array is too deeply nested" instead of exhausting the call stack;
/// the encoder rejects deeper trees with [`EncodeError::TooDeeplyNested`].
pub const RECURSION_LIMIT: usize = 500;
