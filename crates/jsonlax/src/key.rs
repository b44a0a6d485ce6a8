//! Object keys, including duplicate-key preservation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::Equivalent;
use num_bigint::BigInt;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);

/// A text key that compares and hashes by identity rather than content.
///
/// An object scanned with `allow_duplicate_keys` keeps the first occurrence
/// of a repeated key as a plain [`Key::Str`]; every later occurrence is
/// wrapped in a `DuplicateKey`, so one ordered mapping can hold arbitrarily
/// many entries with the same surface text.
///
/// # Examples
///
/// ```
/// use jsonlax::DuplicateKey;
///
/// let a = DuplicateKey::new("x");
/// let b = DuplicateKey::new("x");
/// assert_eq!(a.as_str(), b.as_str());
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
#[derive(Clone, Debug)]
pub struct DuplicateKey {
    text: Arc<str>,
    serial: u64,
}

impl DuplicateKey {
    /// Wraps `text` with a fresh identity.
    #[must_use]
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for DuplicateKey {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial
    }
}

impl Eq for DuplicateKey {}

impl Hash for DuplicateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial.hash(state);
    }
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A key of a JSON object.
///
/// Keys produced by the scanner are always [`Key::Str`] (interned
/// `Arc<str>` text) or [`Key::Duplicate`]. The scalar variants exist for
/// trees built in code; the encoder coerces them to text under
/// `allow_non_str_keys`, drops them under `skipkeys`, and rejects them
/// otherwise.
#[derive(Clone, Debug)]
pub enum Key {
    /// A decoded text key.
    Str(Arc<str>),
    /// A repeated text key with identity equality.
    Duplicate(DuplicateKey),
    /// An integer key, encoded as its decimal representation.
    Int(BigInt),
    /// A float key, encoded as its shortest representation.
    Float(f64),
    /// A boolean key, encoded as `true` or `false`.
    Bool(bool),
    /// A null key, encoded as `null`.
    Null,
}

impl Key {
    /// The key text, for the two text-valued variants.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            Key::Duplicate(d) => Some(d.as_str()),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Key::Str(_) | Key::Duplicate(_) => "str",
            Key::Int(_) => "int",
            Key::Float(_) => "float",
            Key::Bool(_) => "bool",
            Key::Null => "null",
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Str(a), Key::Str(b)) => a == b,
            (Key::Duplicate(a), Key::Duplicate(b)) => a == b,
            (Key::Int(a), Key::Int(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Null, Key::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Key {}

// `Key::Str` hashes exactly like `str` so objects can be probed with a
// borrowed `&str` (see the `Equivalent` impl below).
impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Str(s) => s[..].hash(state),
            Key::Duplicate(d) => d.hash(state),
            Key::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Key::Float(f) => {
                3u8.hash(state);
                f.to_bits().hash(state);
            }
            Key::Bool(b) => {
                4u8.hash(state);
                b.hash(state);
            }
            Key::Null => 5u8.hash(state),
        }
    }
}

impl Equivalent<Key> for str {
    fn equivalent(&self, key: &Key) -> bool {
        matches!(key, Key::Str(s) if **s == *self)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(Arc::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for Key {
    fn from(s: Arc<str>) -> Self {
        Key::Str(s)
    }
}
