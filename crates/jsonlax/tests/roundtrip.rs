//! End-to-end properties over the public API: scanning, encoding and
//! round-tripping.

use jsonlax::{Encoder, EncoderOptions, Key, Object, Scanner, ScannerOptions, Value};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

/// Newtype so the crate-local `Arbitrary` impl is allowed here.
#[derive(Debug, Clone)]
struct ArbitraryValue(Value);

fn finite_float(g: &mut Gen) -> f64 {
    let mut f = f64::arbitrary(g);
    while !f.is_finite() {
        f = f64::arbitrary(g);
    }
    f
}

fn gen_value(g: &mut Gen, depth: usize) -> Value {
    let variants = if depth == 0 { 5 } else { 7 };
    match usize::arbitrary(g) % variants {
        0 => Value::Null,
        1 => Value::Bool(bool::arbitrary(g)),
        2 => Value::from(i64::arbitrary(g)),
        3 => Value::Float(finite_float(g)),
        4 => Value::Str(String::arbitrary(g)),
        5 => {
            let len = usize::arbitrary(g) % 4;
            Value::Array((0..len).map(|_| gen_value(g, depth - 1)).collect())
        }
        _ => {
            let len = usize::arbitrary(g) % 4;
            let mut map = Object::new();
            for _ in 0..len {
                map.insert(Key::from(String::arbitrary(g)), gen_value(g, depth - 1));
            }
            Value::Object(map)
        }
    }
}

impl Arbitrary for ArbitraryValue {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = usize::arbitrary(g) % 3;
        ArbitraryValue(gen_value(g, depth))
    }
}

fn scan(text: &str) -> Result<Value, jsonlax::SyntaxError> {
    Scanner::new(ScannerOptions::default()).scan("<prop>", text)
}

fn encode(value: &Value) -> String {
    Encoder::new(EncoderOptions::default())
        .encode(value)
        .expect("generated values are always encodable")
}

#[quickcheck]
fn round_trip_preserves_value_equality(value: ArbitraryValue) -> bool {
    scan(&encode(&value.0)).expect("encoder output must scan") == value.0
}

#[quickcheck]
fn round_trip_with_sorted_keys(value: ArbitraryValue) -> bool {
    let text = Encoder::new(EncoderOptions {
        sort_keys: true,
        ..EncoderOptions::default()
    })
    .encode(&value.0)
    .expect("generated values are always encodable");
    // Mapping equality is order-insensitive.
    scan(&text).expect("encoder output must scan") == value.0
}

#[quickcheck]
fn encoding_is_stable_across_a_round_trip(value: ArbitraryValue) -> bool {
    let once = encode(&value.0);
    let again = encode(&scan(&once).expect("encoder output must scan"));
    once == again
}

#[quickcheck]
fn ensure_ascii_output_is_ascii_and_round_trips(text: String) -> bool {
    let value = Value::Str(text);
    let encoded = Encoder::new(EncoderOptions {
        ensure_ascii: true,
        ..EncoderOptions::default()
    })
    .encode(&value)
    .expect("strings are always encodable");
    encoded.is_ascii() && scan(&encoded).expect("escaped output must scan") == value
}

#[quickcheck]
fn indented_output_round_trips(value: ArbitraryValue) -> bool {
    let text = Encoder::new(EncoderOptions {
        indent: Some("\t".to_string()),
        trailing_comma: true,
        ..EncoderOptions::default()
    })
    .encode(&value.0)
    .expect("generated values are always encodable");
    let scanner = Scanner::new(ScannerOptions {
        allow_trailing_comma: true,
        ..ScannerOptions::default()
    });
    scanner.scan("<prop>", &text).expect("indented output must scan") == value.0
}

#[quickcheck]
fn scan_never_panics_and_diagnostics_stay_in_bounds(text: String) -> bool {
    match scan(&text) {
        Ok(_) => true,
        Err(err) => err.start <= err.end && err.end <= text.chars().count(),
    }
}

#[test]
fn kitchen_sink_with_every_permissive_feature() {
    let scanner = Scanner::new(ScannerOptions {
        allow_comments: true,
        allow_duplicate_keys: true,
        allow_missing_commas: true,
        allow_nan_and_infinity: true,
        allow_surrogates: true,
        allow_trailing_comma: true,
        allow_unquoted_keys: true,
        ..ScannerOptions::default()
    });
    let text = r#"
    // configuration dump
    {
        name: "jsonlax" /* inline */,
        retries: 3
        backoff: [1.5, Infinity],
        flags: {verbose: true, verbose: false,},
    }
    "#;
    let value = scanner.scan("<sink>", text).unwrap();
    let Value::Object(map) = &value else {
        panic!("expected object");
    };
    assert_eq!(map.len(), 4);

    let encoder = Encoder::new(EncoderOptions {
        allow_nan_and_infinity: true,
        indent: Some("    ".to_string()),
        quoted_keys: false,
        trailing_comma: true,
        end: "\n".to_string(),
        ..EncoderOptions::default()
    });
    let out = encoder.encode(&value).unwrap();
    assert_eq!(
        out,
        "{\n    name: \"jsonlax\",\n    retries: 3,\n    backoff: [\n        1.5,\n        Infinity,\n    ],\n    flags: {\n        verbose: true,\n        verbose: false,\n    },\n}\n"
    );
}

#[test]
fn conformant_text_has_a_canonical_compact_form() {
    let text = r#"{"a": [1, 2.5, "x"], "b": {"nested": null}, "c": false}"#;
    let value = scan(text).unwrap();
    assert_eq!(encode(&value), text);
}
