#![no_main]

use jsonlax::{Encoder, EncoderOptions, Scanner, ScannerOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // The first byte doubles as a feature selector.
    let flags = data.first().copied().unwrap_or(0);
    let scanner = Scanner::new(ScannerOptions {
        allow_comments: flags & 0x01 != 0,
        allow_duplicate_keys: flags & 0x02 != 0,
        allow_missing_commas: flags & 0x04 != 0,
        allow_nan_and_infinity: flags & 0x08 != 0,
        allow_surrogates: flags & 0x10 != 0,
        allow_trailing_comma: flags & 0x20 != 0,
        allow_unquoted_keys: flags & 0x40 != 0,
        use_decimal: flags & 0x80 != 0,
        ..ScannerOptions::default()
    });
    if let Ok(value) = scanner.scan("<fuzz>", text) {
        // Whatever scans must encode.
        Encoder::new(EncoderOptions {
            allow_nan_and_infinity: true,
            ..EncoderOptions::default()
        })
        .encode(&value)
        .expect("scanned values must encode");
    }
});
