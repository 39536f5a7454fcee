#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must not panic — errors are fine, panics are bugs.
    if let Ok(request) = faktura_validator::intake::classify(data) {
        assert!(request.text().starts_with("<?xml version") || !request.text().contains("<?xml version"));
    }
});
