#![no_main]
use libfuzzer_sys::fuzz_target;
use oxitex_lint::validate;

fuzz_target!(|data: &[u8]| {
    // Panic-freedom only: the report itself is not checked.
    // Lossy decoding keeps almost-text inputs in play instead of
    // rejecting everything that is not valid UTF-8.
    let s = String::from_utf8_lossy(data);
    let _ = validate(&s);
});
