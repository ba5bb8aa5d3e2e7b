//! Fuzz target for the Zeek ASCII log reader.
//!
//! Every line must come back as a record, a malformed-line error, or a
//! fatal header error that ends iteration.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netvisor_core::zeek::{ZeekReader, REQUIRED_COLUMNS};

fuzz_target!(|data: &[u8]| {
    let mut fatal = false;
    for item in ZeekReader::new(data).require(REQUIRED_COLUMNS) {
        assert!(!fatal, "record yielded after a fatal error");
        if let Err(e) = item {
            fatal = !e.is_recoverable();
        }
    }
});
