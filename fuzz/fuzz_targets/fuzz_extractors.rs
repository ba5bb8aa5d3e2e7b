//! Fuzz target for the application-layer extractors.
//!
//! Feeds the same payload to the HTTP, DNS, TLS and SSH extractors.
//! Extraction is best-effort and must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netvisor_core::extract::{ExtractorKind, ExtractorRegistry};

fuzz_target!(|data: &[u8]| {
    let registry = ExtractorRegistry::with_builtins(&ExtractorKind::ALL);
    for kind in ExtractorKind::ALL {
        let info = registry.extract(kind.name(), data);
        assert!(info.keys().all(|key| !key.is_empty()));
    }
});
