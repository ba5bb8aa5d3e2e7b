//! Fuzz target for the full analysis pipeline.
//!
//! Arbitrary uploads either fail cleanly or produce a result whose
//! protocol summary accounts for every event.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netvisor_core::{AnalysisConfig, Analyzer};

fuzz_target!(|data: &[u8]| {
    let analyzer = Analyzer::new(
        AnalysisConfig::default()
            .with_max_input_bytes(1 << 20)
            .with_max_events(1_000)
            .with_parallel(false),
    );
    let Ok(analysis) = analyzer.analyze(data) else {
        return;
    };

    let result = &analysis.result;
    let counted: u64 = result.protocol_summary.values().sum();
    assert_eq!(counted, result.detailed_events.len() as u64);
    for (i, event) in result.detailed_events.iter().enumerate() {
        assert_eq!(event.id, i as u64);
    }
    for pair in result.devices.windows(2) {
        assert!(pair[0].total_bytes >= pair[1].total_bytes);
    }
});
