//! Convenient re-exports for common usage.
//!
//! ```rust,no_run
//! use netvisor_core::prelude::*;
//!
//! let analysis = analyze(b"#fields\tts\tid.orig_h\tid.resp_h\n").unwrap();
//! assert!(analysis.result.detailed_events.is_empty());
//! ```

// Entry points
pub use crate::analyze::{analyze, Analyzer};
pub use crate::config::{AnalysisConfig, DirectionPolicy};

// Result types
pub use crate::model::{Analysis, AnalysisResult, AnalysisStats, DetailedEvent, DeviceTotal};

// Extension points
pub use crate::extract::{AppLayerExtractor, ExtractorKind};
pub use crate::model::AppLayerInfo;

// Error types
pub use crate::error::{Error, Result};
