//! Zeek ASCII log parsing.
//!
//! [`ZeekReader`] turns tab-separated, header-described log text into typed
//! [`ZeekRecord`]s; [`to_event`] maps each record onto an analysis event.

mod event;
mod header;
mod reader;
mod value;

pub use event::{path_label, service_label, to_event, REQUIRED_COLUMNS};
pub use header::{Directive, ZeekHeader};
pub use reader::{ZeekReader, ZeekRecord};
pub use value::{unescape, ZeekType, ZeekValue};
