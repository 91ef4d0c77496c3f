//! Stream ingestion: raw database records in, [`Reading`](crate::reading::Reading)s out
//!
//! - [`record`] normalizes one raw sensor or prediction record.
//! - [`event_stream`] decodes the real-time database's server-sent-events
//!   stream into child records, in database key order.

pub mod event_stream;
pub mod record;

pub use event_stream::{ChildCursor, EventStreamDecoder, StreamError, StreamEvent, compare_keys};
pub use record::{RawPrediction, RawSensorRecord, RecordError, SensorSample};

use alloc::string::String;

/// Source of wall-clock time for readings.
///
/// The core has no clock of its own; hosts provide one.
pub trait Clock {
    /// Receipt time as an ISO-8601 string
    fn now_iso8601(&self) -> String;

    /// Local time-of-day label used when a record carries no date/time
    fn now_label(&self) -> String;
}
