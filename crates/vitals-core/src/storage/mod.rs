//! In-memory reading history for the current session
//!
//! Nothing here is persisted: buffers start empty when the session starts and
//! only ever shrink by evicting their oldest entry.

mod history;
mod latest;

pub use history::HistoryBuffer;
pub use latest::LatestValues;

/// Readings kept per signal for the report pages
pub const REPORT_CAPACITY: usize = 100;

/// Points kept per signal for the live dashboard chart
pub const CHART_CAPACITY: usize = 30;

/// Report-level history
pub type ReportHistory = HistoryBuffer<REPORT_CAPACITY>;

/// Chart-level history
pub type ChartHistory = HistoryBuffer<CHART_CAPACITY>;
