// Sales Analytics - Core Library
// Aggregation queries over an in-memory sales table, plus the report and
// export collaborators that consume them.

pub mod analyzer;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod report;

// Re-export commonly used types
pub use analyzer::{
    CustomerStats, SalesAnalyzer, Summary, DEFAULT_TOP_N, DEFAULT_WINDOW_DAYS,
};
pub use error::{AnalyticsError, Result};
pub use export::{export_json, AnalyticsExport};
pub use loader::{load_csv, REQUIRED_COLUMNS};
pub use model::{Segment, Transaction};
pub use report::render_report;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
