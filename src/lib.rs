//! schedlag - Scheduling lag report generator
//!
//! This library turns an appointment scheduling-lag export (CSV/TSV text or
//! an Excel workbook) into a two-sheet Excel report.
//!
//! # Pipeline
//!
//! - Header detection: the header row is found heuristically within the first
//!   rows of the file, and the delimiter of text input is sniffed
//! - Validation: columns are normalized and mapped onto `scheduling_lag`,
//!   `evenflow_flag` and `active_appointment_count`; unparseable rows are
//!   dropped
//! - Aggregation: count pivot by lag and flag, running totals with cumulative
//!   percentages, and a weekly (lag ≤ 7) summary
//! - Export: `Raw_Data` and `Analysis` sheets
//!
//! # Example
//!
//! ```no_run
//! use schedlag::config::AnalysisConfig;
//! use schedlag::pipeline::analyze_file;
//! use std::path::Path;
//!
//! let config = AnalysisConfig::default();
//! let outcome = analyze_file(
//!     Path::new("lag_export.csv"),
//!     Path::new("report.xlsx"),
//!     &config,
//! )?;
//!
//! for row in &outcome.weekly.rows {
//!     println!("{}: {:?}", row.scheduling_lag, row.percent);
//! }
//! # Ok::<(), schedlag::error::LagError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod ingest;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::AnalysisConfig;
pub use error::{LagError, LagResult};
pub use pipeline::{analyze_file, run_full_analysis, AnalysisOutcome, UploadedFile};
pub use types::{
    AnalysisTables, CanonicalField, CellValue, CountTable, CumulativeTable, RawRecord,
    ValidatedTable, WeeklySummary,
};
