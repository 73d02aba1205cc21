//! Input side of the pipeline
//!
//! - `sniffer`: delimiter detection for text exports
//! - `locator`: header row detection for text and worksheet input
//! - `columns`: column name normalization and canonical mapping
//! - `loader`: reading, coercion and row validation

pub mod columns;
pub mod loader;
pub mod locator;
pub mod sniffer;

pub use columns::{ColumnMapper, ColumnMapping};
pub use loader::{DataLoader, InputFormat, LoadedInput};
pub use locator::{DelimitedHeader, HeaderCandidate, HeaderLocator};
pub use sniffer::{fallback_delimiter, sniff_delimiter};
