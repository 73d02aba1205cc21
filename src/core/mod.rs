//! Aggregation engine

pub mod aggregator;

pub use aggregator::Aggregator;
