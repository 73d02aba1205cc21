//! schedlag API Server module
//!
//! Provides the HTTP upload and download surface over the analysis pipeline.
//! Run with `schedlag-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
