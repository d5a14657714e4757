//! ddg-search library
//!
//! Exports the search pipeline, the fetcher and the MCP tool layer for
//! testing and reuse by the `ddg-search` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod search;
pub mod server;
pub mod tool;

pub use error::{Error, ErrorCategory};
