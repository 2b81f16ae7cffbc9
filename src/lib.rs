//! Command-line front end for the import reconciliation core
//!
//! Decodes JSON and spreadsheet files, loads the snapshot of existing
//! records, and prints what an import would change.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
