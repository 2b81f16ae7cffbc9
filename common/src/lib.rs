//! Import reconciliation core
//!
//! Normalizes external rows (spreadsheet or JSON export) onto canonical
//! records and diffs them against an in-memory snapshot of existing entities.
//! Pure: no I/O beyond logging, shared by the CLI and its tests.

pub mod alias;
pub mod diff;
pub mod error;
pub mod normalize;
pub mod reconcile;
pub mod resolve;
pub mod schema;
pub mod types;
pub mod value;

pub use alias::AliasConfig;
pub use diff::{
    diff, get_changed, Candidate, DiffSpec, DiffStatus, DiffSummary, Key, KeyValue, Reconciler,
};
pub use error::{Error, MissingField, Result};
pub use normalize::{normalize, normalize_with, DataFormat, NormalizeOptions, Record};
pub use reconcile::{diff_kind, preview_import};
pub use resolve::Resolver;
pub use schema::{EntityKind, NormalizationSchema, PrimaryKey};
pub use types::Snapshot;
