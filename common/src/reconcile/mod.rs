//! Per-entity reconciliation rules
//!
//! Each entity kind supplies a [`Reconciler`](crate::diff::Reconciler): how
//! its key resolves, which references it needs from the snapshot, and how a
//! normalized record maps onto the full entity. [`diff_kind`] dispatches on
//! [`EntityKind`] for callers that only know the kind at runtime.

pub mod applicants;
pub mod assignments;
pub mod ddahs;
pub mod instructors;
pub mod matching;
pub mod positions;
pub mod postings;

pub use applicants::ApplicantReconciler;
pub use assignments::AssignmentReconciler;
pub use ddahs::DdahReconciler;
pub use instructors::InstructorReconciler;
pub use matching::MatchingReconciler;
pub use positions::PositionReconciler;
pub use postings::PostingReconciler;

use crate::diff::{diff, DiffSpec, Reconciler};
use crate::error::{Error, Result};
use crate::normalize::{normalize_with, DataFormat, NormalizeOptions, Record};
use crate::resolve::Resolver;
use crate::schema::EntityKind;
use crate::types::Snapshot;
use crate::value::{as_number, as_text, is_blank, number_value};
use serde::Serialize;
use serde_json::Value;

/// Diff records of `kind` against the matching collection of `snapshot`.
pub fn diff_kind(
    kind: EntityKind,
    candidates: &[Record],
    snapshot: &Snapshot,
) -> Result<Vec<DiffSpec<Value>>> {
    let resolver = Resolver::new(snapshot);
    match kind {
        EntityKind::Instructors => erase(&InstructorReconciler, candidates, &snapshot.instructors),
        EntityKind::Applicants => erase(&ApplicantReconciler, candidates, &snapshot.applicants),
        EntityKind::Positions => {
            erase(&PositionReconciler::new(resolver), candidates, &snapshot.positions)
        }
        EntityKind::Assignments => {
            erase(&AssignmentReconciler::new(resolver), candidates, &snapshot.assignments)
        }
        EntityKind::Postings => {
            erase(&PostingReconciler::new(resolver), candidates, &snapshot.postings)
        }
        EntityKind::ApplicantMatching => erase(
            &MatchingReconciler::new(resolver),
            candidates,
            &snapshot.applicant_matching_data,
        ),
        EntityKind::Ddahs => erase(&DdahReconciler::new(resolver), candidates, &snapshot.ddahs),
    }
}

/// Normalize a payload and diff it in one step.
///
/// Normalization errors abort before any diff is computed.
pub fn preview_import(
    kind: EntityKind,
    payload: &DataFormat,
    snapshot: &Snapshot,
    options: &NormalizeOptions,
) -> Result<Vec<DiffSpec<Value>>> {
    let records = normalize_with(payload, kind.schema(), options)?;
    diff_kind(kind, &records, snapshot)
}

fn erase<R>(
    reconciler: &R,
    candidates: &[Record],
    existing: &[R::Entity],
) -> Result<Vec<DiffSpec<Value>>>
where
    R: Reconciler,
    R::Entity: Serialize,
{
    diff(reconciler, candidates, existing)?
        .into_iter()
        .map(DiffSpec::into_value)
        .collect()
}

// Helpers shared by the reconcilers. Null and blank values count as "not
// mentioned" and are left out of the patch.

fn present<'r>(record: &'r Record, field: &str) -> Option<&'r Value> {
    record.get(field).filter(|v| !is_blank(Some(*v)))
}

fn copy_text(record: &Record, patch: &mut Record, field: &str) {
    if let Some(text) = present(record, field).and_then(as_text) {
        patch.insert(field.to_string(), Value::String(text));
    }
}

fn copy_number(record: &Record, patch: &mut Record, field: &str) -> Result<()> {
    if let Some(value) = present(record, field) {
        let n = as_number(value).ok_or_else(|| invalid_number(field, value))?;
        patch.insert(field.to_string(), number_value(n).unwrap_or(Value::Null));
    }
    Ok(())
}

fn copy_integer(record: &Record, patch: &mut Record, field: &str) -> Result<()> {
    if let Some(value) = present(record, field) {
        let n = as_number(value).ok_or_else(|| invalid_number(field, value))?;
        patch.insert(field.to_string(), Value::from(n.round() as i64));
    }
    Ok(())
}

fn invalid_number(field: &str, value: &Value) -> Error {
    Error::InvalidPayload(format!("'{}' must be a number, got {}", field, value))
}

/// Text of a required scalar reference field
fn reference_text(record: &Record, field: &str) -> Result<String> {
    present(record, field)
        .and_then(as_text)
        .ok_or_else(|| Error::InvalidPayload(format!("record has no '{}'", field)))
}

fn to_value<T: Serialize>(entity: &T) -> Result<Value> {
    Ok(serde_json::to_value(entity)?)
}
