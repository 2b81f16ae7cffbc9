//! Review output for `preview`
//!
//! Lists what an import would add and modify, with per-field changes, so an
//! operator can confirm before anything is written.

use serde_json::Value;
use std::io::Write;
use tapp_import_common::diff::describe;
use tapp_import_common::{DiffSpec, DiffStatus, DiffSummary, EntityKind};

pub fn write_summary<W: Write>(
    out: &mut W,
    kind: EntityKind,
    diffs: &[DiffSpec<Value>],
) -> std::io::Result<()> {
    let summary = DiffSummary::of(diffs);
    writeln!(
        out,
        "{}: {} new, {} modified, {} unchanged",
        kind, summary.new, summary.modified, summary.unchanged
    )?;

    if summary.new > 0 {
        writeln!(out, "\nWill be added:")?;
        for d in diffs.iter().filter(|d| d.status == DiffStatus::New) {
            writeln!(out, "  + {}", label(kind, &d.obj))?;
        }
    }

    if summary.modified > 0 {
        writeln!(out, "\nWill be modified:")?;
        for d in diffs.iter().filter(|d| d.status == DiffStatus::Modified) {
            writeln!(out, "  ~ {}", label(kind, &d.obj))?;
            for (field, change) in &d.changes {
                writeln!(out, "      {}: {}", field, change)?;
            }
        }
    }

    if summary.new == 0 && summary.modified == 0 {
        writeln!(out, "\nNothing to import.")?;
    }
    Ok(())
}

/// Short name of an entity for listings
fn label(kind: EntityKind, obj: &Value) -> String {
    match kind {
        EntityKind::Assignments => {
            format!("{} / {}", describe(&obj["applicant"]), describe(&obj["position"]))
        }
        EntityKind::ApplicantMatching => describe(&obj["applicant"]),
        EntityKind::Ddahs => format!(
            "{} / {}",
            describe(&obj["assignment"]["position"]),
            describe(&obj["assignment"]["applicant"])
        ),
        _ => describe(obj),
    }
}
