//! Assignments, keyed by the pair (utorid, position code)
//!
//! Both key components are required references: an assignment naming an
//! unknown applicant or position cannot be imported.

use super::{copy_number, copy_text, reference_text, to_value};
use crate::diff::{Candidate, Key, KeyValue, Reconciler};
use crate::error::Result;
use crate::normalize::Record;
use crate::resolve::Resolver;
use crate::types::{Assignment, Position};

pub struct AssignmentReconciler<'a> {
    resolver: Resolver<'a>,
}

impl<'a> AssignmentReconciler<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }
}

impl Reconciler for AssignmentReconciler<'_> {
    type Entity = Assignment;

    fn prepare(&self, record: &Record) -> Result<Candidate> {
        let utorid = reference_text(record, "utorid")?;
        let position_code = reference_text(record, "position_code")?;
        let applicant = self.resolver.applicant(&utorid).required("Applicant", &utorid)?;
        let position = self.resolver.position(&position_code).required("Position", &position_code)?;

        let mut patch = Record::new();
        patch.insert("applicant".into(), to_value(applicant)?);
        patch.insert("position".into(), to_value(position)?);
        copy_number(record, &mut patch, "hours")?;
        for field in ["contract_start", "contract_end", "contract_override_pdf"] {
            copy_text(record, &mut patch, field);
        }

        Ok(Candidate {
            key: vec![
                KeyValue::text(&applicant.utorid),
                KeyValue::text(&position.position_code),
            ],
            patch,
        })
    }

    fn entity_key(&self, entity: &Assignment) -> Key {
        vec![
            KeyValue::text(&entity.applicant.utorid),
            KeyValue::text(&entity.position.position_code),
        ]
    }

    /// New assignments default to the position's hours.
    fn defaults(&self, patch: &Record) -> Assignment {
        let hours = patch
            .get("position")
            .and_then(|p| serde_json::from_value::<Position>(p.clone()).ok())
            .map(|p| p.hours_per_assignment)
            .unwrap_or_default();
        Assignment { hours, ..Default::default() }
    }
}
