//! Positions, keyed by position code
//!
//! `instructors` is a list reference ("Last, First" names, `;`-separated in
//! spreadsheets); unknown names are dropped. `contract_template` must name a
//! loaded template.

use super::{copy_integer, copy_number, copy_text, present, to_value};
use crate::diff::{Candidate, Key, KeyValue, Reconciler};
use crate::error::Result;
use crate::normalize::Record;
use crate::resolve::Resolver;
use crate::types::Position;
use crate::value::as_text;
use serde_json::Value;

const TEXT_FIELDS: &[&str] = &[
    "position_code",
    "position_title",
    "start_date",
    "end_date",
    "duties",
    "qualifications",
];
const INTEGER_FIELDS: &[&str] =
    &["desired_num_assignments", "current_enrollment", "current_waitlisted"];

pub struct PositionReconciler<'a> {
    resolver: Resolver<'a>,
}

impl<'a> PositionReconciler<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }
}

impl Reconciler for PositionReconciler<'_> {
    type Entity = Position;

    fn prepare(&self, record: &Record) -> Result<Candidate> {
        let mut patch = Record::new();
        for field in TEXT_FIELDS {
            copy_text(record, &mut patch, field);
        }
        copy_number(record, &mut patch, "hours_per_assignment")?;
        for field in INTEGER_FIELDS {
            copy_integer(record, &mut patch, field)?;
        }

        if let Some(name) = present(record, "contract_template").and_then(as_text) {
            let template =
                self.resolver.contract_template(&name).required("Contract template", &name)?;
            patch.insert("contract_template".into(), to_value(template)?);
        }
        if let Some(value) = present(record, "instructors") {
            let instructors = self.resolver.instructors(value);
            patch.insert("instructors".into(), to_value(&instructors)?);
        }

        Ok(Candidate {
            key: vec![KeyValue::from_value(record.get("position_code").unwrap_or(&Value::Null))],
            patch,
        })
    }

    fn entity_key(&self, entity: &Position) -> Key {
        vec![KeyValue::text(&entity.position_code)]
    }

    fn defaults(&self, _patch: &Record) -> Position {
        Position::default()
    }
}
