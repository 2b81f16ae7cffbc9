//! Instructors, keyed by utorid

use super::copy_text;
use crate::diff::{Candidate, Key, KeyValue, Reconciler};
use crate::error::Result;
use crate::normalize::Record;
use crate::types::Instructor;
use serde_json::Value;

const FIELDS: &[&str] = &["first_name", "last_name", "utorid", "email"];

pub struct InstructorReconciler;

impl Reconciler for InstructorReconciler {
    type Entity = Instructor;

    fn prepare(&self, record: &Record) -> Result<Candidate> {
        let mut patch = Record::new();
        for field in FIELDS {
            copy_text(record, &mut patch, field);
        }
        Ok(Candidate {
            key: vec![KeyValue::from_value(record.get("utorid").unwrap_or(&Value::Null))],
            patch,
        })
    }

    fn entity_key(&self, entity: &Instructor) -> Key {
        vec![KeyValue::text(&entity.utorid)]
    }

    fn defaults(&self, _patch: &Record) -> Instructor {
        Instructor::default()
    }
}
