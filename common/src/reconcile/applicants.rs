//! Applicants, keyed by utorid

use super::copy_text;
use crate::diff::{Candidate, Key, KeyValue, Reconciler};
use crate::error::Result;
use crate::normalize::Record;
use crate::types::Applicant;
use serde_json::Value;

const FIELDS: &[&str] = &["first_name", "last_name", "utorid", "email", "student_number", "phone"];

pub struct ApplicantReconciler;

impl Reconciler for ApplicantReconciler {
    type Entity = Applicant;

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

    fn entity_key(&self, entity: &Applicant) -> Key {
        vec![KeyValue::text(&entity.utorid)]
    }

    fn defaults(&self, _patch: &Record) -> Applicant {
        Applicant::default()
    }
}
