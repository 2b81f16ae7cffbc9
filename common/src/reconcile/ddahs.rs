//! Duty allocations, keyed by (position code, applicant)
//!
//! A DDAH belongs to one assignment; the key pair must resolve to exactly
//! one existing assignment. Duties come either as an array of
//! `{order, hours, description}` objects or as a `;`-separated cell of
//! `"<hours>h <description>"` items.

use super::{present, reference_text, to_value};
use crate::diff::{Candidate, Key, KeyValue, Reconciler};
use crate::error::{Error, Result};
use crate::normalize::Record;
use crate::resolve::{split_list, Resolver};
use crate::types::{Ddah, Duty};
use crate::value::{as_number, as_text};
use regex::Regex;
use serde_json::Value;

lazy_static::lazy_static! {
    static ref DUTY_RE: Regex = Regex::new(r"^(\d+(?:\.\d+)?)\s*h?\s+(.+)$").unwrap();
}

pub struct DdahReconciler<'a> {
    resolver: Resolver<'a>,
}

impl<'a> DdahReconciler<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }
}

/// Parse the duties of one record; `order` defaults to position in the list.
pub fn parse_duties(value: &Value) -> Result<Vec<Duty>> {
    match value {
        Value::Array(items) if items.iter().all(|i| i.is_object()) => items
            .iter()
            .enumerate()
            .map(|(i, item)| duty_from_object(i, item))
            .collect(),
        Value::Array(_) | Value::String(_) => split_list(value)
            .iter()
            .enumerate()
            .map(|(i, text)| duty_from_text(i, text))
            .collect(),
        other => Err(Error::InvalidPayload(format!("duties must be a list, got {}", other))),
    }
}

fn duty_from_object(index: usize, item: &Value) -> Result<Duty> {
    let hours = item
        .get("hours")
        .and_then(as_number)
        .ok_or_else(|| Error::InvalidPayload(format!("duty {} has no hours", index + 1)))?;
    Ok(Duty {
        order: item
            .get("order")
            .and_then(as_number)
            .map(|n| n.round() as i64)
            .unwrap_or(index as i64 + 1),
        hours,
        description: item.get("description").and_then(as_text).unwrap_or_default(),
    })
}

fn duty_from_text(index: usize, text: &str) -> Result<Duty> {
    let caps = DUTY_RE
        .captures(text)
        .ok_or_else(|| Error::InvalidPayload(format!("cannot read duty '{}'", text)))?;
    let hours = caps[1]
        .parse::<f64>()
        .map_err(|_| Error::InvalidPayload(format!("cannot read duty '{}'", text)))?;
    Ok(Duty {
        order: index as i64 + 1,
        hours,
        description: caps[2].trim().to_string(),
    })
}

impl Reconciler for DdahReconciler<'_> {
    type Entity = Ddah;

    fn prepare(&self, record: &Record) -> Result<Candidate> {
        let position_code = reference_text(record, "position_code")?;
        let utorid = reference_text(record, "applicant")?;
        let assignment = self
            .resolver
            .assignment(&utorid, &position_code)
            .required("Assignment", &format!("{} / {}", position_code, utorid))?;

        let mut patch = Record::new();
        patch.insert("assignment".into(), to_value(assignment)?);
        if let Some(duties) = present(record, "duties") {
            patch.insert("duties".into(), to_value(&parse_duties(duties)?)?);
        }

        Ok(Candidate {
            key: vec![
                KeyValue::text(&assignment.position.position_code),
                KeyValue::text(&assignment.applicant.utorid),
            ],
            patch,
        })
    }

    fn entity_key(&self, entity: &Ddah) -> Key {
        vec![
            KeyValue::text(&entity.assignment.position.position_code),
            KeyValue::text(&entity.assignment.applicant.utorid),
        ]
    }

    fn defaults(&self, _patch: &Record) -> Ddah {
        Ddah::default()
    }
}
