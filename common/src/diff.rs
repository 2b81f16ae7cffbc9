//! Diff engine
//!
//! Classifies each normalized record against the existing collection as
//! new, modified or unchanged. Entity-specific rules (how keys and
//! references resolve, what a record looks like in full-entity shape) come
//! from a [`Reconciler`]; the matching, comparison and merging live here.
//!
//! Fields a record does not mention are never touched: a modified entity is
//! the existing one with only the changed fields overwritten.

use crate::error::Result;
use crate::normalize::Record;
use crate::value::{as_number, as_text, is_blank, parse_date_str};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One normalized component of a primary key
#[derive(Debug, Clone)]
pub enum KeyValue {
    Number(f64),
    Text(String),
    Null,
}

impl KeyValue {
    /// Normalize a key component: trimmed text, numeric strings as numbers.
    pub fn from_value(value: &Value) -> Self {
        if is_blank(Some(value)) {
            return KeyValue::Null;
        }
        if let Some(n) = as_number(value) {
            return KeyValue::Number(n);
        }
        match as_text(value) {
            Some(text) => KeyValue::Text(text),
            None => KeyValue::Text(value.to_string()),
        }
    }

    pub fn text(s: &str) -> Self {
        Self::from_value(&Value::String(s.to_string()))
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KeyValue::Number(a), KeyValue::Number(b)) => a == b,
            (KeyValue::Text(a), KeyValue::Text(b)) => a == b,
            (KeyValue::Null, KeyValue::Null) => true,
            _ => false,
        }
    }
}

pub type Key = Vec<KeyValue>;

/// A record prepared for diffing
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Primary key, with references already resolved
    pub key: Key,
    /// The record's fields in full-entity shape; only fields it mentions
    pub patch: Record,
}

/// Entity-specific rules plugged into [`diff`]
pub trait Reconciler {
    type Entity: Serialize + DeserializeOwned + Clone;

    /// Resolve references and build the key and full-shape patch of one record.
    fn prepare(&self, record: &Record) -> Result<Candidate>;

    /// Primary key of an existing entity, comparable with [`Candidate::key`]
    fn entity_key(&self, entity: &Self::Entity) -> Key;

    /// Base entity a new record is merged onto.
    fn defaults(&self, _patch: &Record) -> Self::Entity;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    New,
    Modified,
    Unchanged,
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffStatus::New => write!(f, "new"),
            DiffStatus::Modified => write!(f, "modified"),
            DiffStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Classification of one imported record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffSpec<E> {
    pub status: DiffStatus,
    /// Merged candidate in full-entity shape
    pub obj: E,
    /// Field → "old → new", only for modified records
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub changes: BTreeMap<String, String>,
}

impl<E: Serialize> DiffSpec<E> {
    /// Same diff with the entity as a JSON value
    pub fn into_value(self) -> Result<DiffSpec<Value>> {
        Ok(DiffSpec {
            status: self.status,
            obj: serde_json::to_value(self.obj)?,
            changes: self.changes,
        })
    }
}

/// Counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub new: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    pub fn of<E>(diffs: &[DiffSpec<E>]) -> Self {
        let mut summary = Self::default();
        for d in diffs {
            match d.status {
                DiffStatus::New => summary.new += 1,
                DiffStatus::Modified => summary.modified += 1,
                DiffStatus::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }
}

/// Diff normalized records against the existing collection.
///
/// # Arguments
/// * `reconciler` - entity rules, holding whatever reference collections it needs
/// * `candidates` - output of the normalizer
/// * `existing` - currently loaded entities (read-only snapshot)
///
/// # Returns
/// One [`DiffSpec`] per candidate, in input order. Errors come from
/// required references that do not resolve.
pub fn diff<R: Reconciler>(
    reconciler: &R,
    candidates: &[Record],
    existing: &[R::Entity],
) -> Result<Vec<DiffSpec<R::Entity>>> {
    let keyed: Vec<(Key, &R::Entity)> = existing
        .iter()
        .map(|entity| (reconciler.entity_key(entity), entity))
        .collect();

    let mut diffs = Vec::with_capacity(candidates.len());
    for (row, record) in candidates.iter().enumerate() {
        let Candidate { key, patch } = reconciler.prepare(record)?;

        let mut matches = keyed.iter().filter(|(k, _)| *k == key).map(|(_, e)| *e);
        let spec = match matches.next() {
            None => {
                let base = reconciler.defaults(&patch);
                DiffSpec {
                    status: DiffStatus::New,
                    obj: overlay(&base, &patch)?,
                    changes: BTreeMap::new(),
                }
            }
            Some(current) => {
                let duplicates = matches.count();
                if duplicates > 0 {
                    tracing::warn!(
                        "Row {} matches {} existing records with the same key; using the first",
                        row,
                        duplicates + 1
                    );
                }
                compare(current, &patch)?
            }
        };
        diffs.push(spec);
    }

    let summary = DiffSummary::of(&diffs);
    tracing::debug!(
        "Diff: {} new, {} modified, {} unchanged",
        summary.new,
        summary.modified,
        summary.unchanged
    );
    Ok(diffs)
}

fn compare<E>(current: &E, patch: &Record) -> Result<DiffSpec<E>>
where
    E: Serialize + DeserializeOwned + Clone,
{
    let existing = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        _ => Record::new(),
    };

    let mut changed = Record::new();
    let mut changes = BTreeMap::new();
    for (field, incoming) in patch {
        let old = existing.get(field).unwrap_or(&Value::Null);
        if !equivalent(old, incoming) {
            changes.insert(field.clone(), format!("{} → {}", describe(old), describe(incoming)));
            changed.insert(field.clone(), incoming.clone());
        }
    }

    if changes.is_empty() {
        Ok(DiffSpec {
            status: DiffStatus::Unchanged,
            obj: current.clone(),
            changes,
        })
    } else {
        Ok(DiffSpec {
            status: DiffStatus::Modified,
            obj: overlay(current, &changed)?,
            changes,
        })
    }
}

/// Shallow-merge `patch` over `base`.
fn overlay<E: Serialize + DeserializeOwned>(base: &E, patch: &Record) -> Result<E> {
    let mut value = serde_json::to_value(base)?;
    if let Value::Object(map) = &mut value {
        for (field, v) in patch {
            map.insert(field.clone(), v.clone());
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Loose equality used for field comparison.
///
/// Null, absent and blank are equal; numbers compare by value (numeric
/// strings included); strings compare trimmed, or by canonical date when
/// both are dates; saved entities compare by id; arrays element-wise.
pub fn equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Array(items)) | (Value::Array(items), Value::Null) => items.is_empty(),
        _ if is_blank(Some(a)) || is_blank(Some(b)) => is_blank(Some(a)) && is_blank(Some(b)),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| equivalent(p, q))
        }
        (Value::Object(x), Value::Object(y)) => match (x.get("id"), y.get("id")) {
            (Some(i), Some(j)) if !i.is_null() && !j.is_null() => equivalent(i, j),
            _ => x
                .keys()
                .chain(y.keys())
                .filter(|k| k.as_str() != "id")
                .all(|k| {
                    equivalent(x.get(k).unwrap_or(&Value::Null), y.get(k).unwrap_or(&Value::Null))
                }),
        },
        _ => {
            if let (Some(m), Some(n)) = (as_number(a), as_number(b)) {
                return m == n;
            }
            match (a, b) {
                (Value::String(s), Value::String(t)) => {
                    let (s, t) = (s.trim(), t.trim());
                    if s == t {
                        return true;
                    }
                    match (parse_date_str(s), parse_date_str(t)) {
                        (Ok(d1), Ok(d2)) => d1 == d2,
                        _ => false,
                    }
                }
                _ => a == b,
            }
        }
    }
}

/// Human-readable rendering of a field value for change descriptions.
pub fn describe(value: &Value) -> String {
    match value {
        v if is_blank(Some(v)) => "(empty)".to_string(),
        Value::Array(items) if items.is_empty() => "(empty)".to_string(),
        Value::Array(items) => items.iter().map(describe).collect::<Vec<_>>().join("; "),
        Value::Object(map) => describe_entity(map),
        other => as_text(other).unwrap_or_else(|| other.to_string()),
    }
}

fn describe_entity(map: &Record) -> String {
    let text = |field: &str| map.get(field).and_then(as_text).filter(|s| !s.is_empty());

    if let Some(code) = text("position_code") {
        // posting positions also carry their hours and head count
        if map.contains_key("num_positions") {
            let details: Vec<String> = [
                map.get("hours").and_then(as_number).map(|h| format!("{}h", fmt_number(h))),
                map.get("num_positions")
                    .and_then(as_number)
                    .map(|n| format!("×{}", fmt_number(n))),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !details.is_empty() {
                return format!("{} ({})", code, details.join(" "));
            }
        }
        return code;
    }
    if let (Some(last), Some(first)) = (text("last_name"), text("first_name")) {
        return format!("{}, {}", last, first);
    }
    if let Some(id) = text("utorid").or_else(|| text("template_name")).or_else(|| text("name")) {
        return id;
    }
    if let Some(description) = text("description") {
        return match map.get("hours").and_then(as_number) {
            Some(hours) => format!("{}h {}", fmt_number(hours), description),
            None => description,
        };
    }
    Value::Object(map.clone()).to_string()
}

fn fmt_number(n: f64) -> String {
    as_text(&Value::from(n)).unwrap_or_default()
}

/// The entities that need a write: new and modified, in order.
pub fn get_changed<E: Clone>(diffs: &[DiffSpec<E>]) -> Vec<E> {
    diffs
        .iter()
        .filter(|d| d.status != DiffStatus::Unchanged)
        .map(|d| d.obj.clone())
        .collect()
}
