//! Postings, keyed by name
//!
//! `posting_positions` lists the positions a posting advertises, either as
//! objects `{position_code, hours, num_positions}` or as a `;`-separated
//! string of codes. Entries naming an unknown position are dropped. An entry
//! that leaves `hours` or `num_positions` out keeps the value the existing
//! posting has for that position.

use super::{copy_text, present, to_value};
use crate::diff::{Candidate, Key, KeyValue, Reconciler};
use crate::error::Result;
use crate::normalize::Record;
use crate::resolve::{split_list, Resolution, Resolver};
use crate::types::{Posting, PostingPosition};
use crate::value::{as_number, as_text};
use serde_json::Value;

pub struct PostingReconciler<'a> {
    resolver: Resolver<'a>,
}

impl<'a> PostingReconciler<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }

    fn posting_positions(&self, value: &Value, existing: Option<&Posting>) -> Vec<PostingPosition> {
        let entries: Vec<(String, Option<&Value>)> = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(_) => match item.get("position_code").and_then(as_text) {
                        Some(code) if !code.is_empty() => Some((code, Some(item))),
                        _ => {
                            tracing::warn!(
                                "Dropping posting position without a position_code: {}",
                                item
                            );
                            None
                        }
                    },
                    Value::String(code) if code.trim().is_empty() => None,
                    other => match as_text(other) {
                        Some(code) => Some((code, None)),
                        None => {
                            tracing::warn!("Dropping posting position entry {}", other);
                            None
                        }
                    },
                })
                .collect(),
            other => split_list(other).into_iter().map(|code| (code, None)).collect(),
        };

        entries
            .into_iter()
            .filter_map(|(code, item)| match self.resolver.position(&code) {
                Resolution::Found(position) => {
                    let field = |name: &str| item.and_then(|i| i.get(name)).and_then(as_number);
                    let current = existing.and_then(|posting| {
                        posting
                            .posting_positions
                            .iter()
                            .find(|pp| pp.position_code.trim() == position.position_code.trim())
                    });
                    Some(PostingPosition {
                        position_id: position.id,
                        position_code: position.position_code.clone(),
                        hours: field("hours").or_else(|| current.and_then(|pp| pp.hours)),
                        num_positions: field("num_positions")
                            .map(|n| n.round() as i64)
                            .or_else(|| current.and_then(|pp| pp.num_positions)),
                    })
                }
                Resolution::NotFound => {
                    tracing::warn!("Dropping unknown posting position '{}'", code);
                    None
                }
                Resolution::Ambiguous(n) => {
                    tracing::warn!(
                        "Dropping ambiguous posting position '{}' ({} matches)",
                        code,
                        n
                    );
                    None
                }
            })
            .collect()
    }
}

impl Reconciler for PostingReconciler<'_> {
    type Entity = Posting;

    fn prepare(&self, record: &Record) -> Result<Candidate> {
        let mut patch = Record::new();
        for field in ["name", "intro_text", "open_date", "close_date", "availability"] {
            copy_text(record, &mut patch, field);
        }
        if let Some(value) = present(record, "posting_positions") {
            let existing = record
                .get("name")
                .and_then(as_text)
                .and_then(|name| self.resolver.posting(&name).found());
            let positions = self.posting_positions(value, existing);
            patch.insert("posting_positions".into(), to_value(&positions)?);
        }

        Ok(Candidate {
            key: vec![KeyValue::from_value(record.get("name").unwrap_or(&Value::Null))],
            patch,
        })
    }

    fn entity_key(&self, entity: &Posting) -> Key {
        vec![KeyValue::text(&entity.name)]
    }

    fn defaults(&self, _patch: &Record) -> Posting {
        Posting {
            availability: "auto".to_string(),
            ..Default::default()
        }
    }
}
