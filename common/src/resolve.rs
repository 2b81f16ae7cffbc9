//! Reference resolver
//!
//! Import files name related records by human-readable identifiers: an
//! applicant by utorid, a position by code, an instructor by "Last, First",
//! a template by name. The resolver looks them up in the loaded snapshot.
//! Whether a miss is fatal is left to the caller.

use crate::error::{Error, Result};
use crate::types::{Applicant, Assignment, Instructor, Position, Posting, Snapshot, Template};
use crate::value::as_text;
use serde_json::Value;

/// Separator for list-valued references in a single cell
pub const LIST_SEPARATOR: char = ';';

/// Outcome of resolving one reference
#[derive(Debug, PartialEq)]
pub enum Resolution<'a, T> {
    Found(&'a T),
    NotFound,
    Ambiguous(usize),
}

impl<'a, T> Resolution<'a, T> {
    /// The match, or `None` when missing or ambiguous
    pub fn found(self) -> Option<&'a T> {
        match self {
            Resolution::Found(item) => Some(item),
            _ => None,
        }
    }

    /// Treat anything but a unique match as an error.
    pub fn required(self, kind: &'static str, reference: &str) -> Result<&'a T> {
        match self {
            Resolution::Found(item) => Ok(item),
            Resolution::NotFound => Err(Error::UnresolvedReference {
                kind,
                reference: reference.to_string(),
            }),
            Resolution::Ambiguous(matches) => Err(Error::AmbiguousReference {
                kind,
                reference: reference.to_string(),
                matches,
            }),
        }
    }
}

/// Pick the single item satisfying `pred`.
pub fn resolve_unique<'a, T>(items: &'a [T], pred: impl Fn(&T) -> bool) -> Resolution<'a, T> {
    let mut matches = items.iter().filter(|item| pred(item));
    match (matches.next(), matches.count()) {
        (None, _) => Resolution::NotFound,
        (Some(item), 0) => Resolution::Found(item),
        (Some(_), rest) => Resolution::Ambiguous(rest + 1),
    }
}

/// Case- and whitespace-insensitive form of a person's name
fn normalize_name(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Split a list-valued reference: an array of strings, or one `;`-separated string.
pub fn split_list(value: &Value) -> Vec<String> {
    let items: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        other => as_text(other)
            .map(|s| s.split(LIST_SEPARATOR).map(|part| part.to_string()).collect())
            .unwrap_or_default(),
    };
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A template by name, falling back to its file name.
fn resolve_template<'a>(templates: &'a [Template], reference: &str) -> Resolution<'a, Template> {
    let reference = reference.trim();
    match resolve_unique(templates, |t| t.template_name.trim() == reference) {
        Resolution::NotFound => resolve_unique(templates, |t| t.template_file.trim() == reference),
        resolved => resolved,
    }
}

/// Resolves references against one snapshot
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn applicant(&self, utorid: &str) -> Resolution<'a, Applicant> {
        let utorid = utorid.trim();
        resolve_unique(&self.snapshot.applicants, |a| a.utorid.trim() == utorid)
    }

    pub fn position(&self, position_code: &str) -> Resolution<'a, Position> {
        let code = position_code.trim();
        resolve_unique(&self.snapshot.positions, |p| p.position_code.trim() == code)
    }

    pub fn posting(&self, name: &str) -> Resolution<'a, Posting> {
        let name = name.trim();
        resolve_unique(&self.snapshot.postings, |p| p.name.trim() == name)
    }

    /// Resolve "Last, First"; a reference without a comma is tried as a utorid.
    pub fn instructor(&self, reference: &str) -> Resolution<'a, Instructor> {
        match reference.split_once(',') {
            Some((last, first)) => {
                let (last, first) = (normalize_name(last), normalize_name(first));
                resolve_unique(&self.snapshot.instructors, |i| {
                    normalize_name(&i.last_name) == last && normalize_name(&i.first_name) == first
                })
            }
            None => {
                let utorid = reference.trim();
                resolve_unique(&self.snapshot.instructors, |i| i.utorid.trim() == utorid)
            }
        }
    }

    /// Resolve every instructor in a list reference, dropping the ones that fail.
    pub fn instructors(&self, value: &Value) -> Vec<Instructor> {
        split_list(value)
            .iter()
            .filter_map(|name| match self.instructor(name) {
                Resolution::Found(instructor) => Some(instructor.clone()),
                Resolution::NotFound => {
                    tracing::warn!("Dropping unknown instructor '{}'", name);
                    None
                }
                Resolution::Ambiguous(n) => {
                    tracing::warn!("Dropping ambiguous instructor '{}' ({} matches)", name, n);
                    None
                }
            })
            .collect()
    }

    pub fn contract_template(&self, reference: &str) -> Resolution<'a, Template> {
        resolve_template(&self.snapshot.contract_templates, reference)
    }

    pub fn letter_template(&self, reference: &str) -> Resolution<'a, Template> {
        resolve_template(&self.snapshot.letter_templates, reference)
    }

    /// The assignment of `utorid` to `position_code`
    pub fn assignment(&self, utorid: &str, position_code: &str) -> Resolution<'a, Assignment> {
        let (utorid, code) = (utorid.trim(), position_code.trim());
        resolve_unique(&self.snapshot.assignments, |a| {
            a.applicant.utorid.trim() == utorid && a.position.position_code.trim() == code
        })
    }
}
