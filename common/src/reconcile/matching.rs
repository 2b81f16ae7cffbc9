//! Applicant matching data, keyed by applicant
//!
//! Hours owed and fulfilled from previous sessions, plus the appointment
//! letter template to use for the applicant.

use super::{copy_number, present, reference_text, to_value};
use crate::diff::{Candidate, Key, KeyValue, Reconciler};
use crate::error::Result;
use crate::normalize::Record;
use crate::resolve::Resolver;
use crate::types::ApplicantMatchingDatum;
use crate::value::as_text;

pub struct MatchingReconciler<'a> {
    resolver: Resolver<'a>,
}

impl<'a> MatchingReconciler<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self { resolver }
    }
}

impl Reconciler for MatchingReconciler<'_> {
    type Entity = ApplicantMatchingDatum;

    fn prepare(&self, record: &Record) -> Result<Candidate> {
        let utorid = reference_text(record, "utorid")?;
        let applicant = self.resolver.applicant(&utorid).required("Applicant", &utorid)?;

        let mut patch = Record::new();
        patch.insert("applicant".into(), to_value(applicant)?);
        for field in ["min_hours_owed", "max_hours_owed", "prev_hours_fulfilled"] {
            copy_number(record, &mut patch, field)?;
        }
        if let Some(name) = present(record, "letter_template").and_then(as_text) {
            let template = self.resolver.letter_template(&name).required("Letter template", &name)?;
            patch.insert("letter_template".into(), to_value(template)?);
        }

        Ok(Candidate {
            key: vec![KeyValue::text(&applicant.utorid)],
            patch,
        })
    }

    fn entity_key(&self, entity: &ApplicantMatchingDatum) -> Key {
        vec![KeyValue::text(&entity.applicant.utorid)]
    }

    fn defaults(&self, _patch: &Record) -> ApplicantMatchingDatum {
        ApplicantMatchingDatum::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{diff, DiffSpec, DiffStatus};
    use crate::error::Error;
    use crate::normalize::{normalize, DataFormat};
    use crate::schema::EntityKind;
    use crate::types::{Applicant, Snapshot, Template};
    use serde_json::json;

    fn snapshot() -> Snapshot {
        let applicant = Applicant { id: Some(1), utorid: "doej1".into(), ..Default::default() };
        Snapshot {
            applicants: vec![
                applicant.clone(),
                Applicant { id: Some(2), utorid: "smithj".into(), ..Default::default() },
            ],
            letter_templates: vec![Template {
                id: Some(5),
                template_name: "Standard".into(),
                ..Default::default()
            }],
            applicant_matching_data: vec![ApplicantMatchingDatum {
                id: Some(7),
                applicant,
                min_hours_owed: Some(50.0),
                max_hours_owed: Some(70.0),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn run(
        rows: serde_json::Value,
        snapshot: &Snapshot,
    ) -> Result<Vec<DiffSpec<ApplicantMatchingDatum>>> {
        let payload = DataFormat::Spreadsheet(serde_json::from_value(rows).unwrap());
        let records = normalize(&payload, EntityKind::ApplicantMatching.schema())?;
        let reconciler = MatchingReconciler::new(Resolver::new(snapshot));
        diff(&reconciler, &records, &snapshot.applicant_matching_data)
    }

    #[test]
    fn test_hours_owed_change() {
        let snapshot = snapshot();
        let diffs = run(
            json!([
                {"UTORid": "doej1", "Min Hours Owed": "50", "Max Hours Owed": 60},
                {
                    "UTORid": "smithj",
                    "Letter Template": "Standard",
                    "Previous Hours Fulfilled": 12.5
                }
            ]),
            &snapshot,
        )
        .unwrap();

        assert_eq!(diffs[0].status, DiffStatus::Modified);
        assert_eq!(diffs[0].changes.len(), 1);
        assert_eq!(diffs[0].changes["max_hours_owed"], "70 → 60");
        assert_eq!(diffs[0].obj.id, Some(7));

        assert_eq!(diffs[1].status, DiffStatus::New);
        assert_eq!(diffs[1].obj.applicant.id, Some(2));
        assert_eq!(diffs[1].obj.prev_hours_fulfilled, Some(12.5));
        assert_eq!(diffs[1].obj.letter_template.as_ref().and_then(|t| t.id), Some(5));
    }

    #[test]
    fn test_existing_datum_without_applicant_id_matches() {
        let mut snapshot = snapshot();
        snapshot.applicant_matching_data[0].applicant.id = None;
        let diffs = run(json!([{"UTORid": "doej1", "Min Hours Owed": 50}]), &snapshot).unwrap();
        assert_eq!(diffs[0].status, DiffStatus::Unchanged);
        assert_eq!(diffs[0].obj.id, Some(7));
    }

    #[test]
    fn test_unknown_applicant_is_fatal() {
        let snapshot = snapshot();
        let err = run(json!([{"UTORid": "ghost"}]), &snapshot).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { kind: "Applicant", .. }));
    }

    #[test]
    fn test_unknown_letter_template_is_fatal() {
        let snapshot = snapshot();
        let err =
            run(json!([{"UTORid": "doej1", "Letter Template": "Fancy"}]), &snapshot).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { kind: "Letter template", .. }));
    }
}
