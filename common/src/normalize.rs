//! Row normalizer
//!
//! Turns a raw import payload into canonical "minimal" records for one
//! entity kind.
//!
//! ## Flow
//! 1. JSON: unwrap the named collection, project onto the schema keys
//!    Spreadsheet: match headers, coerce cells
//! 2. Parse every date column
//! 3. Check required fields (nothing is returned unless every row passes)

use crate::alias::{match_header, unrecognized_headers, HeaderMatch};
use crate::error::{Error, MissingField, Result};
use crate::schema::NormalizationSchema;
use crate::value::{coerce, is_blank, parse_date};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A canonical, possibly partial record: schema keys only
pub type Record = Map<String, Value>;

/// Raw import payload, as produced by the file decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fileType", content = "data", rename_all = "lowercase")]
pub enum DataFormat {
    /// Decoded JSON export, either a bare array or `{ <baseName>: [...] }`
    Json(Value),
    /// Rows keyed by the original header text
    Spreadsheet(Vec<Record>),
}

/// Normalization options
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Report spreadsheet headers that match no field
    pub log_unrecognized_headers: bool,
    /// Report every missing required field instead of the first one
    pub collect_all_missing: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            log_unrecognized_headers: true,
            collect_all_missing: false,
        }
    }
}

/// Normalize a payload with default options.
pub fn normalize(payload: &DataFormat, schema: &NormalizationSchema) -> Result<Vec<Record>> {
    normalize_with(payload, schema, &NormalizeOptions::default())
}

/// Normalize a payload.
///
/// # Arguments
/// * `payload` - decoded JSON or spreadsheet rows
/// * `schema` - schema of the entity kind being imported
/// * `options` - logging and validation options
///
/// # Returns
/// * `Ok(Vec<Record>)` - every row normalized and validated
/// * `Err` - an inconsistent schema, or the first date or required-field
///   failure; no partial batch is returned
pub fn normalize_with(
    payload: &DataFormat,
    schema: &NormalizationSchema,
    options: &NormalizeOptions,
) -> Result<Vec<Record>> {
    schema.validate()?;
    let mut records = match payload {
        DataFormat::Json(data) => normalize_json(data, schema)?,
        DataFormat::Spreadsheet(rows) => normalize_spreadsheet(rows, schema, options),
    };

    for record in &mut records {
        parse_date_columns(record, schema)?;
    }

    if options.collect_all_missing {
        let missing = missing_required(&records, schema);
        if !missing.is_empty() {
            return Err(Error::MissingRequiredFields(missing));
        }
    } else {
        validate_required(&records, schema)?;
    }

    tracing::debug!("Normalized {} {} record(s)", records.len(), schema.base_name);
    Ok(records)
}

fn normalize_json(data: &Value, schema: &NormalizationSchema) -> Result<Vec<Record>> {
    let data = match data {
        Value::Object(map) if map.contains_key(&schema.base_name) => &map[&schema.base_name],
        other => other,
    };

    match data {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(obj) => Ok(project(obj, schema)),
                other => Err(Error::InvalidPayload(format!(
                    "{} entry {} is not an object: {}",
                    schema.base_name, i, other
                ))),
            })
            .collect(),
        Value::Object(obj) => Ok(vec![project(obj, schema)]),
        other => Err(Error::InvalidPayload(format!(
            "expected a list of {} but found {}",
            schema.base_name, other
        ))),
    }
}

/// Keep only schema keys, in schema order.
fn project(obj: &Map<String, Value>, schema: &NormalizationSchema) -> Record {
    schema
        .keys
        .iter()
        .filter_map(|key| obj.get(key).map(|v| (key.clone(), v.clone())))
        .collect()
}

fn normalize_spreadsheet(
    rows: &[Record],
    schema: &NormalizationSchema,
    options: &NormalizeOptions,
) -> Vec<Record> {
    let records: Vec<Record> = rows
        .iter()
        .map(|row| {
            let mut record = Record::new();
            let mut exact = BTreeSet::new();
            for (header, cell) in row {
                let Some(matched) = match_header(header, schema) else {
                    continue;
                };
                let key = matched.key();
                match matched {
                    HeaderMatch::Exact(_) => {
                        record.insert(key.to_string(), coerce(cell));
                        exact.insert(key);
                    }
                    // a canonical header wins over any synonym for the same field
                    HeaderMatch::Synonym(_) => {
                        if !exact.contains(key) && !record.contains_key(key) {
                            record.insert(key.to_string(), coerce(cell));
                        }
                    }
                }
            }
            reorder(record, schema)
        })
        .collect();

    if options.log_unrecognized_headers {
        let headers = rows.iter().flat_map(|row| row.keys().map(String::as_str));
        let unrecognized = unrecognized_headers(headers, schema);
        if !unrecognized.is_empty() {
            tracing::warn!(
                "Ignoring unrecognized {} column(s): {}",
                schema.base_name,
                unrecognized.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
    }

    records
}

fn reorder(mut record: Record, schema: &NormalizationSchema) -> Record {
    schema
        .keys
        .iter()
        .filter_map(|key| record.remove(key).map(|v| (key.clone(), v)))
        .collect()
}

fn parse_date_columns(record: &mut Record, schema: &NormalizationSchema) -> Result<()> {
    for column in &schema.date_columns {
        let Some(value) = record.get_mut(column) else {
            continue;
        };
        if is_blank(Some(&*value)) {
            *value = Value::Null;
        } else {
            *value = Value::String(parse_date(value)?);
        }
    }
    Ok(())
}

/// Fail on the first record with a blank required field.
pub fn validate_required(records: &[Record], schema: &NormalizationSchema) -> Result<()> {
    for (row, record) in records.iter().enumerate() {
        for field in &schema.required_keys {
            if is_blank(record.get(field)) {
                return Err(Error::MissingRequiredField { row, field: field.clone() });
            }
        }
    }
    Ok(())
}

/// Every blank required field, in row order.
pub fn missing_required(records: &[Record], schema: &NormalizationSchema) -> Vec<MissingField> {
    records
        .iter()
        .enumerate()
        .flat_map(|(row, record)| {
            schema
                .required_keys
                .iter()
                .filter(move |field| is_blank(record.get(field.as_str())))
                .map(move |field| MissingField { row, field: field.clone() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntityKind;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_spreadsheet_instructor_row() {
        let payload = DataFormat::Spreadsheet(rows(json!([
            {"Given Name": "Jane", "Last Name": "Doe", "UTORid": "doej1"}
        ])));
        let records = normalize(&payload, EntityKind::Instructors.schema()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            Value::Object(records[0].clone()),
            json!({"first_name": "Jane", "last_name": "Doe", "utorid": "doej1"})
        );
    }

    #[test]
    fn test_spreadsheet_ignores_unknown_columns_and_coerces() {
        let payload = DataFormat::Spreadsheet(rows(json!([
            {"UTORid": "smithj", "Course Code": "CSC100H1S", "Hours": "70", "Notes": "keep?"}
        ])));
        let records = normalize(&payload, EntityKind::Assignments.schema()).unwrap();
        assert_eq!(records[0].get("hours"), Some(&json!(70)));
        assert!(records[0].get("Notes").is_none());
        // schema order
        let keys: Vec<_> = records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["utorid", "position_code", "hours"]);
    }

    #[test]
    fn test_exact_header_beats_synonym() {
        let payload = DataFormat::Spreadsheet(rows(json!([
            {"Email": "synonym@x.com", "email": "exact@x.com", "utorid": "a1"}
        ])));
        let records = normalize(&payload, EntityKind::Applicants.schema()).unwrap();
        assert_eq!(records[0].get("email"), Some(&json!("exact@x.com")));
    }

    #[test]
    fn test_leftmost_synonym_column_wins() {
        let payload = DataFormat::Spreadsheet(rows(json!([
            {
                "UTORid": "a1",
                "Course Code": "CSC100",
                "Start Date": "2021-01-01",
                "Contract Start": "2021-09-01"
            }
        ])));
        let records = normalize(&payload, EntityKind::Assignments.schema()).unwrap();
        assert_eq!(records[0]["contract_start"], json!("2021-01-01T00:00:00.000Z"));
        let keys: Vec<_> = records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["utorid", "position_code", "contract_start"]);
    }

    #[test]
    fn test_json_named_collection_and_bare_array() {
        let schema = EntityKind::Applicants.schema();
        let wrapped = DataFormat::Json(json!({
            "applicants": [{"utorid": "doej1", "email": "a@x.com", "program": "MSc"}]
        }));
        let bare =
            DataFormat::Json(json!([{"utorid": "doej1", "email": "a@x.com", "program": "MSc"}]));

        let a = normalize(&wrapped, schema).unwrap();
        let b = normalize(&bare, schema).unwrap();
        assert_eq!(a, b);
        assert!(a[0].get("program").is_none());
    }

    #[test]
    fn test_json_values_are_not_coerced() {
        let records = normalize(
            &DataFormat::Json(json!([{"utorid": "u1", "student_number": "0012345"}])),
            EntityKind::Applicants.schema(),
        )
        .unwrap();
        assert_eq!(records[0].get("student_number"), Some(&json!("0012345")));
    }

    #[test]
    fn test_json_rejects_scalar_payload() {
        let payload = DataFormat::Json(json!("nope"));
        let err = normalize(&payload, EntityKind::Applicants.schema()).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
    }

    #[test]
    fn test_date_columns_parsed() {
        let payload = DataFormat::Spreadsheet(rows(json!([
            {
                "Position Code": "CSC100",
                "Contract Template": "Standard",
                "Start Date": 44197,
                "End Date": "April 30, 2021"
            }
        ])));
        let records = normalize(&payload, EntityKind::Positions.schema()).unwrap();
        assert_eq!(records[0]["start_date"], json!("2021-01-01T00:00:00.000Z"));
        assert_eq!(records[0]["end_date"], json!("2021-04-30T00:00:00.000Z"));
    }

    #[test]
    fn test_blank_date_becomes_null() {
        let payload = DataFormat::Json(json!([
            {"position_code": "CSC100", "contract_template": "Standard", "start_date": ""}
        ]));
        let records = normalize(&payload, EntityKind::Positions.schema()).unwrap();
        assert_eq!(records[0]["start_date"], Value::Null);
    }

    #[test]
    fn test_bad_date_aborts_batch() {
        let payload = DataFormat::Json(json!([
            {
                "position_code": "CSC100",
                "contract_template": "Standard",
                "start_date": "2021-01-01"
            },
            {"position_code": "CSC200", "contract_template": "Standard", "start_date": "soon"}
        ]));
        let err = normalize(&payload, EntityKind::Positions.schema()).unwrap_err();
        assert!(matches!(err, Error::DateParse { ref value } if value == "soon"));
    }

    #[test]
    fn test_missing_required_reports_first() {
        let payload = DataFormat::Json(json!([
            {"utorid": "ok1"},
            {"email": "no-utorid@x.com"},
            {"utorid": "  "}
        ]));
        let err = normalize(&payload, EntityKind::Applicants.schema()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredField { row: 1, ref field } if field == "utorid"
        ));
    }

    #[test]
    fn test_missing_required_accumulates() {
        let payload = DataFormat::Json(json!([
            {"utorid": "ok1"},
            {"email": "no-utorid@x.com"},
            {"utorid": "  "}
        ]));
        let options = NormalizeOptions { collect_all_missing: true, ..Default::default() };
        match normalize_with(&payload, EntityKind::Applicants.schema(), &options) {
            Err(Error::MissingRequiredFields(missing)) => {
                assert_eq!(missing.iter().map(|m| m.row).collect::<Vec<_>>(), vec![1, 2]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_inconsistent_schema_rejected() {
        let schema: NormalizationSchema = serde_json::from_value(json!({
            "keys": ["name"],
            "keyMap": {"Title": "title"},
            "requiredKeys": ["name"],
            "primaryKey": "name",
            "dateColumns": [],
            "baseName": "things"
        }))
        .unwrap();
        let payload = DataFormat::Json(json!([{"name": "x"}]));
        let err = normalize(&payload, &schema).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn test_data_format_tagging() {
        let payload: DataFormat = serde_json::from_value(json!({
            "fileType": "spreadsheet",
            "data": [{"UTORid": "doej1"}]
        }))
        .unwrap();
        assert!(matches!(payload, DataFormat::Spreadsheet(ref rows) if rows.len() == 1));
    }
}
