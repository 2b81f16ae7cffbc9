//! End-to-end: decode → normalize → diff → changed entities

use rust_xlsxwriter::Workbook;
use serde_json::json;
use tapp_import::error::ImportError;
use tapp_import::pipeline;
use tapp_import_common::types::{Applicant, Assignment, Instructor, Position, Template};
use tapp_import_common::{
    get_changed, AliasConfig, DiffStatus, EntityKind, Error, NormalizeOptions, Snapshot,
};
use tempfile::tempdir;

fn standard() -> Template {
    Template { id: Some(3), template_name: "Standard".into(), ..Default::default() }
}

fn snapshot() -> Snapshot {
    let applicant = Applicant {
        id: Some(1),
        utorid: "doej1".into(),
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        ..Default::default()
    };
    let position = Position {
        id: Some(10),
        position_code: "CSC100".into(),
        hours_per_assignment: 70.0,
        contract_template: Some(standard()),
        ..Default::default()
    };
    Snapshot {
        instructors: vec![Instructor {
            id: Some(5),
            first_name: "John".into(),
            last_name: "Smith".into(),
            utorid: "smithj".into(),
            ..Default::default()
        }],
        applicants: vec![
            applicant.clone(),
            Applicant { id: Some(2), utorid: "leea1".into(), ..Default::default() },
        ],
        positions: vec![position.clone()],
        assignments: vec![Assignment {
            id: Some(20),
            applicant,
            position,
            hours: 70.0,
            ..Default::default()
        }],
        contract_templates: vec![standard()],
        ..Default::default()
    }
}

/// Workbook assignments: one changed, one new
#[test]
fn test_spreadsheet_assignments_preview() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("assignments.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["UTORid", "Course Code", "Hours", "Notes"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "doej1").unwrap();
    sheet.write_string(1, 1, "CSC100").unwrap();
    sheet.write_number(1, 2, 60).unwrap();
    sheet.write_string(2, 0, "leea1").unwrap();
    sheet.write_string(2, 1, "CSC100").unwrap();
    sheet.write_string(2, 3, "new hire").unwrap();
    workbook.save(&path).unwrap();

    let snapshot = snapshot();
    let diffs = pipeline::preview_file(
        EntityKind::Assignments,
        &path,
        &snapshot,
        None,
        &NormalizeOptions::default(),
    )
    .unwrap();

    assert_eq!(diffs.len(), 2);
    assert_eq!(diffs[0].status, DiffStatus::Modified);
    assert_eq!(diffs[0].changes["hours"], "70 → 60");
    assert_eq!(diffs[0].obj["id"], 20);
    assert_eq!(diffs[1].status, DiffStatus::New);
    assert_eq!(diffs[1].obj["hours"], json!(70.0));

    let changed = get_changed(&diffs);
    assert_eq!(changed.len(), 2);
    assert_eq!(changed[1]["applicant"]["utorid"], "leea1");
}

/// JSON positions with an unknown instructor in the list
#[test]
fn test_json_positions_unchanged_and_new() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("positions.json");
    std::fs::write(
        &path,
        json!({
            "positions": [
                {
                    "position_code": "CSC100",
                    "contract_template": "Standard",
                    "hours_per_assignment": "70"
                },
                {
                    "position_code": "CSC200",
                    "contract_template": "Standard",
                    "instructors": "Smith, John; Nobody, Here",
                    "start_date": "Sep 8, 2021"
                }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let snapshot = snapshot();
    let options = NormalizeOptions::default();
    let diffs =
        pipeline::preview_file(EntityKind::Positions, &path, &snapshot, None, &options).unwrap();

    assert_eq!(diffs[0].status, DiffStatus::Unchanged);
    assert_eq!(diffs[1].status, DiffStatus::New);
    assert_eq!(diffs[1].obj["instructors"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(diffs[1].obj["start_date"], "2021-09-08T00:00:00.000Z");
    assert_eq!(get_changed(&diffs).len(), 1);
}

/// Extra header synonyms from an alias file
#[test]
fn test_custom_aliases_map_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("applicants.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Student ID").unwrap();
    sheet.write_string(0, 1, "Mail").unwrap();
    sheet.write_string(1, 0, "doej1").unwrap();
    sheet.write_string(1, 1, "jane@x.com").unwrap();
    workbook.save(&path).unwrap();

    let aliases_path = dir.path().join("aliases.json");
    std::fs::write(&aliases_path, r#"{"Student ID": "utorid", "Mail": "email"}"#).unwrap();
    let aliases: AliasConfig = pipeline::load_aliases(&aliases_path).unwrap();

    let options = NormalizeOptions::default();
    let records =
        pipeline::normalize_file(EntityKind::Applicants, &path, Some(&aliases), &options).unwrap();
    assert_eq!(
        serde_json::Value::Object(records[0].clone()),
        json!({"utorid": "doej1", "email": "jane@x.com"})
    );

    // without the aliases the required utorid column is not found
    let err = pipeline::normalize_file(EntityKind::Applicants, &path, None, &options).unwrap_err();
    assert!(matches!(err, ImportError::Import(Error::MissingRequiredField { row: 0, .. })));
}

/// An assignment for an unknown applicant stops the preview
#[test]
fn test_unknown_reference_surfaces_as_import_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("assignments.json");
    std::fs::write(&path, r#"[{"utorid": "ghost", "position_code": "CSC100"}]"#).unwrap();

    let err = pipeline::preview_file(
        EntityKind::Assignments,
        &path,
        &snapshot(),
        None,
        &NormalizeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ImportError::Import(Error::UnresolvedReference { kind: "Applicant", .. })
    ));
    let expected = Error::UnresolvedReference { kind: "Applicant", reference: "ghost".into() };
    assert_eq!(err.to_string(), expected.to_string());
}

/// Every blank required field is reported when asked
#[test]
fn test_missing_required_reported_for_every_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("instructors.json");
    std::fs::write(&path, r#"[{"email": "a@x.com"}, {"utorid": "ok"}, {"utorid": ""}]"#).unwrap();

    let options = NormalizeOptions { collect_all_missing: true, ..Default::default() };
    let err = pipeline::normalize_file(EntityKind::Instructors, &path, None, &options).unwrap_err();
    match err {
        ImportError::Import(Error::MissingRequiredFields(missing)) => {
            assert_eq!(missing.iter().map(|m| m.row).collect::<Vec<_>>(), vec![0, 2]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Aliases naming unknown fields are dropped and the result validates
#[test]
fn test_schema_for_validates_aliased_schema() {
    let aliases = AliasConfig::from_json(r#"{"Mail": "email", "Shoe Size": "shoe_size"}"#).unwrap();
    let schema = pipeline::schema_for(EntityKind::Applicants, Some(&aliases)).unwrap();
    assert_eq!(schema.key_map.get("Mail").map(|s| s.as_str()), Some("email"));
    assert!(!schema.key_map.contains_key("Shoe Size"));
    assert!(schema.validate().is_ok());
}
