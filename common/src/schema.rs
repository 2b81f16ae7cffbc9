//! Schema registry
//!
//! Each importable entity kind is described declaratively: its canonical
//! field list, the header synonyms accepted from spreadsheets, which fields
//! are required, which form the primary key, which hold dates, and the
//! wrapper property used by named-collection JSON exports.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Primary key: one field or an ordered composite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl PrimaryKey {
    pub fn fields(&self) -> Vec<&str> {
        match self {
            PrimaryKey::Single(field) => vec![field.as_str()],
            PrimaryKey::Composite(fields) => fields.iter().map(|f| f.as_str()).collect(),
        }
    }
}

/// Declarative description of one entity kind's import format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationSchema {
    /// Canonical field names, in output order
    pub keys: Vec<String>,
    /// Header synonym → canonical field
    pub key_map: HashMap<String, String>,
    pub required_keys: Vec<String>,
    pub primary_key: PrimaryKey,
    pub date_columns: Vec<String>,
    /// Wrapper property of named-collection JSON exports
    pub base_name: String,
}

impl NormalizationSchema {
    fn new(base_name: &str, keys: &[&str], primary_key: PrimaryKey) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            key_map: HashMap::new(),
            required_keys: Vec::new(),
            primary_key,
            date_columns: Vec::new(),
            base_name: base_name.to_string(),
        }
    }

    fn synonyms(mut self, field: &str, headers: &[&str]) -> Self {
        for header in headers {
            self.key_map.insert(header.to_string(), field.to_string());
        }
        self
    }

    fn required(mut self, fields: &[&str]) -> Self {
        self.required_keys = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    fn dates(mut self, fields: &[&str]) -> Self {
        self.date_columns = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn has_key(&self, field: &str) -> bool {
        self.keys.iter().any(|k| k == field)
    }

    /// Check that every primary-key, required, date and synonym target is a declared key.
    pub fn validate(&self) -> Result<()> {
        let referenced = self
            .primary_key
            .fields()
            .into_iter()
            .chain(self.required_keys.iter().map(|s| s.as_str()))
            .chain(self.date_columns.iter().map(|s| s.as_str()))
            .chain(self.key_map.values().map(|s| s.as_str()));

        for field in referenced {
            if !self.has_key(field) {
                return Err(Error::InvalidSchema(format!(
                    "'{}' refers to undeclared field '{}'",
                    self.base_name, field
                )));
            }
        }
        Ok(())
    }
}

/// Importable entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Instructors,
    Applicants,
    Positions,
    Assignments,
    Postings,
    ApplicantMatching,
    Ddahs,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Instructors,
        EntityKind::Applicants,
        EntityKind::Positions,
        EntityKind::Assignments,
        EntityKind::Postings,
        EntityKind::ApplicantMatching,
        EntityKind::Ddahs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Instructors => "instructors",
            EntityKind::Applicants => "applicants",
            EntityKind::Positions => "positions",
            EntityKind::Assignments => "assignments",
            EntityKind::Postings => "postings",
            EntityKind::ApplicantMatching => "applicant_matching",
            EntityKind::Ddahs => "ddahs",
        }
    }

    /// Built-in schema for this kind
    pub fn schema(&self) -> &'static NormalizationSchema {
        match self {
            EntityKind::Instructors => &INSTRUCTORS,
            EntityKind::Applicants => &APPLICANTS,
            EntityKind::Positions => &POSITIONS,
            EntityKind::Assignments => &ASSIGNMENTS,
            EntityKind::Postings => &POSTINGS,
            EntityKind::ApplicantMatching => &APPLICANT_MATCHING,
            EntityKind::Ddahs => &DDAHS,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "instructors" | "instructor" => Ok(EntityKind::Instructors),
            "applicants" | "applicant" => Ok(EntityKind::Applicants),
            "positions" | "position" => Ok(EntityKind::Positions),
            "assignments" | "assignment" => Ok(EntityKind::Assignments),
            "postings" | "posting" => Ok(EntityKind::Postings),
            "applicant_matching" | "matching" => Ok(EntityKind::ApplicantMatching),
            "ddahs" | "ddah" => Ok(EntityKind::Ddahs),
            _ => Err(Error::UnknownSchema(s.to_string())),
        }
    }
}

const UTORID_HEADERS: &[&str] = &["UTORid", "UTORID", "Utorid", "UTOR ID"];
const FIRST_NAME_HEADERS: &[&str] = &["First Name", "First name", "Given Name", "First"];
const LAST_NAME_HEADERS: &[&str] = &["Last Name", "Last name", "Surname", "Family Name", "Last"];
const EMAIL_HEADERS: &[&str] = &["Email", "E-mail", "Email Address"];
const POSITION_CODE_HEADERS: &[&str] = &["Position Code", "Course Code", "Course"];

lazy_static::lazy_static! {
    static ref INSTRUCTORS: NormalizationSchema = NormalizationSchema::new(
        "instructors",
        &["first_name", "last_name", "utorid", "email"],
        PrimaryKey::Single("utorid".into()),
    )
    .synonyms("first_name", FIRST_NAME_HEADERS)
    .synonyms("last_name", LAST_NAME_HEADERS)
    .synonyms("email", EMAIL_HEADERS)
    .synonyms("utorid", UTORID_HEADERS)
    .required(&["utorid"]);

    static ref APPLICANTS: NormalizationSchema = NormalizationSchema::new(
        "applicants",
        &["first_name", "last_name", "utorid", "email", "student_number", "phone"],
        PrimaryKey::Single("utorid".into()),
    )
    .synonyms("first_name", FIRST_NAME_HEADERS)
    .synonyms("last_name", LAST_NAME_HEADERS)
    .synonyms("email", EMAIL_HEADERS)
    .synonyms("utorid", UTORID_HEADERS)
    .synonyms("student_number", &["Student Number", "Student number", "Student #", "Student No"])
    .synonyms("phone", &["Phone", "Phone Number", "Phone number"])
    .required(&["utorid"]);

    static ref POSITIONS: NormalizationSchema = NormalizationSchema::new(
        "positions",
        &[
            "position_code",
            "position_title",
            "hours_per_assignment",
            "start_date",
            "end_date",
            "contract_template",
            "instructors",
            "duties",
            "qualifications",
            "desired_num_assignments",
            "current_enrollment",
            "current_waitlisted",
        ],
        PrimaryKey::Single("position_code".into()),
    )
    .synonyms("position_code", POSITION_CODE_HEADERS)
    .synonyms("position_title", &["Position Title", "Course Title", "Title"])
    .synonyms("hours_per_assignment", &["Hours", "Hours Per Assignment", "Hours per Assignment"])
    .synonyms("start_date", &["Start Date", "Start"])
    .synonyms("end_date", &["End Date", "End"])
    .synonyms("contract_template", &["Contract Template", "Offer Template"])
    .synonyms("instructors", &["Instructor", "Instructors"])
    .synonyms("duties", &["Duties"])
    .synonyms("qualifications", &["Qualifications", "Requirements"])
    .synonyms(
        "desired_num_assignments",
        &["Desired Num Assignments", "Number of TAs", "TAs Needed"],
    )
    .synonyms("current_enrollment", &["Current Enrollment", "Enrollment", "Enrolment", "Enrolled"])
    .synonyms("current_waitlisted", &["Current Waitlisted", "Waitlisted", "Waitlist"])
    .required(&["position_code", "contract_template"])
    .dates(&["start_date", "end_date"]);

    static ref ASSIGNMENTS: NormalizationSchema = NormalizationSchema::new(
        "assignments",
        &[
            "utorid",
            "position_code",
            "hours",
            "contract_start",
            "contract_end",
            "contract_override_pdf",
        ],
        PrimaryKey::Composite(vec!["utorid".into(), "position_code".into()]),
    )
    .synonyms("utorid", UTORID_HEADERS)
    .synonyms("position_code", POSITION_CODE_HEADERS)
    .synonyms("hours", &["Hours", "Assigned Hours"])
    .synonyms("contract_start", &["Contract Start", "Start Date", "Start"])
    .synonyms("contract_end", &["Contract End", "End Date", "End"])
    .synonyms("contract_override_pdf", &["Contract Override PDF", "Override PDF"])
    .required(&["utorid", "position_code"])
    .dates(&["contract_start", "contract_end"]);

    static ref POSTINGS: NormalizationSchema = NormalizationSchema::new(
        "postings",
        &["name", "intro_text", "open_date", "close_date", "availability", "posting_positions"],
        PrimaryKey::Single("name".into()),
    )
    .synonyms("name", &["Name", "Posting Name", "Posting"])
    .synonyms("intro_text", &["Intro Text", "Introduction"])
    .synonyms("open_date", &["Open Date", "Opens"])
    .synonyms("close_date", &["Close Date", "Closes"])
    .synonyms("availability", &["Availability"])
    .synonyms("posting_positions", &["Positions", "Posting Positions"])
    .required(&["name"])
    .dates(&["open_date", "close_date"]);

    static ref APPLICANT_MATCHING: NormalizationSchema = NormalizationSchema::new(
        "applicant_matching_data",
        &["utorid", "min_hours_owed", "max_hours_owed", "prev_hours_fulfilled", "letter_template"],
        PrimaryKey::Single("utorid".into()),
    )
    .synonyms("utorid", UTORID_HEADERS)
    .synonyms("min_hours_owed", &["Min Hours Owed", "Minimum Hours Owed"])
    .synonyms("max_hours_owed", &["Max Hours Owed", "Maximum Hours Owed"])
    .synonyms("prev_hours_fulfilled", &["Previous Hours Fulfilled", "Prev Hours Fulfilled"])
    .synonyms("letter_template", &["Letter Template", "Appointment Letter Template"])
    .required(&["utorid"]);

    static ref DDAHS: NormalizationSchema = NormalizationSchema::new(
        "ddahs",
        &["position_code", "applicant", "duties"],
        PrimaryKey::Composite(vec!["position_code".into(), "applicant".into()]),
    )
    .synonyms("position_code", POSITION_CODE_HEADERS)
    .synonyms("applicant", &["Applicant", "UTORid", "UTORID", "Utorid"])
    .synonyms("duties", &["Duties"])
    .required(&["position_code", "applicant"]);
}
