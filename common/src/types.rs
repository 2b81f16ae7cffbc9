//! Full entity types
//!
//! The already-persisted shapes that import records are diffed against.
//! Relations are nested objects (an assignment carries its applicant and
//! position), and records not yet saved have no `id`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instructor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub utorid: String,
}

impl Instructor {
    /// "Last, First", the form used by position imports
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Applicant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub utorid: String,
    pub student_number: String,
    pub phone: String,
}

/// Contract or letter template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub template_name: String,
    pub template_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub position_code: String,
    pub position_title: String,
    pub hours_per_assignment: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub contract_template: Option<Template>,
    pub instructors: Vec<Instructor>,
    pub duties: String,
    pub qualifications: String,
    pub desired_num_assignments: i64,
    pub current_enrollment: Option<i64>,
    pub current_waitlisted: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assignment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub applicant: Applicant,
    pub position: Position,
    pub hours: f64,
    pub contract_start: Option<String>,
    pub contract_end: Option<String>,
    pub contract_override_pdf: Option<String>,
    pub active_offer_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingPosition {
    pub position_id: Option<u64>,
    pub position_code: String,
    pub hours: Option<f64>,
    pub num_positions: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Posting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub intro_text: String,
    pub open_date: Option<String>,
    pub close_date: Option<String>,
    /// "auto", "open" or "closed"
    pub availability: String,
    pub posting_positions: Vec<PostingPosition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantMatchingDatum {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub applicant: Applicant,
    pub min_hours_owed: Option<f64>,
    pub max_hours_owed: Option<f64>,
    pub prev_hours_fulfilled: Option<f64>,
    pub letter_template: Option<Template>,
}

/// One line of a duty allocation form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Duty {
    pub order: i64,
    pub hours: f64,
    pub description: String,
}

/// Duty allocation form for one assignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ddah {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub assignment: Assignment,
    pub duties: Vec<Duty>,
    pub approved_date: Option<String>,
    pub accepted_date: Option<String>,
}

/// Read-only view of the currently loaded collections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub instructors: Vec<Instructor>,
    pub applicants: Vec<Applicant>,
    pub positions: Vec<Position>,
    pub assignments: Vec<Assignment>,
    pub postings: Vec<Posting>,
    pub applicant_matching_data: Vec<ApplicantMatchingDatum>,
    pub ddahs: Vec<Ddah>,
    pub contract_templates: Vec<Template>,
    pub letter_templates: Vec<Template>,
}
