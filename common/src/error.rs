//! Error types for the reconciliation core

use thiserror::Error;

/// A required field that was null or blank after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// Zero-based index of the record in the normalized batch
    pub row: usize,
    pub field: String,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: '{}'", self.row, self.field)
    }
}

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not parse '{value}' as a date")]
    DateParse { value: String },

    #[error("Missing required field '{field}' in row {row}")]
    MissingRequiredField { row: usize, field: String },

    #[error("Missing required fields: {}", join_missing(.0))]
    MissingRequiredFields(Vec<MissingField>),

    #[error("{kind} reference '{reference}' is ambiguous ({matches} matches)")]
    AmbiguousReference {
        kind: &'static str,
        reference: String,
        matches: usize,
    },

    #[error("{kind} reference '{reference}' does not match any loaded record")]
    UnresolvedReference { kind: &'static str, reference: String },

    #[error("Unknown entity kind: {0}")]
    UnknownSchema(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid import payload: {0}")]
    InvalidPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_missing(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_date_parse() {
        let error = Error::DateParse { value: "not a date".to_string() };
        assert_eq!(format!("{}", error), "Could not parse 'not a date' as a date");
    }

    #[test]
    fn test_error_display_missing_field() {
        let error = Error::MissingRequiredField { row: 3, field: "utorid".to_string() };
        let display = format!("{}", error);
        assert!(display.contains("utorid"));
        assert!(display.contains("row 3"));
    }

    #[test]
    fn test_error_display_accumulated() {
        let error = Error::MissingRequiredFields(vec![
            MissingField { row: 0, field: "utorid".into() },
            MissingField { row: 2, field: "position_code".into() },
        ]);
        assert_eq!(
            format!("{}", error),
            "Missing required fields: row 0: 'utorid', row 2: 'position_code'"
        );
    }

    #[test]
    fn test_error_display_references() {
        let error = Error::UnresolvedReference { kind: "Position", reference: "CSC999".into() };
        assert!(format!("{}", error).contains("CSC999"));

        let error = Error::AmbiguousReference {
            kind: "Instructor",
            reference: "Smith, John".into(),
            matches: 2,
        };
        let display = format!("{}", error);
        assert!(display.contains("ambiguous"));
        assert!(display.contains("2 matches"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
