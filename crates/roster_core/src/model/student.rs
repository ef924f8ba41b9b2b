//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical roster record and its subject entries.
//! - Coerce loosely typed wire values (grades, attendance) into numbers.
//! - Validate caller-supplied fields before they reach persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another student.
//! - `name` and `roll_no` are non-blank for every record created through
//!   [`Student::from_fields`].
//! - A grade that cannot be read as a finite number is stored as `0`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a roster record.
pub type StudentId = Uuid;

/// One graded subject of a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub name: String,
    /// Non-numeric input decodes as `0`.
    #[serde(default, deserialize_with = "deserialize_grade")]
    pub grade: f64,
}

impl Subject {
    pub fn new(name: impl Into<String>, grade: f64) -> Self {
        Self {
            name: name.into(),
            grade: if grade.is_finite() { grade } else { 0.0 },
        }
    }
}

/// Canonical roster record as persisted in the document store.
///
/// The average grade is never stored here; see [`crate::report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub roll_no: String,
    /// Percentage, unconstrained range. `None` when never provided.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub attendance: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_stored_subjects")]
    pub subjects: Vec<Subject>,
}

impl Student {
    /// Creates a student with a generated id and no subjects.
    pub fn new(name: impl Into<String>, roll_no: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, roll_no)
    }

    /// Creates a student with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: StudentId, name: impl Into<String>, roll_no: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            roll_no: roll_no.into(),
            attendance: None,
            subjects: Vec::new(),
        }
    }

    /// Builds a new record from submitted fields.
    ///
    /// # Errors
    /// - [`StudentValidationError::MissingName`] when `name` is absent or blank.
    /// - [`StudentValidationError::MissingRollNo`] when `roll_no` is absent or blank.
    pub fn from_fields(fields: StudentFields) -> Result<Self, StudentValidationError> {
        let name = required(fields.name, StudentValidationError::MissingName)?;
        let roll_no = required(fields.roll_no, StudentValidationError::MissingRollNo)?;

        let mut student = Self::new(name, roll_no);
        student.attendance = fields.attendance;
        student.subjects = fields.subjects.unwrap_or_default();
        Ok(student)
    }

    /// Merges submitted fields over this record. `id` never changes.
    ///
    /// Absent fields keep their current value. The record is left untouched
    /// when validation fails.
    pub fn apply(&mut self, fields: StudentFields) -> Result<(), StudentValidationError> {
        let name = fields
            .name
            .map(|name| required(Some(name), StudentValidationError::MissingName))
            .transpose()?;
        let roll_no = fields
            .roll_no
            .map(|roll_no| required(Some(roll_no), StudentValidationError::MissingRollNo))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(roll_no) = roll_no {
            self.roll_no = roll_no;
        }
        if let Some(attendance) = fields.attendance {
            self.attendance = Some(attendance);
        }
        if let Some(subjects) = fields.subjects {
            self.subjects = subjects;
        }
        Ok(())
    }
}

/// Caller-supplied fields for create and update requests.
///
/// Every field is optional so the same shape serves both full creates and
/// partial merges.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFields {
    pub name: Option<String>,
    pub roll_no: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub attendance: Option<f64>,
    /// Entries without a name or grade are dropped while decoding. A value
    /// that is not an array decodes as an empty list.
    #[serde(default, deserialize_with = "deserialize_submitted_subjects")]
    pub subjects: Option<Vec<Subject>>,
}

impl StudentFields {
    pub fn new(name: impl Into<String>, roll_no: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            roll_no: Some(roll_no.into()),
            ..Self::default()
        }
    }

    pub fn with_subject(mut self, name: impl Into<String>, grade: f64) -> Self {
        self.subjects
            .get_or_insert_with(Vec::new)
            .push(Subject::new(name, grade));
        self
    }

    pub fn with_attendance(mut self, attendance: f64) -> Self {
        self.attendance = Some(attendance);
        self
    }
}

/// Validation failures for submitted student fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    MissingName,
    MissingRollNo,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "student name is required"),
            Self::MissingRollNo => write!(f, "student roll number is required"),
        }
    }
}

impl Error for StudentValidationError {}

/// Reads a JSON value as a finite number.
///
/// Numbers pass through and booleans read as `1`/`0`. Strings are trimmed;
/// empty text reads as `0`, `0x`/`0o`/`0b` prefixes read as unsigned
/// integers, anything else must parse as a decimal. Everything else yields
/// `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::String(text) => parse_numeric_text(text.trim())?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    if text.is_empty() {
        return Some(0.0);
    }
    let radix = match text.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return text.parse::<f64>().ok(),
    };
    let digits = &text[2..];
    if digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok().map(|value| value as f64)
}

fn required(
    value: Option<String>,
    error: StudentValidationError,
) -> Result<String, StudentValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(error),
    }
}

/// Stored `null` or non-text values read as empty; numbers keep their digits.
fn deserialize_lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

fn deserialize_grade<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value).unwrap_or(0.0))
}

fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.as_str().is_some_and(|text| text.trim().is_empty()) {
        return Ok(None);
    }
    Ok(coerce_number(&value))
}

fn deserialize_stored_subjects<'de, D>(deserializer: D) -> Result<Vec<Subject>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Subject>(item).ok())
        .collect())
}

fn deserialize_submitted_subjects<'de, D>(deserializer: D) -> Result<Option<Vec<Subject>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Some(Vec::new()));
    };

    let subjects = items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str)?;
            if name.is_empty() {
                return None;
            }
            let grade = item.get("grade")?;
            if grade.is_null() || grade.as_str().is_some_and(str::is_empty) {
                return None;
            }
            Some(Subject::new(name, coerce_number(grade).unwrap_or(0.0)))
        })
        .collect();

    Ok(Some(subjects))
}

#[cfg(test)]
mod tests {
    use super::{coerce_number, Student, StudentFields};
    use serde_json::json;

    #[test]
    fn coerce_number_reads_numbers_and_numeric_text() {
        assert_eq!(coerce_number(&json!(81.5)), Some(81.5));
        assert_eq!(coerce_number(&json!(" 72 ")), Some(72.0));
        assert_eq!(coerce_number(&json!("")), Some(0.0));
        assert_eq!(coerce_number(&json!("x")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&json!(false)), Some(0.0));
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn coerce_number_reads_prefixed_integers() {
        assert_eq!(coerce_number(&json!("0x10")), Some(16.0));
        assert_eq!(coerce_number(&json!(" 0B101 ")), Some(5.0));
        assert_eq!(coerce_number(&json!("0o17")), Some(15.0));
        assert_eq!(coerce_number(&json!("0x")), None);
        assert_eq!(coerce_number(&json!("0x-1")), None);
        assert_eq!(coerce_number(&json!("0xzz")), None);
    }

    #[test]
    fn submitted_subjects_drop_incomplete_entries() {
        let fields: StudentFields = serde_json::from_value(json!({
            "subjects": [
                {"name": "Math", "grade": "90"},
                {"name": "", "grade": "80"},
                {"name": "Art", "grade": ""},
                {"name": "Music"},
                {"name": "Drama", "grade": 0}
            ]
        }))
        .unwrap();

        let subjects = fields.subjects.unwrap();
        let names: Vec<&str> = subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Math", "Drama"]);
        assert_eq!(subjects[0].grade, 90.0);
    }

    #[test]
    fn malformed_subjects_decode_as_empty() {
        let fields: StudentFields =
            serde_json::from_value(json!({"subjects": "not-a-list"})).unwrap();
        assert_eq!(fields.subjects, Some(Vec::new()));

        let absent: StudentFields = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.subjects, None);
    }

    #[test]
    fn stored_null_text_fields_decode_as_empty() {
        let student: Student = serde_json::from_value(json!({
            "id": "6f1c2a52-3b0f-4a55-9a4b-2f7b8f0f6a11",
            "name": null,
            "rollNo": 42
        }))
        .unwrap();

        assert_eq!(student.name, "");
        assert_eq!(student.roll_no, "42");
    }
}
