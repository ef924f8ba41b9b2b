//! Roster domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the roster engine.
//! - Own the wire shape of persisted records (`{"students": [...]}`).
//!
//! # Invariants
//! - Every record is identified by a stable `StudentId`.
//! - Derived values (average grade) are never part of the stored shape.
//! - A stored entry that cannot be read as a student is kept verbatim and
//!   written back unchanged; it never disappears through a later write.

pub mod student;

use log::warn;
use serde::de::Error as _;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use student::Student;

/// Whole persisted roster document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterDocument {
    pub students: Vec<Student>,
    /// Stored entries that do not decode as a [`Student`], in file order.
    pub unreadable: Vec<Value>,
}

impl RosterDocument {
    pub fn new(students: Vec<Student>) -> Self {
        Self {
            students,
            unreadable: Vec::new(),
        }
    }

    fn from_records(records: Vec<Value>) -> Self {
        let mut document = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Student>(record.clone()) {
                Ok(student) => document.students.push(student),
                Err(err) => {
                    warn!(
                        "event=roster_decode module=model status=skipped index={index} error={err}"
                    );
                    document.unreadable.push(record);
                }
            }
        }
        document
    }
}

#[derive(Deserialize)]
struct StoredDocument {
    #[serde(default)]
    students: Value,
}

impl<'de> Deserialize<'de> for RosterDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StoredDocument::deserialize(deserializer)?.students {
            Value::Null => Ok(Self::default()),
            Value::Array(records) => Ok(Self::from_records(records)),
            other => Err(D::Error::custom(format!(
                "`students` must be an array, found {}",
                json_kind(&other)
            ))),
        }
    }
}

impl Serialize for RosterDocument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut document = serializer.serialize_struct("RosterDocument", 1)?;
        document.serialize_field("students", &StoredRecords(self))?;
        document.end()
    }
}

struct StoredRecords<'a>(&'a RosterDocument);

impl Serialize for StoredRecords<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let RosterDocument {
            students,
            unreadable,
        } = self.0;
        let mut records = serializer.serialize_seq(Some(students.len() + unreadable.len()))?;
        for student in students {
            records.serialize_element(student)?;
        }
        for record in unreadable {
            records.serialize_element(record)?;
        }
        records.end()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::RosterDocument;
    use serde_json::json;

    #[test]
    fn unreadable_entries_survive_a_round_trip() {
        let document: RosterDocument = serde_json::from_value(json!({
            "students": [
                {"id": "6f1c2a52-3b0f-4a55-9a4b-2f7b8f0f6a11", "name": "Anna", "rollNo": "AN01"},
                {"id": "legacy-7", "name": "Ben", "rollNo": "B02"}
            ]
        }))
        .unwrap();

        assert_eq!(document.students.len(), 1);
        assert_eq!(document.unreadable.len(), 1);

        let written = serde_json::to_value(&document).unwrap();
        assert_eq!(written["students"][1]["id"], "legacy-7");
    }

    #[test]
    fn non_array_students_is_rejected() {
        assert!(serde_json::from_value::<RosterDocument>(json!({"students": 3})).is_err());
        let empty: RosterDocument = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, RosterDocument::default());
    }
}
