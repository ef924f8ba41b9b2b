use roster_core::{
    average_of, DocumentStore, JsonFileStore, MemoryDocumentStore, ReadFailurePolicy,
    RosterDocument, RosterError, RosterService, StoreError, StudentFields,
    StudentValidationError,
};
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

fn memory_service() -> RosterService {
    RosterService::new(MemoryDocumentStore::new())
}

#[test]
fn insert_and_get_roundtrip_carries_average() {
    let service = memory_service();
    let created = service
        .insert(
            StudentFields::new("Anna", "AN01")
                .with_subject("Math", 80.0)
                .with_subject("Science", 70.0),
        )
        .unwrap();

    let loaded = service.find(created.id).unwrap().unwrap();
    assert_eq!(loaded.student, created);
    assert_eq!(loaded.average_grade, average_of(&created.subjects));
    assert_eq!(loaded.average_grade, 75.0);
}

#[test]
fn insert_generates_distinct_ids() {
    let service = memory_service();
    let a = service.insert(StudentFields::new("A", "1")).unwrap();
    let b = service.insert(StudentFields::new("A", "1")).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn list_preserves_insertion_order() {
    let service = memory_service();
    for (name, roll) in [("Cara", "C3"), ("Anna", "A1"), ("Ben", "B2")] {
        service.insert(StudentFields::new(name, roll)).unwrap();
    }

    let names: Vec<String> = service.list().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Cara", "Anna", "Ben"]);
}

#[test]
fn insert_rejects_missing_fields_without_writing() {
    let service = memory_service();
    let err = service
        .insert(StudentFields {
            name: Some("Nameless roll".to_string()),
            ..StudentFields::default()
        })
        .unwrap_err();

    assert!(matches!(
        err,
        RosterError::Validation(StudentValidationError::MissingRollNo)
    ));
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn get_unknown_id_is_none() {
    let service = memory_service();
    assert!(service.get(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn replace_merges_fields_and_preserves_id() {
    let service = memory_service();
    let created = service
        .insert(StudentFields::new("Ben", "B02").with_subject("Math", 50.0))
        .unwrap();

    let updated = service
        .replace(
            created.id,
            StudentFields {
                roll_no: Some("B20".to_string()),
                ..StudentFields::default()
            }
            .with_subject("Math", 90.0),
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Ben");
    assert_eq!(updated.roll_no, "B20");
    assert_eq!(service.find(created.id).unwrap().unwrap().average_grade, 90.0);
}

#[test]
fn replace_unknown_id_is_none() {
    let service = memory_service();
    let result = service
        .replace(Uuid::new_v4(), StudentFields::new("Ghost", "G0"))
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn remove_twice_returns_false_the_second_time() {
    let service = memory_service();
    let created = service.insert(StudentFields::new("Cara", "C03")).unwrap();

    assert!(service.remove(created.id).unwrap());
    assert!(!service.remove(created.id).unwrap());
    assert!(service.get(created.id).unwrap().is_none());
}

#[test]
fn mutations_persist_to_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    let created = {
        let service = RosterService::new(JsonFileStore::new(&path));
        service.insert(StudentFields::new("Dana", "D04")).unwrap()
    };

    let reopened = RosterService::new(JsonFileStore::new(&path));
    assert_eq!(reopened.get(created.id).unwrap().unwrap(), created);
}

#[test]
fn corrupt_store_recovers_empty_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "[broken").unwrap();

    let service = RosterService::new(JsonFileStore::new(&path));
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn corrupt_store_fails_under_strict_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "[broken").unwrap();

    let service = RosterService::new(JsonFileStore::new(&path))
        .with_read_failure_policy(ReadFailurePolicy::Fail);
    let err = service.list().unwrap_err();
    assert!(matches!(
        err,
        RosterError::Storage(StoreError::Serialization(_))
    ));

    let insert_err = service.insert(StudentFields::new("Eve", "E05")).unwrap_err();
    assert!(matches!(insert_err, RosterError::Storage(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[broken");
}

#[test]
fn malformed_records_survive_the_next_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(
        &path,
        r#"{"students": [
            {"id": "6f1c2a52-3b0f-4a55-9a4b-2f7b8f0f6a11", "name": "Anna", "rollNo": "AN01"},
            {"id": "9b2d7c1e-1d2a-4c7e-8f3a-5e6b7c8d9e0f", "name": null, "rollNo": "N02"},
            {"id": "legacy-3", "name": "Ben", "rollNo": "B03"}
        ]}"#,
    )
    .unwrap();

    let service = RosterService::new(JsonFileStore::new(&path));
    assert_eq!(service.list().unwrap().len(), 2);

    service.insert(StudentFields::new("New", "N1")).unwrap();

    let names: Vec<String> = service.list().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Anna", "", "New"]);
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("Anna"));
    assert!(raw.contains("legacy-3"));
}

#[test]
fn recovered_read_never_overwrites_the_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "[broken").unwrap();

    let service = RosterService::new(JsonFileStore::new(&path));
    assert!(service.list().unwrap().is_empty());

    let err = service.insert(StudentFields::new("Eve", "E05")).unwrap_err();
    assert!(matches!(err, RosterError::Storage(StoreError::Serialization(_))));
    assert!(service.remove(Uuid::new_v4()).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[broken");
}

struct ReadOnlyStore;

impl DocumentStore for ReadOnlyStore {
    fn read(&self) -> roster_core::StoreResult<RosterDocument> {
        Ok(RosterDocument::default())
    }

    fn write(&self, _document: &RosterDocument) -> roster_core::StoreResult<()> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }
}

#[test]
fn write_failures_propagate_to_caller() {
    let service = RosterService::new(ReadOnlyStore);
    let err = service.insert(StudentFields::new("Finn", "F06")).unwrap_err();
    assert!(matches!(err, RosterError::Storage(StoreError::Io(_))));
}

#[test]
fn concurrent_inserts_do_not_lose_updates() {
    let service = Arc::new(memory_service());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for n in 0..10 {
                    service
                        .insert(StudentFields::new(format!("s{worker}-{n}"), format!("R{n}")))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(service.list().unwrap().len(), 80);
}
