use roster_core::{search, MemoryDocumentStore, RosterService, Student, StudentFields, StudentQuery};

fn roster() -> Vec<Student> {
    vec![
        Student::new("Anna", "X100"),
        Student::new("Bob", "AN01"),
        Student::new("Carl", "C300"),
    ]
}

#[test]
fn empty_or_absent_query_returns_everything_unchanged() {
    let students = roster();
    assert_eq!(search(students.clone(), Some("")), students);
    assert_eq!(search(students.clone(), None), students);
}

#[test]
fn query_matches_name_or_roll_number_ignoring_case() {
    let names: Vec<String> = search(roster(), Some("an"))
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Anna", "Bob"]);
}

#[test]
fn query_without_matches_yields_empty() {
    assert!(search(roster(), Some("zz")).is_empty());
}

#[test]
fn query_is_substring_not_fuzzy() {
    let query = StudentQuery::new(Some("ana"));
    assert!(!roster().iter().any(|s| query.matches(s)));
    assert!(StudentQuery::new(Some("NN")).matches(&Student::new("Anna", "1")));
}

#[test]
fn service_search_decorates_matches() {
    let service = RosterService::new(MemoryDocumentStore::new());
    service
        .insert(StudentFields::new("Anna", "AN01").with_subject("Math", 80.0))
        .unwrap();
    service.insert(StudentFields::new("Zed", "Z9")).unwrap();

    let hits = service.search(Some("AN")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].student.name, "Anna");
    assert_eq!(hits[0].average_grade, 80.0);

    assert_eq!(service.search(None).unwrap().len(), 2);
}
