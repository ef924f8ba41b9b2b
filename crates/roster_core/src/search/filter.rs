//! Substring filter over student name and roll number.

use crate::model::student::Student;

/// Prepared search query. Lowercases the needle once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentQuery {
    needle: Option<String>,
}

impl StudentQuery {
    /// Builds a query; `None` and `""` both match everything.
    pub fn new(text: Option<&str>) -> Self {
        Self {
            needle: text
                .filter(|text| !text.is_empty())
                .map(str::to_lowercase),
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.needle.is_none()
    }

    pub fn matches(&self, student: &Student) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };
        student.name.to_lowercase().contains(needle)
            || student.roll_no.to_lowercase().contains(needle)
    }
}

/// Keeps students whose name or roll number contains `query`, ignoring case.
pub fn search(students: Vec<Student>, query: Option<&str>) -> Vec<Student> {
    let query = StudentQuery::new(query);
    if query.is_match_all() {
        return students;
    }
    students
        .into_iter()
        .filter(|student| query.matches(student))
        .collect()
}
