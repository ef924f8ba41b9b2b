//! Averages, rank list and subject-wise reports.

use crate::model::student::{Student, Subject};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Size of the "top students" report.
pub const TOP_N_DEFAULT: usize = 5;

/// A student together with its derived average grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedStudent {
    #[serde(flatten)]
    pub student: Student,
    pub average_grade: f64,
}

/// Mean grade of one subject across the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub subject: String,
    pub average_grade: f64,
}

/// Roster-wide headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub student_count: usize,
    /// Mean of per-student averages; `0` for an empty roster.
    pub average_grade: f64,
    /// Mean over students that report attendance; `None` when none do.
    pub average_attendance: Option<f64>,
    pub subject_count: usize,
}

/// Arithmetic mean of subject grades, `0` when there are none.
pub fn average_of(subjects: &[Subject]) -> f64 {
    mean(subjects.iter().map(|subject| subject.grade))
}

pub fn decorate(student: Student) -> RankedStudent {
    let average_grade = average_of(&student.subjects);
    RankedStudent {
        student,
        average_grade,
    }
}

/// Every student decorated and sorted by average grade, highest first.
pub fn rank_list(students: impl IntoIterator<Item = Student>) -> Vec<RankedStudent> {
    let mut ranked: Vec<RankedStudent> = students.into_iter().map(decorate).collect();
    // `sort_by` is stable: ties keep roster order.
    ranked.sort_by(|a, b| descending(a.average_grade, b.average_grade));
    ranked
}

/// First `n` entries of [`rank_list`].
pub fn top(students: impl IntoIterator<Item = Student>, n: usize) -> Vec<RankedStudent> {
    let mut ranked = rank_list(students);
    ranked.truncate(n);
    ranked
}

/// Mean grade per subject name (case-sensitive), highest first.
///
/// Subjects that never occur are absent. Equal averages keep the order in
/// which each subject was first seen.
pub fn subject_averages<'a>(students: impl IntoIterator<Item = &'a Student>) -> Vec<SubjectAverage> {
    let mut totals: Vec<(&'a str, f64, usize)> = Vec::new();
    let mut index_by_name: HashMap<&'a str, usize> = HashMap::new();

    for subject in students.into_iter().flat_map(|student| &student.subjects) {
        let slot = *index_by_name
            .entry(subject.name.as_str())
            .or_insert_with(|| {
                totals.push((subject.name.as_str(), 0.0, 0));
                totals.len() - 1
            });
        let (_, total, count) = &mut totals[slot];
        *total += subject.grade;
        *count += 1;
    }

    let mut averages: Vec<SubjectAverage> = totals
        .into_iter()
        .map(|(name, total, count)| SubjectAverage {
            subject: name.to_string(),
            average_grade: total / count as f64,
        })
        .collect();
    averages.sort_by(|a, b| descending(a.average_grade, b.average_grade));
    averages
}

pub fn roster_summary(students: &[Student]) -> RosterSummary {
    let average_grade = mean(students.iter().map(|student| average_of(&student.subjects)));

    let attendances: Vec<f64> = students.iter().filter_map(|s| s.attendance).collect();
    let average_attendance = (!attendances.is_empty()).then(|| mean(attendances.iter().copied()));

    RosterSummary {
        student_count: students.len(),
        average_grade,
        average_attendance,
        subject_count: subject_averages(students).len(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// Grades are finite, so `partial_cmp` only falls back for NaN, which never
// reaches this point.
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::{average_of, mean};
    use crate::model::student::Subject;

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average_of(&[]), 0.0);
    }

    #[test]
    fn average_of_two_grades() {
        let subjects = [Subject::new("Math", 80.0), Subject::new("Science", 70.0)];
        assert_eq!(average_of(&subjects), 75.0);
    }

    #[test]
    fn mean_of_nothing_does_not_divide_by_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
    }
}
