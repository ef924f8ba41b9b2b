//! Command-line front end for the roster.
//!
//! # Responsibility
//! - Expose roster CRUD, search and reports against a local data file.
//! - Render results as aligned text or, with `--json`, the HTTP wire shape.
//!
//! # Invariants
//! - Every command opens the store, runs one roster call and exits.
//! - Non-zero exit status on any error, including unknown ids.

use clap::{Parser, Subcommand, ValueEnum};
use roster_core::{
    init_logging, open_store, RankedStudent, ReadFailurePolicy, RosterError, RosterService,
    RosterSummary, StoreError, StoreKind, StudentFields, StudentId, Subject, SubjectAverage,
    TOP_N_DEFAULT,
};
use serde::Serialize;
use std::fmt::{Display, Formatter, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Manage the student roster")]
struct Cli {
    /// Roster data file (JSON document or SQLite database).
    #[arg(long, env = "ROSTER_DATA_PATH", default_value = "data/db.json", global = true)]
    data: PathBuf,

    /// Storage backend: json, sqlite or memory.
    #[arg(long, env = "ROSTER_STORE", default_value = "json", global = true)]
    store: StoreKind,

    /// Fail instead of treating an unreadable data file as an empty roster.
    #[arg(long, global = true)]
    strict: bool,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "ROSTER_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[arg(long, env = "ROSTER_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List students, optionally filtered by name or roll number.
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one student.
    Show { id: StudentId },
    /// Add a student.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        roll_no: String,
        #[arg(long)]
        attendance: Option<f64>,
        /// Repeatable, `Name=Grade`.
        #[arg(long = "subject", value_parser = parse_subject)]
        subjects: Vec<Subject>,
    },
    /// Update fields of a student; omitted fields are kept.
    Update {
        id: StudentId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        roll_no: Option<String>,
        #[arg(long)]
        attendance: Option<f64>,
        /// Replaces all subjects. Repeatable, `Name=Grade`.
        #[arg(long = "subject", value_parser = parse_subject)]
        subjects: Vec<Subject>,
        /// Remove every subject.
        #[arg(long, conflicts_with = "subjects")]
        clear_subjects: bool,
    },
    /// Delete a student.
    Remove { id: StudentId },
    /// Print a report.
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
        /// Number of students for `top`.
        #[arg(long, default_value_t = TOP_N_DEFAULT)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    Ranklist,
    Top,
    SubjectAverages,
    Summary,
}

#[derive(Debug)]
enum CliError {
    Logging(String),
    Store(StoreError),
    Roster(RosterError),
    NotFound(StudentId),
    Render(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging: {message}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Roster(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::Render(err) => write!(f, "failed to render output: {err}"),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RosterError> for CliError {
    fn from(value: RosterError) -> Self {
        Self::Roster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Render(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("roster: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(&cli.log_level, &log_dir.to_string_lossy()).map_err(CliError::Logging)?;
    }

    let policy = if cli.strict {
        ReadFailurePolicy::Fail
    } else {
        ReadFailurePolicy::RecoverEmpty
    };
    let roster = RosterService::new(open_store(cli.store, &cli.data)?)
        .with_read_failure_policy(policy);

    execute(&roster, cli.command, cli.json)
}

fn execute(roster: &RosterService, command: Command, json: bool) -> Result<String, CliError> {
    match command {
        Command::List { search } => {
            let students = roster.search(search.as_deref())?;
            render(json, students.as_slice(), render_students)
        }
        Command::Show { id } => {
            let student = roster.find(id)?.ok_or(CliError::NotFound(id))?;
            render(json, &student, |s| render_students(std::slice::from_ref(s)))
        }
        Command::Add {
            name,
            roll_no,
            attendance,
            subjects,
        } => {
            let fields = StudentFields {
                name: Some(name),
                roll_no: Some(roll_no),
                attendance,
                subjects: Some(subjects),
            };
            let student = roster_core::decorate(roster.insert(fields)?);
            render(json, &student, |s| format!("added {}", s.student.id))
        }
        Command::Update {
            id,
            name,
            roll_no,
            attendance,
            subjects,
            clear_subjects,
        } => {
            let subjects = if clear_subjects || !subjects.is_empty() {
                Some(subjects)
            } else {
                None
            };
            let fields = StudentFields {
                name,
                roll_no,
                attendance,
                subjects,
            };
            let student = roster
                .replace(id, fields)?
                .map(roster_core::decorate)
                .ok_or(CliError::NotFound(id))?;
            render(json, &student, |s| render_students(std::slice::from_ref(s)))
        }
        Command::Remove { id } => {
            if !roster.remove(id)? {
                return Err(CliError::NotFound(id));
            }
            render(json, &id, |id| format!("removed {id}"))
        }
        Command::Report { kind, limit } => match kind {
            ReportKind::Ranklist => render(json, &roster.rank_list()?[..], render_students),
            ReportKind::Top => render(json, &roster.top(limit)?[..], render_students),
            ReportKind::SubjectAverages => {
                render(json, &roster.subject_averages()?[..], render_subject_averages)
            }
            ReportKind::Summary => render(json, &roster.summary()?, render_summary),
        },
    }
}

fn render<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<String, CliError> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text(value))
    }
}

fn render_students(students: &[RankedStudent]) -> String {
    if students.is_empty() {
        return "no students".to_string();
    }

    let mut out = String::new();
    for (rank, entry) in students.iter().enumerate() {
        let student = &entry.student;
        let attendance = student
            .attendance
            .map_or_else(|| "-".to_string(), |value| format!("{value:.1}%"));
        let _ = writeln!(
            out,
            "{:>3}. {:<24} {:<10} avg {:>6.2}  attendance {:>7}  {}",
            rank + 1,
            student.name,
            student.roll_no,
            entry.average_grade,
            attendance,
            student.id
        );
    }
    out.trim_end().to_string()
}

fn render_subject_averages(averages: &[SubjectAverage]) -> String {
    if averages.is_empty() {
        return "no subjects".to_string();
    }

    averages
        .iter()
        .map(|avg| format!("{:<24} {:>6.2}", avg.subject, avg.average_grade))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_summary(summary: &RosterSummary) -> String {
    let attendance = summary
        .average_attendance
        .map_or_else(|| "-".to_string(), |value| format!("{value:.1}%"));
    format!(
        "students: {}\nsubjects: {}\naverage grade: {:.2}\naverage attendance: {}",
        summary.student_count, summary.subject_count, summary.average_grade, attendance
    )
}

fn parse_subject(raw: &str) -> Result<Subject, String> {
    let (name, grade) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `Name=Grade`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("subject name is empty in `{raw}`"));
    }
    let grade: f64 = grade
        .trim()
        .parse()
        .map_err(|_| format!("grade `{}` is not a number", grade.trim()))?;
    Ok(Subject::new(name, grade))
}
