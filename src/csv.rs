use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Amount;
use crate::model::{NewStudent, StudentRecord};

/// Errors that can occur when opening or parsing registration csv rows.
///
/// Per-row errors enforce the same contract the interactive form does:
/// required fields, known labels, distinct subjects. Rows that fail leave the
/// roster untouched.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: {field} must not be empty")]
    EmptyField { line: usize, field: &'static str },

    #[error("line {line}: unknown grade '{label}'")]
    UnknownGrade { line: usize, label: String },

    #[error("line {line}: unknown subject '{label}'")]
    UnknownSubject { line: usize, label: String },

    #[error("line {line}: subject2 duplicates subject1 '{label}'")]
    SubjectClash { line: usize, label: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputRow {
    first_name: String,
    last_name: String,
    grade: String,
    subject1: String,
    subject2: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputRow<'a> {
    id: String,
    first_name: &'a str,
    last_name: &'a str,
    grade: &'static str,
    subject1: &'static str,
    subject2: &'static str,
    is_paid: bool,
    debt: Amount,
}

/// Read registrations from a csv file with a
/// `firstName,lastName,grade,subject1,subject2` header.
pub fn read_registrations(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<NewStudent, CsvError>>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(|source| CsvError::Open {
            path: path.as_ref().display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            registration_from_row(line, row)
        }))
}

fn registration_from_row(line: usize, row: InputRow) -> Result<NewStudent, CsvError> {
    if row.first_name.is_empty() {
        return Err(CsvError::EmptyField {
            line,
            field: "firstName",
        });
    }
    if row.last_name.is_empty() {
        return Err(CsvError::EmptyField {
            line,
            field: "lastName",
        });
    }

    let grade = row.grade.parse().map_err(|_| CsvError::UnknownGrade {
        line,
        label: row.grade.clone(),
    })?;
    let subject1 = row.subject1.parse().map_err(|_| CsvError::UnknownSubject {
        line,
        label: row.subject1.clone(),
    })?;
    let subject2 = row.subject2.parse().map_err(|_| CsvError::UnknownSubject {
        line,
        label: row.subject2.clone(),
    })?;
    if subject1 == subject2 {
        return Err(CsvError::SubjectClash {
            line,
            label: row.subject1,
        });
    }

    Ok(NewStudent {
        first_name: row.first_name,
        last_name: row.last_name,
        grade,
        subject1,
        subject2,
    })
}

/// Write the roster to stdout in csv format.
pub fn write_roster<'a>(students: impl IntoIterator<Item = &'a StudentRecord>) {
    let stdout = io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());

    for student in students {
        let row = OutputRow {
            id: student.id.to_string(),
            first_name: &student.first_name,
            last_name: &student.last_name,
            grade: student.grade.label(),
            subject1: student.subject1.label(),
            subject2: student.subject2.label(),
            is_paid: student.is_paid,
            debt: student.debt,
        };
        writer.serialize(&row).expect("failed to write csv row");
    }

    writer.flush().expect("failed to flush csv writer");
}
