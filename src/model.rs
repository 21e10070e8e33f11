//! Core domain types for the registration roster.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::Amount;

/// Exam fee owed by every student at registration.
pub const EXAM_FEE: Amount = Amount::from_units(10_000);

/// Student identifier, generated at registration.
pub type StudentId = Uuid;

/// School grade of a candidate. Closed set; `Abiturient` is a school leaver
/// sitting the exam outside the regular grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "4")]
    Fourth,
    #[serde(rename = "5")]
    Fifth,
    #[serde(rename = "6")]
    Sixth,
    #[serde(rename = "7")]
    Seventh,
    #[serde(rename = "8")]
    Eighth,
    #[serde(rename = "9")]
    Ninth,
    Abiturient,
}

impl Grade {
    pub const ALL: [Grade; 10] = [
        Grade::First,
        Grade::Second,
        Grade::Third,
        Grade::Fourth,
        Grade::Fifth,
        Grade::Sixth,
        Grade::Seventh,
        Grade::Eighth,
        Grade::Ninth,
        Grade::Abiturient,
    ];

    /// The label used in storage and on the command line.
    pub fn label(&self) -> &'static str {
        match self {
            Grade::First => "1",
            Grade::Second => "2",
            Grade::Third => "3",
            Grade::Fourth => "4",
            Grade::Fifth => "5",
            Grade::Sixth => "6",
            Grade::Seventh => "7",
            Grade::Eighth => "8",
            Grade::Ninth => "9",
            Grade::Abiturient => "Abiturient",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown grade '{0}' (expected 1-9 or Abiturient)")]
pub struct UnknownGrade(pub String);

impl FromStr for Grade {
    type Err = UnknownGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|g| g.label() == s)
            .ok_or_else(|| UnknownGrade(s.to_string()))
    }
}

/// Exam subject. Closed set of the twelve subjects offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Matematika,
    #[serde(rename = "Ingliz tili")]
    InglizTili,
    #[serde(rename = "Ona tili")]
    OnaTili,
    Kimyo,
    Biologiya,
    Fizika,
    Tarix,
    #[serde(rename = "Rus tili")]
    RusTili,
    #[serde(rename = "Turk tili")]
    TurkTili,
    #[serde(rename = "Nemis tili")]
    NemisTili,
    #[serde(rename = "Koreys tili")]
    KoreysTili,
    Huquq,
}

impl Subject {
    pub const ALL: [Subject; 12] = [
        Subject::Matematika,
        Subject::InglizTili,
        Subject::OnaTili,
        Subject::Kimyo,
        Subject::Biologiya,
        Subject::Fizika,
        Subject::Tarix,
        Subject::RusTili,
        Subject::TurkTili,
        Subject::NemisTili,
        Subject::KoreysTili,
        Subject::Huquq,
    ];

    /// The label used in storage and on the command line.
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Matematika => "Matematika",
            Subject::InglizTili => "Ingliz tili",
            Subject::OnaTili => "Ona tili",
            Subject::Kimyo => "Kimyo",
            Subject::Biologiya => "Biologiya",
            Subject::Fizika => "Fizika",
            Subject::Tarix => "Tarix",
            Subject::RusTili => "Rus tili",
            Subject::TurkTili => "Turk tili",
            Subject::NemisTili => "Nemis tili",
            Subject::KoreysTili => "Koreys tili",
            Subject::Huquq => "Huquq",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown subject '{0}'")]
pub struct UnknownSubject(pub String);

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.label() == s)
            .ok_or_else(|| UnknownSubject(s.to_string()))
    }
}

/// Registration input, as collected by the presentation layer.
///
/// The caller guarantees non-empty names and distinct subjects; the roster
/// stores whatever it is handed.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub grade: Grade,
    pub subject1: Subject,
    pub subject2: Subject,
}

/// One student's registration and payment state.
///
/// Field names in the serialized form match the stored blob layout
/// (`firstName`, `isPaid`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub grade: Grade,
    pub subject1: Subject,
    pub subject2: Subject,
    pub is_paid: bool,
    pub debt: Amount,
}

impl StudentRecord {
    /// Build a fresh registration: new id, unpaid, owing the full exam fee.
    pub fn new(input: NewStudent) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            last_name: input.last_name,
            grade: input.grade,
            subject1: input.subject1,
            subject2: input.subject2,
            is_paid: false,
            debt: EXAM_FEE,
        }
    }
}

/// A mutation accepted by the roster. This is the whole mutation surface;
/// nothing else ever changes a stored record.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Append a new registration.
    Register(NewStudent),
    /// Settle a student's exam fee; clears the debt. Irreversible.
    MarkPaid { id: StudentId },
    /// Remove a registration permanently.
    Remove { id: StudentId },
}
