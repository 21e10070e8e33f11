//! Error types for roster mutations.

use thiserror::Error;

use crate::model::StudentId;
use crate::storage::StorageError;

/// Top-level error returned by [`Roster::apply`](super::Roster::apply).
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("{0}")]
    Student(#[from] StudentOpError),

    #[error("failed to persist roster: {0}")]
    Storage(#[from] StorageError),
}

/// The mutation being attempted on an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentOp {
    MarkPaid,
    Remove,
}

/// Error for mutations addressing a record by id.
#[derive(Debug, Error)]
pub enum StudentOpError {
    #[error("{0:?}: student {1} not found")]
    NotFound(StudentOp, StudentId),

    #[error("{0:?}: student {1} has already paid")]
    AlreadyPaid(StudentOp, StudentId),
}
