//! Student roster engine.
//!
//! The roster owns the canonical in-memory list of registrations and the sole
//! mutation surface. Records keep insertion order; every successful mutation
//! is written back in full through the injected store.
//! Also supports an async stream of mutations for batch import.

use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::model::{Mutation, NewStudent, StudentId, StudentRecord};
use crate::storage::RosterStore;

mod error;
pub use error::{RosterError, StudentOp, StudentOpError};

/// The registration roster.
///
/// Holds the student records and a persistence collaborator. Constructed once
/// per session via [`Roster::open`], which restores the previous session's
/// records before anything reads them.
pub struct Roster<S> {
    students: Vec<StudentRecord>,
    store: S,
}

/// Public API
impl<S: RosterStore> Roster<S> {
    /// Load the persisted roster through `store`, or start empty.
    pub fn open(store: S) -> Result<Self, RosterError> {
        let students = store.load()?;
        Ok(Self { students, store })
    }

    /// Drain a mutation stream, applying each in order.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Mutation> + Unpin) {
        while let Some(mutation) = stream.next().await {
            // a failed mutation must not stop the batch, so we just ignore the
            // application result
            let _ = self.apply(mutation);
        }
    }

    /// All records, in insertion order.
    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    /// Look up one record by id.
    pub fn get(&self, id: StudentId) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Apply a single mutation on top of the current roster state.
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), RosterError> {
        match mutation {
            Mutation::Register(input) => {
                let name = format!("{} {}", input.first_name, input.last_name);
                let result = self.register(input);
                match &result {
                    Ok(id) => info!(student = %id, name = %name, "registration applied"),
                    Err(e) => Self::log_failure("registration", &name, e),
                }
                result.map(|_| ())
            }
            Mutation::MarkPaid { id } => {
                let result = self.mark_paid(id);
                Self::log_result("payment", id, &result);
                result
            }
            Mutation::Remove { id } => {
                let result = self.remove(id);
                Self::log_result("removal", id, &result);
                result
            }
        }
    }

    /// Append a new registration and return its freshly assigned id.
    ///
    /// No field validation happens here; the presentation layer guarantees
    /// non-empty names and distinct subjects before calling.
    pub fn register(&mut self, input: NewStudent) -> Result<StudentId, RosterError> {
        let record = StudentRecord::new(input);
        let id = record.id;
        self.students.push(record);
        self.save()?;
        Ok(id)
    }

    /// Settle a student's exam fee: `is_paid` becomes true, the debt clears.
    ///
    /// Irreversible; paying twice is an error, as is an unknown id. On error
    /// the collection is untouched and nothing is saved.
    pub fn mark_paid(&mut self, id: StudentId) -> Result<(), RosterError> {
        let record = self
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StudentOpError::NotFound(StudentOp::MarkPaid, id))?;

        if record.is_paid {
            return Err(StudentOpError::AlreadyPaid(StudentOp::MarkPaid, id).into());
        }

        record.is_paid = true;
        record.debt = Amount::ZERO;
        self.save()?;
        Ok(())
    }

    /// Remove a registration permanently. Unknown ids are an error; the
    /// collection is untouched and nothing is saved.
    pub fn remove(&mut self, id: StudentId) -> Result<(), RosterError> {
        let idx = self
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or(StudentOpError::NotFound(StudentOp::Remove, id))?;

        self.students.remove(idx);
        self.save()?;
        Ok(())
    }
}

/// Private API
impl<S: RosterStore> Roster<S> {
    fn save(&self) -> Result<(), RosterError> {
        self.store.save(&self.students)?;
        Ok(())
    }

    /// Small helper to log mutation results for id-addressed operations.
    fn log_result(op: &str, id: StudentId, result: &Result<(), RosterError>) {
        match result {
            Ok(()) => info!(student = %id, "{op} applied"),
            Err(e) => Self::log_failure(op, &id, e),
        }
    }

    fn log_failure(op: &str, subject: &dyn std::fmt::Display, error: &RosterError) {
        match error {
            RosterError::Storage(e) => warn!(student = %subject, error = %e, "{op} not persisted"),
            e => info!(student = %subject, reason = %e, "{op} skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EXAM_FEE, Grade, Subject};
    use crate::storage::MemoryStore;

    // test utils

    fn input(first: &str, last: &str) -> NewStudent {
        NewStudent {
            first_name: first.to_string(),
            last_name: last.to_string(),
            grade: Grade::Fifth,
            subject1: Subject::Matematika,
            subject2: Subject::Fizika,
        }
    }

    fn roster() -> Roster<MemoryStore> {
        Roster::open(MemoryStore::new()).unwrap()
    }

    #[test]
    fn open_on_empty_store_starts_empty() {
        assert!(roster().students().is_empty());
    }

    // Register

    #[test]
    fn register_appends_in_insertion_order() {
        let mut roster = roster();
        roster.register(input("Ali", "Valiyev")).unwrap();
        roster.register(input("Laylo", "Karimova")).unwrap();

        let names: Vec<_> = roster.students().iter().map(|s| s.first_name.as_str()).collect();
        assert_eq!(names, ["Ali", "Laylo"]);
    }

    #[test]
    fn register_starts_unpaid_with_full_fee() {
        let mut roster = roster();
        let id = roster.register(input("Ali", "Valiyev")).unwrap();

        let record = roster.get(id).unwrap();
        assert!(!record.is_paid);
        assert_eq!(record.debt, EXAM_FEE);
    }

    #[test]
    fn register_assigns_distinct_ids() {
        let mut roster = roster();
        let mut ids = Vec::new();
        for i in 0..20 {
            ids.push(roster.register(input(&format!("Student{i}"), "Test")).unwrap());
        }
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn list_length_tracks_adds_and_removes() {
        let mut roster = roster();
        let a = roster.register(input("Ali", "Valiyev")).unwrap();
        let _b = roster.register(input("Bobur", "Aliyev")).unwrap();
        let c = roster.register(input("Laylo", "Karimova")).unwrap();

        roster.remove(a).unwrap();
        roster.remove(c).unwrap();

        assert_eq!(roster.students().len(), 1);
        assert_eq!(roster.students()[0].first_name, "Bobur");
    }

    // MarkPaid

    #[test]
    fn mark_paid_clears_debt_and_leaves_others_untouched() {
        let mut roster = roster();
        let a = roster.register(input("Ali", "Valiyev")).unwrap();
        let b = roster.register(input("Bobur", "Aliyev")).unwrap();

        roster.mark_paid(a).unwrap();

        let paid = roster.get(a).unwrap();
        assert!(paid.is_paid);
        assert_eq!(paid.debt, Amount::ZERO);

        let other = roster.get(b).unwrap();
        assert!(!other.is_paid);
        assert_eq!(other.debt, EXAM_FEE);
    }

    #[test]
    fn mark_paid_unknown_id_fails_and_changes_nothing() {
        let mut roster = roster();
        roster.register(input("Ali", "Valiyev")).unwrap();

        let result = roster.mark_paid(StudentId::new_v4());
        assert!(matches!(
            result,
            Err(RosterError::Student(StudentOpError::NotFound(
                StudentOp::MarkPaid,
                _
            )))
        ));
        assert!(!roster.students()[0].is_paid);
    }

    #[test]
    fn mark_paid_twice_fails() {
        let mut roster = roster();
        let id = roster.register(input("Ali", "Valiyev")).unwrap();
        roster.mark_paid(id).unwrap();

        let result = roster.mark_paid(id);
        assert!(matches!(
            result,
            Err(RosterError::Student(StudentOpError::AlreadyPaid(
                StudentOp::MarkPaid,
                _
            )))
        ));

        // still paid, still zero debt
        let record = roster.get(id).unwrap();
        assert!(record.is_paid);
        assert_eq!(record.debt, Amount::ZERO);
    }

    // Remove

    #[test]
    fn remove_unknown_id_fails() {
        let mut roster = roster();
        let result = roster.remove(StudentId::new_v4());
        assert!(matches!(
            result,
            Err(RosterError::Student(StudentOpError::NotFound(
                StudentOp::Remove,
                _
            )))
        ));
    }

    #[test]
    fn removed_id_is_gone() {
        let mut roster = roster();
        let id = roster.register(input("Ali", "Valiyev")).unwrap();
        roster.remove(id).unwrap();

        assert!(roster.get(id).is_none());
        let result = roster.remove(id);
        assert!(matches!(result, Err(RosterError::Student(_))));
    }

    // Full lifecycle

    #[test]
    fn register_pay_remove_scenario() {
        let mut roster = roster();
        let id = roster.register(input("Ali", "Valiyev")).unwrap();
        assert_eq!(roster.get(id).unwrap().debt, Amount::from_units(10_000));
        assert!(!roster.get(id).unwrap().is_paid);

        roster.mark_paid(id).unwrap();
        assert_eq!(roster.get(id).unwrap().debt, Amount::ZERO);
        assert!(roster.get(id).unwrap().is_paid);

        roster.remove(id).unwrap();
        assert!(roster.students().is_empty());
    }

    // Persistence

    #[test]
    fn every_successful_mutation_is_saved() {
        let store = MemoryStore::new();
        let mut roster = Roster::open(store.clone()).unwrap();

        let id = roster.register(input("Ali", "Valiyev")).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);

        roster.mark_paid(id).unwrap();
        assert!(store.load().unwrap()[0].is_paid);

        roster.remove(id).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn failed_mutation_is_not_saved() {
        let store = MemoryStore::new();
        let mut roster = Roster::open(store.clone()).unwrap();
        roster.register(input("Ali", "Valiyev")).unwrap();

        let _ = roster.mark_paid(StudentId::new_v4());
        assert!(!store.load().unwrap()[0].is_paid);
    }

    #[test]
    fn reopening_restores_records_field_by_field() {
        let store = MemoryStore::new();
        let mut roster = Roster::open(store.clone()).unwrap();
        roster.register(input("Ali", "Valiyev")).unwrap();
        let paid = roster.register(input("Laylo", "Karimova")).unwrap();
        roster.mark_paid(paid).unwrap();

        let before = roster.students().to_vec();
        let reopened = Roster::open(store).unwrap();
        assert_eq!(reopened.students(), before.as_slice());
    }

    // apply / run

    #[test]
    fn apply_dispatches_register() {
        let mut roster = roster();
        roster
            .apply(Mutation::Register(input("Ali", "Valiyev")))
            .unwrap();
        assert_eq!(roster.students().len(), 1);
    }

    #[test]
    fn apply_dispatches_id_mutations() {
        let mut roster = roster();
        let id = roster.register(input("Ali", "Valiyev")).unwrap();

        roster.apply(Mutation::MarkPaid { id }).unwrap();
        assert!(roster.get(id).unwrap().is_paid);

        roster.apply(Mutation::Remove { id }).unwrap();
        assert!(roster.students().is_empty());
    }

    #[tokio::test]
    async fn run_processes_all_mutations() {
        let mut roster = roster();
        let mutations = vec![
            Mutation::Register(input("Ali", "Valiyev")),
            Mutation::Register(input("Bobur", "Aliyev")),
        ];

        roster.run(tokio_stream::iter(mutations)).await;
        assert_eq!(roster.students().len(), 2);
    }

    #[tokio::test]
    async fn run_skips_failed_mutations_and_continues() {
        let mut roster = roster();
        let mutations = vec![
            Mutation::Register(input("Ali", "Valiyev")),
            Mutation::MarkPaid {
                id: StudentId::new_v4(), // unknown, should be skipped
            },
            Mutation::Register(input("Bobur", "Aliyev")),
        ];

        roster.run(tokio_stream::iter(mutations)).await;
        assert_eq!(roster.students().len(), 2);
    }
}
