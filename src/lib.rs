pub mod amount;
pub mod csv;
pub mod model;
pub mod roster;
pub mod storage;
pub mod summary;

pub use amount::Amount;
pub use model::{EXAM_FEE, Grade, Mutation, NewStudent, StudentId, StudentRecord, Subject};
pub use roster::Roster;
pub use storage::{JsonFileStore, MemoryStore, RosterStore};
pub use summary::{RosterSummary, filter_by_name};
