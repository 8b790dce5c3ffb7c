//! Grade operations: the service that drives load/mutate/save against a
//! [`DocumentStore`](crate::storage::DocumentStore), and the pure queries it
//! runs over the loaded document.

pub mod query;
pub mod service;

pub use query::{format_number, TopGrades};
pub use service::GradeService;
