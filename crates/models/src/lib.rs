//! Data model for the grades document: records, the persisted document,
//! request inputs and filter criteria.

pub mod errors;
pub mod value;
pub mod grade;
pub mod filter;

pub use grade::{Grade, GradeDocument, GradeFields, GradeId, GradeInput};
pub use value::GradeValue;
