//! Service layer for the grades API.
//! - `storage`: whole-document persistence behind the `DocumentStore` trait.
//! - `grades`: the seven grade operations and their pure query helpers.
//! - `errors`: the typed error every operation returns.

pub mod errors;
pub mod storage;
pub mod grades;
