//! Parties domain module (procuring entity, persons, business functions).
//!
//! Pure domain types; no IO, no storage.

pub mod party;
pub mod revision;

pub use party::{
    Address, BusinessFunction, BusinessFunctionDocument, BusinessFunctionType, Identifier, Person,
    ProcuringEntity,
};
pub use revision::{
    BusinessFunctionDocumentRevision, BusinessFunctionRevision, PersonRevision,
    ProcuringEntityRevision,
};
