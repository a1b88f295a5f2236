//! Database bootstrap and document store

pub mod init;
pub mod store;

pub use init::*;
pub use store::{Document, DocumentStore, FieldPath, FieldUpdate, SqliteDocumentStore};
