//! Persistence layer for the roster document.
//!
//! # Responsibility
//! - Define the whole-document read/write contract.
//! - Keep file and SQL details out of the service layer.
//!
//! # Invariants
//! - Backends persist the complete document on every write.
//! - Backend errors surface as [`document_store::StoreError`]; recovery
//!   policy is decided by the caller.

pub mod document_store;
pub mod json_store;
pub mod sqlite_store;
