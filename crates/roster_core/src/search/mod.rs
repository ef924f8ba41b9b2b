//! Free-text roster search.
//!
//! # Responsibility
//! - Filter students by case-insensitive substring over name and roll number.
//!
//! # Invariants
//! - A blank query keeps every student, in order.
//! - No fuzzy matching and no relevance scoring; input order is preserved.

pub mod filter;
