//! Aggregation engine over roster snapshots.
//!
//! # Responsibility
//! - Derive per-student averages on read.
//! - Reduce the roster into ranked and subject-grouped report views.
//!
//! # Invariants
//! - Functions are pure; the store is never mutated from here.
//! - All orderings are stable, so equal averages keep input order.

pub mod aggregation;
