//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate document store calls into roster use-case APIs.
//! - Keep HTTP/CLI layers decoupled from storage details.

pub mod roster_service;
