//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate fetch, policy evaluation and persistence per use case.
//! - Keep transport layers decoupled from storage details.

pub mod person_service;
