//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate codec and repository calls into UI-level operations.
//! - Keep UI/FFI layers decoupled from storage and format details.

pub mod files;
pub mod import;
pub mod record_service;
