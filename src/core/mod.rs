//! Core dump logic.
//!
//! This module contains:
//! - Orchestrator: Runs a dump and hands over the artifact
//! - Error: Dump failure kinds
//! - Redact: Keeps credentials out of diagnostics

pub mod error;
pub mod orchestrator;
pub mod redact;

// Re-export commonly used types
pub use error::DumpError;
pub use orchestrator::{DumpOrchestrator, TEMP_FILE_PREFIX};
pub use redact::{redact, REDACTED};
