//! dbexport - dump a MySQL database to a deliverable file
//!
//! Runs `mysqldump` against the database named by a connection URL and
//! hands the result back as a file the caller owns.
//!
//! # Guarantees
//!
//! - A returned artifact always holds complete, non-empty tool output
//! - Failed, timed-out or cancelled dumps leave no files behind
//! - Concurrent dumps never share a file
//! - The password never appears in logs or error messages
//!
//! # Modules
//!
//! - `adapters`: External dump tools (mysqldump)
//! - `core`: Dump orchestration, errors, redaction
//! - `domain`: Data structures (ConnectionConfig, DumpArtifact)
//! - `config`: Layered settings
//! - `cli`: Command-line interface and artifact delivery
//!
//! # Usage
//!
//! ```bash
//! # Dump into the current directory
//! DATABASE_URL=mysql://user:pass@db/app dbexport dump
//!
//! # Stream to stdout
//! dbexport dump --output - | gzip > app.sql.gz
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{CredentialMode, DumpTool, MysqldumpAdapter};
pub use config::{DumpSettings, Settings};
pub use core::{DumpError, DumpOrchestrator};
pub use domain::{ConfigError, ConnectionConfig, DumpArtifact};
