//! Domain types for dbexport.
//!
//! This module contains the core data structures:
//! - ConnectionConfig: Credentials resolved from a connection URL
//! - DumpArtifact: A finished dump file and its delivery name

pub mod artifact;
pub mod connection;

// Re-export commonly used types
pub use artifact::{export_filename, parse_export_timestamp, DumpArtifact, EXPORT_TIMESTAMP_FORMAT};
pub use connection::{ConfigError, ConnectionConfig};
