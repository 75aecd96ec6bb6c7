//! Adapter interfaces for external dump tools.
//!
//! Adapters run the actual dump binary. The orchestrator owns the output
//! file and its cleanup; an adapter only writes into the handle it is given.

pub mod mysqldump;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::DumpError;
use crate::domain::ConnectionConfig;

// Re-export the mysqldump adapter
pub use mysqldump::MysqldumpAdapter;

/// How the password reaches the dump tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    /// Option file with mode 0600, passed as --defaults-extra-file
    #[default]
    DefaultsFile,

    /// MYSQL_PWD in the child environment
    Environment,

    /// --password= on the command line (visible in process listings)
    Argv,
}

/// Everything an adapter needs for one dump
#[derive(Debug)]
pub struct DumpRequest<'a> {
    pub connection: &'a ConnectionConfig,
    pub credentials: CredentialMode,
    pub timeout: Duration,
    /// Directory for auxiliary files (credential option file)
    pub work_dir: &'a Path,
    /// Appended before the database name
    pub extra_args: &'a [String],
}

/// Result of a successful tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutcome {
    /// Captured stderr (warnings), possibly truncated
    pub stderr: String,
}

/// Trait for external dump tools
#[async_trait]
pub trait DumpTool: Send + Sync {
    /// Human-readable tool name
    fn name(&self) -> &str;

    /// Run a dump, writing the tool's stdout into `output`.
    ///
    /// Must fail on non-zero exit and on timeout, killing the process in the
    /// latter case.
    async fn dump(
        &self,
        request: &DumpRequest<'_>,
        output: std::fs::File,
    ) -> Result<ToolOutcome, DumpError>;

    /// Check the tool is installed; returns its version line
    async fn health_check(&self) -> Result<String>;
}
