//! mysqldump adapter.
//!
//! Spawns `mysqldump` with discrete arguments (never through a shell) and
//! streams its stdout straight into the file handed over by the orchestrator.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use super::{CredentialMode, DumpRequest, DumpTool, ToolOutcome};
use crate::core::DumpError;
use crate::domain::ConnectionConfig;

/// Snapshot read without table locks, streamed row by row
pub const CONSISTENCY_ARGS: &[&str] = &["--single-transaction", "--quick", "--lock-tables=false"];

/// How much trailing stderr to keep for diagnostics
const STDERR_TAIL_BYTES: usize = 8 * 1024;

/// mysqldump adapter using subprocess mode
pub struct MysqldumpAdapter {
    /// Path to the mysqldump binary (default: "mysqldump")
    binary_path: String,
}

impl Default for MysqldumpAdapter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BINARY)
    }
}

impl MysqldumpAdapter {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    /// Arguments for a request, excluding any --defaults-extra-file
    pub fn build_args(request: &DumpRequest<'_>) -> Vec<String> {
        let conn = request.connection;
        let mut args = vec![format!("--host={}", conn.host())];
        if let Some(port) = conn.port() {
            args.push(format!("--port={}", port));
        }

        // With an option file the user travels alongside the password
        match request.credentials {
            CredentialMode::DefaultsFile => {}
            CredentialMode::Environment => args.push(format!("--user={}", conn.username())),
            CredentialMode::Argv => {
                args.push(format!("--user={}", conn.username()));
                args.push(format!("--password={}", conn.password()));
            }
        }

        args.extend(CONSISTENCY_ARGS.iter().map(|a| a.to_string()));
        args.extend(request.extra_args.iter().cloned());
        args.push(conn.database().to_string());
        args
    }
}

#[async_trait]
impl DumpTool for MysqldumpAdapter {
    fn name(&self) -> &str {
        "mysqldump"
    }

    async fn dump(
        &self,
        request: &DumpRequest<'_>,
        output: std::fs::File,
    ) -> Result<ToolOutcome, DumpError> {
        let mut cmd = Command::new(&self.binary_path);

        // Removed on drop, so it lives exactly as long as this call
        let _defaults_file = match request.credentials {
            CredentialMode::DefaultsFile => {
                let file = write_defaults_file(request.connection, request.work_dir)?;
                // mysqldump only honours this as the first argument
                cmd.arg(format!("--defaults-extra-file={}", file.path().display()));
                Some(file)
            }
            CredentialMode::Environment => {
                cmd.env("MYSQL_PWD", request.connection.password());
                None
            }
            CredentialMode::Argv => {
                warn!("Passing the database password on the command line; it is visible in process listings");
                None
            }
        };

        cmd.args(Self::build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::from(output))
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // One deadline for the process and for draining its stderr
        let deadline = Instant::now() + request.timeout;

        debug!(binary = %self.binary_path, "Spawning dump tool");
        let mut child = cmd.spawn().map_err(|e| DumpError::ProcessStart {
            program: self.binary_path.clone(),
            message: e.to_string(),
        })?;

        let stderr = child.stderr.take();
        let mut stderr_task = tokio::spawn(async move {
            match stderr {
                Some(pipe) => read_tail(pipe, STDERR_TAIL_BYTES).await,
                None => Vec::new(),
            }
        });

        let waited = timeout_at(deadline, child.wait()).await;
        let status = match waited {
            Ok(status) => status?,
            Err(_) => {
                warn!(timeout = ?request.timeout, "Dump tool timed out, killing it");
                if let Err(e) = child.kill().await {
                    // Already exited between the timeout firing and the kill
                    debug!(error = %e, "Kill after timeout failed");
                }
                stderr_task.abort();
                return Err(DumpError::Timeout {
                    timeout: request.timeout,
                });
            }
        };

        // A forked helper can keep stderr open after the tool itself exits
        let stderr = match timeout_at(deadline, &mut stderr_task).await {
            Ok(joined) => joined.unwrap_or_default(),
            Err(_) => {
                warn!(timeout = ?request.timeout, "Dump tool stderr still open at deadline");
                stderr_task.abort();
                return Err(DumpError::Timeout {
                    timeout: request.timeout,
                });
            }
        };
        let stderr = String::from_utf8_lossy(&stderr).trim().to_string();

        if !status.success() {
            return Err(DumpError::ProcessFailure {
                exit_code: status.code(),
                diagnostic: stderr,
            });
        }

        if !stderr.is_empty() {
            debug!(stderr = %stderr, "Dump tool wrote to stderr");
        }

        Ok(ToolOutcome { stderr })
    }

    async fn health_check(&self) -> Result<String> {
        let output = Command::new(&self.binary_path)
            .arg("--version")
            .output()
            .await
            .with_context(|| format!("Failed to run {} --version", self.binary_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} health check failed: {}", self.binary_path, stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }
}

/// Write a `[client]` option file holding the credentials.
///
/// NamedTempFile is created with mode 0600 on unix.
fn write_defaults_file(conn: &ConnectionConfig, dir: &Path) -> Result<NamedTempFile, DumpError> {
    let mut file = tempfile::Builder::new()
        .prefix("dbexport_creds_")
        .suffix(".cnf")
        .tempfile_in(dir)?;

    write!(
        file,
        "[client]\nuser=\"{}\"\npassword=\"{}\"\n",
        escape_option_value(conn.username()),
        escape_option_value(conn.password())
    )?;
    file.flush()?;
    Ok(file)
}

/// Escape a value for a double-quoted option file entry
fn escape_option_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Read a stream to the end, keeping only the last `limit` bytes
async fn read_tail<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> Vec<u8> {
    let mut tail = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                tail.extend_from_slice(&buf[..n]);
                if tail.len() > limit {
                    let excess = tail.len() - limit;
                    tail.drain(..excess);
                }
            }
        }
    }
    tail
}
