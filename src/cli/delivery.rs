//! Delivering a dump artifact to its destination.
//!
//! The artifact is converted into a deleting guard before any bytes move,
//! so it is removed whether delivery succeeds or not.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::domain::DumpArtifact;

/// Where a dump should end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// Standard output
    Stdout,

    /// A file, or a directory that receives the suggested filename
    Path(PathBuf),
}

impl DeliveryTarget {
    /// `-` means stdout; no argument means the current directory
    pub fn from_arg(arg: Option<PathBuf>) -> Self {
        match arg {
            Some(path) if path.as_os_str() == "-" => DeliveryTarget::Stdout,
            Some(path) => DeliveryTarget::Path(path),
            None => DeliveryTarget::Path(PathBuf::from(".")),
        }
    }
}

/// What was delivered where
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    pub destination: String,
    pub filename: String,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Deliver `artifact` to `target`, then delete it.
pub async fn deliver(artifact: DumpArtifact, target: &DeliveryTarget) -> Result<DeliveryReceipt> {
    match target {
        DeliveryTarget::Stdout => {
            let mut stdout = tokio::io::stdout();
            let mut receipt = deliver_to_writer(artifact, &mut stdout).await?;
            receipt.destination = "-".to_string();
            Ok(receipt)
        }
        DeliveryTarget::Path(path) => deliver_to_path(artifact, path).await,
    }
}

/// Stream the artifact into `writer`, then delete it
pub async fn deliver_to_writer<W>(artifact: DumpArtifact, writer: &mut W) -> Result<DeliveryReceipt>
where
    W: AsyncWrite + Unpin,
{
    let receipt = receipt_for(&artifact, String::new());
    let source = artifact
        .into_temp_path()
        .context("Failed to take ownership of dump file")?;

    let mut file = tokio::fs::File::open(&source)
        .await
        .with_context(|| format!("Failed to open dump: {}", source.display()))?;
    tokio::io::copy(&mut file, writer)
        .await
        .context("Failed to stream dump")?;
    writer.flush().await.context("Failed to flush dump output")?;
    drop(file);

    source.close().context("Failed to remove dump temp file")?;
    Ok(receipt)
}

/// Copy the artifact to `path` atomically, then delete it.
///
/// Bytes land in a sibling temp file first, so a failed copy never leaves a
/// truncated dump at the destination.
pub async fn deliver_to_path(artifact: DumpArtifact, path: &Path) -> Result<DeliveryReceipt> {
    let destination = if path.is_dir() {
        path.join(&artifact.suggested_filename)
    } else {
        path.to_path_buf()
    };
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let receipt = receipt_for(&artifact, destination.display().to_string());
    let source = artifact
        .into_temp_path()
        .context("Failed to take ownership of dump file")?;

    let staging = tempfile::Builder::new()
        .prefix(".dbexport_")
        .suffix(".partial")
        .tempfile_in(&parent)
        .with_context(|| format!("Failed to create file in {}", parent.display()))?;

    {
        let mut reader = tokio::fs::File::open(&source)
            .await
            .with_context(|| format!("Failed to open dump: {}", source.display()))?;
        let mut writer = tokio::fs::File::from_std(staging.reopen()?);
        tokio::io::copy(&mut reader, &mut writer)
            .await
            .with_context(|| format!("Failed to copy dump to {}", destination.display()))?;
        writer.sync_all().await.context("Failed to sync dump")?;
    }

    staging
        .persist(&destination)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", destination.display()))?;
    debug!(destination = %destination.display(), "Dump persisted");

    source.close().context("Failed to remove dump temp file")?;
    info!(destination = %destination.display(), bytes = receipt.size_bytes, "Dump delivered");
    Ok(receipt)
}

fn receipt_for(artifact: &DumpArtifact, destination: String) -> DeliveryReceipt {
    DeliveryReceipt {
        destination,
        filename: artifact.suggested_filename.clone(),
        size_bytes: artifact.size_bytes,
        sha256: artifact.sha256.clone(),
    }
}
