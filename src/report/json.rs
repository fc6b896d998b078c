//! JSON documents written by a run: `{generated_at, kind, payload}`.

use crate::core::domain::error::{ProxmoxResult, ValidationError};
use crate::core::domain::value_object::serde_helpers::system_time;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;
use std::time::SystemTime;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Inventory,
    StorageReport,
    CleanupPlan,
    RunSummary,
}

#[derive(Serialize)]
struct DocumentRef<'a, T> {
    #[serde(with = "system_time")]
    generated_at: SystemTime,
    kind: DocumentKind,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Document<T> {
    kind: DocumentKind,
    payload: T,
}

/// Writes `payload` wrapped in a document envelope, pretty-printed.
pub async fn write_document<T: Serialize>(
    path: &Path,
    kind: DocumentKind,
    payload: &T,
) -> ProxmoxResult<()> {
    let document = DocumentRef {
        generated_at: SystemTime::now(),
        kind,
        payload,
    };
    let json = serde_json::to_vec_pretty(&document)?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), ?kind, "document written");
    Ok(())
}

/// Reads a document and returns its payload.
///
/// # Errors
/// Fails on I/O or JSON errors, or when the document holds a different kind.
pub async fn read_document<T: DeserializeOwned>(
    path: &Path,
    expected: DocumentKind,
) -> ProxmoxResult<T> {
    let bytes = tokio::fs::read(path).await?;
    let document: Document<T> = serde_json::from_slice(&bytes)?;
    if document.kind != expected {
        return Err(ValidationError::ConstraintViolation(format!(
            "{} holds a {:?} document, expected {:?}",
            path.display(),
            document.kind,
            expected
        ))
        .into());
    }
    Ok(document.payload)
}
