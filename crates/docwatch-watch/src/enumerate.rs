//! File enumeration: resolve a triggered path into document stubs.

use crate::router::should_ignore;
use chrono::{DateTime, Utc};
use docwatch_core::{fuzzy_hash, sha256_hex, Document};
use futures_util::future::join_all;
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Settings and watch-root attribution for one enumeration call.
#[derive(Debug, Clone)]
pub struct EnumerateContext {
    /// Logical name of the watch root, e.g. its directory name.
    pub folder_id: String,
    /// Path of the watch root.
    pub folder_path: String,
    /// Delay before scanning, letting the filesystem quiesce after a write.
    pub settle: Duration,
    pub ignore_patterns: Vec<Pattern>,
}

/// Resolve a watch-root for a triggered path: the registry root containing
/// it. Returns `(folder_id, folder_path)`.
pub fn folder_for(roots: &[PathBuf], path: &Path) -> Option<(String, String)> {
    roots
        .iter()
        .filter(|root| path.starts_with(root))
        .max_by_key(|root| root.components().count())
        .map(|root| {
            let id = root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| root.to_string_lossy().to_string());
            (id, root.to_string_lossy().to_string())
        })
}

/// Produce one document stub per regular file under `path`.
///
/// Directories are traversed recursively; a missing path yields an empty
/// list, not an error, and entries that fail to stat are skipped and logged
/// without failing the batch. Per-file metadata reads fan out as tasks and
/// are joined before returning.
pub async fn enumerate(path: &Path, ctx: &EnumerateContext) -> Vec<Document> {
    if !ctx.settle.is_zero() {
        tokio::time::sleep(ctx.settle).await;
    }

    if !path.exists() {
        debug!("Enumerate: path missing, nothing to do: {:?}", path);
        return Vec::new();
    }

    let files: Vec<PathBuf> = if path.is_dir() {
        walkdir::WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| !should_ignore(p, &ctx.ignore_patterns))
            .collect()
    } else if should_ignore(path, &ctx.ignore_patterns) {
        Vec::new()
    } else {
        vec![path.to_path_buf()]
    };

    let tasks: Vec<_> = files
        .into_iter()
        .map(|file| {
            let folder_id = ctx.folder_id.clone();
            let folder_path = ctx.folder_path.clone();
            tokio::spawn(async move { stub(file, folder_id, folder_path).await })
        })
        .collect();

    let mut documents = Vec::new();
    for joined in join_all(tasks).await {
        match joined {
            Ok(Ok(doc)) => documents.push(doc),
            Ok(Err((file, e))) => warn!("Skipping {:?}: {}", file, e),
            Err(e) => warn!("Enumeration task failed: {}", e),
        }
    }

    debug!("Enumerated {} document(s) under {:?}", documents.len(), path);
    documents
}

/// Build one document stub with metadata and discovery fingerprints.
async fn stub(
    path: PathBuf,
    folder_id: String,
    folder_path: String,
) -> Result<Document, (PathBuf, std::io::Error)> {
    let meta = tokio::fs::metadata(&path)
        .await
        .map_err(|e| (path.clone(), e))?;
    let bytes = tokio::fs::read(&path).await.map_err(|e| (path.clone(), e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    let modified: DateTime<Utc> = meta.modified().map(Into::into).unwrap_or_else(|_| Utc::now());
    // Creation time is unavailable on some filesystems
    let created: DateTime<Utc> = meta.created().map(Into::into).unwrap_or(modified);

    let mut doc = Document::new(folder_id, path.to_string_lossy().to_string())
        .with_name(name)
        .with_extension(extension);
    doc.folder_path = folder_path;
    doc.size = meta.len();
    doc.permissions = permission_string(&meta);
    doc.created_at = created;
    doc.modified_at = modified;
    doc.document_id = sha256_hex(&bytes);
    doc.ssdeep_hash = fuzzy_hash(&bytes);

    Ok(doc)
}

#[cfg(unix)]
fn permission_string(meta: &std::fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:o}", meta.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn permission_string(meta: &std::fs::Metadata) -> String {
    if meta.permissions().readonly() {
        "444".to_string()
    } else {
        "644".to_string()
    }
}
