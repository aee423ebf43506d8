/// Local upload collaborator
///
/// Stores uploaded images in a media directory on disk and hands back a
/// `file://` URL. The bytes are sniffed with the `image` crate first so a
/// renamed text file never ends up in the catalog.
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{Pending, Uploader};
use crate::config::PermittedType;
use crate::state::upload::CandidateFile;

pub struct LocalUploader {
    media_dir: PathBuf,
    permitted: Vec<PermittedType>,
}

impl LocalUploader {
    pub fn new(media_dir: impl Into<PathBuf>, permitted: Vec<PermittedType>) -> Self {
        Self {
            media_dir: media_dir.into(),
            permitted,
        }
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }
}

impl Uploader for LocalUploader {
    fn permitted_types(&self) -> &[PermittedType] {
        &self.permitted
    }

    fn upload(&self, file: CandidateFile) -> Pending<Result<String, String>> {
        let media_dir = self.media_dir.clone();
        Box::pin(async move {
            // Spawn blocking task for CPU-bound decoding and disk IO
            tokio::task::spawn_blocking(move || store_blocking(&media_dir, &file))
                .await
                .map_err(|e| format!("Task join error: {}", e))?
        })
    }
}

/// Blocking version of the upload
fn store_blocking(media_dir: &Path, file: &CandidateFile) -> Result<String, String> {
    let format = image::guess_format(&file.bytes)
        .map_err(|_| format!("{} is not a recognised image", file.name))?;

    std::fs::create_dir_all(media_dir)
        .map_err(|e| format!("Failed to create media directory: {}", e))?;

    let target = media_dir.join(stored_name(&file.name, Utc::now().timestamp_millis()));
    std::fs::write(&target, &file.bytes).map_err(|e| format!("Failed to write image: {}", e))?;

    info!(path = %target.display(), ?format, "image stored");
    Ok(file_url(&target))
}

/// Timestamp-prefixed file name with anything unusual replaced by '_'
fn stored_name(original: &str, millis: i64) -> String {
    let cleaned: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}-{}", millis, cleaned)
}

fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}
