//! Storage for uploaded images (menu photos, hero banner, about section,
//! profile photos) beneath `<data_dir>/public/uploads`, served at `/uploads`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploaded file is empty")]
    Empty,
    #[error("invalid upload path")]
    InvalidPath,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written by [`UploadStorage::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    subdir: Option<String>,
    file_name: String,
}

impl StoredUpload {
    /// Bare file name, e.g. `hero_<uuid>.png`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Path relative to the web root, e.g. `uploads/profiles/photo_<uuid>.jpg`.
    #[must_use]
    pub fn relative_path(&self) -> String {
        match &self.subdir {
            Some(dir) => format!("uploads/{dir}/{}", self.file_name),
            None => format!("uploads/{}", self.file_name),
        }
    }

    /// Absolute URL path, e.g. `/uploads/profiles/photo_<uuid>.jpg`.
    #[must_use]
    pub fn url_path(&self) -> String {
        format!("/{}", self.relative_path())
    }
}

#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `data` under a fresh name `<prefix>_<uuid><ext>`, keeping the
    /// extension of `original_name` when it looks sane.
    pub async fn save(
        &self,
        prefix: &str,
        subdir: Option<&str>,
        original_name: Option<&str>,
        data: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }

        let file_name = format!(
            "{prefix}_{}{}",
            Uuid::new_v4().simple(),
            original_name.map(extension).unwrap_or_default()
        );

        let dir = match subdir {
            Some(sub) => self.root.join(sub),
            None => self.root.clone(),
        };
        fs::create_dir_all(&dir).await?;

        let temp_path = dir.join(format!(".{file_name}.tmp"));
        let mut file = File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, dir.join(&file_name)).await?;

        tracing::debug!("Stored upload {} ({} bytes)", file_name, data.len());

        Ok(StoredUpload {
            subdir: subdir.map(str::to_string),
            file_name,
        })
    }

    /// Deletes a stored file. Accepts a bare file name, a relative path or a
    /// URL path as handed out by [`StoredUpload`]. Returns `false` when the
    /// file was already gone.
    pub async fn remove(&self, stored: &str) -> Result<bool, UploadError> {
        let path = self.resolve(stored)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(UploadError::Io(e)),
        }
    }

    /// Best-effort cleanup used after a replace has committed.
    pub async fn remove_all<I, S>(&self, stored: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in stored {
            let item = item.as_ref();
            if let Err(e) = self.remove(item).await {
                tracing::warn!("Failed to delete old upload {}: {}", item, e);
            }
        }
    }

    fn resolve(&self, stored: &str) -> Result<PathBuf, UploadError> {
        let trimmed = stored.trim_start_matches('/');
        let relative = trimmed.strip_prefix("uploads/").unwrap_or(trimmed);
        let relative = Path::new(relative);

        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(UploadError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }
}

fn extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
