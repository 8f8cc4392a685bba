use std::path::{Path, PathBuf};

use axum::body::Bytes;
use uuid::Uuid;

/// Public path prefix the upload directory is served under
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("the uploaded file is not an image")]
    NotAnImage,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An image received in a multipart submission, not yet written to disk.
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Content types accepted as featured images and the extension each one is
/// stored under. The client's file name is never used, so the served
/// content type always matches one of these.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

impl PendingImage {
    /// `None` for anything outside the raster allowlist, SVG included.
    fn extension(&self) -> Option<&'static str> {
        let content_type = self
            .content_type
            .as_deref()?
            .split(';')
            .next()?
            .trim()
            .to_ascii_lowercase();

        IMAGE_TYPES
            .iter()
            .find(|(mime, _)| *mime == content_type)
            .map(|(_, ext)| *ext)
    }
}

/// Writes uploaded images under a directory that is served statically.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(ImageStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores the image under a fresh name and returns its public path.
    pub async fn save(&self, image: PendingImage) -> Result<String, UploadError> {
        let Some(extension) = image.extension() else {
            return Err(UploadError::NotAnImage);
        };

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&file_name), &image.bytes).await?;

        tracing::debug!(
            %file_name,
            original = ?image.file_name,
            size = image.bytes.len(),
            "stored uploaded image"
        );
        Ok(format!("{UPLOADS_ROUTE}/{file_name}"))
    }

    /// Deletes a file previously returned by `save`. Paths outside the
    /// upload route, like the default image, are left alone.
    pub async fn remove(&self, public_path: &str) {
        let Some(file_name) = public_path
            .strip_prefix(UPLOADS_ROUTE)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| {
                !name.is_empty()
                    && !name.starts_with('.')
                    && !name.contains(['/', '\\'])
            })
        else {
            return;
        };

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => tracing::debug!(%file_name, "removed uploaded image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(%file_name, error = %e, "could not remove uploaded image"),
        }
    }
}
