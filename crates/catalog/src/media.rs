//! Storage for uploaded app images.
//!
//! Files live under `<root>/mini_apps/` and rows keep only the path relative
//! to `root`, so the media root can move without touching the database.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{CatalogError, ResultCatalog};

/// Sub-directory of the media root holding app images.
pub const UPLOAD_DIR: &str = "mini_apps";

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `bytes` as a new image and return its relative path.
    ///
    /// The stored name is random; only the extension of `file_name` is kept.
    pub async fn save_image(&self, file_name: &str, bytes: &[u8]) -> ResultCatalog<String> {
        if bytes.is_empty() {
            return Err(CatalogError::Validation("uploaded image is empty".to_string()));
        }
        let extension = image_extension(file_name)?;

        let dir = self.root.join(UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let stored = format!("{}.{extension}", Uuid::new_v4().simple());
        let path = dir.join(&stored);
        {
            let mut file = tokio::fs::File::create(&path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
        }
        tracing::debug!("stored image {} ({} bytes)", path.display(), bytes.len());

        Ok(format!("{UPLOAD_DIR}/{stored}"))
    }

    /// Remove a previously stored image. Missing files are ignored.
    pub async fn remove(&self, relative: &str) -> ResultCatalog<()> {
        if relative.is_empty() {
            return Ok(());
        }
        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn image_extension(file_name: &str) -> ResultCatalog<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            CatalogError::Validation(format!("image {file_name:?} has no extension"))
        })?;

    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CatalogError::Validation(format!(
            "unsupported image type: .{extension}"
        )));
    }
    Ok(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_normalized() {
        assert_eq!(image_extension("Logo.PNG").unwrap(), "png");
        assert_eq!(image_extension("a.b.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn non_images_are_rejected() {
        assert!(image_extension("notes.txt").is_err());
        assert!(image_extension("README").is_err());
    }
}
