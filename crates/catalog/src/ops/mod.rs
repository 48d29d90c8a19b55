use std::path::{Path, PathBuf};

use sea_orm::DatabaseConnection;

use crate::{CatalogError, MediaStore, ResultCatalog};

mod apps;
mod certificates;
mod reviews;
mod stores;
mod users;

pub use apps::{AppDetail, AppInput};
pub use certificates::CertificateInput;
pub use reviews::{ReviewChange, ReviewInput};
pub use stores::StoreInput;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Catalog {
    database: DatabaseConnection,
    media: MediaStore,
}

impl Catalog {
    /// Return a builder for `Catalog`.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    pub fn media_root(&self) -> &Path {
        self.media.root()
    }

    /// Store an uploaded image under the media root; see [`MediaStore::save_image`].
    pub async fn save_image(&self, file_name: &str, bytes: &[u8]) -> ResultCatalog<String> {
        self.media.save_image(file_name, bytes).await
    }

    /// Drop an image that was stored but never referenced by a saved row.
    pub async fn discard_image(&self, relative: &str) -> ResultCatalog<()> {
        self.media.remove(relative).await
    }
}

/// Trim `value` and check it is non-empty and at most `max` characters.
fn required_text(value: &str, label: &str, max: usize) -> ResultCatalog<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::ConstraintViolation(format!(
            "{label} must not be empty"
        )));
    }
    bounded(trimmed, label, max)
}

/// Like [`required_text`], but blank input becomes `None`.
fn optional_text(value: Option<&str>, label: &str, max: usize) -> ResultCatalog<Option<String>> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| bounded(s, label, max))
        .transpose()
}

fn bounded(value: &str, label: &str, max: usize) -> ResultCatalog<String> {
    if value.chars().count() > max {
        return Err(CatalogError::ConstraintViolation(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// The builder for `Catalog`
#[derive(Default)]
pub struct CatalogBuilder {
    database: DatabaseConnection,
    media_root: Option<PathBuf>,
}

impl CatalogBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> CatalogBuilder {
        self.database = db;
        self
    }

    /// Directory uploaded images are written to. Defaults to `media`.
    pub fn media_root(mut self, root: impl Into<PathBuf>) -> CatalogBuilder {
        self.media_root = Some(root.into());
        self
    }

    /// Construct `Catalog`
    pub fn build(self) -> Catalog {
        let root = self.media_root.unwrap_or_else(|| PathBuf::from("media"));
        Catalog {
            database: self.database,
            media: MediaStore::new(root),
        }
    }
}
