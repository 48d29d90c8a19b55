//! Data model and query layer of the app catalog.
//!
//! Every read or write goes through [`Catalog`]. Relationships are never
//! loaded lazily: each traversal (reviews of an app, stores carrying an app,
//! ...) has its own method.

pub use app_entries::AppEntry;
pub use category::Category;
pub use certificates::Certificate;
pub use error::CatalogError;
pub use media::MediaStore;
pub use ops::{
    AppDetail, AppInput, Catalog, CatalogBuilder, CertificateInput, ReviewChange, ReviewInput,
    StoreInput,
};
pub use price::Price;
pub use reviews::{MAX_RATING, Review};
pub use stores::Store;
pub use users::User;

pub mod app_entries;
pub mod certificates;
pub mod reviews;
pub mod store_apps;
pub mod stores;
pub mod users;

mod category;
mod error;
mod media;
mod ops;
mod price;

type ResultCatalog<T> = Result<T, CatalogError>;
