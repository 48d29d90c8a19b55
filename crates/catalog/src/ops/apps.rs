use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use serde::Serialize;

use crate::{
    AppEntry, CatalogError, Category, Certificate, Price, ResultCatalog, Review, Store,
    app_entries, certificates, reviews, store_apps, stores,
};

use super::{Catalog, ReviewChange, optional_text, required_text, with_tx};

/// Writable fields of an [`AppEntry`].
#[derive(Clone, Debug, Default)]
pub struct AppInput {
    pub name: String,
    /// Two-letter category code, e.g. `"FR"`.
    pub category: String,
    /// `None` keeps the current image on update (and means "no image" on create).
    pub image: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub price: Price,
}

/// An app with everything the detail page shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppDetail {
    pub app: AppEntry,
    pub reviews: Vec<Review>,
    pub certificate: Option<Certificate>,
    pub stores: Vec<Store>,
}

struct ValidApp {
    name: String,
    category: Category,
    image: Option<String>,
    description: Option<String>,
}

fn validate(input: &AppInput) -> ResultCatalog<ValidApp> {
    Ok(ValidApp {
        name: required_text(&input.name, "name", 100)?,
        category: Category::try_from(input.category.as_str())?,
        image: optional_text(input.image.as_deref(), "image", 255)?,
        description: optional_text(input.description.as_deref(), "description", usize::MAX)?,
    })
}

impl Catalog {
    /// Every app, oldest first (primary key ascending).
    pub async fn list_apps(&self) -> ResultCatalog<Vec<AppEntry>> {
        app_entries::Entity::find()
            .order_by_asc(app_entries::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(AppEntry::try_from)
            .collect()
    }

    pub async fn app(&self, id: i32) -> ResultCatalog<AppEntry> {
        let model = app_entries::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("app {id}")))?;
        AppEntry::try_from(model)
    }

    pub async fn app_exists(&self, id: i32) -> ResultCatalog<bool> {
        Ok(app_entries::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .is_some())
    }

    /// Load an app together with its reviews, certificate and stores.
    pub async fn app_detail(&self, id: i32) -> ResultCatalog<AppDetail> {
        let model = app_entries::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("app {id}")))?;

        let stores = model
            .find_related(stores::Entity)
            .order_by_asc(stores::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Store::from)
            .collect();
        let reviews = self.reviews_for_app(id).await?;
        let certificate = self.certificate_for_app(id).await?;

        Ok(AppDetail {
            app: AppEntry::try_from(model)?,
            reviews,
            certificate,
            stores,
        })
    }

    pub async fn create_app(&self, input: AppInput) -> ResultCatalog<AppEntry> {
        self.save_app(None, input, Vec::new()).await
    }

    pub async fn update_app(&self, id: i32, input: AppInput) -> ResultCatalog<AppEntry> {
        self.save_app(Some(id), input, Vec::new()).await
    }

    /// Create (`id == None`) or update an app and apply inline review
    /// changes in a single transaction.
    pub async fn save_app(
        &self,
        id: Option<i32>,
        input: AppInput,
        review_changes: Vec<ReviewChange>,
    ) -> ResultCatalog<AppEntry> {
        let valid = validate(&input)?;
        let saved = with_tx!(self, |db_tx| {
            save_app_rows(&db_tx, id, valid, &input, review_changes).await
        })?;

        tracing::debug!("saved app {} ({})", saved.id, saved.name);
        AppEntry::try_from(saved)
    }

    /// Delete an app with its reviews, certificate and store links.
    ///
    /// Stores themselves are kept. The schema cascades too; the explicit
    /// deletes keep the behavior independent of the SQLite `foreign_keys`
    /// pragma.
    pub async fn delete_app(&self, id: i32) -> ResultCatalog<()> {
        let image = with_tx!(self, |db_tx| delete_app_rows(&db_tx, id).await)?;

        if let Err(err) = self.media.remove(&image).await {
            tracing::warn!("failed to remove image {image} of deleted app {id}: {err}");
        }
        Ok(())
    }
}

async fn save_app_rows(
    db_tx: &DatabaseTransaction,
    id: Option<i32>,
    valid: ValidApp,
    input: &AppInput,
    review_changes: Vec<ReviewChange>,
) -> ResultCatalog<app_entries::Model> {
    let model = match id {
        None => {
            let active = app_entries::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(valid.name),
                image: ActiveValue::Set(valid.image.unwrap_or_default()),
                category: ActiveValue::Set(valid.category.code().to_string()),
                date_added: ActiveValue::Set(Utc::now()),
                description: ActiveValue::Set(valid.description),
                is_active: ActiveValue::Set(input.is_active),
                price_minor: ActiveValue::Set(input.price.minor()),
            };
            active.insert(db_tx).await?
        }
        Some(id) => update_app_row(db_tx, id, valid, input).await?,
    };
    Catalog::apply_review_changes(db_tx, model.id, review_changes).await?;
    Ok(model)
}

async fn update_app_row(
    db_tx: &DatabaseTransaction,
    id: i32,
    valid: ValidApp,
    input: &AppInput,
) -> ResultCatalog<app_entries::Model> {
    let current = app_entries::Entity::find_by_id(id)
        .one(db_tx)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("app {id}")))?;

    let mut active: app_entries::ActiveModel = current.into();
    active.name = ActiveValue::Set(valid.name);
    active.category = ActiveValue::Set(valid.category.code().to_string());
    if let Some(image) = valid.image {
        active.image = ActiveValue::Set(image);
    }
    active.description = ActiveValue::Set(valid.description);
    active.is_active = ActiveValue::Set(input.is_active);
    active.price_minor = ActiveValue::Set(input.price.minor());
    Ok(active.update(db_tx).await?)
}

async fn delete_app_rows(db_tx: &DatabaseTransaction, id: i32) -> ResultCatalog<String> {
    let model = app_entries::Entity::find_by_id(id)
        .one(db_tx)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("app {id}")))?;

    reviews::Entity::delete_many()
        .filter(reviews::Column::AppId.eq(id))
        .exec(db_tx)
        .await?;
    certificates::Entity::delete_many()
        .filter(certificates::Column::AppId.eq(id))
        .exec(db_tx)
        .await?;
    store_apps::Entity::delete_many()
        .filter(store_apps::Column::AppId.eq(id))
        .exec(db_tx)
        .await?;

    let image = model.image.clone();
    model.delete(db_tx).await?;
    Ok(image)
}
