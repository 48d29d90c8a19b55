use std::collections::BTreeSet;

use sea_orm::{
    ActiveValue, DatabaseTransaction, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*,
};

use crate::{CatalogError, ResultCatalog, Store, app_entries, store_apps, stores};

use super::{Catalog, optional_text, required_text, with_tx};

/// Writable fields of a [`Store`], including the apps it carries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreInput {
    pub name: String,
    pub mother_company: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    /// Replaces the whole app set of the store.
    pub app_ids: Vec<i32>,
}

struct ValidStore {
    name: String,
    mother_company: String,
    contact_number: Option<String>,
    email: Option<String>,
    app_ids: BTreeSet<i32>,
}

fn validate(input: StoreInput) -> ResultCatalog<ValidStore> {
    let email = optional_text(input.email.as_deref(), "email", 254)?;
    if let Some(email) = &email
        && !is_plausible_email(email)
    {
        return Err(CatalogError::ConstraintViolation(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(ValidStore {
        name: required_text(&input.name, "name", 100)?,
        mother_company: required_text(&input.mother_company, "mother company", 100)?,
        contact_number: optional_text(input.contact_number.as_deref(), "contact number", 20)?,
        email,
        app_ids: input.app_ids.into_iter().collect(),
    })
}

fn is_plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

async fn replace_app_set(
    db_tx: &DatabaseTransaction,
    store_id: i32,
    app_ids: &BTreeSet<i32>,
) -> ResultCatalog<()> {
    if !app_ids.is_empty() {
        let found = app_entries::Entity::find()
            .filter(app_entries::Column::Id.is_in(app_ids.iter().copied()))
            .count(db_tx)
            .await?;
        if found != app_ids.len() as u64 {
            return Err(CatalogError::ConstraintViolation(
                "store references an app that does not exist".to_string(),
            ));
        }
    }

    store_apps::Entity::delete_many()
        .filter(store_apps::Column::StoreId.eq(store_id))
        .exec(db_tx)
        .await?;
    for app_id in app_ids {
        store_apps::Entity::insert(store_apps::ActiveModel {
            store_id: ActiveValue::Set(store_id),
            app_id: ActiveValue::Set(*app_id),
        })
        .exec_without_returning(db_tx)
        .await?;
    }
    Ok(())
}

async fn save_store_rows(
    db_tx: &DatabaseTransaction,
    id: Option<i32>,
    valid: ValidStore,
) -> ResultCatalog<stores::Model> {
    let model = match id {
        None => {
            stores::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(valid.name),
                mother_company: ActiveValue::Set(valid.mother_company),
                contact_number: ActiveValue::Set(valid.contact_number),
                email: ActiveValue::Set(valid.email),
            }
            .insert(db_tx)
            .await?
        }
        Some(id) => {
            let mut active: stores::ActiveModel = stores::Entity::find_by_id(id)
                .one(db_tx)
                .await?
                .ok_or_else(|| CatalogError::NotFound(format!("store {id}")))?
                .into();
            active.name = ActiveValue::Set(valid.name);
            active.mother_company = ActiveValue::Set(valid.mother_company);
            active.contact_number = ActiveValue::Set(valid.contact_number);
            active.email = ActiveValue::Set(valid.email);
            active.update(db_tx).await?
        }
    };
    replace_app_set(db_tx, model.id, &valid.app_ids).await?;
    Ok(model)
}

impl Catalog {
    pub async fn list_stores(&self) -> ResultCatalog<Vec<Store>> {
        Ok(stores::Entity::find()
            .order_by_asc(stores::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Store::from)
            .collect())
    }

    pub async fn store(&self, id: i32) -> ResultCatalog<Store> {
        stores::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Store::from)
            .ok_or_else(|| CatalogError::NotFound(format!("store {id}")))
    }

    /// Stores whose app set contains `app_id`, by store id. Empty when none
    /// match (including when the app does not exist).
    pub async fn stores_carrying(&self, app_id: i32) -> ResultCatalog<Vec<Store>> {
        let models = stores::Entity::find()
            .join(JoinType::InnerJoin, stores::Relation::StoreApps.def())
            .filter(store_apps::Column::AppId.eq(app_id))
            .order_by_asc(stores::Column::Id)
            .all(&self.database)
            .await?;
        tracing::debug!("{} stores carry app {app_id}", models.len());
        Ok(models.into_iter().map(Store::from).collect())
    }

    /// Ids of the apps a store carries, ascending.
    pub async fn store_app_ids(&self, store_id: i32) -> ResultCatalog<Vec<i32>> {
        Ok(store_apps::Entity::find()
            .filter(store_apps::Column::StoreId.eq(store_id))
            .order_by_asc(store_apps::Column::AppId)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|link| link.app_id)
            .collect())
    }

    pub async fn create_store(&self, input: StoreInput) -> ResultCatalog<Store> {
        let valid = validate(input)?;
        let model = with_tx!(self, |db_tx| save_store_rows(&db_tx, None, valid).await)?;
        Ok(Store::from(model))
    }

    pub async fn update_store(&self, id: i32, input: StoreInput) -> ResultCatalog<Store> {
        let valid = validate(input)?;
        let model = with_tx!(self, |db_tx| save_store_rows(&db_tx, Some(id), valid).await)?;
        Ok(Store::from(model))
    }

    /// Delete a store. Only its app links go with it; the apps stay.
    pub async fn delete_store(&self, id: i32) -> ResultCatalog<()> {
        with_tx!(self, |db_tx| {
            store_apps::Entity::delete_many()
                .filter(store_apps::Column::StoreId.eq(id))
                .exec(&db_tx)
                .await?;
            let res = stores::Entity::delete_by_id(id).exec(&db_tx).await?;
            if res.rows_affected == 0 {
                Err(CatalogError::NotFound(format!("store {id}")))
            } else {
                Ok(())
            }
        })
    }
}
