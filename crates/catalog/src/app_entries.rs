//! The module contains the `AppEntry` struct and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::{CatalogError, Category, Price};

/// A cataloged app.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppEntry {
    pub id: i32,
    pub name: String,
    /// Path relative to the media root, empty when no image was uploaded.
    pub image: String,
    pub category: Category,
    pub date_added: DateTime<Utc>,
    pub description: String,
    pub is_active: bool,
    pub price: Price,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "app_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub image: String,
    pub category: String,
    pub date_added: DateTimeUtc,
    pub description: Option<String>,
    pub is_active: bool,
    pub price_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
    #[sea_orm(has_one = "super::certificates::Entity")]
    Certificate,
    #[sea_orm(has_many = "super::store_apps::Entity")]
    StoreApps,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::certificates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Certificate.def()
    }
}

impl Related<super::stores::Entity> for Entity {
    fn to() -> RelationDef {
        super::store_apps::Relation::Store.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::store_apps::Relation::App.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for AppEntry {
    type Error = CatalogError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            image: model.image,
            category: Category::try_from(model.category.as_str())?,
            date_added: model.date_added,
            description: model.description.unwrap_or_default(),
            is_active: model.is_active,
            price: Price::from_minor(model.price_minor)?,
        })
    }
}
