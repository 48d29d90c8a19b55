//! The module contains the `Store` struct and its table.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A store carrying any number of apps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Store {
    pub id: i32,
    pub name: String,
    pub mother_company: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub mother_company: String,
    pub contact_number: Option<String>,
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::store_apps::Entity")]
    StoreApps,
}

impl Related<super::app_entries::Entity> for Entity {
    fn to() -> RelationDef {
        super::store_apps::Relation::App.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::store_apps::Relation::Store.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Store {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            mother_company: model.mother_company,
            contact_number: model.contact_number,
            email: model.email,
        }
    }
}
