//! The module contains the `Certificate` struct and its table.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Certificate issued to a single app.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Certificate {
    pub id: i32,
    pub app_id: i32,
    pub certificate_name: String,
    pub certificate_number: String,
    pub issued_by: String,
    pub issue_date: DateTime<Utc>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "certificates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub app_id: i32,
    pub certificate_name: String,
    #[sea_orm(unique)]
    pub certificate_number: String,
    pub issued_by: String,
    pub issue_date: DateTimeUtc,
    pub expiry_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::app_entries::Entity",
        from = "Column::AppId",
        to = "super::app_entries::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    App,
}

impl Related<super::app_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::App.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Certificate {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            app_id: model.app_id,
            certificate_name: model.certificate_name,
            certificate_number: model.certificate_number,
            issued_by: model.issued_by,
            issue_date: model.issue_date,
            expiry_date: model.expiry_date,
        }
    }
}
