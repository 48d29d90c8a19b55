//! The module contains the `Review` struct and its table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Ratings go from 0 (not rated) to 5.
pub const MAX_RATING: i32 = 5;

/// A review of an app, together with its author's username.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Review {
    pub id: i32,
    pub app_id: i32,
    pub user_id: i32,
    pub username: String,
    pub review_text: String,
    pub rating: i32,
    pub date_added: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub app_id: i32,
    pub user_id: i32,
    pub review_text: String,
    pub rating: i32,
    pub date_added: DateTimeUtc,
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::app_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::App.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Review {
    pub(crate) fn from_parts(model: Model, username: String) -> Self {
        Self {
            id: model.id,
            app_id: model.app_id,
            user_id: model.user_id,
            username,
            review_text: model.review_text,
            rating: model.rating,
            date_added: model.date_added,
        }
    }
}
