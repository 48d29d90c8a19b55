use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    CatalogError, MAX_RATING, ResultCatalog, Review, app_entries, reviews, users,
};

use super::{Catalog, with_tx};

/// Writable fields of a [`Review`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewInput {
    pub app_id: i32,
    pub user_id: i32,
    pub review_text: String,
    pub rating: i32,
}

/// One inline edit on the reviews of an app.
///
/// Inside [`Catalog::save_app`] the `app_id` of every input is replaced by
/// the id of the app being saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewChange {
    Add(ReviewInput),
    Update(i32, ReviewInput),
    Delete(i32),
}

fn validate_rating(rating: i32) -> ResultCatalog<()> {
    if !(0..=MAX_RATING).contains(&rating) {
        return Err(CatalogError::ConstraintViolation(format!(
            "rating must be between 0 and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

async fn ensure_references<C: ConnectionTrait>(db: &C, input: &ReviewInput) -> ResultCatalog<()> {
    if app_entries::Entity::find_by_id(input.app_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(CatalogError::ConstraintViolation(format!(
            "app {} does not exist",
            input.app_id
        )));
    }
    if users::Entity::find_by_id(input.user_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(CatalogError::ConstraintViolation(format!(
            "user {} does not exist",
            input.user_id
        )));
    }
    Ok(())
}

async fn insert_review(db_tx: &DatabaseTransaction, input: ReviewInput) -> ResultCatalog<i32> {
    validate_rating(input.rating)?;
    ensure_references(db_tx, &input).await?;
    let active = reviews::ActiveModel {
        id: ActiveValue::NotSet,
        app_id: ActiveValue::Set(input.app_id),
        user_id: ActiveValue::Set(input.user_id),
        review_text: ActiveValue::Set(input.review_text.trim().to_string()),
        rating: ActiveValue::Set(input.rating),
        date_added: ActiveValue::Set(Utc::now()),
    };
    Ok(active.insert(db_tx).await?.id)
}

async fn update_review_row(
    db_tx: &DatabaseTransaction,
    id: i32,
    input: ReviewInput,
    only_app: Option<i32>,
) -> ResultCatalog<i32> {
    validate_rating(input.rating)?;
    ensure_references(db_tx, &input).await?;

    let mut query = reviews::Entity::find_by_id(id);
    if let Some(app_id) = only_app {
        query = query.filter(reviews::Column::AppId.eq(app_id));
    }
    let current = query
        .one(db_tx)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("review {id}")))?;

    let mut active: reviews::ActiveModel = current.into();
    active.app_id = ActiveValue::Set(input.app_id);
    active.user_id = ActiveValue::Set(input.user_id);
    active.review_text = ActiveValue::Set(input.review_text.trim().to_string());
    active.rating = ActiveValue::Set(input.rating);
    Ok(active.update(db_tx).await?.id)
}

impl Catalog {
    /// Reviews of an app with their authors, oldest first.
    pub async fn reviews_for_app(&self, app_id: i32) -> ResultCatalog<Vec<Review>> {
        let rows = reviews::Entity::find()
            .filter(reviews::Column::AppId.eq(app_id))
            .find_also_related(users::Entity)
            .order_by_asc(reviews::Column::DateAdded)
            .order_by_asc(reviews::Column::Id)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(review, user)| {
                let username = user.map(|u| u.username).unwrap_or_default();
                Review::from_parts(review, username)
            })
            .collect())
    }

    pub async fn review(&self, id: i32) -> ResultCatalog<Review> {
        let (review, user) = reviews::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("review {id}")))?;
        Ok(Review::from_parts(
            review,
            user.map(|u| u.username).unwrap_or_default(),
        ))
    }

    pub async fn add_review(&self, input: ReviewInput) -> ResultCatalog<Review> {
        let id = with_tx!(self, |db_tx| insert_review(&db_tx, input).await)?;
        self.review(id).await
    }

    pub async fn update_review(&self, id: i32, input: ReviewInput) -> ResultCatalog<Review> {
        let id = with_tx!(self, |db_tx| {
            update_review_row(&db_tx, id, input, None).await
        })?;
        self.review(id).await
    }

    pub async fn delete_review(&self, id: i32) -> ResultCatalog<()> {
        let res = reviews::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(CatalogError::NotFound(format!("review {id}")));
        }
        Ok(())
    }

    pub(super) async fn apply_review_changes(
        db_tx: &DatabaseTransaction,
        app_id: i32,
        changes: Vec<ReviewChange>,
    ) -> ResultCatalog<()> {
        for change in changes {
            match change {
                ReviewChange::Add(input) => {
                    insert_review(db_tx, ReviewInput { app_id, ..input }).await?;
                }
                ReviewChange::Update(id, input) => {
                    update_review_row(db_tx, id, ReviewInput { app_id, ..input }, Some(app_id))
                        .await?;
                }
                ReviewChange::Delete(id) => {
                    reviews::Entity::delete_many()
                        .filter(reviews::Column::Id.eq(id))
                        .filter(reviews::Column::AppId.eq(app_id))
                        .exec(db_tx)
                        .await?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_accepts_zero_to_five() {
        for rating in 0..=5 {
            assert!(validate_rating(rating).is_ok());
        }
    }

    #[test]
    fn rating_outside_range_violates_constraint() {
        assert!(matches!(
            validate_rating(6),
            Err(CatalogError::ConstraintViolation(_))
        ));
        assert!(matches!(
            validate_rating(-1),
            Err(CatalogError::ConstraintViolation(_))
        ));
    }
}
