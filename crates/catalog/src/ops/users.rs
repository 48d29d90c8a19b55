use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};

use crate::{CatalogError, ResultCatalog, User, users};

use super::{Catalog, required_text};

fn hash_password(password: &str) -> ResultCatalog<String> {
    if password.is_empty() {
        return Err(CatalogError::ConstraintViolation(
            "password must not be empty".to_string(),
        ));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CatalogError::Password(err.to_string()))
}

fn verify_password(password: &str, hash: &str) -> ResultCatalog<bool> {
    let parsed = PasswordHash::new(hash).map_err(|err| CatalogError::Password(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Argon2 is CPU-bound; run it on the blocking pool.
async fn blocking<T, F>(work: F) -> ResultCatalog<T>
where
    T: Send + 'static,
    F: FnOnce() -> ResultCatalog<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| CatalogError::Password(err.to_string()))?
}

impl Catalog {
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_staff: bool,
    ) -> ResultCatalog<User> {
        let username = required_text(username, "username", 150)?;
        if users::Entity::find()
            .filter(users::Column::Username.eq(username.as_str()))
            .one(&self.database)
            .await?
            .is_some()
        {
            return Err(CatalogError::ConstraintViolation(format!(
                "username {username} is taken"
            )));
        }

        let password = password.to_string();
        let password_hash = blocking(move || hash_password(&password)).await?;
        let model = users::ActiveModel {
            id: ActiveValue::NotSet,
            username: ActiveValue::Set(username),
            password_hash: ActiveValue::Set(password_hash),
            is_staff: ActiveValue::Set(is_staff),
        }
        .insert(&self.database)
        .await?;
        tracing::info!("created user {}", model.username);
        Ok(User::from(model))
    }

    pub async fn list_users(&self) -> ResultCatalog<Vec<User>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::from)
            .collect())
    }

    /// Return the user when `password` matches, `None` otherwise.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultCatalog<Option<User>> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        let password = password.to_string();
        let hash = model.password_hash.clone();
        if !blocking(move || verify_password(&password, &hash)).await? {
            return Ok(None);
        }
        Ok(Some(User::from(model)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
    }

    #[test]
    fn verify_matches_only_the_hashed_password() {
        let hash = hash_password("secret").unwrap();
        assert!(verify_password("secret", &hash).unwrap());
        assert!(!verify_password("Secret", &hash).unwrap());
        assert!(matches!(
            verify_password("secret", "not a phc string"),
            Err(CatalogError::Password(_))
        ));
    }

    #[tokio::test]
    async fn hashing_runs_on_the_blocking_pool() {
        let hash = blocking(|| hash_password("secret")).await.unwrap();
        let verified = blocking(move || verify_password("secret", &hash))
            .await
            .unwrap();
        assert!(verified);
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(
            hash_password(""),
            Err(CatalogError::ConstraintViolation(_))
        ));
    }
}
