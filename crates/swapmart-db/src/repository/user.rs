//! # User Repository
//!
//! Lookups used to resolve swap parties and snapshot them into the ledger.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use swapmart_core::{NewUser, User};

const USER_COLUMNS: &str = "id, name, user_name, email, phone_number, gender, location, \
                            profile_url, profile_icon, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        fetch_user(&mut conn, id).await
    }

    /// Registers a user with a generated id.
    ///
    /// ## Errors
    /// `UniqueViolation` when the user name, email or phone number is taken.
    pub async fn insert(&self, new_user: &NewUser) -> DbResult<User> {
        let now = Utc::now();
        let user = User {
            id: generate_id(),
            name: new_user.name.trim().to_string(),
            user_name: new_user.user_name.trim().to_string(),
            email: new_user.email.trim().to_lowercase(),
            phone_number: new_user.phone_number.trim().to_string(),
            gender: new_user.gender.clone(),
            location: new_user.location.clone(),
            profile_url: None,
            profile_icon: None,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %user.id, user_name = %user.user_name, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, user_name, email, phone_number, gender, location,
                profile_url, profile_icon, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.gender)
        .bind(&user.location)
        .bind(&user.profile_url)
        .bind(&user.profile_icon)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, user.user_name.clone())
            }
            other => other,
        })?;

        Ok(user)
    }

    /// Finds a user by email (case-insensitive) or exact user name.
    pub async fn find_by_email_or_username(&self, identifier: &str) -> DbResult<Option<User>> {
        let identifier = identifier.trim();
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = lower(?) OR user_name = ? LIMIT 1"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(identifier)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Counts all users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Loads a user on an existing connection or transaction.
pub async fn fetch_user(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{test_db, user};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let ada = user(&db, "ada").await;

        let found = db.users().get_by_id(&ada.id).await.unwrap().unwrap();
        assert_eq!(found.user_name, "ada");
        assert_eq!(found.email, "ada@example.com");

        let by_email = db
            .users()
            .find_by_email_or_username("ADA@example.com")
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(ada.id.clone()));

        let by_handle = db.users().find_by_email_or_username("ada").await.unwrap();
        assert!(by_handle.is_some());

        assert!(db.users().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_name_rejected() {
        let db = test_db().await;
        user(&db, "bob").await;

        let err = db
            .users()
            .insert(&NewUser {
                name: "Other Bob".to_string(),
                user_name: "bob".to_string(),
                email: "other@example.com".to_string(),
                phone_number: "555-other".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(db.users().count().await.unwrap(), 1);
    }
}
