//! # Category Repository
//!
//! Store-backed category list. Names are normalized to upper case and kept
//! unique by the `categories.name` UNIQUE constraint.
//!
//! ```text
//! create("books") ──► BOOKS (banned = 0)
//!                        │
//!            ban ◄───────┼───────► unban
//!                        │
//! remove("books") ──► items.category_id = NULL, row deleted
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::generate_id;
use crate::error::{DbError, DbResult};
use swapmart_core::validation::normalize_category_name;
use swapmart_core::{Category, CoreError};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category.
    ///
    /// ## Errors
    /// - `Rule(Validation)` for an empty or malformed name
    /// - `UniqueViolation` when the name exists (case-insensitively)
    pub async fn create(&self, name: &str) -> DbResult<Category> {
        let name = normalize_category_name(name).map_err(CoreError::from)?;
        let category = Category {
            id: generate_id(),
            name,
            banned: false,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO categories (id, name, banned, created_at) VALUES (?, ?, 0, ?)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("category", &category.name),
                other => other,
            })?;

        info!(id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Removes a category. Items listed under it keep existing without one.
    pub async fn remove(&self, name: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let category = fetch_category(&mut tx, name)
            .await?
            .ok_or_else(|| CoreError::CategoryNotFound(name.to_string()))?;

        let detached = sqlx::query("UPDATE items SET category_id = NULL WHERE category_id = ?")
            .bind(&category.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(&category.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(name = %category.name, detached_items = detached, "Category removed");
        Ok(())
    }

    /// Bans a category: existing items stay, new listings are refused.
    pub async fn ban(&self, name: &str) -> DbResult<()> {
        self.set_banned(name, true).await
    }

    /// Lifts a ban.
    pub async fn unban(&self, name: &str) -> DbResult<()> {
        self.set_banned(name, false).await
    }

    async fn set_banned(&self, name: &str, banned: bool) -> DbResult<()> {
        let normalized = normalize_category_name(name).map_err(CoreError::from)?;

        let result = sqlx::query("UPDATE categories SET banned = ? WHERE name = ?")
            .bind(banned)
            .bind(&normalized)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CategoryNotFound(name.to_string()).into());
        }

        debug!(name = %normalized, banned, "Category ban flag updated");
        Ok(())
    }

    /// Whether the named category is banned.
    pub async fn is_banned(&self, name: &str) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let category = fetch_category(&mut conn, name)
            .await?
            .ok_or_else(|| CoreError::CategoryNotFound(name.to_string()))?;
        Ok(category.banned)
    }

    /// Gets a category by name (case-insensitive).
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let mut conn = self.pool.acquire().await?;
        fetch_category(&mut conn, name).await
    }

    /// All categories that accept new listings, alphabetically.
    pub async fn list_valid(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, banned, created_at FROM categories WHERE banned = 0 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }
}

/// Loads a category by name on an existing connection.
///
/// Malformed names cannot exist in the table, so they resolve to `None`.
pub async fn fetch_category(conn: &mut SqliteConnection, name: &str) -> DbResult<Option<Category>> {
    let Ok(normalized) = normalize_category_name(name) else {
        return Ok(None);
    };

    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, banned, created_at FROM categories WHERE name = ?",
    )
    .bind(normalized)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(category)
}

// =============================================================================
// Unit Tests
// =============================================================================
