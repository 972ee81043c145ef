//! # Item Repository
//!
//! Listings and the one-way `sold` flag.
//!
//! ## The Sold Flag
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE items SET sold = 1, sold_at = ? WHERE id = ? AND sold = 0      │
//! │                                                                         │
//! │  rows_affected = 1  → this settlement owns the item                    │
//! │  rows_affected = 0  → someone else sold it first → DbError::Conflict   │
//! │                       (the caller's transaction rolls back)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::category::fetch_category;
use super::generate_id;
use crate::error::{DbError, DbResult};
use swapmart_core::validation::{validate_item_name, validate_price_cents};
use swapmart_core::{CoreError, Item, NewItem, Page};

/// `SELECT` list shared by every item query; joins the category name.
macro_rules! item_select {
    () => {
        r#"
        SELECT
            i.id,
            i.name,
            i.description,
            i.category_id,
            c.name AS category_name,
            i.price_cents,
            i.sold,
            i.sold_at,
            i.owner_id,
            i.created_at,
            i.updated_at
        FROM items i
        LEFT JOIN categories c ON c.id = i.category_id
        "#
    };
}

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Gets an item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let mut conn = self.pool.acquire().await?;
        fetch_item(&mut conn, id).await
    }

    /// Lists a new item for `new_item.owner_id`.
    ///
    /// ## Errors
    /// - `Rule(Validation)` for an empty name or negative price
    /// - `Rule(UserNotFound)` for an unknown owner
    /// - `Rule(CategoryNotFound)` / `Rule(CategoryBanned)`
    pub async fn register(&self, new_item: &NewItem) -> DbResult<Item> {
        validate_item_name(&new_item.name).map_err(CoreError::from)?;
        validate_price_cents(new_item.price_cents).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let owner_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
            .bind(&new_item.owner_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owner_exists.is_none() {
            return Err(CoreError::UserNotFound(new_item.owner_id.clone()).into());
        }

        let category = fetch_category(&mut tx, &new_item.category)
            .await?
            .ok_or_else(|| CoreError::CategoryNotFound(new_item.category.clone()))?;
        if category.banned {
            return Err(CoreError::CategoryBanned(category.name).into());
        }

        let now = Utc::now();
        let item = Item {
            id: generate_id(),
            name: new_item.name.trim().to_string(),
            description: new_item.description.clone(),
            category_id: Some(category.id),
            category_name: Some(category.name),
            price_cents: new_item.price_cents,
            sold: false,
            sold_at: None,
            owner_id: new_item.owner_id.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, description, category_id, price_cents,
                sold, sold_at, owner_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 0, NULL, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category_id)
        .bind(item.price_cents)
        .bind(&item.owner_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %item.id, owner_id = %item.owner_id, price = %item.price(), "Item registered");
        Ok(item)
    }

    /// Items listed by `owner_id`, newest first.
    pub async fn list_by_owner(&self, owner_id: &str, page: Page) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(concat!(
            item_select!(),
            "WHERE i.owner_id = ? ORDER BY i.created_at DESC, i.rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(owner_id)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Unsold items in a category, newest first.
    ///
    /// An unknown category yields an empty list.
    pub async fn list_unsold_by_category(&self, category: &str, page: Page) -> DbResult<Vec<Item>> {
        let Ok(normalized) = swapmart_core::validation::normalize_category_name(category) else {
            return Ok(Vec::new());
        };

        let items = sqlx::query_as::<_, Item>(concat!(
            item_select!(),
            "WHERE c.name = ? AND i.sold = 0 ORDER BY i.created_at DESC, i.rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(normalized)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Counts all items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Loads an item on an existing connection or transaction.
pub async fn fetch_item(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(concat!(item_select!(), "WHERE i.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(item)
}

/// Flips `sold` to true if it is still false.
///
/// ## Errors
/// `Conflict` when the item was already sold (or does not exist).
pub async fn mark_item_sold(
    conn: &mut SqliteConnection,
    id: &str,
    sold_at: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE items SET sold = 1, sold_at = ?, updated_at = ? WHERE id = ? AND sold = 0",
    )
    .bind(sold_at)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict("Item", id));
    }

    debug!(item_id = %id, "Item marked sold");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::now_seconds;
    use crate::repository::test_support::{item, seeded_db, user};

    #[tokio::test]
    async fn test_register_and_get() {
        let db = seeded_db().await;
        let owner = user(&db, "ann").await;
        let lamp = item(&db, &owner, "Lamp", 1_500).await;

        let found = db.items().get_by_id(&lamp.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Lamp");
        assert_eq!(found.price_cents, 1_500);
        assert_eq!(found.category_name.as_deref(), Some("GENERAL"));
        assert!(!found.sold);
        assert!(found.sold_at.is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let db = seeded_db().await;
        let owner = user(&db, "ann").await;
        let base = NewItem {
            name: "Chair".to_string(),
            description: None,
            category: "general".to_string(),
            price_cents: 2_000,
            owner_id: owner.id.clone(),
        };

        let negative = NewItem { price_cents: -1, ..base.clone() };
        assert!(matches!(
            db.items().register(&negative).await,
            Err(DbError::Rule(CoreError::Validation(_)))
        ));

        let unknown = NewItem { category: "spaceships".to_string(), ..base.clone() };
        assert!(matches!(
            db.items().register(&unknown).await,
            Err(DbError::Rule(CoreError::CategoryNotFound(_)))
        ));

        let orphan = NewItem { owner_id: "nobody".to_string(), ..base.clone() };
        assert!(matches!(
            db.items().register(&orphan).await,
            Err(DbError::Rule(CoreError::UserNotFound(_)))
        ));

        db.categories().ban("general").await.unwrap();
        assert!(matches!(
            db.items().register(&base).await,
            Err(DbError::Rule(CoreError::CategoryBanned(_)))
        ));

        assert_eq!(db.items().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_item_sold_only_once() {
        let db = seeded_db().await;
        let owner = user(&db, "ann").await;
        let lamp = item(&db, &owner, "Lamp", 1_500).await;

        let sold_at = now_seconds();
        let mut conn = db.pool().acquire().await.unwrap();
        mark_item_sold(&mut conn, &lamp.id, sold_at).await.unwrap();

        let second = mark_item_sold(&mut conn, &lamp.id, now_seconds()).await;
        assert!(matches!(second, Err(DbError::Conflict { .. })));

        let found = fetch_item(&mut conn, &lamp.id).await.unwrap().unwrap();
        assert!(found.sold);
        assert_eq!(found.sold_at, Some(sold_at));
    }

    #[tokio::test]
    async fn test_listing_queries() {
        let db = seeded_db().await;
        db.categories().create("books").await.unwrap();
        let owner = user(&db, "ann").await;

        let first = item(&db, &owner, "Lamp", 1_500).await;
        let second = item(&db, &owner, "Rug", 4_000).await;

        let mine = db.items().list_by_owner(&owner.id, Page::default()).await.unwrap();
        assert_eq!(
            mine.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            vec![second.id.as_str(), first.id.as_str()]
        );

        let page_two = db.items().list_by_owner(&owner.id, Page::new(1, 2)).await.unwrap();
        assert_eq!(page_two.len(), 1);
        assert_eq!(page_two[0].id, first.id);

        {
            let mut conn = db.pool().acquire().await.unwrap();
            mark_item_sold(&mut conn, &first.id, now_seconds()).await.unwrap();
        }

        let unsold = db
            .items()
            .list_unsold_by_category("general", Page::default())
            .await
            .unwrap();
        assert_eq!(unsold.len(), 1);
        assert_eq!(unsold[0].id, second.id);

        let empty = db
            .items()
            .list_unsold_by_category("books", Page::default())
            .await
            .unwrap();
        assert!(empty.is_empty());
    }
}
