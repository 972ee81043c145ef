//! # Repository Module
//!
//! Database repository implementations for Swapmart.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Read paths (views, admin, tests)                                      │
//! │       db.swaps().list_pending_for_owner(owner, page)                   │
//! │       └── repository struct holding a SqlitePool                       │
//! │                                                                         │
//! │  Write paths (engine operations)                                       │
//! │       let mut tx = db.begin().await?;                                  │
//! │       item::fetch_item(&mut tx, id)                                    │
//! │       swap::transition_swap(&mut tx, id, from, to)                     │
//! │       ledger::append_entry(&mut tx, &entry)                            │
//! │       tx.commit().await?;                                              │
//! │       └── free functions taking &mut SqliteConnection                  │
//! │                                                                         │
//! │  Pool methods acquire one connection and call the same free functions, │
//! │  so each query is written once.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Users and lookups
//! - [`ItemRepository`](item::ItemRepository) - Listings and the sold flag
//! - [`CategoryRepository`](category::CategoryRepository) - Category table
//! - [`SwapRequestRepository`](swap::SwapRequestRepository) - Swap requests and views
//! - [`LedgerRepository`](ledger::LedgerRepository) - Append-only settlement history

pub mod category;
pub mod item;
pub mod ledger;
pub mod swap;
pub mod user;

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time truncated to whole seconds, as stored in `sold_at`.
pub fn now_seconds() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by repository tests.

    use swapmart_core::{Item, NewItem, NewUser, User};

    use crate::pool::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn user(db: &Database, handle: &str) -> User {
        db.users()
            .insert(&NewUser {
                name: format!("{handle} name"),
                user_name: handle.to_string(),
                email: format!("{handle}@example.com"),
                phone_number: format!("555-{handle}"),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn item(db: &Database, owner: &User, name: &str, price_cents: i64) -> Item {
        db.items()
            .register(&NewItem {
                name: name.to_string(),
                description: None,
                category: "general".to_string(),
                price_cents,
                owner_id: owner.id.clone(),
            })
            .await
            .unwrap()
    }

    /// Database with a `GENERAL` category already created.
    pub async fn seeded_db() -> Database {
        let db = test_db().await;
        db.categories().create("general").await.unwrap();
        db
    }
}
