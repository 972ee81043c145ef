//! # Swap Request Repository
//!
//! Storage for swap requests plus the enriched read models the HTTP layer
//! shows to owners and initiators.
//!
//! ## Guarded Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transition_swap(id, from, to)                                         │
//! │     UPDATE swap_requests SET state = :to WHERE id = ? AND state = :from│
//! │                                                                         │
//! │  Two owners pressing "accept" at once:                                 │
//! │     tx A: pending → completed   rows_affected = 1  ✓                   │
//! │     tx B: pending → completed   rows_affected = 0  → Conflict, rollback│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `(initiator_id, item2_id)` UNIQUE index backs the one-request-per-pair
//! rule; re-offers go through [`reoffer_swap`] instead of a second insert.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use super::generate_id;
use super::item::fetch_item;
use super::user::fetch_user;
use crate::error::{DbError, DbResult};
use swapmart_core::settlement::balance_owed;
use swapmart_core::{
    EnrichedSwapRequest, IncompleteSwap, Item, ItemDetails, Page, SwapRequest, SwapState,
};

const SWAP_COLUMNS: &str =
    "id, item1_id, item2_id, owner_id, initiator_id, state, created_at, updated_at";

/// Repository for swap request reads.
#[derive(Debug, Clone)]
pub struct SwapRequestRepository {
    pool: SqlitePool,
}

impl SwapRequestRepository {
    /// Creates a new SwapRequestRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SwapRequestRepository { pool }
    }

    /// Gets a swap request by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SwapRequest>> {
        let mut conn = self.pool.acquire().await?;
        fetch_swap(&mut conn, id).await
    }

    /// Pending requests targeting `owner_id`'s items, newest first, with both
    /// items and the initiator's profile.
    ///
    /// ## Errors
    /// `NotFound` naming the first item or user a listed request points at
    /// that no longer exists. The page is never returned short.
    pub async fn list_pending_for_owner(
        &self,
        owner_id: &str,
        page: Page,
    ) -> DbResult<Vec<EnrichedSwapRequest>> {
        let mut conn = self.pool.acquire().await?;
        let requests = list_by_owner_and_state(&mut conn, owner_id, SwapState::Pending, page).await?;

        let mut enriched = Vec::with_capacity(requests.len());
        for request in &requests {
            let item1 = require_item(&mut conn, request, &request.item1_id).await?;
            let item2 = require_item(&mut conn, request, &request.item2_id).await?;
            let initiator = fetch_user(&mut conn, &request.initiator_id)
                .await?
                .ok_or_else(|| {
                    warn!(swap_id = %request.id, "Swap request initiator is missing");
                    DbError::not_found("User", &request.initiator_id)
                })?;

            enriched.push(EnrichedSwapRequest::new(request, &item1, &item2, &initiator));
        }

        Ok(enriched)
    }

    /// The balance-pending request `initiator_id` made for `item2_id`.
    ///
    /// `balance_owed` is `item1 - item2`; the item shown is item2.
    pub async fn find_incomplete_for_initiator(
        &self,
        initiator_id: &str,
        item2_id: &str,
    ) -> DbResult<Option<IncompleteSwap>> {
        let mut conn = self.pool.acquire().await?;

        let Some(request) = find_by_initiator_and_target(&mut conn, initiator_id, item2_id).await?
        else {
            return Ok(None);
        };
        if request.state != SwapState::AwaitingBalance {
            return Ok(None);
        }

        incomplete_view(&mut conn, &request, View::Target).await.map(Some)
    }

    /// Balance-pending requests targeting `owner_id`'s items, newest first.
    ///
    /// Each carries `balance_owed = item1 - item2` and item1's details.
    pub async fn list_incomplete_for_owner(
        &self,
        owner_id: &str,
        page: Page,
    ) -> DbResult<Vec<IncompleteSwap>> {
        let mut conn = self.pool.acquire().await?;
        let requests =
            list_by_owner_and_state(&mut conn, owner_id, SwapState::AwaitingBalance, page).await?;

        let mut views = Vec::with_capacity(requests.len());
        for request in &requests {
            views.push(incomplete_view(&mut conn, request, View::Offered).await?);
        }
        Ok(views)
    }

    /// Number of requests `initiator_id` has open against `item2_id` (0 or 1).
    pub async fn count_for_pair(&self, initiator_id: &str, item2_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM swap_requests WHERE initiator_id = ? AND item2_id = ?",
        )
        .bind(initiator_id)
        .bind(item2_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Counts all swap requests.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM swap_requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(Clone, Copy)]
enum View {
    /// Show item1 (what the owner is being offered).
    Offered,
    /// Show item2 (what the initiator wants).
    Target,
}

async fn incomplete_view(
    conn: &mut SqliteConnection,
    request: &SwapRequest,
    view: View,
) -> DbResult<IncompleteSwap> {
    let item1 = require_item(&mut *conn, request, &request.item1_id).await?;
    let item2 = require_item(&mut *conn, request, &request.item2_id).await?;

    let shown = match view {
        View::Offered => &item1,
        View::Target => &item2,
    };

    Ok(IncompleteSwap {
        id: request.id.clone(),
        balance_owed: balance_owed(item1.price(), item2.price()),
        item: ItemDetails::from(shown),
    })
}

/// One side of `request`; a dangling reference is `NotFound`.
async fn require_item(
    conn: &mut SqliteConnection,
    request: &SwapRequest,
    item_id: &str,
) -> DbResult<Item> {
    fetch_item(conn, item_id).await?.ok_or_else(|| {
        warn!(swap_id = %request.id, item_id, "Swap request references a missing item");
        DbError::not_found("Item", item_id)
    })
}

async fn list_by_owner_and_state(
    conn: &mut SqliteConnection,
    owner_id: &str,
    state: SwapState,
    page: Page,
) -> DbResult<Vec<SwapRequest>> {
    let sql = format!(
        "SELECT {SWAP_COLUMNS} FROM swap_requests \
         WHERE owner_id = ? AND state = ? \
         ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
    );
    let requests = sqlx::query_as::<_, SwapRequest>(&sql)
        .bind(owner_id)
        .bind(state)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(requests)
}

// =============================================================================
// Transactional Helpers
// =============================================================================

/// Loads a swap request by id.
pub async fn fetch_swap(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<SwapRequest>> {
    let sql = format!("SELECT {SWAP_COLUMNS} FROM swap_requests WHERE id = ?");
    let request = sqlx::query_as::<_, SwapRequest>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(request)
}

/// Loads the request keyed by `(initiator_id, item2_id)`, if any.
pub async fn find_by_initiator_and_target(
    conn: &mut SqliteConnection,
    initiator_id: &str,
    item2_id: &str,
) -> DbResult<Option<SwapRequest>> {
    let sql = format!(
        "SELECT {SWAP_COLUMNS} FROM swap_requests WHERE initiator_id = ? AND item2_id = ?"
    );
    let request = sqlx::query_as::<_, SwapRequest>(&sql)
        .bind(initiator_id)
        .bind(item2_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(request)
}

/// Whether a request other than `excluding_id` targets `item2_id` and is
/// already `AwaitingBalance`.
pub async fn has_awaiting_balance_for_target(
    conn: &mut SqliteConnection,
    item2_id: &str,
    excluding_id: &str,
) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM swap_requests WHERE item2_id = ? AND state = ? AND id <> ?",
    )
    .bind(item2_id)
    .bind(SwapState::AwaitingBalance)
    .bind(excluding_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count > 0)
}

/// Inserts a new `Pending` request.
///
/// ## Errors
/// `UniqueViolation` when the pair already has a request.
pub async fn insert_swap(
    conn: &mut SqliteConnection,
    item1_id: &str,
    item2_id: &str,
    owner_id: &str,
    initiator_id: &str,
) -> DbResult<SwapRequest> {
    let now = Utc::now();
    let request = SwapRequest {
        id: generate_id(),
        item1_id: item1_id.to_string(),
        item2_id: item2_id.to_string(),
        owner_id: owner_id.to_string(),
        initiator_id: initiator_id.to_string(),
        state: SwapState::Pending,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO swap_requests (
            id, item1_id, item2_id, owner_id, initiator_id, state, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&request.id)
    .bind(&request.item1_id)
    .bind(&request.item2_id)
    .bind(&request.owner_id)
    .bind(&request.initiator_id)
    .bind(request.state)
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(&mut *conn)
    .await?;

    debug!(swap_id = %request.id, item1_id, item2_id, "Swap request inserted");
    Ok(request)
}

/// Replaces the offered item and resets the request to `Pending`, provided
/// it is still in `expected` state.
pub async fn reoffer_swap(
    conn: &mut SqliteConnection,
    id: &str,
    item1_id: &str,
    expected: SwapState,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE swap_requests SET item1_id = ?, state = ?, updated_at = ? WHERE id = ? AND state = ?",
    )
    .bind(item1_id)
    .bind(SwapState::Pending)
    .bind(Utc::now())
    .bind(id)
    .bind(expected)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict("Swap request", id));
    }

    debug!(swap_id = %id, item1_id, "Swap request re-offered");
    Ok(())
}

/// Compare-and-swap on the request state.
pub async fn transition_swap(
    conn: &mut SqliteConnection,
    id: &str,
    from: SwapState,
    to: SwapState,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE swap_requests SET state = ?, updated_at = ? WHERE id = ? AND state = ?",
    )
    .bind(to)
    .bind(Utc::now())
    .bind(id)
    .bind(from)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict("Swap request", id));
    }

    debug!(swap_id = %id, ?from, ?to, "Swap request transitioned");
    Ok(())
}

/// Deletes one request.
pub async fn delete_swap(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM swap_requests WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Swap request", id));
    }
    Ok(())
}

/// Deletes every request that offers or targets any of `item_ids`.
///
/// Returns the number of rows removed.
pub async fn delete_swaps_referencing_items(
    conn: &mut SqliteConnection,
    item_ids: &[&str],
) -> DbResult<u64> {
    let mut removed = 0;
    for item_id in item_ids {
        removed += sqlx::query("DELETE FROM swap_requests WHERE item1_id = ? OR item2_id = ?")
            .bind(*item_id)
            .bind(*item_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }

    if removed > 0 {
        debug!(?item_ids, removed, "Deleted swap requests for settled items");
    }
    Ok(removed)
}

// =============================================================================
// Unit Tests
// =============================================================================
