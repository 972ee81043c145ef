//! # Swap Engine
//!
//! Negotiation and settlement of item-for-item swaps.
//!
//! ## One Transaction Per Operation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  accept(owner, swap_id)                                                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    fetch_swap ─► owner check ─► fetch item1, item2                     │
//! │    SwapState::transition(Accept { equal_value })                       │
//! │    ├── AwaitingBalance: transition_swap(pending → awaiting_balance)    │
//! │    └── Completed:                                                       │
//! │          transition_swap(pending → completed)      CAS                 │
//! │          mark_item_sold(item1), mark_item_sold(item2)   CAS            │
//! │          append_entry(initiator), append_entry(owner)                  │
//! │          delete_swaps_referencing_items(item1, item2)                  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error drops the transaction and nothing is written.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads for the list views go through the pool and never overlap a write
//! transaction.

use sqlx::SqliteConnection;
use tracing::{info, instrument, warn};

use swapmart_core::validation::{validate_amount_cents, validate_page, validate_uuid};
use swapmart_core::{
    BalancePlan, CoreError, EnrichedSwapRequest, IncompleteSwap, Item, Money, NewLedgerEntry,
    Page, PartySnapshot, SettlementSummary, SwapEvent, SwapRequest, User,
};
use swapmart_db::repository::item::{fetch_item, mark_item_sold};
use swapmart_db::repository::ledger::append_entry;
use swapmart_db::repository::now_seconds;
use swapmart_db::repository::swap::{
    delete_swap, delete_swaps_referencing_items, fetch_swap, find_by_initiator_and_target,
    has_awaiting_balance_for_target, insert_swap, reoffer_swap, transition_swap,
};
use swapmart_db::repository::user::fetch_user;
use swapmart_db::Database;

use crate::config::MarketConfig;
use crate::error::MarketResult;

/// Returned by [`SwapEngine::accept`] when the prices differ.
pub const UNEQUAL_ACCEPT_MESSAGE: &str =
    "Swap request accepted. Incomplete till payment of balance is confirmed";

/// Swap negotiation and settlement.
#[derive(Debug, Clone)]
pub struct SwapEngine {
    db: Database,
    default_page_size: u32,
    max_page_size: u32,
}

impl SwapEngine {
    pub fn new(db: Database, config: &MarketConfig) -> Self {
        SwapEngine {
            db,
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// Offers `item1_id` (owned by the initiator) for `item2_id`.
    ///
    /// A second offer for the same target item replaces the offered item on
    /// the existing request and puts it back to `Pending`; it never creates a
    /// second row.
    ///
    /// ## Errors
    /// - `NotFound`: unknown initiator or item
    /// - `BadRequest`: sold item, item1 not owned by the initiator, item2
    ///   owned by the initiator, or an identical request already exists
    #[instrument(skip(self))]
    pub async fn initiate(
        &self,
        item1_id: &str,
        item2_id: &str,
        initiator_id: &str,
    ) -> MarketResult<SwapRequest> {
        let mut tx = self.db.begin().await?;

        require_user(&mut tx, initiator_id).await?;
        let item1 = require_unsold_item(&mut tx, item1_id).await?;
        let item2 = require_unsold_item(&mut tx, item2_id).await?;

        if !item1.is_owned_by(initiator_id) {
            warn!("Initiator does not own the offered item");
            return Err(CoreError::NotItemOwner {
                item_id: item1.id,
                user_id: initiator_id.to_string(),
            }
            .into());
        }
        if item2.is_owned_by(initiator_id) {
            warn!("Initiator targeted their own item");
            return Err(CoreError::SelfSwap { item_id: item2.id }.into());
        }

        let id = match find_by_initiator_and_target(&mut tx, initiator_id, item2_id).await? {
            None => {
                insert_swap(&mut tx, &item1.id, &item2.id, &item2.owner_id, initiator_id)
                    .await?
                    .id
            }
            Some(existing) if existing.item1_id == item1.id => {
                return Err(CoreError::DuplicateSwapRequest {
                    item1_id: item1.id,
                    item2_id: item2.id,
                }
                .into());
            }
            Some(existing) => {
                existing.state.transition(SwapEvent::Reoffer)?;
                reoffer_swap(&mut tx, &existing.id, &item1.id, existing.state).await?;
                info!(
                    swap_id = %existing.id,
                    previous_item = %existing.item1_id,
                    "Swap request re-offered"
                );
                existing.id
            }
        };

        let request = fetch_swap(&mut tx, &id)
            .await?
            .ok_or_else(|| CoreError::SwapNotFound(id.clone()))?;
        tx.commit().await?;

        info!(swap_id = %request.id, owner_id = %request.owner_id, "Swap request pending");
        Ok(request)
    }

    /// Declines a pending request and removes it.
    ///
    /// ## Errors
    /// - `NotFound`: no request with this id belongs to `owner_id`
    /// - `BadRequest`: the request is not `Pending`
    #[instrument(skip(self))]
    pub async fn reject(&self, owner_id: &str, swap_id: &str) -> MarketResult<()> {
        validate_uuid("swap id", swap_id).map_err(CoreError::from)?;
        let mut tx = self.db.begin().await?;

        let request = require_owned_swap(&mut tx, owner_id, swap_id).await?;
        let next = request.state.transition(SwapEvent::Reject)?;
        transition_swap(&mut tx, &request.id, request.state, next).await?;
        delete_swap(&mut tx, &request.id).await?;

        tx.commit().await?;

        info!(swap_id = %request.id, "Swap request rejected");
        Ok(())
    }

    /// Accepts a pending request.
    ///
    /// Equal prices settle immediately and return the settlement summary.
    /// Unequal prices move the request to `AwaitingBalance` and return
    /// [`UNEQUAL_ACCEPT_MESSAGE`].
    ///
    /// While one accepted request on an item waits for its balance, every
    /// other request for that item stays `Pending` and cannot be accepted.
    #[instrument(skip(self))]
    pub async fn accept(&self, owner_id: &str, swap_id: &str) -> MarketResult<String> {
        validate_uuid("swap id", swap_id).map_err(CoreError::from)?;
        let mut tx = self.db.begin().await?;

        let request = require_owned_swap(&mut tx, owner_id, swap_id).await?;
        let (item1, item2) = require_swap_items(&mut tx, &request).await?;

        let equal_value = item1.price() == item2.price();
        let next = request.state.transition(SwapEvent::Accept { equal_value })?;

        if has_awaiting_balance_for_target(&mut tx, &item2.id, &request.id).await? {
            warn!(item2_id = %item2.id, "Target item is held by another accepted swap");
            return Err(CoreError::ItemAwaitingBalance(item2.id).into());
        }

        if !next.is_terminal() {
            transition_swap(&mut tx, &request.id, request.state, next).await?;
            tx.commit().await?;

            info!(
                swap_id = %request.id,
                balance = %(item1.price() - item2.price()),
                "Swap request accepted, awaiting balance"
            );
            return Ok(UNEQUAL_ACCEPT_MESSAGE.to_string());
        }

        let initiator = require_user(&mut tx, &request.initiator_id).await?;
        let owner = require_user(&mut tx, &request.owner_id).await?;

        transition_swap(&mut tx, &request.id, request.state, next).await?;
        settle_items(&mut tx, &item1, &item2).await?;

        append_entry(
            &mut tx,
            &NewLedgerEntry::swap_leg(
                PartySnapshot::from(&initiator),
                &owner.id,
                &item2,
                Money::zero(),
                Money::zero(),
            ),
        )
        .await?;
        append_entry(
            &mut tx,
            &NewLedgerEntry::swap_leg(
                PartySnapshot::from(&owner),
                &initiator.id,
                &item1,
                Money::zero(),
                Money::zero(),
            ),
        )
        .await?;

        tx.commit().await?;

        info!(swap_id = %request.id, price = %item1.price(), "Equal-value swap completed");
        Ok(SettlementSummary::swapped(&item1, Money::zero(), Money::zero()).to_string())
    }

    /// Settles an accepted swap by paying the price difference.
    ///
    /// Only the owner of the lower-priced item owes money, so only they may
    /// call this. Overpayment is recorded as `balance_available` on the
    /// payer's ledger entry.
    ///
    /// ## Errors
    /// - `NotFound`: unknown request, or the caller is not a party to it
    /// - `BadRequest`: not `AwaitingBalance`, negative amount, caller owes
    ///   nothing, or the amount is short
    #[instrument(skip(self, amount), fields(amount = %amount))]
    pub async fn complete(
        &self,
        caller_id: &str,
        amount: Money,
        swap_id: &str,
    ) -> MarketResult<String> {
        validate_uuid("swap id", swap_id).map_err(CoreError::from)?;
        validate_amount_cents(amount.cents()).map_err(CoreError::from)?;

        let mut tx = self.db.begin().await?;

        let request = fetch_swap(&mut tx, swap_id)
            .await?
            .filter(|r| r.owner_id == caller_id || r.initiator_id == caller_id)
            .ok_or_else(|| CoreError::SwapNotFound(swap_id.to_string()))?;

        let next = request.state.transition(SwapEvent::SettleBalance)?;
        let (item1, item2) = require_swap_items(&mut tx, &request).await?;

        let plan = BalancePlan::resolve(&item1, &item2, caller_id)?;
        let balance = plan
            .settle(amount)
            .inspect_err(|_| warn!(due = %plan.due(), "Balance payment too low"))?;

        let (payer_item, payee_item) = if plan.payer_receives == item1.id {
            (&item1, &item2)
        } else {
            (&item2, &item1)
        };
        let payer = require_user(&mut tx, &plan.payer_id).await?;
        let payee = require_user(&mut tx, &plan.payee_id).await?;

        transition_swap(&mut tx, &request.id, request.state, next).await?;
        settle_items(&mut tx, &item1, &item2).await?;

        append_entry(
            &mut tx,
            &NewLedgerEntry::swap_leg(
                PartySnapshot::from(&payer),
                &payee.id,
                payer_item,
                amount,
                balance,
            ),
        )
        .await?;
        append_entry(
            &mut tx,
            &NewLedgerEntry::swap_leg(
                PartySnapshot::from(&payee),
                &payer.id,
                payee_item,
                Money::zero(),
                Money::zero(),
            ),
        )
        .await?;

        tx.commit().await?;

        info!(
            swap_id = %request.id,
            payer_id = %payer.id,
            due = %plan.due(),
            balance = %balance,
            "Swap completed"
        );
        Ok(SettlementSummary::swapped(payer_item, amount, balance).to_string())
    }

    /// Pending requests for `owner_id`'s items, newest first.
    ///
    /// `limit = 0` uses the configured default page size.
    pub async fn list_pending(
        &self,
        owner_id: &str,
        limit: u32,
        page: u32,
    ) -> MarketResult<Vec<EnrichedSwapRequest>> {
        let page = self.page(limit, page)?;
        Ok(self.db.swaps().list_pending_for_owner(owner_id, page).await?)
    }

    /// The balance-pending request `initiator_id` made for `item_id`.
    pub async fn get_incomplete(
        &self,
        initiator_id: &str,
        item_id: &str,
    ) -> MarketResult<IncompleteSwap> {
        let found = self
            .db
            .swaps()
            .find_incomplete_for_initiator(initiator_id, item_id)
            .await?;
        Ok(found.ok_or_else(|| CoreError::SwapNotFound(item_id.to_string()))?)
    }

    /// Balance-pending requests for `owner_id`'s items, newest first.
    pub async fn list_incomplete(
        &self,
        owner_id: &str,
        limit: u32,
        page: u32,
    ) -> MarketResult<Vec<IncompleteSwap>> {
        let page = self.page(limit, page)?;
        Ok(self.db.swaps().list_incomplete_for_owner(owner_id, page).await?)
    }

    fn page(&self, limit: u32, page: u32) -> MarketResult<Page> {
        let page = validate_page(limit, page, self.default_page_size, self.max_page_size)
            .map_err(CoreError::from)?;
        Ok(page)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

pub(crate) async fn require_user(conn: &mut SqliteConnection, id: &str) -> MarketResult<User> {
    let user = fetch_user(conn, id)
        .await?
        .ok_or_else(|| CoreError::UserNotFound(id.to_string()))?;
    Ok(user)
}

pub(crate) async fn require_unsold_item(
    conn: &mut SqliteConnection,
    id: &str,
) -> MarketResult<Item> {
    let item = fetch_item(conn, id)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;
    if item.sold {
        return Err(CoreError::ItemAlreadySold(item.id).into());
    }
    Ok(item)
}

/// A request the caller owns. Someone else's request reads as missing.
async fn require_owned_swap(
    conn: &mut SqliteConnection,
    owner_id: &str,
    swap_id: &str,
) -> MarketResult<SwapRequest> {
    let request = fetch_swap(conn, swap_id)
        .await?
        .filter(|r| r.owner_id == owner_id)
        .ok_or_else(|| CoreError::SwapNotFound(swap_id.to_string()))?;
    Ok(request)
}

/// Both sides of a request, each still listed and unsold.
async fn require_swap_items(
    conn: &mut SqliteConnection,
    request: &SwapRequest,
) -> MarketResult<(Item, Item)> {
    let item1 = require_swap_item(conn, &request.item1_id).await?;
    let item2 = require_swap_item(conn, &request.item2_id).await?;
    Ok((item1, item2))
}

async fn require_swap_item(conn: &mut SqliteConnection, id: &str) -> MarketResult<Item> {
    match fetch_item(conn, id).await? {
        Some(item) if !item.sold => Ok(item),
        Some(item) => Err(CoreError::ItemAlreadySold(item.id).into()),
        None => Err(CoreError::SwapItemUnavailable(id.to_string()).into()),
    }
}

/// Marks both items sold and clears every request that mentions either.
async fn settle_items(conn: &mut SqliteConnection, item1: &Item, item2: &Item) -> MarketResult<()> {
    let sold_at = now_seconds();
    mark_item_sold(conn, &item1.id, sold_at).await?;
    mark_item_sold(conn, &item2.id, sold_at).await?;

    let removed =
        delete_swaps_referencing_items(conn, &[item1.id.as_str(), item2.id.as_str()]).await?;
    info!(item1_id = %item1.id, item2_id = %item2.id, removed, "Swap items settled");
    Ok(())
}
