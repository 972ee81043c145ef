//! # Item Purchase
//!
//! Straight cash purchase of a listed item.
//!
//! ```text
//! BEGIN
//!   buyer exists ─► item exists, unsold, not the buyer's
//!   change = amount - price            (short → InsufficientAmount)
//!   mark_item_sold(item)               CAS sold = 0
//!   append_entry(buyer, bought = true)
//!   delete_swaps_referencing_items(item)
//! COMMIT
//! ```

use tracing::{info, instrument};

use swapmart_core::settlement::purchase_change;
use swapmart_core::validation::validate_amount_cents;
use swapmart_core::{CoreError, Money, NewLedgerEntry, PartySnapshot, SettlementSummary};
use swapmart_db::repository::item::mark_item_sold;
use swapmart_db::repository::ledger::append_entry;
use swapmart_db::repository::now_seconds;
use swapmart_db::repository::swap::delete_swaps_referencing_items;
use swapmart_db::Database;

use crate::error::MarketResult;
use crate::swap::{require_unsold_item, require_user};

/// Cash purchases.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    db: Database,
}

impl PurchaseService {
    pub fn new(db: Database) -> Self {
        PurchaseService { db }
    }

    /// Buys `item_id` for `amount`, returning the settlement summary.
    ///
    /// Any pending swap that offers or targets the item is withdrawn.
    ///
    /// ## Errors
    /// - `NotFound`: unknown buyer or item
    /// - `BadRequest`: item sold, buyer owns it, negative or short amount
    #[instrument(skip(self, amount), fields(amount = %amount))]
    pub async fn buy(&self, buyer_id: &str, item_id: &str, amount: Money) -> MarketResult<String> {
        validate_amount_cents(amount.cents()).map_err(CoreError::from)?;

        let mut tx = self.db.begin().await?;

        let buyer = require_user(&mut tx, buyer_id).await?;
        let item = require_unsold_item(&mut tx, item_id).await?;
        if item.is_owned_by(buyer_id) {
            return Err(CoreError::CannotBuyOwnItem(item.id).into());
        }

        let change = purchase_change(item.price(), amount)?;

        mark_item_sold(&mut tx, &item.id, now_seconds()).await?;
        append_entry(
            &mut tx,
            &NewLedgerEntry::purchase(PartySnapshot::from(&buyer), &item, amount, change),
        )
        .await?;
        let withdrawn = delete_swaps_referencing_items(&mut tx, &[item.id.as_str()]).await?;

        tx.commit().await?;

        info!(
            item_id = %item.id,
            seller_id = %item.owner_id,
            price = %item.price(),
            change = %change,
            withdrawn,
            "Item sold"
        );
        Ok(SettlementSummary::sold(&item, amount, change).to_string())
    }
}
