//! # Settlement Arithmetic
//!
//! Balance and change calculations for swaps and purchases, plus the
//! human-readable summary returned when a settlement commits.
//!
//! ## Who Pays Whom
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  item1 (initiator's) $100.00        item2 (owner's) $150.00            │
//! │                                                                         │
//! │  diff    = higher - lower           = $50.00                           │
//! │  payer   = owner of the lower item  = initiator                        │
//! │  balance = amount - diff                                               │
//! │                                                                         │
//! │  amount $40.00 → balance -$10.00 → InsufficientAmount                  │
//! │  amount $50.00 → balance   $0.00 → settles                             │
//! │  amount $60.00 → balance  $10.00 → settles, $10.00 change recorded     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Item;

// =============================================================================
// Balance Rules
// =============================================================================

/// Change left after paying the difference between two prices.
///
/// Fails when there is a difference to cover and `amount` falls short.
/// Overpayment is allowed and comes back as positive change.
///
/// ## Example
/// ```rust
/// use swapmart_core::money::Money;
/// use swapmart_core::settlement::pay_off;
///
/// let change = pay_off(Money::from_cents(15_000), Money::from_cents(10_000), Money::from_cents(5_000));
/// assert_eq!(change.unwrap(), Money::zero());
///
/// assert!(pay_off(Money::from_cents(15_000), Money::from_cents(10_000), Money::from_cents(4_000)).is_err());
/// ```
pub fn pay_off(higher: Money, lower: Money, amount: Money) -> CoreResult<Money> {
    let diff = higher - lower;
    let balance = amount - diff;

    if diff.is_positive() && balance.is_negative() {
        return Err(CoreError::InsufficientAmount {
            required: diff,
            offered: amount,
        });
    }

    Ok(balance)
}

/// Change owed to a buyer paying `amount` for an item priced `price`.
pub fn purchase_change(price: Money, amount: Money) -> CoreResult<Money> {
    let change = amount - price;
    if change.is_negative() {
        return Err(CoreError::InsufficientAmount {
            required: price,
            offered: amount,
        });
    }
    Ok(change)
}

/// Signed difference `item1 - item2` reported on incomplete swaps.
#[inline]
pub fn balance_owed(item1_price: Money, item2_price: Money) -> Money {
    item1_price - item2_price
}

// =============================================================================
// Balance Plan
// =============================================================================

/// Resolved direction of an unequal swap settlement.
///
/// Only the owner of the lower-priced item owes money, so only they may
/// settle. The payer receives the higher-priced item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancePlan {
    pub payer_id: String,
    pub payee_id: String,
    /// Item the payer receives (the higher-priced one).
    pub payer_receives: String,
    /// Item the payee receives (the lower-priced one).
    pub payee_receives: String,
    pub higher: Money,
    pub lower: Money,
}

impl BalancePlan {
    /// Works out who pays for the swap of `item1` (offered) and `item2`
    /// (target) and checks that `caller_id` is that party.
    pub fn resolve(item1: &Item, item2: &Item, caller_id: &str) -> CoreResult<Self> {
        let (high, low) = if item1.price() > item2.price() {
            (item1, item2)
        } else if item2.price() > item1.price() {
            (item2, item1)
        } else {
            return Err(CoreError::NoBalanceOwed);
        };

        if !low.is_owned_by(caller_id) {
            return Err(CoreError::NoBalanceOwed);
        }

        Ok(Self {
            payer_id: low.owner_id.clone(),
            payee_id: high.owner_id.clone(),
            payer_receives: high.id.clone(),
            payee_receives: low.id.clone(),
            higher: high.price(),
            lower: low.price(),
        })
    }

    /// Amount the payer must cover.
    #[inline]
    pub fn due(&self) -> Money {
        self.higher - self.lower
    }

    /// Applies [`pay_off`] to a submitted amount.
    pub fn settle(&self, amount: Money) -> CoreResult<Money> {
        pay_off(self.higher, self.lower, amount)
    }
}

// =============================================================================
// Summary
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementKind {
    Swapped,
    Sold,
}

/// Receipt text returned by accept, complete and buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementSummary {
    pub item_id: String,
    pub item_name: String,
    pub kind: SettlementKind,
    pub price: Money,
    pub amount_paid: Money,
    pub balance: Money,
}

impl SettlementSummary {
    pub fn swapped(item: &Item, amount_paid: Money, balance: Money) -> Self {
        Self::new(item, SettlementKind::Swapped, amount_paid, balance)
    }

    pub fn sold(item: &Item, amount_paid: Money, balance: Money) -> Self {
        Self::new(item, SettlementKind::Sold, amount_paid, balance)
    }

    fn new(item: &Item, kind: SettlementKind, amount_paid: Money, balance: Money) -> Self {
        Self {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            kind,
            price: item.price(),
            amount_paid,
            balance,
        }
    }
}

impl fmt::Display for SettlementSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            SettlementKind::Swapped => "Swapped",
            SettlementKind::Sold => "Sold",
        };
        writeln!(f, "Item ID: {}", self.item_id)?;
        writeln!(f, "Item Name: {}", self.item_name)?;
        writeln!(f, "{}: true", label)?;
        writeln!(f, "Price: {}", self.price)?;
        writeln!(f, "Amount Paid: {}", self.amount_paid)?;
        writeln!(f, "Balance To Retrieve: {}", self.balance)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str, owner: &str, price_cents: i64) -> Item {
        let now = Utc::now();
        Item {
            id: id.to_string(),
            name: format!("Item {id}"),
            description: None,
            category_id: None,
            category_name: None,
            price_cents,
            sold: false,
            sold_at: None,
            owner_id: owner.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pay_off_exact_and_over() {
        let high = Money::from_cents(15_000);
        let low = Money::from_cents(10_000);

        assert_eq!(pay_off(high, low, Money::from_cents(5_000)).unwrap(), Money::zero());
        assert_eq!(
            pay_off(high, low, Money::from_cents(6_000)).unwrap(),
            Money::from_cents(1_000)
        );
    }

    #[test]
    fn test_pay_off_underpayment() {
        let err = pay_off(
            Money::from_cents(15_000),
            Money::from_cents(10_000),
            Money::from_cents(4_000),
        )
        .unwrap_err();

        match err {
            CoreError::InsufficientAmount { required, offered } => {
                assert_eq!(required.cents(), 5_000);
                assert_eq!(offered.cents(), 4_000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pay_off_no_difference() {
        let price = Money::from_cents(7_500);
        assert_eq!(pay_off(price, price, Money::zero()).unwrap(), Money::zero());
    }

    #[test]
    fn test_purchase_change() {
        let price = Money::from_cents(2_000);
        assert_eq!(purchase_change(price, Money::from_cents(2_500)).unwrap().cents(), 500);
        assert!(purchase_change(price, price).unwrap().is_zero());
        assert!(purchase_change(price, Money::from_cents(1_999)).is_err());
    }

    #[test]
    fn test_balance_owed_is_signed() {
        assert_eq!(
            balance_owed(Money::from_cents(10_000), Money::from_cents(15_000)).cents(),
            -5_000
        );
        assert_eq!(
            balance_owed(Money::from_cents(15_000), Money::from_cents(10_000)).cents(),
            5_000
        );
    }

    #[test]
    fn test_plan_initiator_pays_for_higher_target() {
        let item1 = item("i1", "alice", 10_000);
        let item2 = item("i2", "bob", 15_000);

        let plan = BalancePlan::resolve(&item1, &item2, "alice").unwrap();
        assert_eq!(plan.payer_id, "alice");
        assert_eq!(plan.payee_id, "bob");
        assert_eq!(plan.payer_receives, "i2");
        assert_eq!(plan.payee_receives, "i1");
        assert_eq!(plan.due().cents(), 5_000);

        assert!(matches!(
            BalancePlan::resolve(&item1, &item2, "bob"),
            Err(CoreError::NoBalanceOwed)
        ));
    }

    #[test]
    fn test_plan_owner_pays_for_higher_offer() {
        let item1 = item("i1", "alice", 20_000);
        let item2 = item("i2", "bob", 12_500);

        let plan = BalancePlan::resolve(&item1, &item2, "bob").unwrap();
        assert_eq!(plan.payer_id, "bob");
        assert_eq!(plan.payer_receives, "i1");
        assert_eq!(plan.settle(Money::from_cents(7_500)).unwrap(), Money::zero());
    }

    #[test]
    fn test_plan_equal_prices_owe_nothing() {
        let item1 = item("i1", "alice", 7_500);
        let item2 = item("i2", "bob", 7_500);
        assert!(matches!(
            BalancePlan::resolve(&item1, &item2, "alice"),
            Err(CoreError::NoBalanceOwed)
        ));
    }

    #[test]
    fn test_summary_format() {
        let summary = SettlementSummary::swapped(
            &item("i2", "bob", 15_000),
            Money::from_cents(5_000),
            Money::zero(),
        );
        assert_eq!(
            summary.to_string(),
            "Item ID: i2\nItem Name: Item i2\nSwapped: true\nPrice: $150.00\nAmount Paid: $50.00\nBalance To Retrieve: $0.00\n"
        );

        let sold = SettlementSummary::sold(&item("i3", "carol", 999), Money::from_cents(1_000), Money::from_cents(1));
        assert!(sold.to_string().contains("Sold: true\n"));
        assert!(sold.to_string().ends_with("Balance To Retrieve: $0.01\n"));
    }
}
