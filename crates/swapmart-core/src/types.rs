//! # Domain Types
//!
//! Core domain types used throughout Swapmart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │      Item       │   │  SwapRequest    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  item1_id (mine)│       │
//! │  │  user_name      │   │  owner_id (FK)  │   │  item2_id (want)│       │
//! │  │  email, phone   │   │  price_cents    │   │  owner_id       │       │
//! │  └─────────────────┘   │  sold, sold_at  │   │  initiator_id   │       │
//! │                        └─────────────────┘   │  state          │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   └─────────────────┘       │
//! │  │    Category     │   │  LedgerEntry    │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  name (UNIQUE)  │   │  PartySnapshot  │                              │
//! │  │  banned         │   │  amounts        │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage types derive `sqlx::FromRow` when the `sqlx` feature is on.
//! View types (`ItemDetails`, `EnrichedSwapRequest`, `IncompleteSwap`) are
//! assembled from storage rows and serialized in camelCase for the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::swap::{CompletionStatus, SwapState, SwapStatus};
use crate::DEFAULT_PAGE_SIZE;

// =============================================================================
// User
// =============================================================================

/// A registered marketplace user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub name: String,
    /// Unique handle.
    pub user_name: String,
    /// Unique.
    pub email: String,
    /// Unique.
    pub phone_number: String,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub profile_url: Option<String>,
    pub profile_icon: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to register a user. The id and timestamps are generated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: Option<String>,
    pub location: Option<String>,
}

// =============================================================================
// Category
// =============================================================================

/// A listing category. Names are stored upper-case and are unique.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Banned categories keep their items but accept no new listings.
    pub banned: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Item
// =============================================================================

/// An item listed for sale or swap.
///
/// `sold` flips `false -> true` exactly once; `sold_at` is written in the
/// same update and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    pub description: Option<String>,

    /// Category the item is listed under. `None` once the category is removed.
    pub category_id: Option<String>,

    /// Joined from `categories.name`.
    pub category_name: Option<String>,

    /// Price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    pub sold: bool,

    #[ts(as = "Option<String>")]
    pub sold_at: Option<DateTime<Utc>>,

    /// User who listed the item.
    pub owner_id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the price as Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Fields needed to list a new item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    /// Category name, matched case-insensitively.
    pub category: String,
    pub price_cents: i64,
    pub owner_id: String,
}

// =============================================================================
// Swap Request
// =============================================================================

/// A two-party swap offer: the initiator's `item1` for the owner's `item2`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SwapRequest {
    pub id: String,
    /// Offered item, owned by `initiator_id`.
    pub item1_id: String,
    /// Target item, owned by `owner_id`.
    pub item2_id: String,
    pub owner_id: String,
    pub initiator_id: String,
    pub state: SwapState,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SwapRequest {
    #[inline]
    pub fn status(&self) -> SwapStatus {
        self.state.status()
    }

    #[inline]
    pub fn completion_status(&self) -> CompletionStatus {
        self.state.completion_status()
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Identity of a party copied at settlement time.
///
/// Later profile edits do not rewrite history, so the ledger keeps its own
/// copy instead of joining `users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PartySnapshot {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "owner_id"))]
    pub user_id: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "owner_name"))]
    pub name: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "owner_email"))]
    pub email: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "owner_phone"))]
    pub phone_number: String,
}

impl From<&User> for PartySnapshot {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}

/// One settlement leg. Written once, never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: String,

    /// The party this entry belongs to.
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub party: PartySnapshot,

    /// Other side of the settlement. Seller for purchases.
    pub counterparty_id: Option<String>,

    /// Item this party received.
    pub item_id: String,
    pub item_name: String,

    pub bought: bool,
    pub swapped: bool,

    pub amount_paid_cents: i64,
    /// Change owed back to the payer.
    pub balance_available_cents: i64,
    pub balance_owed_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    #[inline]
    pub fn owner_id(&self) -> &str {
        &self.party.user_id
    }

    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    #[inline]
    pub fn balance_available(&self) -> Money {
        Money::from_cents(self.balance_available_cents)
    }

    #[inline]
    pub fn balance_owed(&self) -> Money {
        Money::from_cents(self.balance_owed_cents)
    }
}

/// A ledger entry before it is stored.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub party: PartySnapshot,
    pub counterparty_id: Option<String>,
    pub item_id: String,
    pub item_name: String,
    pub bought: bool,
    pub swapped: bool,
    pub amount_paid: Money,
    pub balance_available: Money,
    pub balance_owed: Money,
}

impl NewLedgerEntry {
    /// Swap leg for `party`, who receives `received`.
    pub fn swap_leg(
        party: PartySnapshot,
        counterparty_id: &str,
        received: &Item,
        amount_paid: Money,
        balance_available: Money,
    ) -> Self {
        Self {
            party,
            counterparty_id: Some(counterparty_id.to_string()),
            item_id: received.id.clone(),
            item_name: received.name.clone(),
            bought: false,
            swapped: true,
            amount_paid,
            balance_available,
            balance_owed: Money::zero(),
        }
    }

    /// Purchase leg for the buyer.
    pub fn purchase(buyer: PartySnapshot, item: &Item, amount_paid: Money, change: Money) -> Self {
        Self {
            party: buyer,
            counterparty_id: Some(item.owner_id.clone()),
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            bought: true,
            swapped: false,
            amount_paid,
            balance_available: change,
            balance_owed: Money::zero(),
        }
    }
}

// =============================================================================
// View Models
// =============================================================================

/// Item fields embedded in swap views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Money,
}

impl From<&Item> for ItemDetails {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            category: item.category_name.clone(),
            price: item.price(),
        }
    }
}

/// Public profile fields of a swap initiator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: String,
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub phone_number: String,
    pub location: Option<String>,
    pub profile_icon: Option<String>,
}

impl From<&User> for UserDetails {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            location: user.location.clone(),
            profile_icon: user.profile_icon.clone(),
        }
    }
}

/// A pending swap request as shown to the target item's owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSwapRequest {
    pub id: String,
    pub state: SwapState,
    pub status: SwapStatus,
    pub completion_status: CompletionStatus,
    /// Offered item.
    pub item1: ItemDetails,
    /// Target item.
    pub item2: ItemDetails,
    pub initiator: UserDetails,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl EnrichedSwapRequest {
    pub fn new(request: &SwapRequest, item1: &Item, item2: &Item, initiator: &User) -> Self {
        Self {
            id: request.id.clone(),
            state: request.state,
            status: request.status(),
            completion_status: request.completion_status(),
            item1: item1.into(),
            item2: item2.into(),
            initiator: initiator.into(),
            created_at: request.created_at,
        }
    }
}

/// An accepted swap waiting on a balance payment.
///
/// `balance_owed` is `item1.price - item2.price`; the caller interprets the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteSwap {
    pub id: String,
    pub balance_owed: Money,
    pub item: ItemDetails,
}

// =============================================================================
// Pagination
// =============================================================================

/// A 1-based page of `limit` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page {
    pub limit: u32,
    pub page: u32,
}

impl Page {
    pub const fn new(limit: u32, page: u32) -> Self {
        Self { limit, page }
    }

    /// Rows to skip. Page 0 is treated as page 1.
    pub const fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.limit as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(DEFAULT_PAGE_SIZE, 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
