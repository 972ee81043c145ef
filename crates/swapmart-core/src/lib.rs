//! # swapmart-core: Pure Business Logic for Swapmart
//!
//! This crate is the **heart** of Swapmart. It contains the marketplace rules
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Swapmart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP layer (external consumer)                  │   │
//! │  │   initiate ──► accept / reject ──► complete ──► receipt        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 swapmart-engine (orchestration)                 │   │
//! │  │       SwapEngine, PurchaseService - one transaction per op     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ swapmart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │    swap    │  │ settlement│  │   │
//! │  │   │   Item    │  │   Money   │  │ SwapState  │  │  pay_off  │  │   │
//! │  │   │  Ledger   │  │           │  │ SwapEvent  │  │  Summary  │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 swapmart-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, User, SwapRequest, LedgerEntry, views)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`swap`] - Swap request state machine
//! - [`settlement`] - Balance arithmetic and settlement summaries
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use swapmart_core::money::Money;
//! use swapmart_core::settlement::pay_off;
//!
//! // Item1 is worth $150.00, item2 $100.00, the payer hands over $60.00
//! let change = pay_off(Money::from_cents(15_000), Money::from_cents(10_000), Money::from_cents(6_000)).unwrap();
//! assert_eq!(change.cents(), 1_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod settlement;
pub mod swap;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use settlement::{BalancePlan, SettlementSummary};
pub use swap::{SwapEvent, SwapState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on rows returned by a single list call.
pub const MAX_PAGE_SIZE: u32 = 100;
