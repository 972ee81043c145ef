//! # swapmart-db: Database Layer for Swapmart
//!
//! This crate provides database access for Swapmart.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Swapmart Data Flow                               │
//! │                                                                         │
//! │  swapmart-engine (SwapEngine::accept, PurchaseService::buy, ...)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   swapmart-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ users, items, │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ categories,   │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │    │ swaps, ledger │    │              │  │   │
//! │  │   │ begin() → tx  │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (./swapmart.db by default)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use swapmart_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./swapmart.db")).await?;
//! let pending = db.swaps().list_pending_for_owner(&owner_id, Page::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, TableCounts};

pub use repository::category::CategoryRepository;
pub use repository::item::ItemRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::swap::SwapRequestRepository;
pub use repository::user::UserRepository;
