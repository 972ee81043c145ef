//! # swapmart-engine: Swap Negotiation and Settlement
//!
//! The operations the marketplace HTTP layer calls. Every write operation
//! runs inside a single database transaction; a failure anywhere rolls the
//! whole operation back.
//!
//! ## Swap Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  initiate ──► Pending ──accept (equal)──► Completed ──► row deleted    │
//! │                 │  ▲                                                    │
//! │                 │  └── initiate (new item1) ◄── AwaitingBalance        │
//! │                 │                                  ▲     │              │
//! │                 ├──accept (unequal)────────────────┘     │ complete     │
//! │                 │                                        ▼              │
//! │                 └──reject──► Rejected ──► deleted    Completed          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use swapmart_engine::{MarketConfig, SwapEngine};
//!
//! let config = MarketConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//! let engine = SwapEngine::new(db.clone(), &config);
//!
//! let request = engine.initiate(&my_item, &their_item, &me).await?;
//! ```

pub mod config;
pub mod error;
pub mod purchase;
pub mod swap;
pub mod telemetry;

pub use config::{ConfigError, MarketConfig};
pub use error::{MarketError, MarketResult};
pub use purchase::PurchaseService;
pub use swap::{SwapEngine, UNEQUAL_ACCEPT_MESSAGE};
