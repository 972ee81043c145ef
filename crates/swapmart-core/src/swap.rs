//! # Swap State Machine
//!
//! Lifecycle of a two-party item swap request.
//!
//! ## States and Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Swap Request Lifecycle                           │
//! │                                                                         │
//! │   initiate ──► ┌──────────┐  Reject   ┌──────────┐                     │
//! │                │ Pending  │──────────►│ Rejected │ (row deleted)       │
//! │   Reoffer ───► └────┬─────┘           └──────────┘                     │
//! │      ▲              │ Accept                                            │
//! │      │      ┌───────┴────────────┐                                      │
//! │      │      │ equal value        │ unequal value                        │
//! │      │      ▼                    ▼                                      │
//! │      │ ┌───────────┐     ┌─────────────────┐                           │
//! │      │ │ Completed │◄────│ AwaitingBalance │                           │
//! │      │ └───────────┘     └────────┬────────┘                           │
//! │      │  (row deleted)   SettleBalance│                                  │
//! │      └───────────────────────────────┘ Reoffer                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A single tagged enum replaces the legacy `status` + `completionStatus`
//! string pair; [`SwapState::status`] and [`SwapState::completion_status`]
//! project it back for clients that still read the pair.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Swap State
// =============================================================================

/// Persisted state of a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SwapState {
    /// Offer made, waiting for the target item's owner.
    Pending,
    /// Accepted with unequal prices; the lower-priced side owes a balance.
    AwaitingBalance,
    /// Settled. Items are sold and ledger entries written.
    Completed,
    /// Declined by the target item's owner.
    Rejected,
}

/// Something that happens to a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapEvent {
    /// Initiator replaced the offered item on an existing request.
    Reoffer,
    /// Target owner accepted. `equal_value` when both prices match.
    Accept { equal_value: bool },
    /// Target owner declined.
    Reject,
    /// Lower-priced party paid the difference.
    SettleBalance,
}

impl SwapState {
    /// Applies `event`, returning the next state or an error for an illegal move.
    ///
    /// ## Example
    /// ```rust
    /// use swapmart_core::swap::{SwapEvent, SwapState};
    ///
    /// let next = SwapState::Pending
    ///     .transition(SwapEvent::Accept { equal_value: false })
    ///     .unwrap();
    /// assert_eq!(next, SwapState::AwaitingBalance);
    ///
    /// assert!(SwapState::AwaitingBalance.transition(SwapEvent::Reject).is_err());
    /// ```
    pub fn transition(self, event: SwapEvent) -> CoreResult<SwapState> {
        use SwapEvent::*;
        use SwapState::*;

        match (self, event) {
            (Pending | AwaitingBalance, Reoffer) => Ok(Pending),
            (Pending, Accept { equal_value: true }) => Ok(Completed),
            (Pending, Accept { equal_value: false }) => Ok(AwaitingBalance),
            (Pending, Reject) => Ok(Rejected),
            (AwaitingBalance, SettleBalance) => Ok(Completed),
            (from, event) => Err(CoreError::InvalidSwapTransition { from, event }),
        }
    }

    /// Terminal states are deleted in the same transaction that reaches them.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SwapState::Completed | SwapState::Rejected)
    }

    /// Legacy `status` projection.
    pub const fn status(&self) -> SwapStatus {
        match self {
            SwapState::Pending => SwapStatus::Pending,
            SwapState::AwaitingBalance | SwapState::Completed => SwapStatus::Accepted,
            SwapState::Rejected => SwapStatus::Rejected,
        }
    }

    /// Legacy `completionStatus` projection.
    pub const fn completion_status(&self) -> CompletionStatus {
        match self {
            SwapState::AwaitingBalance => CompletionStatus::Incomplete,
            SwapState::Completed => CompletionStatus::Completed,
            SwapState::Pending | SwapState::Rejected => CompletionStatus::None,
        }
    }
}

impl Default for SwapState {
    fn default() -> Self {
        SwapState::Pending
    }
}

// =============================================================================
// Legacy Projections
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
}

/// `None` serializes as the empty string, matching the old wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CompletionStatus {
    #[serde(rename = "")]
    None,
    #[serde(rename = "INCOMPLETE")]
    Incomplete,
    #[serde(rename = "COMPLETED")]
    Completed,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_branches_on_value_parity() {
        assert_eq!(
            SwapState::Pending.transition(SwapEvent::Accept { equal_value: true }).unwrap(),
            SwapState::Completed
        );
        assert_eq!(
            SwapState::Pending.transition(SwapEvent::Accept { equal_value: false }).unwrap(),
            SwapState::AwaitingBalance
        );
    }

    #[test]
    fn test_settle_only_from_awaiting_balance() {
        assert_eq!(
            SwapState::AwaitingBalance.transition(SwapEvent::SettleBalance).unwrap(),
            SwapState::Completed
        );
        assert!(SwapState::Pending.transition(SwapEvent::SettleBalance).is_err());
        assert!(SwapState::Completed.transition(SwapEvent::SettleBalance).is_err());
    }

    #[test]
    fn test_only_pending_is_rejectable() {
        assert_eq!(
            SwapState::Pending.transition(SwapEvent::Reject).unwrap(),
            SwapState::Rejected
        );
        for state in [SwapState::AwaitingBalance, SwapState::Completed, SwapState::Rejected] {
            let err = state.transition(SwapEvent::Reject).unwrap_err();
            assert!(matches!(
                err,
                CoreError::InvalidSwapTransition { from, event: SwapEvent::Reject } if from == state
            ));
        }
    }

    #[test]
    fn test_reoffer_resets_to_pending() {
        assert_eq!(SwapState::Pending.transition(SwapEvent::Reoffer).unwrap(), SwapState::Pending);
        assert_eq!(
            SwapState::AwaitingBalance.transition(SwapEvent::Reoffer).unwrap(),
            SwapState::Pending
        );
        assert!(SwapState::Completed.transition(SwapEvent::Reoffer).is_err());
        assert!(SwapState::Rejected.transition(SwapEvent::Reoffer).is_err());
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        let events = [
            SwapEvent::Reoffer,
            SwapEvent::Accept { equal_value: true },
            SwapEvent::Accept { equal_value: false },
            SwapEvent::Reject,
            SwapEvent::SettleBalance,
        ];
        for state in [SwapState::Completed, SwapState::Rejected] {
            assert!(state.is_terminal());
            for event in events {
                assert!(state.transition(event).is_err());
            }
        }
    }

    #[test]
    fn test_legacy_projection() {
        assert_eq!(SwapState::Pending.status(), SwapStatus::Pending);
        assert_eq!(SwapState::Pending.completion_status(), CompletionStatus::None);
        assert_eq!(SwapState::AwaitingBalance.status(), SwapStatus::Accepted);
        assert_eq!(
            SwapState::AwaitingBalance.completion_status(),
            CompletionStatus::Incomplete
        );
        assert_eq!(SwapState::Completed.completion_status(), CompletionStatus::Completed);
        assert_eq!(SwapState::Rejected.status(), SwapStatus::Rejected);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&SwapState::AwaitingBalance).unwrap(),
            "\"awaiting_balance\""
        );
        assert_eq!(serde_json::to_string(&SwapStatus::Accepted).unwrap(), "\"ACCEPTED\"");
        assert_eq!(serde_json::to_string(&CompletionStatus::None).unwrap(), "\"\"");
    }
}
