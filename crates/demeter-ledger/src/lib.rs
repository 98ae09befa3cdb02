//! Resource ledger for the Demeter farm simulation.
//!
//! The player's money, water and research points all live in a single
//! [`ResourceLedger`]. Every balance change goes through
//! [`ResourceLedger::credit`] or [`ResourceLedger::debit`] and is appended
//! to an entry log. Debits that would push a balance below zero are
//! rejected, never truncated.
//!
//! # Modules
//!
//! - [`ledger`] -- The [`ResourceLedger`] struct: guarded balances plus the
//!   append-only entry log.
//! - [`reconcile`] -- Replays the log from the opening balances and reports
//!   any resource whose live balance drifted from its history.
//!
//! # Usage
//!
//! ```
//! use demeter_ledger::ResourceLedger;
//! use demeter_ledger::reconcile::ReconcileResult;
//! use demeter_types::Resource;
//! use rust_decimal::Decimal;
//!
//! # fn main() -> Result<(), demeter_ledger::LedgerError> {
//! let mut ledger = ResourceLedger::new(Decimal::new(1000, 0), Decimal::new(500, 0), Decimal::ZERO)?;
//!
//! // Buy seeds.
//! ledger.debit(Resource::Money, Decimal::new(10, 0), 0, "SEED").ok();
//! assert_eq!(ledger.balance(Resource::Money), Decimal::new(990, 0));
//!
//! // Research points cannot go negative.
//! assert!(ledger.debit(Resource::Research, Decimal::new(1, 0), 0, "UNLOCK").is_err());
//!
//! assert_eq!(ledger.verify_balances(), ReconcileResult::Balanced);
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod reconcile;

// Re-export primary types at crate root.
pub use ledger::ResourceLedger;
pub use reconcile::ReconcileResult;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use demeter_types::Resource;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when mutating ledger balances.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("ledger amount must be non-zero")]
    ZeroQuantity,

    /// Amount must not be negative.
    #[error("ledger amount must be positive, got {amount}")]
    NegativeQuantity {
        /// The invalid amount.
        amount: Decimal,
    },

    /// The debit would take the balance below zero.
    #[error("insufficient {resource}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// The resource being debited.
        resource: Resource,
        /// Balance before the attempted debit.
        balance: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// A credit would overflow the balance.
    #[error("arithmetic overflow crediting {resource}")]
    Overflow {
        /// The resource being credited.
        resource: Resource,
    },
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A mismatch between the live balances and the replayed entry log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Per-resource mismatch: (`replayed`, `live`).
    pub mismatches: BTreeMap<Resource, (Decimal, Decimal)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
