//! Plain data structs shared between the simulation crates and the UI.
//!
//! Nothing here carries behaviour beyond small constructors: these are the
//! values that cross the boundary to rendering, persistence and logging.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EntryDirection, NotificationKind, PlotState, Resource};
use crate::ids::{CropId, LedgerEntryId};

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// A single balance mutation recorded by the resource ledger.
///
/// Entries are append-only; together with the opening balances they fully
/// determine the current balance of every resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// The simulation cycle in which the mutation happened.
    pub cycle: u64,
    /// The resource that changed.
    pub resource: Resource,
    /// Credit or debit.
    pub direction: EntryDirection,
    /// Amount moved (always positive).
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Balance of `resource` immediately after this entry.
    #[ts(as = "String")]
    pub balance_after: Decimal,
    /// Short machine-readable reason (e.g. `"SEED"`, `"HARVEST"`).
    pub reason: String,
    /// Real-world timestamp.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

/// Read-only view of one plot, as handed to the farm renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlotSnapshot {
    /// Flat index of the plot in the grid.
    pub index: usize,
    /// Row of the plot.
    pub row: usize,
    /// Column of the plot.
    pub col: usize,
    /// Lifecycle state.
    pub state: PlotState,
    /// Planted crop, if any.
    pub crop: Option<CropId>,
    /// Cycles of growth accumulated so far.
    pub growth_stage: u32,
    /// Irrigated during the current cycle.
    pub irrigated: bool,
    /// Fertilizer applied since planting.
    pub fertilized: bool,
    /// Pesticide applied since planting.
    pub pesticide_applied: bool,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A semantic outcome for the notification collaborator to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Human-readable text.
    pub message: String,
}

impl Notification {
    /// Build a notification of the given kind.
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a [`NotificationKind::Success`] notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    /// Shorthand for a [`NotificationKind::Info`] notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }
}
