//! Enumeration types for the Demeter farm simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A spendable resource held by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Resource {
    /// Cash used for seeds, fertilizer, pesticide and event responses.
    Money,
    /// Irrigation water in litres.
    Water,
    /// Research points earned from harvests, spent on technologies.
    Research,
}

impl Resource {
    /// All resources in ledger order.
    pub const ALL: [Self; 3] = [Self::Money, Self::Water, Self::Research];
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Money => "money",
            Self::Water => "water",
            Self::Research => "research",
        };
        f.write_str(name)
    }
}

/// Which side of the ledger an entry lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EntryDirection {
    /// The balance increased.
    Credit,
    /// The balance decreased.
    Debit,
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

/// Lifecycle state of a single farm plot.
///
/// The states are mutually exclusive. A crop is present in every state
/// except [`PlotState::Empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PlotState {
    /// Nothing planted.
    Empty,
    /// Seeded this cycle, no growth yet.
    Planted,
    /// Growing but not yet mature.
    Growing,
    /// Mature and harvestable.
    Ready,
    /// Dried out. Keeps its crop and growth; irrigation recovers it.
    Dry,
}

impl PlotState {
    /// Whether a crop occupies the plot.
    pub const fn is_occupied(self) -> bool {
        !matches!(self, Self::Empty)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// One of the two bounded score dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Gauge {
    /// How much the farm produces.
    Productivity,
    /// How gently the farm treats soil and water.
    Sustainability,
}

impl core::fmt::Display for Gauge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Productivity => f.write_str("productivity"),
            Self::Sustainability => f.write_str("sustainability"),
        }
    }
}

/// Coarse band of a gauge value, shown as a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GaugeLevel {
    /// Below 30.
    Low,
    /// From 30 up to (not including) 70.
    Medium,
    /// 70 and above.
    High,
}

// ---------------------------------------------------------------------------
// Technologies
// ---------------------------------------------------------------------------

/// Grouping of technologies in the research panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TechCategory {
    /// New plantable crops.
    Crops,
    /// Water efficiency.
    Irrigation,
    /// Field monitoring.
    Monitoring,
}

/// A player action that only becomes available through a technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum UnlockableAction {
    /// Send monitoring drones over the fields for a productivity boost.
    DroneMonitoring,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Severity of a notification surfaced to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NotificationKind {
    /// The action went through.
    Success,
    /// The action was rejected.
    Error,
    /// Something needs attention but nothing broke.
    Warning,
    /// Purely informational.
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_empty_is_unoccupied() {
        assert!(!PlotState::Empty.is_occupied());
        assert!(PlotState::Planted.is_occupied());
        assert!(PlotState::Growing.is_occupied());
        assert!(PlotState::Ready.is_occupied());
        assert!(PlotState::Dry.is_occupied());
    }

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        let json = serde_json::to_string(&UnlockableAction::DroneMonitoring).unwrap_or_default();
        assert_eq!(json, "\"drone_monitoring\"");
        assert_eq!(Resource::Research.to_string(), "research");
    }
}
