//! Shared type definitions for the Demeter farm simulation.
//!
//! This crate is the single source of truth for identifiers, enums and plain
//! data structs used across the workspace. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the browser front end, which
//! renders the farm grid, gauges and notifications from them.
//!
//! # Modules
//!
//! - [`ids`] -- Slug and UUID identifier wrappers
//! - [`enums`] -- Resources, plot states, gauges, notification kinds
//! - [`structs`] -- Ledger entries, plot snapshots, notifications

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    EntryDirection, Gauge, GaugeLevel, NotificationKind, PlotState, Resource, TechCategory,
    UnlockableAction,
};
pub use ids::{CropId, EventId, LedgerEntryId, LocationId, SessionId, TechnologyId};
pub use structs::{LedgerEntry, Notification, PlotSnapshot};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::SessionId::export_all();
        let _ = crate::ids::LedgerEntryId::export_all();
        let _ = crate::ids::CropId::export_all();
        let _ = crate::ids::TechnologyId::export_all();
        let _ = crate::ids::EventId::export_all();
        let _ = crate::ids::LocationId::export_all();

        // Enums
        let _ = crate::enums::Resource::export_all();
        let _ = crate::enums::EntryDirection::export_all();
        let _ = crate::enums::PlotState::export_all();
        let _ = crate::enums::Gauge::export_all();
        let _ = crate::enums::GaugeLevel::export_all();
        let _ = crate::enums::TechCategory::export_all();
        let _ = crate::enums::UnlockableAction::export_all();
        let _ = crate::enums::NotificationKind::export_all();

        // Structs
        let _ = crate::structs::LedgerEntry::export_all();
        let _ = crate::structs::PlotSnapshot::export_all();
        let _ = crate::structs::Notification::export_all();
    }
}
