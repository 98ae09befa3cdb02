//! Rules, cycle scheduling, and orchestration for the Demeter farm
//! simulation.
//!
//! This crate turns the farm model from `demeter-world` and the ledger from
//! `demeter-ledger` into a playable session. A [`Game`] owns one
//! [`SimulationState`] and a seeded random source, and every player action
//! either fully applies or leaves the state untouched.
//!
//! # Modules
//!
//! - [`actions`] -- Plant, irrigate, fertilize, spray, harvest, and drone
//!   monitoring against a [`SimulationState`].
//! - [`clock`] -- Cycle counter and the [`TerminationPolicy`].
//! - [`config`] -- Configuration loading from `demeter-config.yaml` into
//!   strongly-typed structs.
//! - [`effects`] -- Effect data carried by events and technologies, and
//!   the interpreter that applies it.
//! - [`error`] -- [`GameError`] and its notification mapping.
//! - [`events`] -- The event catalog, random selection, and resolution.
//! - [`game`] -- The [`Game`] orchestrator.
//! - [`scheduler`] -- The per-cycle growth, drying, and event pass.
//! - [`score`] -- Productivity and sustainability gauges and the final
//!   score.
//! - [`state`] -- The [`SimulationState`] aggregate and session rules.
//! - [`technology`] -- The technology tree.
//!
//! [`TerminationPolicy`]: clock::TerminationPolicy

pub mod actions;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod game;
pub mod scheduler;
pub mod score;
pub mod state;
pub mod technology;

pub use actions::HarvestReport;
pub use config::SimulationConfig;
pub use error::GameError;
pub use events::{EventCatalog, EventPresentation};
pub use game::{FinalReport, Game};
pub use scheduler::CycleSummary;
pub use state::SimulationState;
pub use technology::TechnologyTree;
