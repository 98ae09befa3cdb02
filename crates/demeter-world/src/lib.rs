//! Farm plots, crops, and environmental data for the Demeter simulation.
//!
//! This crate models the physical farm: a fixed grid of plots, each moving
//! through its own growth state machine, the catalog of plantable crops,
//! the price list for plot work, and the environmental readings for the
//! farm's location.
//!
//! # Modules
//!
//! - [`plot`] -- Single-plot state machine (empty, planted, growing,
//!   ready, dry) with check-then-apply mutators.
//! - [`grid`] -- [`PlotGrid`]: the fixed rectangular farm, addressing,
//!   per-state counts and grid-wide drying.
//! - [`crops`] -- [`CropDefinition`] and the runtime-extensible
//!   [`CropCatalog`].
//! - [`costs`] -- [`ActionCosts`]: what planting, irrigation, fertilizer
//!   and pesticide cost.
//! - [`environment`] -- Locations, the [`EnvironmentProvider`] trait,
//!   simulated tables with per-cycle drift, and the fallback wrapper.
//! - [`persistence`] -- [`PreferenceStore`] implementations for the saved
//!   location choice.
//! - [`error`] -- Error types for plot and catalog operations.

pub mod costs;
pub mod crops;
pub mod environment;
pub mod error;
pub mod grid;
pub mod persistence;
pub mod plot;

// Re-export primary types at crate root.
pub use costs::ActionCosts;
pub use crops::{CropCatalog, CropDefinition};
pub use environment::{
    EnvironmentProvider, EnvironmentalSnapshot, FallbackProvider, FarmAdvice, ForecastDay,
    ProviderError, SimulatedProvider,
};
pub use error::WorldError;
pub use grid::{PlotFilter, PlotGrid};
pub use persistence::{
    CustomLocation, FileStore, LocationPreference, MemoryStore, PersistError, PreferenceStore,
};
pub use plot::{ClearedCrop, GrowthOutcome, Plot};
