//! The [`Game`] orchestrator: one session, one state, one random source.
//!
//! Every mutating operation follows the same steps:
//!
//! 1. Refuse with [`GameError::SimulationEnded`] once the session is over.
//! 2. Run the operation against a clone of the [`SimulationState`].
//! 3. Replace the live state with the clone only if it succeeded.
//!
//! A failed operation therefore never leaves a partial mutation behind,
//! even for multi-step event options and technology unlocks. The random
//! source is not rolled back: a failed attempt still consumes its draws.
//!
//! The environmental provider and the preference store live beside the
//! state and are not part of the copy. The copy does include the ledger's
//! entry log, so an operation costs time linear in the session's history.
//! At a few entries per action this stays small for sessions of hundreds
//! of cycles.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use demeter_types::{
    CropId, EventId, GaugeLevel, LocationId, Notification, PlotSnapshot, Resource, SessionId,
    TechnologyId,
};
use demeter_world::environment::{DEFAULT_LOCATION, is_known_location};
use demeter_world::{
    CustomLocation, EnvironmentProvider, EnvironmentalSnapshot, FallbackProvider, FileStore,
    ForecastDay, LocationPreference, MemoryStore, PreferenceStore, SimulatedProvider,
};

use crate::actions::{self, HarvestReport};
use crate::clock::EndReason;
use crate::config::SimulationConfig;
use crate::error::GameError;
use crate::events::{EventCatalog, EventPresentation, WELCOME_EVENT};
use crate::scheduler::{self, CycleSummary};
use crate::state::SimulationState;
use crate::technology::TechnologyTree;

/// An external environmental data source.
pub type DynProvider = Box<dyn EnvironmentProvider + Send>;

/// A boxed location preference store.
pub type DynStore = Box<dyn PreferenceStore + Send>;

/// End-of-session summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalReport {
    /// The session this report closes.
    pub session: SessionId,
    /// The final score.
    pub score: Decimal,
    /// Completed cycles.
    pub cycles: u64,
    /// Closing money balance.
    pub money: Decimal,
    /// Closing water balance.
    pub water: Decimal,
    /// Closing research balance.
    pub research: Decimal,
    /// Closing productivity.
    pub productivity: Decimal,
    /// Closing sustainability.
    pub sustainability: Decimal,
    /// Productivity band.
    pub productivity_level: GaugeLevel,
    /// Sustainability band.
    pub sustainability_level: GaugeLevel,
    /// Technologies in unlock order.
    pub technologies: Vec<TechnologyId>,
    /// Number of ledger entries recorded.
    pub ledger_entries: usize,
    /// Whether replaying the ledger reproduces the live balances.
    pub ledger_balanced: bool,
    /// Why the session ended, if it has.
    pub end_reason: Option<EndReason>,
}

/// Run `op` on a scratch copy of `state` and keep the copy only on success.
fn atomically<T>(
    state: &mut SimulationState,
    op: impl FnOnce(&mut SimulationState) -> Result<T, GameError>,
) -> Result<T, GameError> {
    let mut scratch = state.clone();
    let out = op(&mut scratch)?;
    *state = scratch;
    Ok(out)
}

/// A single farm session.
pub struct Game {
    /// Identifies this session in logs and reports.
    session: SessionId,
    /// Everything actions can change.
    state: SimulationState,
    /// Unlockable technologies.
    technologies: TechnologyTree,
    /// Random and scripted events.
    events: EventCatalog,
    /// Environmental data, simulated tables as fallback.
    environment: FallbackProvider<DynProvider>,
    /// The farm's location.
    location: LocationId,
    /// Where the location preference is saved.
    store: DynStore,
    /// Seeded source for every random draw in the session.
    rng: StdRng,
}

impl Game {
    /// Start a session from `config`.
    ///
    /// Uses the simulated environment only, and a file store when a
    /// preference path is configured (memory otherwise).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::World`] for invalid grid dimensions and
    /// [`GameError::UnknownLocation`] for an unknown farm location.
    pub fn new(config: &SimulationConfig) -> Result<Self, GameError> {
        let mut state = SimulationState::from_config(config)?;
        let location = LocationId::new(config.farm.location.as_str());
        if !is_known_location(&location) {
            return Err(GameError::UnknownLocation(location));
        }
        if config.simulation.intro_event {
            state.pending_event = Some(EventId::new(WELCOME_EVENT));
        }
        let session = SessionId::new();
        let store: DynStore = match &config.environment.preference_path {
            Some(path) => Box::new(FileStore::new(path.clone())),
            None => Box::new(MemoryStore::new()),
        };

        info!(
            session = %session,
            seed = config.simulation.seed,
            rows = config.farm.rows,
            cols = config.farm.cols,
            %location,
            max_cycles = ?config.simulation.max_cycles,
            "Game started"
        );
        Ok(Self {
            session,
            state,
            technologies: TechnologyTree::builtin(),
            events: EventCatalog::builtin(),
            environment: FallbackProvider::simulated_only(SimulatedProvider::new()),
            location,
            store,
            rng: StdRng::seed_from_u64(config.simulation.seed),
        })
    }

    /// Read environmental data from `provider` first, falling back to the
    /// simulated tables when it fails.
    #[must_use]
    pub fn with_environment_source(
        mut self,
        provider: impl EnvironmentProvider + Send + 'static,
    ) -> Self {
        self.environment.set_primary(Box::new(provider));
        self
    }

    /// Save and load the location preference through `store`.
    #[must_use]
    pub fn with_store(mut self, store: impl PreferenceStore + Send + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Refuse mutation once the session is over.
    const fn ensure_running(&self) -> Result<(), GameError> {
        if self.state.clock.is_ended() {
            return Err(GameError::SimulationEnded);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Plot actions
    // -----------------------------------------------------------------------

    /// Plant `crop` on plot `index`.
    ///
    /// # Errors
    ///
    /// See [`actions::plant`]; [`GameError::SimulationEnded`] after the end.
    pub fn plant(&mut self, index: usize, crop: &CropId) -> Result<Notification, GameError> {
        self.ensure_running()?;
        atomically(&mut self.state, |s| actions::plant(s, index, crop))
    }

    /// Irrigate plot `index` for this cycle.
    ///
    /// # Errors
    ///
    /// See [`actions::irrigate`]; [`GameError::SimulationEnded`] after the end.
    pub fn irrigate(&mut self, index: usize) -> Result<Notification, GameError> {
        self.ensure_running()?;
        atomically(&mut self.state, |s| actions::irrigate(s, index))
    }

    /// Fertilize plot `index`.
    ///
    /// # Errors
    ///
    /// See [`actions::fertilize`]; [`GameError::SimulationEnded`] after the end.
    pub fn fertilize(&mut self, index: usize) -> Result<Notification, GameError> {
        self.ensure_running()?;
        atomically(&mut self.state, |s| actions::fertilize(s, index))
    }

    /// Apply pesticide to plot `index`.
    ///
    /// # Errors
    ///
    /// See [`actions::apply_pesticide`]; [`GameError::SimulationEnded`] after
    /// the end.
    pub fn apply_pesticide(&mut self, index: usize) -> Result<Notification, GameError> {
        self.ensure_running()?;
        atomically(&mut self.state, |s| actions::apply_pesticide(s, index))
    }

    /// Harvest plot `index`.
    ///
    /// # Errors
    ///
    /// See [`actions::harvest`]; [`GameError::SimulationEnded`] after the end.
    pub fn harvest(&mut self, index: usize) -> Result<HarvestReport, GameError> {
        self.ensure_running()?;
        atomically(&mut self.state, |s| actions::harvest(s, index))
    }

    /// Fly the monitoring drones.
    ///
    /// # Errors
    ///
    /// See [`actions::deploy_drones`]; [`GameError::SimulationEnded`] after
    /// the end.
    pub fn deploy_drones(&mut self) -> Result<Notification, GameError> {
        self.ensure_running()?;
        atomically(&mut self.state, actions::deploy_drones)
    }

    // -----------------------------------------------------------------------
    // Technologies
    // -----------------------------------------------------------------------

    /// Unlock technology `id` with research points.
    ///
    /// # Errors
    ///
    /// See [`TechnologyTree::unlock`]; [`GameError::SimulationEnded`] after
    /// the end.
    pub fn unlock_technology(&mut self, id: &TechnologyId) -> Result<Notification, GameError> {
        self.ensure_running()?;
        let technologies = &self.technologies;
        let tech = atomically(&mut self.state, |s| technologies.unlock(s, id))?;
        Ok(Notification::success(format!("{} unlocked", tech.name)))
    }

    // -----------------------------------------------------------------------
    // Cycles and events
    // -----------------------------------------------------------------------

    /// Advance one cycle: grow or dry every plot, drift the simulated
    /// environment, and maybe fire an event.
    ///
    /// # Errors
    ///
    /// [`GameError::EventPending`] while an event awaits a decision, and
    /// [`GameError::SimulationEnded`] after the end.
    pub fn advance_cycle(&mut self) -> Result<CycleSummary, GameError> {
        self.ensure_running()?;
        if let Some(id) = &self.state.pending_event {
            return Err(GameError::EventPending(id.clone()));
        }
        let events = &self.events;
        let rng = &mut self.rng;
        let summary = atomically(&mut self.state, |s| scheduler::run_cycle(s, events, rng))?;

        let rules = &self.state.rules;
        if rules.environment_drift {
            self.environment
                .simulated_mut()
                .drift(summary.cycle, rules.advisory_horizon, &mut self.rng);
        }
        if summary.ended {
            info!(cycle = summary.cycle, "Cycle limit reached; game over");
        }
        Ok(summary)
    }

    /// Fire event `id` now, as if it had been drawn.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownEvent`], [`GameError::EventPending`] if another
    /// event is waiting, and [`GameError::SimulationEnded`] after the end.
    pub fn trigger_event(&mut self, id: &EventId) -> Result<EventPresentation, GameError> {
        self.ensure_running()?;
        if let Some(pending) = &self.state.pending_event {
            return Err(GameError::EventPending(pending.clone()));
        }
        let presentation = self.events.present(id)?;
        self.state.pending_event = Some(id.clone());
        info!(event = %id, "Event triggered");
        Ok(presentation)
    }

    /// Answer the pending event with option `option`.
    ///
    /// # Errors
    ///
    /// [`GameError::NoPendingEvent`], [`GameError::InvalidOption`], and
    /// [`GameError::SimulationEnded`] after the end.
    pub fn resolve_event(&mut self, option: usize) -> Result<Notification, GameError> {
        self.ensure_running()?;
        let id = self
            .state
            .pending_event
            .clone()
            .ok_or(GameError::NoPendingEvent)?;
        let events = &self.events;
        let rng = &mut self.rng;
        atomically(&mut self.state, |s| {
            let outcome = events.resolve(s, &id, option, rng)?;
            s.pending_event = None;
            Ok(outcome)
        })
    }

    /// The event waiting for a decision, if any.
    pub fn pending_event(&self) -> Option<EventPresentation> {
        let id = self.state.pending_event.as_ref()?;
        self.events.present(id).ok()
    }

    // -----------------------------------------------------------------------
    // Environment and location
    // -----------------------------------------------------------------------

    /// Current readings for the farm's location.
    ///
    /// # Errors
    ///
    /// [`GameError::Provider`] if no source knows the location.
    pub fn environmental_snapshot(&self) -> Result<EnvironmentalSnapshot, GameError> {
        Ok(self.environment.snapshot(&self.location)?)
    }

    /// Five-day forecast for the farm's location.
    ///
    /// # Errors
    ///
    /// [`GameError::Provider`] if no source knows the location.
    pub fn weather_forecast(&self) -> Result<Vec<ForecastDay>, GameError> {
        Ok(self.environment.weather_forecast(&self.location)?)
    }

    /// Move the farm to a built-in location.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownLocation`] for an id outside the built-in list.
    pub fn set_location(&mut self, id: &LocationId) -> Result<Notification, GameError> {
        if !is_known_location(id) {
            return Err(GameError::UnknownLocation(id.clone()));
        }
        self.location = id.clone();
        info!(location = %id, "Location changed");
        Ok(Notification::success(format!("Location set to {id}")))
    }

    /// Save the current location, with optional custom coordinates.
    ///
    /// # Errors
    ///
    /// [`GameError::Persist`] if encoding or the store fails.
    pub fn save_location_preference(
        &mut self,
        custom: Option<CustomLocation>,
    ) -> Result<Notification, GameError> {
        let preference = LocationPreference::new(self.location.clone(), custom);
        self.store.save(&preference.to_blob()?)?;
        info!(location = %self.location, "Location preference saved");
        Ok(Notification::success("Location preference saved"))
    }

    /// Restore the saved location. Nothing saved, or a location no longer
    /// known, selects the default location.
    ///
    /// # Errors
    ///
    /// [`GameError::Persist`] if the store fails or holds an invalid blob.
    pub fn load_location_preference(&mut self) -> Result<Option<LocationPreference>, GameError> {
        let preference = match self.store.load()? {
            Some(blob) => Some(LocationPreference::from_blob(&blob)?),
            None => None,
        };
        self.location = match &preference {
            Some(p) if is_known_location(&p.location) => p.location.clone(),
            Some(p) => {
                warn!(location = %p.location, "Saved location is unknown; using default");
                LocationId::new(DEFAULT_LOCATION)
            }
            None => LocationId::new(DEFAULT_LOCATION),
        };
        Ok(preference)
    }

    // -----------------------------------------------------------------------
    // End of game
    // -----------------------------------------------------------------------

    /// End the session now. Idempotent.
    pub fn finish(&mut self) -> Notification {
        self.state.clock.finish();
        info!(cycle = self.state.cycle(), "Game finished");
        Notification::info(format!(
            "Game over after {} cycles. Final score: {}",
            self.state.cycle(),
            self.final_score()
        ))
    }

    /// Current final score.
    pub fn final_score(&self) -> Decimal {
        self.state.score.final_score(
            self.state.ledger.balance(Resource::Money),
            self.state.cycle(),
        )
    }

    /// The end-of-session summary. Available at any time.
    pub fn final_report(&self) -> FinalReport {
        let s = &self.state;
        let ledger_balanced = s.ledger.verify_balances().is_balanced();
        if !ledger_balanced {
            warn!("Ledger replay does not match live balances");
        }
        FinalReport {
            session: self.session,
            score: self.final_score(),
            cycles: s.cycle(),
            money: s.ledger.balance(Resource::Money),
            water: s.ledger.balance(Resource::Water),
            research: s.ledger.balance(Resource::Research),
            productivity: s.score.productivity(),
            sustainability: s.score.sustainability(),
            productivity_level: s.score.level(demeter_types::Gauge::Productivity),
            sustainability_level: s.score.level(demeter_types::Gauge::Sustainability),
            technologies: s.unlocked_technologies.clone(),
            ledger_entries: s.ledger.len(),
            ledger_balanced,
            end_reason: s.clock.end_reason(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// This session's identifier.
    pub const fn session_id(&self) -> SessionId {
        self.session
    }

    /// The live state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Completed cycles.
    pub const fn cycle(&self) -> u64 {
        self.state.cycle()
    }

    /// Balance of `resource`.
    pub fn balance(&self, resource: Resource) -> Decimal {
        self.state.ledger.balance(resource)
    }

    /// Whether the session is over.
    pub const fn is_ended(&self) -> bool {
        self.state.clock.is_ended()
    }

    /// Snapshot of every plot, in index order.
    pub fn plots(&self) -> Vec<PlotSnapshot> {
        self.state.grid.snapshots()
    }

    /// The technology catalog.
    pub const fn technologies(&self) -> &TechnologyTree {
        &self.technologies
    }

    /// The event catalog.
    pub const fn events(&self) -> &EventCatalog {
        &self.events
    }

    /// The farm's location.
    pub const fn location(&self) -> &LocationId {
        &self.location
    }

    /// Whether an external environmental source is attached.
    pub const fn has_environment_source(&self) -> bool {
        self.environment.has_primary()
    }
}

impl core::fmt::Debug for Game {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Game")
            .field("session", &self.session)
            .field("cycle", &self.state.cycle())
            .field("location", &self.location)
            .field("pending_event", &self.state.pending_event)
            .field("ended", &self.state.clock.is_ended())
            .finish_non_exhaustive()
    }
}
