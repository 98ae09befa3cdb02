//! The single simulation state aggregate.
//!
//! Everything an action can change lives in [`SimulationState`]. The
//! [`Game`](crate::Game) owns exactly one, and multi-step mutations (event
//! options, technology unlocks) run against a clone that replaces the
//! original only on success.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use demeter_ledger::ResourceLedger;
use demeter_types::{EventId, TechnologyId, UnlockableAction};
use demeter_world::{ActionCosts, CropCatalog, PlotGrid};

use crate::clock::{SimulationClock, TerminationPolicy};
use crate::config::SimulationConfig;
use crate::error::GameError;
use crate::score::ScoreModel;

/// Fixed rule parameters for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Sustainability change per irrigation.
    pub irrigation_sustainability: Decimal,
    /// Sustainability change per fertilizer application.
    pub fertilizer_sustainability: Decimal,
    /// Sustainability change per pesticide application.
    pub pesticide_sustainability: Decimal,
    /// Productivity change per harvest.
    pub harvest_productivity: Decimal,
    /// Productivity change per drone deployment.
    pub drone_productivity: Decimal,
    /// Payout multiplier for fertilized harvests.
    pub fertilizer_multiplier: Decimal,
    /// Research per harvest is `floor(payout / research_divisor)`.
    pub research_divisor: Decimal,
    /// Probability an unirrigated plot dries per cycle.
    pub drying_chance: f64,
    /// Probability of a random event per cycle.
    pub event_chance: f64,
    /// Advisory session length for environmental drift.
    pub advisory_horizon: u64,
    /// Whether the simulated environment drifts.
    pub environment_drift: bool,
}

impl Rules {
    /// Extract the rule parameters from a configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let scoring = &config.scoring;
        Self {
            irrigation_sustainability: scoring.irrigation_sustainability,
            fertilizer_sustainability: scoring.fertilizer_sustainability,
            pesticide_sustainability: scoring.pesticide_sustainability,
            harvest_productivity: scoring.harvest_productivity,
            drone_productivity: scoring.drone_productivity,
            fertilizer_multiplier: config.economy.fertilizer_multiplier,
            research_divisor: config.economy.research_divisor,
            drying_chance: config.simulation.drying_chance,
            event_chance: config.simulation.event_chance,
            advisory_horizon: config.simulation.advisory_horizon,
            environment_drift: config.environment.drift,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

/// Ledger, farm, gauges, progress and pending decision for one session.
///
/// Serializes as a whole, so a session can be saved and restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Money, water and research balances.
    pub ledger: ResourceLedger,
    /// The farm.
    pub grid: PlotGrid,
    /// Plantable crops.
    pub crops: CropCatalog,
    /// Current action prices.
    pub costs: ActionCosts,
    /// Productivity and sustainability.
    pub score: ScoreModel,
    /// Unlocked technologies, in unlock order. Append-only.
    pub unlocked_technologies: Vec<TechnologyId>,
    /// Actions made available by technologies.
    pub unlocked_actions: BTreeSet<UnlockableAction>,
    /// Drones already deployed in the current cycle.
    pub drones_deployed: bool,
    /// Cycle counter and end-of-game state.
    pub clock: SimulationClock,
    /// Event waiting for the player's decision.
    pub pending_event: Option<EventId>,
    /// Session rule parameters.
    pub rules: Rules,
}

impl SimulationState {
    /// Build the opening state described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::World`] if the grid dimensions are invalid and
    /// [`GameError::Ledger`] for a negative opening balance.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, GameError> {
        let economy = &config.economy;
        Ok(Self {
            ledger: ResourceLedger::new(
                economy.starting_money,
                economy.starting_water,
                economy.starting_research,
            )?,
            grid: PlotGrid::new(config.farm.rows, config.farm.cols)?,
            crops: CropCatalog::with_base_crops(),
            costs: ActionCosts {
                seed: economy.seed_cost,
                irrigation: economy.irrigation_cost,
                fertilizer: economy.fertilizer_cost,
                pesticide: economy.pesticide_cost,
            },
            score: ScoreModel::new(
                config.scoring.initial_productivity,
                config.scoring.initial_sustainability,
            ),
            unlocked_technologies: Vec::new(),
            unlocked_actions: BTreeSet::new(),
            drones_deployed: false,
            clock: SimulationClock::new(TerminationPolicy {
                max_cycles: config.simulation.max_cycles,
            }),
            pending_event: None,
            rules: Rules::from_config(config),
        })
    }

    /// Completed cycles.
    pub const fn cycle(&self) -> u64 {
        self.clock.cycle()
    }

    /// Whether `tech` has been unlocked.
    pub fn is_unlocked(&self, tech: &TechnologyId) -> bool {
        self.unlocked_technologies.contains(tech)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use demeter_ledger::LedgerError;
    use demeter_types::{CropId, Resource};
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn state_survives_a_json_round_trip() {
        let mut state = SimulationState::from_config(&SimulationConfig::default()).unwrap();
        state.ledger.debit(Resource::Money, dec!(10), 0, "PLANT:maize").unwrap();
        state.grid.plot_mut(0).unwrap().plant(CropId::new("maize")).unwrap();
        state.unlocked_technologies.push(TechnologyId::new("rice"));
        state.pending_event = Some(EventId::new("drought"));

        let json = serde_json::to_string(&state).unwrap();
        let back: SimulationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert!(back.ledger.verify_balances().is_balanced());
    }

    #[test]
    fn negative_opening_balance_is_refused() {
        let mut config = SimulationConfig::default();
        config.economy.starting_water = dec!(-1);
        assert!(matches!(
            SimulationState::from_config(&config),
            Err(GameError::Ledger(LedgerError::NegativeQuantity { .. }))
        ));
    }
}
