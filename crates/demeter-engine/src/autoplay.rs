//! A scripted player for headless sessions.
//!
//! Each turn the autopilot answers any pending event, buys every
//! technology it can afford (cheapest first), flies the drones if it has
//! them, works its field, and then advances the cycle. Action failures
//! are expected (a dry spell empties the water tank, a bad event drains
//! the money) and are logged and counted rather than propagated.

use rust_decimal::Decimal;
use tracing::{debug, info};

use demeter_core::events::WELCOME_EVENT;
use demeter_core::{Game, GameError};
use demeter_types::{CropId, Notification, PlotState, Resource, UnlockableAction};

/// Option picked for every event after the introduction.
const CAUTIOUS_OPTION: usize = 1;

/// Tunables for the scripted policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autopilot {
    /// Number of plots the autopilot farms, starting from plot 0.
    pub field_size: usize,
    /// Money kept back from planting for events and care.
    pub money_reserve: Decimal,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            field_size: 8,
            money_reserve: Decimal::ONE_HUNDRED,
        }
    }
}

/// Counters for one autoplayed session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoplayStats {
    /// Cycles advanced.
    pub cycles: u64,
    /// Crops planted.
    pub plantings: u64,
    /// Irrigations performed.
    pub irrigations: u64,
    /// Crops harvested.
    pub harvests: u64,
    /// Money earned from harvests.
    pub harvest_income: Decimal,
    /// Events answered.
    pub events_resolved: u64,
    /// Technologies bought.
    pub technologies: u64,
    /// Drone flights.
    pub drone_flights: u64,
    /// Actions refused by the game.
    pub refused: u64,
}

/// Bump a counter.
fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}

impl Autopilot {
    /// Play until the game ends or `max_cycles` more cycles have passed.
    ///
    /// # Errors
    ///
    /// Returns the [`GameError`] of a failed cycle advance or event
    /// resolution; ordinary action refusals are only counted.
    pub fn play(&self, game: &mut Game, max_cycles: u64) -> Result<AutoplayStats, GameError> {
        let mut stats = AutoplayStats::default();
        while !game.is_ended() && stats.cycles < max_cycles {
            answer_event(game, &mut stats)?;
            research(game, &mut stats);
            self.work_field(game, &mut stats);

            let summary = game.advance_cycle()?;
            bump(&mut stats.cycles);
            debug!(
                cycle = summary.cycle,
                ready = summary.ready,
                dried = summary.dried,
                net_flow = ?summary.net_flow,
                money = %game.balance(Resource::Money),
                water = %game.balance(Resource::Water),
                "Autopilot turn done"
            );
        }
        answer_event(game, &mut stats)?;
        info!(
            cycles = stats.cycles,
            harvests = stats.harvests,
            technologies = stats.technologies,
            refused = stats.refused,
            "Autopilot finished"
        );
        Ok(stats)
    }

    /// Harvest, irrigate and replant the field plots.
    fn work_field(&self, game: &mut Game, stats: &mut AutoplayStats) {
        let crops: Vec<CropId> = game.state().crops.iter().map(|c| c.id.clone()).collect();
        let plots = game.plots();

        for plot in plots.iter().take(self.field_size) {
            match plot.state {
                PlotState::Ready => match game.harvest(plot.index) {
                    Ok(report) => {
                        bump(&mut stats.harvests);
                        stats.harvest_income = stats.harvest_income.saturating_add(report.value);
                    }
                    Err(e) => refuse(&e, stats),
                },
                PlotState::Planted | PlotState::Growing | PlotState::Dry => {
                    if !plot.irrigated && succeeded(game.irrigate(plot.index), stats) {
                        bump(&mut stats.irrigations);
                    }
                }
                PlotState::Empty => {
                    let money = game.balance(Resource::Money);
                    let seed = game.state().costs.seed;
                    if money < self.money_reserve.saturating_add(seed) {
                        continue;
                    }
                    let rotation = plot.index.checked_rem(crops.len());
                    let Some(crop) = rotation.and_then(|i| crops.get(i)) else {
                        continue;
                    };
                    if succeeded(game.plant(plot.index, crop), stats) {
                        bump(&mut stats.plantings);
                    }
                }
            }
        }
    }
}

/// Answer the pending event, if there is one and the game is running.
fn answer_event(game: &mut Game, stats: &mut AutoplayStats) -> Result<(), GameError> {
    if game.is_ended() {
        return Ok(());
    }
    let Some(event) = game.pending_event() else {
        return Ok(());
    };
    let option = if event.id.as_str() == WELCOME_EVENT {
        0
    } else {
        CAUTIOUS_OPTION.min(event.options.len().saturating_sub(1))
    };
    let outcome = game.resolve_event(option)?;
    bump(&mut stats.events_resolved);
    info!(event = %event.id, option, outcome = %outcome.message, "Autopilot answered event");
    Ok(())
}

/// Buy every affordable technology, cheapest first.
fn research(game: &mut Game, stats: &mut AutoplayStats) {
    let mut candidates: Vec<_> = game
        .technologies()
        .iter()
        .filter(|t| !game.state().is_unlocked(&t.id))
        .map(|t| (t.cost, t.id.clone()))
        .collect();
    candidates.sort();

    for (cost, id) in candidates {
        if game.balance(Resource::Research) < cost {
            break;
        }
        if succeeded(game.unlock_technology(&id), stats) {
            bump(&mut stats.technologies);
        }
    }

    let state = game.state();
    let drones_ready = state
        .unlocked_actions
        .contains(&UnlockableAction::DroneMonitoring)
        && !state.drones_deployed;
    if drones_ready && succeeded(game.deploy_drones(), stats) {
        bump(&mut stats.drone_flights);
    }
}

/// Log the outcome of an action; refusals are counted.
fn succeeded(result: Result<Notification, GameError>, stats: &mut AutoplayStats) -> bool {
    match result {
        Ok(note) => {
            debug!(message = %note.message, "Autopilot action");
            true
        }
        Err(e) => {
            refuse(&e, stats);
            false
        }
    }
}

/// Log and count a refused action.
fn refuse(error: &GameError, stats: &mut AutoplayStats) {
    bump(&mut stats.refused);
    let note = error.notification();
    debug!(kind = ?note.kind, message = %note.message, "Autopilot action refused");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use demeter_core::SimulationConfig;

    use super::*;

    fn config(max_cycles: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.simulation.max_cycles = Some(max_cycles);
        config.simulation.drying_chance = 0.0;
        config
    }

    #[test]
    fn plays_to_the_cycle_limit() {
        let mut game = Game::new(&config(12)).unwrap();
        let stats = Autopilot::default().play(&mut game, 100).unwrap();

        assert!(game.is_ended());
        assert_eq!(stats.cycles, 12);
        assert!(stats.plantings >= 8);
        assert!(stats.harvests > 0);
        assert!(stats.harvest_income > Decimal::ZERO);
        assert!(stats.events_resolved >= 1);
        assert!(game.final_report().ledger_balanced);
    }

    #[test]
    fn stops_after_the_requested_cycles() {
        let mut config = config(50);
        config.simulation.max_cycles = None;
        let mut game = Game::new(&config).unwrap();
        let stats = Autopilot::default().play(&mut game, 5).unwrap();
        assert_eq!(stats.cycles, 5);
        assert!(!game.is_ended());
        assert!(game.pending_event().is_none());
    }

    #[test]
    fn buys_technologies_and_flies_drones() {
        let mut config = config(2);
        config.economy.starting_research = dec!(1000);
        config.simulation.event_chance = 0.0;
        let mut game = Game::new(&config).unwrap();
        let stats = Autopilot::default().play(&mut game, 2).unwrap();

        assert_eq!(stats.technologies, 4);
        assert_eq!(stats.drone_flights, 2);
        assert_eq!(game.balance(Resource::Research), dec!(625));
        assert_eq!(game.state().costs.irrigation, dec!(5));
    }

    #[test]
    fn poor_farm_keeps_its_reserve() {
        let mut config = config(3);
        config.economy.starting_money = dec!(105);
        config.simulation.event_chance = 0.0;
        let mut game = Game::new(&config).unwrap();
        let stats = Autopilot::default().play(&mut game, 3).unwrap();
        assert_eq!(stats.plantings, 0);
        assert_eq!(game.balance(Resource::Money), dec!(105));
    }
}
