//! The cycle pass: grow or dry every plot, reset per-cycle flags, advance
//! the clock, and maybe fire a random event.
//!
//! # Per-plot rule
//!
//! ```text
//! empty                      -> nothing
//! not irrigated, roll dries  -> Dry, growth unchanged
//! already dry, roll spared   -> stays Dry (only irrigation recovers it)
//! otherwise                  -> stage + 1, Ready if stage >= growth time else Growing
//! ```
//!
//! Every plot ends the pass with its irrigation flag clear.

use std::collections::BTreeMap;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use demeter_types::Resource;
use demeter_world::GrowthOutcome;

use crate::effects::roll;
use crate::error::GameError;
use crate::events::{EventCatalog, EventPresentation};
use crate::state::SimulationState;

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Cycle count after this pass.
    pub cycle: u64,
    /// Plots that grew a stage.
    pub grown: usize,
    /// Plots that became ready this cycle.
    pub ready: usize,
    /// Plots that dried out this cycle.
    pub dried: usize,
    /// Plots that were dry and stayed dry.
    pub still_dry: usize,
    /// Net ledger change per resource over the cycle this pass closed.
    /// Resources with no entries are absent.
    pub net_flow: BTreeMap<Resource, Decimal>,
    /// The event fired at the end of the cycle, if any.
    pub event: Option<EventPresentation>,
    /// Whether this cycle reached the session's cycle limit.
    pub ended: bool,
}

/// Run one cycle against `state`.
///
/// Draw order is fixed: one drying roll per unirrigated crop in plot
/// order, then one event roll, then the event pick.
///
/// # Errors
///
/// Returns [`GameError::UnknownCrop`] if a plot holds a crop missing from
/// the catalog, and [`GameError::Clock`] on counter overflow.
pub fn run_cycle(
    state: &mut SimulationState,
    events: &EventCatalog,
    rng: &mut impl Rng,
) -> Result<CycleSummary, GameError> {
    let mut summary = CycleSummary::default();
    let drying_chance = state.rules.drying_chance;

    for plot in state.grid.iter_mut() {
        let Some(crop) = plot.crop() else {
            continue;
        };
        let growth_time = state.crops.get(crop)?.growth_time;
        let dries = !plot.is_irrigated() && roll(rng, drying_chance);
        match plot.advance(growth_time, dries)? {
            GrowthOutcome::Idle => {}
            GrowthOutcome::Dried => {
                summary.dried = summary.dried.saturating_add(1);
                debug!(plot = plot.index(), "Plot dried out");
            }
            GrowthOutcome::StayedDry => {
                summary.still_dry = summary.still_dry.saturating_add(1);
            }
            GrowthOutcome::Grew { stage, ready } => {
                summary.grown = summary.grown.saturating_add(1);
                if ready && stage == growth_time {
                    summary.ready = summary.ready.saturating_add(1);
                }
            }
        }
    }

    state.drones_deployed = false;
    summary.net_flow = state.ledger.net_flow_for_cycle(state.cycle());
    summary.cycle = state.clock.advance()?;
    summary.ended = state.clock.is_ended();

    if !summary.ended && roll(rng, state.rules.event_chance) {
        if let Some(event) = events.trigger_random(rng) {
            state.pending_event = Some(event.id.clone());
            summary.event = Some(event);
        }
    }

    info!(
        cycle = summary.cycle,
        grown = summary.grown,
        ready = summary.ready,
        dried = summary.dried,
        still_dry = summary.still_dry,
        net_flow = ?summary.net_flow,
        event = summary.event.as_ref().map(|e| e.id.as_str()),
        "Cycle complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    use demeter_types::{CropId, PlotState};

    use super::*;
    use crate::config::SimulationConfig;

    fn state(drying: f64, event: f64) -> SimulationState {
        let mut config = SimulationConfig::default();
        config.simulation.drying_chance = drying;
        config.simulation.event_chance = event;
        SimulationState::from_config(&config).unwrap()
    }

    fn plant(state: &mut SimulationState, index: usize, crop: &str) {
        state.grid.plot_mut(index).unwrap().plant(CropId::new(crop)).unwrap();
    }

    #[test]
    fn certain_drying_dries_unirrigated_plots() {
        let mut s = state(1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        plant(&mut s, 0, "maize");

        let summary = run_cycle(&mut s, &EventCatalog::builtin(), &mut rng).unwrap();
        assert_eq!(summary.dried, 1);
        assert_eq!(summary.cycle, 1);
        let plot = s.grid.plot(0).unwrap();
        assert_eq!(plot.state(), PlotState::Dry);
        assert_eq!(plot.growth_stage(), 0);
    }

    #[test]
    fn irrigated_plot_reaches_ready() {
        let mut s = state(1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let events = EventCatalog::builtin();
        plant(&mut s, 0, "maize");

        for cycle in 1..=3 {
            s.grid.plot_mut(0).unwrap().irrigate(3).unwrap();
            let summary = run_cycle(&mut s, &events, &mut rng).unwrap();
            assert_eq!(summary.grown, 1);
            assert_eq!(summary.ready, usize::from(cycle == 3));
        }
        assert_eq!(s.grid.plot(0).unwrap().state(), PlotState::Ready);
        assert!(!s.grid.plot(0).unwrap().is_irrigated());
    }

    #[test]
    fn zero_drying_grows_without_water() {
        let mut s = state(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        plant(&mut s, 5, "soy");
        let events = EventCatalog::builtin();
        run_cycle(&mut s, &events, &mut rng).unwrap();
        run_cycle(&mut s, &events, &mut rng).unwrap();
        assert_eq!(s.grid.plot(5).unwrap().state(), PlotState::Ready);
    }

    #[test]
    fn certain_event_becomes_pending() {
        let mut s = state(0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(3);
        let summary = run_cycle(&mut s, &EventCatalog::builtin(), &mut rng).unwrap();
        let event = summary.event.unwrap();
        assert_ne!(event.id.as_str(), crate::events::WELCOME_EVENT);
        assert_eq!(s.pending_event, Some(event.id));
    }

    #[test]
    fn summary_reports_the_closed_cycles_net_flow() {
        let mut s = state(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let events = EventCatalog::builtin();
        s.ledger.debit(Resource::Money, dec!(10), 0, "PLANT:maize").unwrap();
        s.ledger.debit(Resource::Water, dec!(10), 0, "IRRIGATE").unwrap();
        s.ledger.credit(Resource::Money, dec!(75), 0, "HARVEST:maize").unwrap();

        let summary = run_cycle(&mut s, &events, &mut rng).unwrap();
        assert_eq!(summary.net_flow.get(&Resource::Money), Some(&dec!(65)));
        assert_eq!(summary.net_flow.get(&Resource::Water), Some(&dec!(-10)));
        assert_eq!(summary.net_flow.get(&Resource::Research), None);

        let quiet = run_cycle(&mut s, &events, &mut rng).unwrap();
        assert!(quiet.net_flow.is_empty());
    }

    #[test]
    fn drone_flag_resets_each_cycle() {
        let mut s = state(0.0, 0.0);
        s.drones_deployed = true;
        let mut rng = StdRng::seed_from_u64(3);
        run_cycle(&mut s, &EventCatalog::builtin(), &mut rng).unwrap();
        assert!(!s.drones_deployed);
    }
}
