//! Player actions against a [`SimulationState`].
//!
//! Each action checks every precondition first, in a fixed order, and only
//! then mutates. The first mutation is always the ledger debit, so a
//! shortage leaves the state untouched. [`Game`](crate::Game) additionally
//! runs each action on a scratch copy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use demeter_ledger::LedgerError;
use demeter_types::{CropId, Notification, PlotState, Resource, UnlockableAction};
use demeter_world::ActionCosts;

use crate::error::GameError;
use crate::state::SimulationState;

/// What a harvest produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReport {
    /// The harvested plot.
    pub plot: usize,
    /// The crop that was cleared.
    pub crop: CropId,
    /// Money credited.
    pub value: Decimal,
    /// Research points credited.
    pub research: Decimal,
}

impl HarvestReport {
    /// The success notification for this harvest.
    pub fn notification(&self) -> Notification {
        Notification::success(format!(
            "Harvested {} on plot {}: +${} and +{} research points",
            self.crop, self.plot, self.value, self.research
        ))
    }
}

/// Debit `amount` unless it is zero. Costs lowered to nothing by a
/// technology make the action free.
fn charge(
    state: &mut SimulationState,
    resource: Resource,
    amount: Decimal,
    reason: &str,
) -> Result<(), GameError> {
    if amount.is_zero() {
        return Ok(());
    }
    let cycle = state.cycle();
    state.ledger.debit(resource, amount, cycle, reason)?;
    Ok(())
}

/// Growth time of the crop on an occupied plot.
fn growth_time_at(state: &SimulationState, index: usize, action: &'static str) -> Result<u32, GameError> {
    let plot = state.grid.plot(index)?;
    let crop = plot.crop().ok_or(GameError::InvalidState {
        index,
        state: plot.state(),
        action,
    })?;
    Ok(state.crops.get(crop)?.growth_time)
}

// ---------------------------------------------------------------------------
// Plot actions
// ---------------------------------------------------------------------------

/// Plant `crop` on plot `index` for the seed price.
///
/// # Errors
///
/// In check order: [`GameError::PlotOutOfRange`], [`GameError::InvalidState`]
/// unless the plot is empty, [`GameError::UnknownCrop`],
/// [`GameError::InsufficientFunds`].
pub fn plant(state: &mut SimulationState, index: usize, crop: &CropId) -> Result<Notification, GameError> {
    state.grid.plot(index)?.check_plant()?;
    let def = state.crops.get(crop)?;
    let impact = def.sustainability_impact;
    let name = def.name.clone();

    let cost = state.costs.seed;
    charge(state, ActionCosts::SEED_RESOURCE, cost, &format!("PLANT:{crop}"))?;
    state.grid.plot_mut(index)?.plant(crop.clone())?;
    state.score.adjust_sustainability(impact);

    info!(plot = index, %crop, %impact, "Crop planted");
    Ok(Notification::success(format!("Planted {name} on plot {index}")))
}

/// Irrigate plot `index` for this cycle. A dry plot recovers.
///
/// # Errors
///
/// [`GameError::InvalidState`] for an empty plot,
/// [`GameError::AlreadyIrrigated`], [`GameError::InsufficientWater`].
pub fn irrigate(state: &mut SimulationState, index: usize) -> Result<Notification, GameError> {
    state.grid.plot(index)?.check_irrigate()?;
    let growth_time = growth_time_at(state, index, "irrigate")?;

    let cost = state.costs.irrigation;
    charge(state, ActionCosts::IRRIGATION_RESOURCE, cost, "IRRIGATE")?;
    let recovered = state.grid.plot_mut(index)?.irrigate(growth_time)?;
    state
        .score
        .adjust_sustainability(state.rules.irrigation_sustainability);

    info!(plot = index, recovered, %cost, "Plot irrigated");
    let message = if recovered {
        format!("Plot {index} irrigated and recovered from drought")
    } else {
        format!("Plot {index} irrigated")
    };
    Ok(Notification::success(message))
}

/// Fertilize plot `index`. Fertilized harvests pay more.
///
/// # Errors
///
/// [`GameError::InvalidState`] for an empty plot,
/// [`GameError::AlreadyFertilized`], [`GameError::InsufficientFunds`].
pub fn fertilize(state: &mut SimulationState, index: usize) -> Result<Notification, GameError> {
    state.grid.plot(index)?.check_fertilize()?;

    let cost = state.costs.fertilizer;
    charge(state, ActionCosts::FERTILIZER_RESOURCE, cost, "FERTILIZE")?;
    state.grid.plot_mut(index)?.fertilize()?;
    state
        .score
        .adjust_sustainability(state.rules.fertilizer_sustainability);

    info!(plot = index, "Plot fertilized");
    Ok(Notification::success(format!("Plot {index} fertilized")))
}

/// Spray pesticide on plot `index`.
///
/// # Errors
///
/// [`GameError::InvalidState`] for an empty plot,
/// [`GameError::AlreadyPesticide`], [`GameError::InsufficientFunds`].
pub fn apply_pesticide(state: &mut SimulationState, index: usize) -> Result<Notification, GameError> {
    state.grid.plot(index)?.check_pesticide()?;

    let cost = state.costs.pesticide;
    charge(state, ActionCosts::PESTICIDE_RESOURCE, cost, "PESTICIDE")?;
    state.grid.plot_mut(index)?.apply_pesticide()?;
    state
        .score
        .adjust_sustainability(state.rules.pesticide_sustainability);

    info!(plot = index, "Pesticide applied");
    Ok(Notification::success(format!("Pesticide applied to plot {index}")))
}

/// Harvest a ready plot: pay out its value (more if fertilized), grant
/// research and clear the plot.
///
/// # Errors
///
/// [`GameError::NotReady`] unless the plot is ready. Ledger overflow is
/// reported as [`GameError::Ledger`].
pub fn harvest(state: &mut SimulationState, index: usize) -> Result<HarvestReport, GameError> {
    let plot = state.grid.plot(index)?;
    plot.check_harvest()?;
    let crop = plot.crop().cloned().ok_or(GameError::NotReady {
        index,
        state: plot.state(),
    })?;
    let base = state.crops.get(&crop)?.value;
    let overflow = || {
        GameError::Ledger(LedgerError::Overflow {
            resource: Resource::Money,
        })
    };
    let value = if plot.is_fertilized() {
        base.checked_mul(state.rules.fertilizer_multiplier)
            .ok_or_else(overflow)?
    } else {
        base
    };
    let research = value
        .checked_div(state.rules.research_divisor)
        .ok_or_else(overflow)?
        .floor();

    let cycle = state.cycle();
    let reason = format!("HARVEST:{crop}");
    state.ledger.credit(Resource::Money, value, cycle, &reason)?;
    if research > Decimal::ZERO {
        state.ledger.credit(Resource::Research, research, cycle, &reason)?;
    }
    state.grid.plot_mut(index)?.harvest()?;
    state
        .score
        .adjust_productivity(state.rules.harvest_productivity);

    info!(plot = index, %crop, %value, %research, "Crop harvested");
    Ok(HarvestReport {
        plot: index,
        crop,
        value,
        research,
    })
}

// ---------------------------------------------------------------------------
// Unlockable actions
// ---------------------------------------------------------------------------

/// Fly the monitoring drones over the farm once this cycle.
///
/// # Errors
///
/// [`GameError::ActionLocked`] before the technology is unlocked,
/// [`GameError::AlreadyDeployed`] if used this cycle.
pub fn deploy_drones(state: &mut SimulationState) -> Result<Notification, GameError> {
    let action = UnlockableAction::DroneMonitoring;
    if !state.unlocked_actions.contains(&action) {
        return Err(GameError::ActionLocked(action));
    }
    if state.drones_deployed {
        return Err(GameError::AlreadyDeployed);
    }

    state.drones_deployed = true;
    let productivity = state
        .score
        .adjust_productivity(state.rules.drone_productivity);
    let dry = state.grid.count_in(PlotState::Dry);
    let ready = state.grid.count_in(PlotState::Ready);

    info!(%productivity, dry, ready, "Drones deployed");
    Ok(Notification::success(format!(
        "Drones surveyed the farm: {ready} plots ready, {dry} plots dry"
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::SimulationConfig;

    fn state() -> SimulationState {
        SimulationState::from_config(&SimulationConfig::default()).unwrap()
    }

    fn maize() -> CropId {
        CropId::new("maize")
    }

    /// Grow plot `index` straight to ready.
    fn ripen(state: &mut SimulationState, index: usize) {
        let growth_time = growth_time_at(state, index, "grow").unwrap();
        for _ in 0..growth_time {
            state.grid.plot_mut(index).unwrap().advance(growth_time, false).unwrap();
        }
    }

    #[test]
    fn plant_charges_seed_and_applies_impact() {
        let mut s = state();
        let note = plant(&mut s, 0, &maize()).unwrap();
        assert_eq!(note, Notification::success("Planted Maize on plot 0"));
        assert_eq!(s.ledger.balance(Resource::Money), dec!(990));
        let plot = s.grid.plot(0).unwrap();
        assert_eq!(plot.state(), PlotState::Planted);
        assert_eq!(plot.growth_stage(), 0);

        plant(&mut s, 1, &CropId::new("soy")).unwrap();
        assert_eq!(s.score.sustainability(), dec!(55));
    }

    #[test]
    fn plant_checks_state_before_crop_and_money() {
        let mut s = state();
        plant(&mut s, 0, &maize()).unwrap();
        let result = plant(&mut s, 0, &CropId::new("kale"));
        assert!(matches!(result, Err(GameError::InvalidState { index: 0, .. })));

        let result = plant(&mut s, 1, &CropId::new("kale"));
        assert!(matches!(result, Err(GameError::UnknownCrop(_))));

        let result = plant(&mut s, 99, &maize());
        assert!(matches!(result, Err(GameError::PlotOutOfRange { index: 99, len: 36 })));
    }

    #[test]
    fn plant_without_money_changes_nothing() {
        let mut s = state();
        s.ledger = demeter_ledger::ResourceLedger::new(dec!(5), dec!(500), dec!(0)).unwrap();
        let before = s.clone();
        let result = plant(&mut s, 0, &maize());
        assert!(matches!(result, Err(GameError::InsufficientFunds { .. })));
        assert_eq!(s, before);
    }

    #[test]
    fn irrigation_is_single_use_per_cycle() {
        let mut s = state();
        plant(&mut s, 0, &maize()).unwrap();
        irrigate(&mut s, 0).unwrap();
        assert_eq!(s.ledger.balance(Resource::Water), dec!(490));
        assert_eq!(s.score.sustainability(), dec!(55));
        assert!(matches!(irrigate(&mut s, 0), Err(GameError::AlreadyIrrigated(0))));
        assert_eq!(s.ledger.balance(Resource::Water), dec!(490));
    }

    #[test]
    fn irrigating_empty_plot_is_invalid() {
        let mut s = state();
        assert!(matches!(irrigate(&mut s, 4), Err(GameError::InvalidState { index: 4, .. })));
    }

    #[test]
    fn irrigation_recovers_dry_plot() {
        let mut s = state();
        plant(&mut s, 2, &maize()).unwrap();
        s.grid.plot_mut(2).unwrap().dry_out();
        let note = irrigate(&mut s, 2).unwrap();
        assert!(note.message.contains("recovered"));
        assert_eq!(s.grid.plot(2).unwrap().state(), PlotState::Growing);
    }

    #[test]
    fn free_irrigation_skips_the_ledger() {
        let mut s = state();
        s.costs.irrigation = Decimal::ZERO;
        plant(&mut s, 0, &maize()).unwrap();
        let entries = s.ledger.len();
        irrigate(&mut s, 0).unwrap();
        assert_eq!(s.ledger.len(), entries);
        assert!(s.grid.plot(0).unwrap().is_irrigated());
    }

    #[test]
    fn fertilizer_and_pesticide_cost_sustainability() {
        let mut s = state();
        plant(&mut s, 0, &maize()).unwrap();
        fertilize(&mut s, 0).unwrap();
        apply_pesticide(&mut s, 0).unwrap();
        assert_eq!(s.score.sustainability(), dec!(25));
        assert_eq!(s.ledger.balance(Resource::Money), dec!(955));
        assert!(matches!(fertilize(&mut s, 0), Err(GameError::AlreadyFertilized(0))));
        assert!(matches!(apply_pesticide(&mut s, 0), Err(GameError::AlreadyPesticide(0))));
    }

    #[test]
    fn fertilized_harvest_pays_half_again() {
        let mut s = state();
        plant(&mut s, 0, &maize()).unwrap();
        fertilize(&mut s, 0).unwrap();
        ripen(&mut s, 0);
        assert_eq!(s.ledger.balance(Resource::Money), dec!(975));

        let report = harvest(&mut s, 0).unwrap();
        assert_eq!(report.value, dec!(75));
        assert_eq!(report.research, dec!(7));
        assert_eq!(s.ledger.balance(Resource::Money), dec!(1050));
        assert_eq!(s.ledger.balance(Resource::Research), dec!(7));
        assert_eq!(s.score.productivity(), dec!(60));

        let plot = s.grid.plot(0).unwrap();
        assert_eq!(plot.state(), PlotState::Empty);
        assert!(!plot.is_fertilized());
        assert!(plot.crop().is_none());
    }

    #[test]
    fn harvest_before_ready_is_refused() {
        let mut s = state();
        plant(&mut s, 0, &maize()).unwrap();
        let before = s.clone();
        assert!(matches!(harvest(&mut s, 0), Err(GameError::NotReady { index: 0, .. })));
        assert_eq!(s, before);
    }

    #[test]
    fn drones_are_locked_then_once_per_cycle() {
        let mut s = state();
        assert!(matches!(
            deploy_drones(&mut s),
            Err(GameError::ActionLocked(UnlockableAction::DroneMonitoring))
        ));
        s.unlocked_actions.insert(UnlockableAction::DroneMonitoring);
        deploy_drones(&mut s).unwrap();
        assert_eq!(s.score.productivity(), dec!(55));
        assert!(matches!(deploy_drones(&mut s), Err(GameError::AlreadyDeployed)));
    }
}
