//! Single-plot state machine: plant, grow, dry out, recover, harvest.
//!
//! ```text
//!            plant            grow              grow (stage >= growth time)
//!   Empty ----------> Planted -----> Growing ---------------------------> Ready
//!     ^                  \              |                                   |
//!     |                   \  no water   | no water                no water  |
//!     |                    `----------> Dry <-------------------------------'
//!     |                                  |  irrigate: back to Growing or Ready
//!     `--------------- harvest (Ready only) ---------------------------------
//! ```
//!
//! Every mutating method re-checks its own preconditions, and each has a
//! matching `check_*` method so callers can validate a whole action
//! (plot, ledger, catalog) before committing any part of it.

use serde::{Deserialize, Serialize};

use demeter_types::{CropId, PlotSnapshot, PlotState};

use crate::error::WorldError;

/// Result of advancing one plot by one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthOutcome {
    /// The plot is empty; nothing happened.
    Idle,
    /// The plot was not irrigated and dried out this cycle.
    Dried,
    /// The plot was already dry and stays dry until irrigated.
    StayedDry,
    /// The crop grew one stage.
    Grew {
        /// Growth stage after this cycle.
        stage: u32,
        /// Whether the crop is now ready for harvest.
        ready: bool,
    },
}

/// What a harvest removed from the plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearedCrop {
    /// The harvested crop.
    pub crop: CropId,
    /// Whether fertilizer had been applied.
    pub fertilized: bool,
    /// Whether pesticide had been applied.
    pub pesticide_applied: bool,
}

/// One cell of the farm grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    /// Position of this plot in the grid.
    index: usize,
    /// Lifecycle state.
    state: PlotState,
    /// Planted crop; present iff `state` is not `Empty`.
    crop: Option<CropId>,
    /// Cycles of growth since planting.
    growth_stage: u32,
    /// Irrigated during the current cycle.
    irrigated: bool,
    /// Fertilizer applied since planting.
    fertilized: bool,
    /// Pesticide applied since planting.
    pesticide_applied: bool,
}

impl Plot {
    /// Create an empty plot at `index`.
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            state: PlotState::Empty,
            crop: None,
            growth_stage: 0,
            irrigated: false,
            fertilized: false,
            pesticide_applied: false,
        }
    }

    /// Position of this plot in the grid.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> PlotState {
        self.state
    }

    /// The planted crop, if any.
    pub const fn crop(&self) -> Option<&CropId> {
        self.crop.as_ref()
    }

    /// Cycles of growth accumulated so far.
    pub const fn growth_stage(&self) -> u32 {
        self.growth_stage
    }

    /// Whether the plot has been irrigated this cycle.
    pub const fn is_irrigated(&self) -> bool {
        self.irrigated
    }

    /// Whether fertilizer has been applied.
    pub const fn is_fertilized(&self) -> bool {
        self.fertilized
    }

    /// Whether pesticide has been applied.
    pub const fn has_pesticide(&self) -> bool {
        self.pesticide_applied
    }

    /// Whether a crop occupies the plot.
    pub const fn is_occupied(&self) -> bool {
        self.state.is_occupied()
    }

    // -----------------------------------------------------------------------
    // Planting
    // -----------------------------------------------------------------------

    /// Check that a crop can be planted here.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidState`] unless the plot is empty.
    pub const fn check_plant(&self) -> Result<(), WorldError> {
        if self.is_occupied() {
            return Err(self.invalid_state("plant"));
        }
        Ok(())
    }

    /// Plant `crop`, resetting growth.
    ///
    /// # Errors
    ///
    /// See [`check_plant`](Self::check_plant).
    pub fn plant(&mut self, crop: CropId) -> Result<(), WorldError> {
        self.check_plant()?;
        self.state = PlotState::Planted;
        self.crop = Some(crop);
        self.growth_stage = 0;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Care actions
    // -----------------------------------------------------------------------

    /// Check that the plot can be irrigated.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidState`] for an empty plot and
    /// [`WorldError::AlreadyIrrigated`] if it was irrigated this cycle.
    pub const fn check_irrigate(&self) -> Result<(), WorldError> {
        if !self.is_occupied() {
            return Err(self.invalid_state("irrigate"));
        }
        if self.irrigated {
            return Err(WorldError::AlreadyIrrigated(self.index));
        }
        Ok(())
    }

    /// Irrigate the plot. A dry plot recovers to `Ready` if it had already
    /// reached `growth_time`, otherwise to `Growing`.
    ///
    /// Returns `true` if the plot was dry and recovered.
    ///
    /// # Errors
    ///
    /// See [`check_irrigate`](Self::check_irrigate).
    pub fn irrigate(&mut self, growth_time: u32) -> Result<bool, WorldError> {
        self.check_irrigate()?;
        self.irrigated = true;
        if self.state == PlotState::Dry {
            self.state = self.grown_state(growth_time);
            return Ok(true);
        }
        Ok(false)
    }

    /// Check that fertilizer can be applied.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidState`] for an empty plot and
    /// [`WorldError::AlreadyFertilized`] if fertilizer is already applied.
    pub const fn check_fertilize(&self) -> Result<(), WorldError> {
        if !self.is_occupied() {
            return Err(self.invalid_state("fertilize"));
        }
        if self.fertilized {
            return Err(WorldError::AlreadyFertilized(self.index));
        }
        Ok(())
    }

    /// Apply fertilizer.
    ///
    /// # Errors
    ///
    /// See [`check_fertilize`](Self::check_fertilize).
    pub fn fertilize(&mut self) -> Result<(), WorldError> {
        self.check_fertilize()?;
        self.fertilized = true;
        Ok(())
    }

    /// Check that pesticide can be applied.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidState`] for an empty plot and
    /// [`WorldError::AlreadyPesticide`] if pesticide is already applied.
    pub const fn check_pesticide(&self) -> Result<(), WorldError> {
        if !self.is_occupied() {
            return Err(self.invalid_state("apply pesticide to"));
        }
        if self.pesticide_applied {
            return Err(WorldError::AlreadyPesticide(self.index));
        }
        Ok(())
    }

    /// Apply pesticide.
    ///
    /// # Errors
    ///
    /// See [`check_pesticide`](Self::check_pesticide).
    pub fn apply_pesticide(&mut self) -> Result<(), WorldError> {
        self.check_pesticide()?;
        self.pesticide_applied = true;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Harvest
    // -----------------------------------------------------------------------

    /// Check that the plot can be harvested.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotReady`] unless the plot is `Ready`.
    pub const fn check_harvest(&self) -> Result<(), WorldError> {
        if !matches!(self.state, PlotState::Ready) {
            return Err(WorldError::NotReady {
                index: self.index,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Harvest the crop and reset every field to the empty state.
    ///
    /// # Errors
    ///
    /// See [`check_harvest`](Self::check_harvest).
    pub fn harvest(&mut self) -> Result<ClearedCrop, WorldError> {
        self.check_harvest()?;
        let crop = self.crop.take().ok_or(WorldError::NotReady {
            index: self.index,
            state: self.state,
        })?;
        let cleared = ClearedCrop {
            crop,
            fertilized: self.fertilized,
            pesticide_applied: self.pesticide_applied,
        };
        *self = Self::new(self.index);
        Ok(cleared)
    }

    // -----------------------------------------------------------------------
    // Cycle transitions
    // -----------------------------------------------------------------------

    /// Advance one cycle.
    ///
    /// `dries` is the outcome of the caller's drying roll and is ignored
    /// when the plot was irrigated. The irrigation flag is always clear
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if the growth stage
    /// would overflow.
    pub fn advance(&mut self, growth_time: u32, dries: bool) -> Result<GrowthOutcome, WorldError> {
        if !self.is_occupied() {
            return Ok(GrowthOutcome::Idle);
        }

        let was_dry = self.state == PlotState::Dry;
        if !self.irrigated && dries {
            self.state = PlotState::Dry;
            return Ok(if was_dry {
                GrowthOutcome::StayedDry
            } else {
                GrowthOutcome::Dried
            });
        }

        self.irrigated = false;
        if was_dry {
            return Ok(GrowthOutcome::StayedDry);
        }

        self.growth_stage = self
            .growth_stage
            .checked_add(1)
            .ok_or(WorldError::ArithmeticOverflow)?;
        self.state = self.grown_state(growth_time);
        Ok(GrowthOutcome::Grew {
            stage: self.growth_stage,
            ready: self.state == PlotState::Ready,
        })
    }

    /// Dry the plot out, keeping its crop and growth. No-op when empty.
    ///
    /// Returns `true` if the plot changed.
    pub fn dry_out(&mut self) -> bool {
        if !self.is_occupied() || self.state == PlotState::Dry {
            return false;
        }
        self.state = PlotState::Dry;
        true
    }

    /// Read-only view at grid position (`row`, `col`).
    pub fn snapshot(&self, row: usize, col: usize) -> PlotSnapshot {
        PlotSnapshot {
            index: self.index,
            row,
            col,
            state: self.state,
            crop: self.crop.clone(),
            growth_stage: self.growth_stage,
            irrigated: self.irrigated,
            fertilized: self.fertilized,
            pesticide_applied: self.pesticide_applied,
        }
    }

    /// `Ready` once the stage reaches the crop's growth time.
    const fn grown_state(&self, growth_time: u32) -> PlotState {
        if self.growth_stage >= growth_time {
            PlotState::Ready
        } else {
            PlotState::Growing
        }
    }

    /// Build the invalid-state error for `action`.
    const fn invalid_state(&self, action: &'static str) -> WorldError {
        WorldError::InvalidState {
            index: self.index,
            state: self.state,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maize() -> CropId {
        CropId::new("maize")
    }

    fn planted() -> Plot {
        let mut plot = Plot::new(0);
        assert!(plot.plant(maize()).is_ok());
        plot
    }

    #[test]
    fn new_plot_is_empty() {
        let plot = Plot::new(4);
        assert_eq!(plot.index(), 4);
        assert_eq!(plot.state(), PlotState::Empty);
        assert!(plot.crop().is_none());
        assert_eq!(plot.growth_stage(), 0);
    }

    #[test]
    fn cannot_plant_twice() {
        let mut plot = planted();
        assert!(matches!(
            plot.plant(maize()),
            Err(WorldError::InvalidState { state: PlotState::Planted, .. })
        ));
    }

    #[test]
    fn irrigated_plot_grows_to_ready() {
        let mut plot = planted();
        for cycle in 1..=3_u32 {
            assert_eq!(plot.irrigate(3), Ok(false));
            let outcome = plot.advance(3, true);
            assert_eq!(outcome, Ok(GrowthOutcome::Grew { stage: cycle, ready: cycle == 3 }));
            assert!(!plot.is_irrigated());
        }
        assert_eq!(plot.state(), PlotState::Ready);
    }

    #[test]
    fn unirrigated_plot_dries_without_growth() {
        let mut plot = planted();
        assert_eq!(plot.advance(3, true), Ok(GrowthOutcome::Dried));
        assert_eq!(plot.state(), PlotState::Dry);
        assert_eq!(plot.growth_stage(), 0);
        assert_eq!(plot.crop(), Some(&maize()));
    }

    #[test]
    fn dry_plot_stays_dry_until_irrigated() {
        let mut plot = planted();
        let _ = plot.advance(3, true);
        assert_eq!(plot.advance(3, false), Ok(GrowthOutcome::StayedDry));
        assert_eq!(plot.state(), PlotState::Dry);
        assert_eq!(plot.growth_stage(), 0);

        assert_eq!(plot.irrigate(3), Ok(true));
        assert_eq!(plot.state(), PlotState::Growing);
    }

    #[test]
    fn dry_ready_plot_recovers_to_ready() {
        let mut plot = planted();
        for _ in 0..3 {
            let _ = plot.advance(3, false);
        }
        assert_eq!(plot.state(), PlotState::Ready);
        assert!(plot.dry_out());
        assert_eq!(plot.irrigate(3), Ok(true));
        assert_eq!(plot.state(), PlotState::Ready);
    }

    #[test]
    fn irrigation_is_single_use_per_cycle() {
        let mut plot = planted();
        assert!(plot.irrigate(3).is_ok());
        assert_eq!(plot.irrigate(3), Err(WorldError::AlreadyIrrigated(0)));
        let _ = plot.advance(3, true);
        assert!(plot.irrigate(3).is_ok());
    }

    #[test]
    fn care_actions_require_a_crop() {
        let mut plot = Plot::new(2);
        assert!(matches!(plot.irrigate(3), Err(WorldError::InvalidState { .. })));
        assert!(matches!(plot.fertilize(), Err(WorldError::InvalidState { .. })));
        assert!(matches!(plot.apply_pesticide(), Err(WorldError::InvalidState { .. })));
        assert!(!plot.dry_out());
    }

    #[test]
    fn fertilizer_and_pesticide_apply_once() {
        let mut plot = planted();
        assert!(plot.fertilize().is_ok());
        assert_eq!(plot.fertilize(), Err(WorldError::AlreadyFertilized(0)));
        assert!(plot.apply_pesticide().is_ok());
        assert_eq!(plot.apply_pesticide(), Err(WorldError::AlreadyPesticide(0)));
    }

    #[test]
    fn harvest_requires_ready_and_clears_everything() {
        let mut plot = planted();
        assert!(matches!(plot.harvest(), Err(WorldError::NotReady { .. })));

        let _ = plot.fertilize();
        let _ = plot.apply_pesticide();
        for _ in 0..3 {
            let _ = plot.irrigate(3);
            let _ = plot.advance(3, false);
        }

        let cleared = plot.harvest();
        assert_eq!(
            cleared,
            Ok(ClearedCrop {
                crop: maize(),
                fertilized: true,
                pesticide_applied: true,
            })
        );
        assert_eq!(plot, Plot::new(0));
    }

    #[test]
    fn empty_plot_is_idle() {
        let mut plot = Plot::new(1);
        assert_eq!(plot.advance(3, true), Ok(GrowthOutcome::Idle));
        assert_eq!(plot.state(), PlotState::Empty);
    }
}
