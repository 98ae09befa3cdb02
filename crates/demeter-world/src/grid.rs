//! The farm: a fixed rectangular grid of [`Plot`]s.
//!
//! Plots are stored row-major. Dimensions are chosen at construction and
//! never change afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use demeter_types::{PlotSnapshot, PlotState};

use crate::error::WorldError;
use crate::plot::Plot;

/// Default number of grid rows.
pub const DEFAULT_ROWS: usize = 6;

/// Default number of grid columns.
pub const DEFAULT_COLS: usize = 6;

/// Selects plots for grid-wide mutations such as a drought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotFilter {
    /// Every plot holding a crop.
    Occupied,
    /// Plots holding a crop that were not irrigated this cycle.
    UnirrigatedCrops,
}

impl PlotFilter {
    /// Whether `plot` is selected.
    pub const fn matches(self, plot: &Plot) -> bool {
        match self {
            Self::Occupied => plot.is_occupied(),
            Self::UnirrigatedCrops => plot.is_occupied() && !plot.is_irrigated(),
        }
    }
}

/// A fixed-size grid of plots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotGrid {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Plots in row-major order.
    plots: Vec<Plot>,
}

impl PlotGrid {
    /// Create a grid of `rows * cols` empty plots.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either dimension is zero
    /// or the plot count overflows.
    pub fn new(rows: usize, cols: usize) -> Result<Self, WorldError> {
        if rows == 0 || cols == 0 {
            return Err(WorldError::InvalidDimensions { rows, cols });
        }
        let len = rows
            .checked_mul(cols)
            .ok_or(WorldError::InvalidDimensions { rows, cols })?;
        Ok(Self {
            rows,
            cols,
            plots: (0..len).map(Plot::new).collect(),
        })
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of plots.
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    /// Always `false` for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Borrow the plot at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlotOutOfRange`] if `index` is past the end.
    pub fn plot(&self, index: usize) -> Result<&Plot, WorldError> {
        let len = self.plots.len();
        self.plots
            .get(index)
            .ok_or(WorldError::PlotOutOfRange { index, len })
    }

    /// Mutably borrow the plot at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlotOutOfRange`] if `index` is past the end.
    pub fn plot_mut(&mut self, index: usize) -> Result<&mut Plot, WorldError> {
        let len = self.plots.len();
        self.plots
            .get_mut(index)
            .ok_or(WorldError::PlotOutOfRange { index, len })
    }

    /// Flat index of (`row`, `col`).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlotOutOfRange`] if either coordinate is
    /// outside the grid.
    pub fn index_of(&self, row: usize, col: usize) -> Result<usize, WorldError> {
        let out_of_range = WorldError::PlotOutOfRange {
            index: row.saturating_mul(self.cols).saturating_add(col),
            len: self.plots.len(),
        };
        if row >= self.rows || col >= self.cols {
            return Err(out_of_range);
        }
        row.checked_mul(self.cols)
            .and_then(|base| base.checked_add(col))
            .ok_or(out_of_range)
    }

    /// (`row`, `col`) of a flat index, without bounds checking.
    const fn position(&self, index: usize) -> (usize, usize) {
        match (index.checked_div(self.cols), index.checked_rem(self.cols)) {
            (Some(row), Some(col)) => (row, col),
            _ => (0, 0),
        }
    }

    /// Iterate over every plot in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Plot> {
        self.plots.iter()
    }

    /// Iterate mutably over every plot in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Plot> {
        self.plots.iter_mut()
    }

    /// Dry every plot selected by `filter`. Returns the indices that changed.
    pub fn dry_where(&mut self, filter: PlotFilter) -> Vec<usize> {
        self.plots
            .iter_mut()
            .filter(|plot| filter.matches(plot))
            .filter_map(|plot| plot.dry_out().then_some(plot.index()))
            .collect()
    }

    /// Number of plots in `state`.
    pub fn count_in(&self, state: PlotState) -> usize {
        self.plots.iter().filter(|p| p.state() == state).count()
    }

    /// Number of plots in each state. States with no plots are omitted.
    pub fn state_counts(&self) -> BTreeMap<PlotState, usize> {
        let mut counts = BTreeMap::new();
        for plot in &self.plots {
            let n = counts.entry(plot.state()).or_insert(0_usize);
            *n = n.saturating_add(1);
        }
        counts
    }

    /// Snapshot of the plot at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlotOutOfRange`] if `index` is past the end.
    pub fn snapshot(&self, index: usize) -> Result<PlotSnapshot, WorldError> {
        let (row, col) = self.position(index);
        self.plot(index).map(|plot| plot.snapshot(row, col))
    }

    /// Snapshots of every plot, in index order.
    pub fn snapshots(&self) -> Vec<PlotSnapshot> {
        self.plots
            .iter()
            .map(|plot| {
                let (row, col) = self.position(plot.index());
                plot.snapshot(row, col)
            })
            .collect()
    }
}

impl Default for PlotGrid {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            plots: (0..DEFAULT_ROWS.saturating_mul(DEFAULT_COLS)).map(Plot::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use demeter_types::CropId;

    use super::*;

    fn plant(grid: &mut PlotGrid, index: usize) {
        let planted = grid.plot_mut(index).and_then(|p| p.plant(CropId::new("maize")));
        assert!(planted.is_ok());
    }

    #[test]
    fn default_grid_is_six_by_six() {
        let grid = PlotGrid::default();
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.cols(), 6);
        assert_eq!(grid.len(), 36);
        assert_eq!(grid.count_in(PlotState::Empty), 36);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            PlotGrid::new(0, 4),
            Err(WorldError::InvalidDimensions { rows: 0, cols: 4 })
        );
        assert!(PlotGrid::new(3, 0).is_err());
    }

    #[test]
    fn out_of_range_index_rejected() {
        let mut grid = PlotGrid::default();
        assert_eq!(grid.plot(36).err(), Some(WorldError::PlotOutOfRange { index: 36, len: 36 }));
        assert!(grid.plot_mut(100).is_err());
    }

    #[test]
    fn row_col_addressing() {
        let grid = PlotGrid::new(2, 3);
        let Ok(grid) = grid else {
            return;
        };
        assert_eq!(grid.index_of(1, 2), Ok(5));
        assert_eq!(grid.index_of(0, 0), Ok(0));
        assert!(grid.index_of(2, 0).is_err());
        assert!(grid.index_of(0, 3).is_err());

        let snap = grid.snapshot(4);
        assert_eq!(snap.map(|s| (s.row, s.col)), Ok((1, 1)));
    }

    #[test]
    fn dry_where_selects_unirrigated_crops() {
        let mut grid = PlotGrid::default();
        plant(&mut grid, 0);
        plant(&mut grid, 1);
        plant(&mut grid, 2);
        assert!(grid.plot_mut(1).and_then(|p| p.irrigate(3)).is_ok());

        let dried = grid.dry_where(PlotFilter::UnirrigatedCrops);
        assert_eq!(dried, vec![0, 2]);
        assert_eq!(grid.count_in(PlotState::Dry), 2);
        assert_eq!(grid.count_in(PlotState::Planted), 1);

        // Already dry plots are not reported twice.
        assert!(grid.dry_where(PlotFilter::Occupied).contains(&1));
        assert_eq!(grid.count_in(PlotState::Dry), 3);
    }

    #[test]
    fn state_counts_cover_every_plot() {
        let mut grid = PlotGrid::default();
        plant(&mut grid, 7);
        let counts = grid.state_counts();
        assert_eq!(counts.get(&PlotState::Empty), Some(&35));
        assert_eq!(counts.get(&PlotState::Planted), Some(&1));
        assert_eq!(grid.snapshots().len(), 36);
    }
}
