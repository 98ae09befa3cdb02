//! Error types for the `demeter-world` crate.
//!
//! Plot and catalog operations return [`WorldError`]. Environmental data
//! and preference storage have their own error types in
//! [`environment`](crate::environment) and
//! [`persistence`](crate::persistence).

use demeter_types::{CropId, PlotState};

/// Errors that can occur during plot grid and crop catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A plot index (or row/column pair) lies outside the grid.
    #[error("plot {index} is outside the grid ({len} plots)")]
    PlotOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of plots in the grid.
        len: usize,
    },

    /// The plot's state forbids the action.
    #[error("plot {index} is {state:?}; cannot {action}")]
    InvalidState {
        /// The plot.
        index: usize,
        /// Its current state.
        state: PlotState,
        /// What was attempted (e.g. `"plant"`).
        action: &'static str,
    },

    /// The plot has already been irrigated this cycle.
    #[error("plot {0} is already irrigated this cycle")]
    AlreadyIrrigated(usize),

    /// Fertilizer has already been applied since planting.
    #[error("plot {0} is already fertilized")]
    AlreadyFertilized(usize),

    /// Pesticide has already been applied since planting.
    #[error("plot {0} already has pesticide applied")]
    AlreadyPesticide(usize),

    /// Only ready plots can be harvested.
    #[error("plot {index} is not ready for harvest ({state:?})")]
    NotReady {
        /// The plot.
        index: usize,
        /// Its current state.
        state: PlotState,
    },

    /// The crop id is not in the catalog.
    #[error("unknown crop: {0}")]
    UnknownCrop(CropId),

    /// A crop with the same id is already in the catalog.
    #[error("duplicate crop id: {0}")]
    DuplicateCrop(CropId),

    /// A crop definition violates its bounds.
    #[error("invalid crop {crop}: {reason}")]
    InvalidCrop {
        /// The offending crop.
        crop: CropId,
        /// What is wrong.
        reason: &'static str,
    },

    /// A grid must have at least one row and one column.
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
