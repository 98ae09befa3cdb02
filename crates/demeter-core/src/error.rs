//! The game-level error taxonomy and its mapping to player notifications.
//!
//! Every variant is recoverable: a failed action changes nothing and the
//! caller decides how to present it. [`GameError::notification`] gives the
//! default presentation.

use rust_decimal::Decimal;

use demeter_ledger::LedgerError;
use demeter_types::{
    CropId, EventId, LocationId, Notification, NotificationKind, PlotState, Resource,
    TechnologyId, UnlockableAction,
};
use demeter_world::{PersistError, ProviderError, WorldError};

use crate::clock::ClockError;

/// Errors returned by [`Game`](crate::Game) operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Not enough money for the action.
    #[error("not enough money: have {balance}, need {required}")]
    InsufficientFunds {
        /// Current money balance.
        balance: Decimal,
        /// Amount the action costs.
        required: Decimal,
    },

    /// Not enough water for the action.
    #[error("not enough water: have {balance}, need {required}")]
    InsufficientWater {
        /// Current water balance.
        balance: Decimal,
        /// Amount the action costs.
        required: Decimal,
    },

    /// Not enough research points for the unlock.
    #[error("not enough research points: have {balance}, need {required}")]
    InsufficientResearch {
        /// Current research balance.
        balance: Decimal,
        /// Cost of the technology.
        required: Decimal,
    },

    /// Any other ledger failure.
    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    /// The plot index lies outside the grid.
    #[error("plot {index} is outside the grid ({len} plots)")]
    PlotOutOfRange {
        /// Requested index.
        index: usize,
        /// Grid size.
        len: usize,
    },

    /// The plot's state forbids the action.
    #[error("plot {index} is {state:?}; cannot {action}")]
    InvalidState {
        /// The plot.
        index: usize,
        /// Its state.
        state: PlotState,
        /// What was attempted.
        action: &'static str,
    },

    /// Irrigated already this cycle.
    #[error("plot {0} is already irrigated this cycle")]
    AlreadyIrrigated(usize),

    /// Fertilized already.
    #[error("plot {0} is already fertilized")]
    AlreadyFertilized(usize),

    /// Pesticide applied already.
    #[error("plot {0} already has pesticide applied")]
    AlreadyPesticide(usize),

    /// Harvest attempted before the crop is ready.
    #[error("plot {index} is not ready for harvest ({state:?})")]
    NotReady {
        /// The plot.
        index: usize,
        /// Its state.
        state: PlotState,
    },

    /// The technology is already unlocked.
    #[error("technology {0} is already unlocked")]
    AlreadyUnlocked(TechnologyId),

    /// The action requires a technology that is not unlocked yet.
    #[error("{0:?} is locked; unlock its technology first")]
    ActionLocked(UnlockableAction),

    /// Drones were already deployed this cycle.
    #[error("drones have already been deployed this cycle")]
    AlreadyDeployed,

    /// Unknown crop id.
    #[error("unknown crop: {0}")]
    UnknownCrop(CropId),

    /// Unknown technology id.
    #[error("unknown technology: {0}")]
    UnknownTechnology(TechnologyId),

    /// Unknown event id.
    #[error("unknown event: {0}")]
    UnknownEvent(EventId),

    /// Unknown location id.
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    /// The option index is out of range for the event.
    #[error("event {event} has no option {index} ({count} options)")]
    InvalidOption {
        /// The event.
        event: EventId,
        /// Requested index.
        index: usize,
        /// Number of options.
        count: usize,
    },

    /// There is no event waiting for a decision.
    #[error("no event is waiting for a decision")]
    NoPendingEvent,

    /// An event must be resolved before the cycle can advance.
    #[error("event {0} must be resolved first")]
    EventPending(EventId),

    /// The game has ended.
    #[error("the simulation has ended")]
    SimulationEnded,

    /// The cycle counter cannot advance.
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// Plot or catalog failure not covered above.
    #[error("world error: {0}")]
    World(WorldError),

    /// The environmental data provider failed.
    #[error("environment error: {0}")]
    Provider(#[from] ProviderError),

    /// Saving or loading the location preference failed.
    #[error("preference error: {0}")]
    Persist(#[from] PersistError),
}

impl From<LedgerError> for GameError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance {
                resource,
                balance,
                requested,
            } => Self::insufficient(resource, balance, requested),
            other => Self::Ledger(other),
        }
    }
}

impl From<WorldError> for GameError {
    fn from(e: WorldError) -> Self {
        match e {
            WorldError::PlotOutOfRange { index, len } => Self::PlotOutOfRange { index, len },
            WorldError::InvalidState {
                index,
                state,
                action,
            } => Self::InvalidState {
                index,
                state,
                action,
            },
            WorldError::AlreadyIrrigated(i) => Self::AlreadyIrrigated(i),
            WorldError::AlreadyFertilized(i) => Self::AlreadyFertilized(i),
            WorldError::AlreadyPesticide(i) => Self::AlreadyPesticide(i),
            WorldError::NotReady { index, state } => Self::NotReady { index, state },
            WorldError::UnknownCrop(id) => Self::UnknownCrop(id),
            other => Self::World(other),
        }
    }
}

impl GameError {
    /// The resource-specific shortage error.
    pub const fn insufficient(resource: Resource, balance: Decimal, required: Decimal) -> Self {
        match resource {
            Resource::Money => Self::InsufficientFunds { balance, required },
            Resource::Water => Self::InsufficientWater { balance, required },
            Resource::Research => Self::InsufficientResearch { balance, required },
        }
    }

    /// How the failure should be shown to the player.
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Self::NotReady { .. } | Self::EventPending(_) | Self::ActionLocked(_) => {
                NotificationKind::Warning
            }
            Self::AlreadyIrrigated(_)
            | Self::AlreadyFertilized(_)
            | Self::AlreadyPesticide(_)
            | Self::AlreadyUnlocked(_)
            | Self::AlreadyDeployed
            | Self::NoPendingEvent
            | Self::SimulationEnded => NotificationKind::Info,
            _ => NotificationKind::Error,
        }
    }

    /// The notification for this failure.
    pub fn notification(&self) -> Notification {
        Notification::new(self.kind(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn ledger_shortage_maps_per_resource() {
        let err: GameError = LedgerError::InsufficientBalance {
            resource: Resource::Water,
            balance: dec!(5),
            requested: dec!(10),
        }
        .into();
        assert!(matches!(
            err,
            GameError::InsufficientWater {
                balance,
                required,
            } if balance == dec!(5) && required == dec!(10)
        ));
    }

    #[test]
    fn world_errors_keep_their_meaning() {
        let err: GameError = WorldError::AlreadyIrrigated(3).into();
        assert!(matches!(err, GameError::AlreadyIrrigated(3)));
        let err: GameError = WorldError::InvalidDimensions { rows: 0, cols: 1 }.into();
        assert!(matches!(err, GameError::World(_)));
    }

    #[test]
    fn notification_kinds() {
        assert_eq!(
            GameError::InsufficientFunds {
                balance: dec!(0),
                required: dec!(10),
            }
            .kind(),
            NotificationKind::Error
        );
        assert_eq!(
            GameError::NotReady {
                index: 0,
                state: PlotState::Growing,
            }
            .kind(),
            NotificationKind::Warning
        );
        assert_eq!(GameError::AlreadyIrrigated(0).kind(), NotificationKind::Info);
        assert_eq!(
            GameError::UnknownCrop(CropId::new("kale")).notification().message,
            "unknown crop: kale"
        );
    }
}
