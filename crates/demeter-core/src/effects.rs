//! Effect data and the interpreter that applies it.
//!
//! Event options and technologies do not carry code. They carry lists of
//! [`Effect`] / [`TechEffect`] values, and the functions here apply them to
//! a [`SimulationState`]. Callers that need all-or-nothing behaviour run
//! the interpreter against a clone and keep it only on success.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use demeter_types::{Gauge, Notification, NotificationKind, Resource, UnlockableAction};
use demeter_world::{CropDefinition, PlotFilter};

use crate::error::GameError;
use crate::state::SimulationState;

// ---------------------------------------------------------------------------
// Event effects
// ---------------------------------------------------------------------------

/// A test evaluated when a [`Effect::ConditionalBranch`] runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Condition {
    /// True with probability `p`, drawn when the branch runs.
    Chance {
        /// Probability in `[0, 1]`.
        p: f64,
    },
    /// True if the gauge is at or above `threshold`.
    GaugeAtLeast {
        /// Gauge to read.
        gauge: Gauge,
        /// Inclusive lower bound.
        threshold: Decimal,
    },
    /// True if the ledger holds at least `amount` of `resource`.
    CanAfford {
        /// Resource to check.
        resource: Resource,
        /// Required balance.
        amount: Decimal,
    },
}

/// One step of an event option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Effect {
    /// Debit a resource. Fails if the balance is too small.
    SpendResource {
        /// Resource to debit.
        resource: Resource,
        /// Amount.
        amount: Decimal,
    },
    /// Credit a resource.
    GrantResource {
        /// Resource to credit.
        resource: Resource,
        /// Amount.
        amount: Decimal,
    },
    /// Shift a gauge (clamped).
    AdjustScore {
        /// Gauge to shift.
        gauge: Gauge,
        /// Signed change.
        delta: Decimal,
    },
    /// Dry every plot the filter selects.
    MutatePlotGrid {
        /// Which plots.
        filter: PlotFilter,
    },
    /// Run `then` if the condition holds, `otherwise` if not.
    ConditionalBranch {
        /// The test.
        condition: Condition,
        /// Effects when true.
        then: Vec<Effect>,
        /// Effects when false.
        otherwise: Vec<Effect>,
    },
    /// Set the outcome shown to the player. The last one applied wins.
    Notify {
        /// Presentation kind.
        kind: NotificationKind,
        /// Outcome text.
        message: String,
    },
}

impl Effect {
    /// Shorthand for a success notification.
    pub fn success(message: &str) -> Self {
        Self::Notify {
            kind: NotificationKind::Success,
            message: message.to_owned(),
        }
    }

    /// Shorthand for a notification of `kind`.
    pub fn notify(kind: NotificationKind, message: &str) -> Self {
        Self::Notify {
            kind,
            message: message.to_owned(),
        }
    }
}

/// What applying a list of effects did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectReport {
    /// The outcome to show, if any effect set one.
    pub notification: Option<Notification>,
    /// Plots dried by grid mutations.
    pub dried_plots: Vec<usize>,
}

/// True with probability `p`. Always consumes one draw; `p <= 0` (or NaN)
/// is never true and `p >= 1` always is.
pub fn roll(rng: &mut impl Rng, p: f64) -> bool {
    let draw: f64 = rng.random();
    draw < p
}

/// Evaluate a condition against the state.
fn holds(state: &SimulationState, condition: &Condition, rng: &mut impl Rng) -> bool {
    match condition {
        Condition::Chance { p } => roll(rng, *p),
        Condition::GaugeAtLeast { gauge, threshold } => state.score.get(*gauge) >= *threshold,
        Condition::CanAfford { resource, amount } => state.ledger.can_afford(*resource, *amount),
    }
}

/// Apply `effects` in order. `reason` labels the ledger entries.
///
/// Stops at the first failing effect; earlier effects stay applied, so
/// callers wanting atomicity must pass a scratch copy.
///
/// # Errors
///
/// Returns the ledger error of a failing spend or grant.
pub fn apply_effects(
    state: &mut SimulationState,
    effects: &[Effect],
    reason: &str,
    rng: &mut impl Rng,
) -> Result<EffectReport, GameError> {
    let mut report = EffectReport::default();
    apply_into(state, effects, reason, rng, &mut report)?;
    Ok(report)
}

/// Recursive worker for [`apply_effects`].
fn apply_into(
    state: &mut SimulationState,
    effects: &[Effect],
    reason: &str,
    rng: &mut impl Rng,
    report: &mut EffectReport,
) -> Result<(), GameError> {
    let cycle = state.cycle();
    for effect in effects {
        match effect {
            Effect::SpendResource { resource, amount } => {
                state.ledger.debit(*resource, *amount, cycle, reason)?;
            }
            Effect::GrantResource { resource, amount } => {
                state.ledger.credit(*resource, *amount, cycle, reason)?;
            }
            Effect::AdjustScore { gauge, delta } => {
                let value = state.score.adjust(*gauge, *delta);
                debug!(%gauge, %delta, %value, reason, "Gauge adjusted");
            }
            Effect::MutatePlotGrid { filter } => {
                let dried = state.grid.dry_where(*filter);
                debug!(?filter, count = dried.len(), reason, "Plots dried");
                report.dried_plots.extend(dried);
            }
            Effect::ConditionalBranch {
                condition,
                then,
                otherwise,
            } => {
                let branch = if holds(state, condition, rng) {
                    then
                } else {
                    otherwise
                };
                apply_into(state, branch, reason, rng, report)?;
            }
            Effect::Notify { kind, message } => {
                report.notification = Some(Notification::new(*kind, message.clone()));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Technology effects
// ---------------------------------------------------------------------------

/// A permanent rule change granted by a technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TechEffect {
    /// Make a new crop plantable.
    AddCrop {
        /// The crop.
        crop: CropDefinition,
    },
    /// Lower the water cost of irrigation.
    ReduceIrrigationCost {
        /// Reduction per irrigation.
        amount: Decimal,
    },
    /// Shift a gauge once.
    AdjustScore {
        /// Gauge to shift.
        gauge: Gauge,
        /// Signed change.
        delta: Decimal,
    },
    /// Make a new player action available.
    UnlockAction {
        /// The action.
        action: UnlockableAction,
    },
}

/// Apply one technology effect.
///
/// # Errors
///
/// Returns [`GameError::World`] if the crop is already in the catalog.
pub fn apply_tech_effect(state: &mut SimulationState, effect: &TechEffect) -> Result<(), GameError> {
    match effect {
        TechEffect::AddCrop { crop } => {
            state.crops.insert(crop.clone())?;
            debug!(crop = %crop.id, "Crop added to catalog");
        }
        TechEffect::ReduceIrrigationCost { amount } => {
            let cost = state.costs.reduce_irrigation(*amount);
            debug!(%cost, "Irrigation cost reduced");
        }
        TechEffect::AdjustScore { gauge, delta } => {
            state.score.adjust(*gauge, *delta);
        }
        TechEffect::UnlockAction { action } => {
            state.unlocked_actions.insert(*action);
            debug!(?action, "Action unlocked");
        }
    }
    Ok(())
}
