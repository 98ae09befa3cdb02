//! The technology tree: research-gated, one-shot rule changes.
//!
//! | Technology           | Category   | Cost | Effects                                      |
//! |----------------------|------------|------|----------------------------------------------|
//! | `rice`               | Crops      |  50  | adds rice                                    |
//! | `cotton`             | Crops      |  75  | adds cotton                                  |
//! | `drip_irrigation`    | Irrigation | 100  | irrigation -5 water, sustainability +15      |
//! | `monitoring_drones`  | Monitoring | 150  | productivity +10, unlocks drone monitoring   |
//!
//! Unlocking is append-only: a technology's effects run exactly once per
//! session, and a second unlock fails without touching anything.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use demeter_types::{Gauge, Resource, TechCategory, TechnologyId, UnlockableAction};
use demeter_world::crops;

use crate::effects::{TechEffect, apply_tech_effect};
use crate::error::GameError;
use crate::state::SimulationState;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    /// Catalog key.
    pub id: TechnologyId,
    /// Display name.
    pub name: String,
    /// Category shown in the UI.
    pub category: TechCategory,
    /// Research point cost.
    pub cost: Decimal,
    /// Player-facing description.
    pub description: String,
    /// Effects applied once on unlock.
    pub effects: Vec<TechEffect>,
}

/// The catalog of unlockable technologies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnologyTree {
    /// Technologies by id.
    technologies: BTreeMap<TechnologyId, Technology>,
}

impl TechnologyTree {
    /// The four built-in technologies.
    pub fn builtin() -> Self {
        let tech = |id: &str, name: &str, category, cost: i64, description: &str, effects| Technology {
            id: TechnologyId::new(id),
            name: name.to_owned(),
            category,
            cost: Decimal::new(cost, 0),
            description: description.to_owned(),
            effects,
        };
        let technologies = [
            tech(
                "rice",
                "Rice",
                TechCategory::Crops,
                50,
                "A hardy crop that does well in wet areas.",
                vec![TechEffect::AddCrop { crop: crops::rice() }],
            ),
            tech(
                "cotton",
                "Cotton",
                TechCategory::Crops,
                75,
                "A high-value crop that needs more water.",
                vec![TechEffect::AddCrop {
                    crop: crops::cotton(),
                }],
            ),
            tech(
                "drip_irrigation",
                "Drip Irrigation",
                TechCategory::Irrigation,
                100,
                "An efficient irrigation system that uses less water.",
                vec![
                    TechEffect::ReduceIrrigationCost {
                        amount: Decimal::new(5, 0),
                    },
                    TechEffect::AdjustScore {
                        gauge: Gauge::Sustainability,
                        delta: Decimal::new(15, 0),
                    },
                ],
            ),
            tech(
                "monitoring_drones",
                "Monitoring Drones",
                TechCategory::Monitoring,
                150,
                "Camera drones that watch over crop health.",
                vec![
                    TechEffect::AdjustScore {
                        gauge: Gauge::Productivity,
                        delta: Decimal::TEN,
                    },
                    TechEffect::UnlockAction {
                        action: UnlockableAction::DroneMonitoring,
                    },
                ],
            ),
        ]
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();
        Self { technologies }
    }

    /// Look up a technology.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTechnology`] for an unknown id.
    pub fn get(&self, id: &TechnologyId) -> Result<&Technology, GameError> {
        self.technologies
            .get(id)
            .ok_or_else(|| GameError::UnknownTechnology(id.clone()))
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.values()
    }

    /// Number of technologies.
    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    /// Unlock `id`: check, pay, record, then apply every effect once.
    ///
    /// Effects run after the debit on the same state, so callers that need
    /// all-or-nothing behaviour pass a scratch copy.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTechnology`],
    /// [`GameError::AlreadyUnlocked`] or
    /// [`GameError::InsufficientResearch`]; nothing changes in those cases.
    pub fn unlock<'a>(
        &'a self,
        state: &mut SimulationState,
        id: &TechnologyId,
    ) -> Result<&'a Technology, GameError> {
        let tech = self.get(id)?;
        if state.is_unlocked(id) {
            return Err(GameError::AlreadyUnlocked(id.clone()));
        }
        let balance = state.ledger.balance(Resource::Research);
        if balance < tech.cost {
            return Err(GameError::InsufficientResearch {
                balance,
                required: tech.cost,
            });
        }

        let cycle = state.cycle();
        state
            .ledger
            .debit(Resource::Research, tech.cost, cycle, &format!("TECH:{id}"))?;
        state.unlocked_technologies.push(id.clone());
        for effect in &tech.effects {
            apply_tech_effect(state, effect)?;
        }

        info!(
            technology = %id,
            category = ?tech.category,
            cost = %tech.cost,
            research_left = %state.ledger.balance(Resource::Research),
            "Technology unlocked"
        );
        Ok(tech)
    }
}

impl Default for TechnologyTree {
    fn default() -> Self {
        Self::builtin()
    }
}
