//! Per-action prices for plot work.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use demeter_types::Resource;

/// What each plot action costs. Seeds, fertilizer and pesticide are paid in
/// money; irrigation is paid in water.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCosts {
    /// Money per planting.
    pub seed: Decimal,
    /// Water per irrigation.
    pub irrigation: Decimal,
    /// Money per fertilizer application.
    pub fertilizer: Decimal,
    /// Money per pesticide application.
    pub pesticide: Decimal,
}

impl ActionCosts {
    /// Resource charged for seeds.
    pub const SEED_RESOURCE: Resource = Resource::Money;
    /// Resource charged for irrigation.
    pub const IRRIGATION_RESOURCE: Resource = Resource::Water;
    /// Resource charged for fertilizer.
    pub const FERTILIZER_RESOURCE: Resource = Resource::Money;
    /// Resource charged for pesticide.
    pub const PESTICIDE_RESOURCE: Resource = Resource::Money;

    /// Lower the irrigation cost by `amount`, never below zero.
    /// Returns the new cost.
    pub fn reduce_irrigation(&mut self, amount: Decimal) -> Decimal {
        self.irrigation = self.irrigation.saturating_sub(amount).max(Decimal::ZERO);
        self.irrigation
    }
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            seed: Decimal::new(10, 0),
            irrigation: Decimal::new(10, 0),
            fertilizer: Decimal::new(15, 0),
            pesticide: Decimal::new(20, 0),
        }
    }
}
