//! Productivity and sustainability gauges and the final score.
//!
//! Both gauges live in `[0, 100]`. Every adjustment clamps, so no delta can
//! fail or push a gauge out of range.
//!
//! ```text
//! final = round((p * 0.6 + s * 0.4) * (1 + money / 10000) * (1 + cycles / 20))
//! ```
//!
//! Rounding is half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use demeter_types::{Gauge, GaugeLevel};

/// Upper bound of both gauges.
pub const GAUGE_MAX: Decimal = Decimal::ONE_HUNDRED;

/// Gauges below this level are [`GaugeLevel::Low`].
const LOW_BELOW: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Gauges below this level (and not low) are [`GaugeLevel::Medium`].
const MEDIUM_BELOW: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

/// The two bounded gauges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreModel {
    /// Productivity gauge.
    productivity: Decimal,
    /// Sustainability gauge.
    sustainability: Decimal,
}

impl ScoreModel {
    /// Create gauges with the given starting values, clamped into range.
    pub fn new(productivity: Decimal, sustainability: Decimal) -> Self {
        Self {
            productivity: clamp(productivity),
            sustainability: clamp(sustainability),
        }
    }

    /// Current value of `gauge`.
    pub const fn get(&self, gauge: Gauge) -> Decimal {
        match gauge {
            Gauge::Productivity => self.productivity,
            Gauge::Sustainability => self.sustainability,
        }
    }

    /// Current productivity.
    pub const fn productivity(&self) -> Decimal {
        self.productivity
    }

    /// Current sustainability.
    pub const fn sustainability(&self) -> Decimal {
        self.sustainability
    }

    /// Add `delta` to `gauge`, clamping into `[0, 100]`. Returns the new
    /// value.
    pub fn adjust(&mut self, gauge: Gauge, delta: Decimal) -> Decimal {
        let slot = match gauge {
            Gauge::Productivity => &mut self.productivity,
            Gauge::Sustainability => &mut self.sustainability,
        };
        *slot = clamp(slot.saturating_add(delta));
        *slot
    }

    /// Shorthand for `adjust(Gauge::Productivity, delta)`.
    pub fn adjust_productivity(&mut self, delta: Decimal) -> Decimal {
        self.adjust(Gauge::Productivity, delta)
    }

    /// Shorthand for `adjust(Gauge::Sustainability, delta)`.
    pub fn adjust_sustainability(&mut self, delta: Decimal) -> Decimal {
        self.adjust(Gauge::Sustainability, delta)
    }

    /// Display band of `gauge`.
    pub fn level(&self, gauge: Gauge) -> GaugeLevel {
        level_of(self.get(gauge))
    }

    /// Final score for the given money balance and completed cycles.
    pub fn final_score(&self, money: Decimal, cycles_completed: u64) -> Decimal {
        final_score(self.productivity, self.sustainability, money, cycles_completed)
    }
}

impl Default for ScoreModel {
    fn default() -> Self {
        let half = Decimal::from_parts(50, 0, 0, false, 0);
        Self::new(half, half)
    }
}

/// Clamp into `[0, 100]`.
fn clamp(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, GAUGE_MAX)
}

/// Display band for a gauge value.
pub fn level_of(value: Decimal) -> GaugeLevel {
    if value < LOW_BELOW {
        GaugeLevel::Low
    } else if value < MEDIUM_BELOW {
        GaugeLevel::Medium
    } else {
        GaugeLevel::High
    }
}

/// The end-of-game score. Saturates instead of overflowing.
pub fn final_score(
    productivity: Decimal,
    sustainability: Decimal,
    money: Decimal,
    cycles_completed: u64,
) -> Decimal {
    let base = productivity
        .saturating_mul(Decimal::new(6, 1))
        .saturating_add(sustainability.saturating_mul(Decimal::new(4, 1)));
    let money_factor = Decimal::ONE.saturating_add(
        money
            .checked_div(Decimal::from(10_000_u32))
            .unwrap_or(Decimal::ZERO),
    );
    let cycle_factor = Decimal::ONE.saturating_add(
        Decimal::from(cycles_completed)
            .checked_div(Decimal::from(20_u32))
            .unwrap_or(Decimal::ZERO),
    );
    base.saturating_mul(money_factor)
        .saturating_mul(cycle_factor)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn starts_at_fifty_fifty() {
        let score = ScoreModel::default();
        assert_eq!(score.productivity(), dec!(50));
        assert_eq!(score.sustainability(), dec!(50));
        assert_eq!(score.level(Gauge::Productivity), GaugeLevel::Medium);
    }

    #[test]
    fn adjustments_clamp_to_bounds() {
        let mut score = ScoreModel::default();
        assert_eq!(score.adjust_productivity(dec!(500)), dec!(100));
        assert_eq!(score.adjust_sustainability(dec!(-75)), dec!(0));
        assert_eq!(score.adjust_sustainability(dec!(-1)), dec!(0));
        assert_eq!(score.adjust(Gauge::Productivity, dec!(-30)), dec!(70));
    }

    #[test]
    fn construction_clamps() {
        let score = ScoreModel::new(dec!(140), dec!(-3));
        assert_eq!(score.get(Gauge::Productivity), dec!(100));
        assert_eq!(score.get(Gauge::Sustainability), dec!(0));
    }

    #[test]
    fn level_bands() {
        assert_eq!(level_of(dec!(29.9)), GaugeLevel::Low);
        assert_eq!(level_of(dec!(30)), GaugeLevel::Medium);
        assert_eq!(level_of(dec!(69)), GaugeLevel::Medium);
        assert_eq!(level_of(dec!(70)), GaugeLevel::High);
    }

    #[test]
    fn final_score_formula() {
        // (50 * 0.6 + 50 * 0.4) * (1 + 1000/10000) * (1 + 0/20) = 55
        let score = ScoreModel::default();
        assert_eq!(score.final_score(dec!(1000), 0), dec!(55));

        // (80 * 0.6 + 40 * 0.4) * 1.25 * 1.5 = 64 * 1.875 = 120
        let score = ScoreModel::new(dec!(80), dec!(40));
        assert_eq!(score.final_score(dec!(2500), 10), dec!(120));
    }

    #[test]
    fn final_score_rounds_half_away_from_zero() {
        // (1 * 0.6 + 0 * 0.4) * 1 * (1 + 5/20) = 0.75 -> 1
        assert_eq!(final_score(dec!(1), dec!(0), dec!(0), 5), dec!(1));
        // 0.5 exactly -> 1
        assert_eq!(final_score(dec!(0), dec!(1.25), dec!(0), 0), dec!(1));
    }
}
