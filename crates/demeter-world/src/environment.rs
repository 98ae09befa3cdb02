//! Environmental data for the farm's location.
//!
//! The core never talks to a satellite service directly. It reads through
//! the [`EnvironmentProvider`] trait, which has two built-in
//! implementations:
//!
//! - [`SimulatedProvider`] -- per-location reference tables (soil moisture,
//!   vegetation index, five-day forecast) that drift a little every cycle.
//! - [`FallbackProvider`] -- wraps an optional external provider and serves
//!   the simulated tables whenever it is absent or fails.
//!
//! # Drift
//!
//! Once per cycle the simulated tables move toward a hotter, drier farm.
//! With `f = cycle / horizon`:
//!
//! | Reading            | New value                                   |
//! |--------------------|---------------------------------------------|
//! | Soil moisture      | `clamp(v - 10f + U(-10, 10), 0, 100)`       |
//! | Vegetation (NDVI)  | `clamp(v - 0.1f + U(-0.1, 0.1), 0, 1)`      |
//! | Temperature        | `round(25 + 5f + U(-2, 2))`                 |
//! | Precipitation      | `round(clamp(30 - 15f + U(-20, 20), 0, 100))` |

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use demeter_types::LocationId;

/// The location used when none (or an unknown one) is selected.
pub const DEFAULT_LOCATION: &str = "brasilia";

/// Days covered by a forecast.
pub const FORECAST_DAYS: usize = 5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by an [`EnvironmentProvider`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider has no data for this location.
    #[error("no environmental data for location {0}")]
    UnknownLocation(LocationId),

    /// The provider could not be reached or returned unusable data.
    #[error("environmental data source unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A selectable farm location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Stable key.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// The built-in locations, in display order.
pub fn locations() -> Vec<Location> {
    let site = |id: &str, name: &str, latitude: f64, longitude: f64| Location {
        id: LocationId::new(id),
        name: name.to_owned(),
        latitude,
        longitude,
    };
    vec![
        site("brasilia", "Brasília", -15.7801, -47.9292),
        site("goiania", "Goiânia", -16.6799, -49.2550),
        site("cuiaba", "Cuiabá", -15.6014, -56.0979),
        site("palmas", "Palmas", -10.2491, -48.3243),
    ]
}

/// Whether `id` names a built-in location.
pub fn is_known_location(id: &LocationId) -> bool {
    locations().iter().any(|l| &l.id == id)
}

/// One day of a weather forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Day label ("Today", "Tomorrow", "Day 3", ...).
    pub day: String,
    /// Temperature in degrees Celsius.
    pub temperature: i32,
    /// Chance of rain in percent, `0..=100`.
    pub precipitation_pct: u32,
}

/// Current readings for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSnapshot {
    /// Where the readings apply.
    pub location: LocationId,
    /// Soil moisture in percent, `0..=100`.
    pub soil_moisture: f64,
    /// Normalized difference vegetation index, `0..=1`.
    pub vegetation_index: f64,
    /// Today's temperature in degrees Celsius.
    pub temperature: i32,
    /// Today's chance of rain in percent.
    pub precipitation: u32,
}

/// Farming advice derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FarmAdvice {
    /// Soil moisture below 30%.
    IrrigateUrgently,
    /// Soil moisture below 60%.
    IrrigatePreventively,
    /// Temperature above 30 degrees.
    WatchHeatStress,
    /// Rain chance above 50%.
    CheckDrainage,
    /// Nothing to worry about.
    Favorable,
}

impl FarmAdvice {
    /// Human-readable advice.
    pub const fn message(self) -> &'static str {
        match self {
            Self::IrrigateUrgently => "Irrigation needed urgently",
            Self::IrrigatePreventively => "Consider preventive irrigation",
            Self::WatchHeatStress => "Watch for plant heat stress",
            Self::CheckDrainage => "Watch soil drainage",
            Self::Favorable => "Favorable growing conditions",
        }
    }
}

impl EnvironmentalSnapshot {
    /// Advice for these readings. Checks run in priority order: moisture
    /// first, then heat, then rain.
    pub fn advice(&self) -> FarmAdvice {
        if self.soil_moisture < 30.0 {
            FarmAdvice::IrrigateUrgently
        } else if self.soil_moisture < 60.0 {
            FarmAdvice::IrrigatePreventively
        } else if self.temperature > 30 {
            FarmAdvice::WatchHeatStress
        } else if self.precipitation > 50 {
            FarmAdvice::CheckDrainage
        } else {
            FarmAdvice::Favorable
        }
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Source of environmental readings.
pub trait EnvironmentProvider {
    /// Current readings for `location`.
    fn snapshot(&self, location: &LocationId) -> Result<EnvironmentalSnapshot, ProviderError>;

    /// Five-day forecast for `location`.
    fn weather_forecast(&self, location: &LocationId) -> Result<Vec<ForecastDay>, ProviderError>;
}

impl<P: EnvironmentProvider + ?Sized> EnvironmentProvider for Box<P> {
    fn snapshot(&self, location: &LocationId) -> Result<EnvironmentalSnapshot, ProviderError> {
        (**self).snapshot(location)
    }

    fn weather_forecast(&self, location: &LocationId) -> Result<Vec<ForecastDay>, ProviderError> {
        (**self).weather_forecast(location)
    }
}

// ---------------------------------------------------------------------------
// SimulatedProvider
// ---------------------------------------------------------------------------

/// Simulated readings for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SiteReadings {
    /// Soil moisture in percent.
    soil_moisture: f64,
    /// Vegetation index.
    vegetation_index: f64,
    /// Forecast, today first.
    forecast: Vec<ForecastDay>,
}

/// Built-in reference tables with per-cycle drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedProvider {
    /// Readings per location.
    sites: BTreeMap<LocationId, SiteReadings>,
}

/// Label for forecast day `i` (zero-based).
fn day_label(i: usize) -> String {
    match i {
        0 => "Today".to_owned(),
        1 => "Tomorrow".to_owned(),
        n => format!("Day {}", n.saturating_add(1)),
    }
}

/// Build a forecast from `(temperature, precipitation)` pairs.
fn forecast(days: [(i32, u32); FORECAST_DAYS]) -> Vec<ForecastDay> {
    days.iter()
        .enumerate()
        .map(|(i, &(temperature, precipitation_pct))| ForecastDay {
            day: day_label(i),
            temperature,
            precipitation_pct,
        })
        .collect()
}

impl SimulatedProvider {
    /// Tables for the four built-in locations.
    pub fn new() -> Self {
        let site = |soil_moisture, vegetation_index, days| SiteReadings {
            soil_moisture,
            vegetation_index,
            forecast: forecast(days),
        };
        let sites = [
            (
                "brasilia",
                site(60.0, 0.72, [(25, 10), (27, 5), (26, 15), (24, 30), (23, 25)]),
            ),
            (
                "goiania",
                site(65.0, 0.78, [(28, 5), (30, 0), (29, 10), (27, 20), (26, 15)]),
            ),
            (
                "cuiaba",
                site(35.0, 0.45, [(32, 0), (34, 0), (33, 5), (31, 10), (30, 8)]),
            ),
            (
                "palmas",
                site(55.0, 0.68, [(30, 40), (28, 35), (29, 20), (31, 15), (32, 10)]),
            ),
        ]
        .into_iter()
        .map(|(id, readings)| (LocationId::new(id), readings))
        .collect();
        Self { sites }
    }

    /// Look up a site.
    fn site(&self, location: &LocationId) -> Result<&SiteReadings, ProviderError> {
        self.sites
            .get(location)
            .ok_or_else(|| ProviderError::UnknownLocation(location.clone()))
    }

    /// Apply one cycle of drift to every location.
    ///
    /// `horizon` is the advisory session length; a zero horizon is
    /// treated as one.
    pub fn drift(&mut self, cycle: u64, horizon: u64, rng: &mut impl Rng) {
        let f = cycle_factor(cycle, horizon);
        for readings in self.sites.values_mut() {
            readings.soil_moisture =
                (readings.soil_moisture - 10.0 * f + rng.random_range(-10.0..=10.0)).clamp(0.0, 100.0);
            readings.vegetation_index =
                (readings.vegetation_index - 0.1 * f + rng.random_range(-0.1..=0.1)).clamp(0.0, 1.0);
            for day in &mut readings.forecast {
                day.temperature = round_to_i32(25.0 + 5.0 * f + rng.random_range(-2.0..=2.0));
                let rain = (30.0 - 15.0 * f + rng.random_range(-20.0..=20.0)).clamp(0.0, 100.0);
                day.precipitation_pct = u32::try_from(round_to_i32(rain)).unwrap_or(0);
            }
        }
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentProvider for SimulatedProvider {
    fn snapshot(&self, location: &LocationId) -> Result<EnvironmentalSnapshot, ProviderError> {
        let site = self.site(location)?;
        let today = site.forecast.first();
        Ok(EnvironmentalSnapshot {
            location: location.clone(),
            soil_moisture: site.soil_moisture,
            vegetation_index: site.vegetation_index,
            temperature: today.map_or(0, |d| d.temperature),
            precipitation: today.map_or(0, |d| d.precipitation_pct),
        })
    }

    fn weather_forecast(&self, location: &LocationId) -> Result<Vec<ForecastDay>, ProviderError> {
        Ok(self.site(location)?.forecast.clone())
    }
}

/// `cycle / horizon` as a float, saturating both at `u32::MAX`.
fn cycle_factor(cycle: u64, horizon: u64) -> f64 {
    let cycle = f64::from(u32::try_from(cycle).unwrap_or(u32::MAX));
    let horizon = f64::from(u32::try_from(horizon.max(1)).unwrap_or(u32::MAX));
    cycle / horizon
}

/// Round half away from zero into an `i32`, saturating at the bounds.
#[allow(clippy::cast_possible_truncation)]
fn round_to_i32(value: f64) -> i32 {
    value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

// ---------------------------------------------------------------------------
// FallbackProvider
// ---------------------------------------------------------------------------

/// Reads from an external provider when one is attached, and from the
/// simulated tables when it is absent or fails.
#[derive(Debug, Clone)]
pub struct FallbackProvider<P> {
    /// External source, if any.
    primary: Option<P>,
    /// Always-available simulated tables.
    simulated: SimulatedProvider,
}

impl<P: EnvironmentProvider> FallbackProvider<P> {
    /// Serve only the simulated tables.
    pub const fn simulated_only(simulated: SimulatedProvider) -> Self {
        Self {
            primary: None,
            simulated,
        }
    }

    /// Try `primary` first, falling back to `simulated`.
    pub const fn with_primary(primary: P, simulated: SimulatedProvider) -> Self {
        Self {
            primary: Some(primary),
            simulated,
        }
    }

    /// Attach (or replace) the external source.
    pub fn set_primary(&mut self, primary: P) {
        self.primary = Some(primary);
    }

    /// Whether an external source is attached.
    pub const fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// The simulated tables.
    pub const fn simulated(&self) -> &SimulatedProvider {
        &self.simulated
    }

    /// The simulated tables, for drift.
    pub const fn simulated_mut(&mut self) -> &mut SimulatedProvider {
        &mut self.simulated
    }
}

impl<P: EnvironmentProvider> EnvironmentProvider for FallbackProvider<P> {
    fn snapshot(&self, location: &LocationId) -> Result<EnvironmentalSnapshot, ProviderError> {
        if let Some(primary) = &self.primary {
            match primary.snapshot(location) {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => warn!(%location, error = %e, "Environment provider failed; using simulated data"),
            }
        }
        self.simulated.snapshot(location)
    }

    fn weather_forecast(&self, location: &LocationId) -> Result<Vec<ForecastDay>, ProviderError> {
        if let Some(primary) = &self.primary {
            match primary.weather_forecast(location) {
                Ok(days) => return Ok(days),
                Err(e) => warn!(%location, error = %e, "Forecast provider failed; using simulated data"),
            }
        }
        self.simulated.weather_forecast(location)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    struct Offline;

    impl EnvironmentProvider for Offline {
        fn snapshot(&self, _: &LocationId) -> Result<EnvironmentalSnapshot, ProviderError> {
            Err(ProviderError::Unavailable("offline".to_owned()))
        }

        fn weather_forecast(&self, _: &LocationId) -> Result<Vec<ForecastDay>, ProviderError> {
            Err(ProviderError::Unavailable("offline".to_owned()))
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn four_builtin_locations() {
        let all = locations();
        assert_eq!(all.len(), 4);
        assert!(is_known_location(&LocationId::new(DEFAULT_LOCATION)));
        assert!(!is_known_location(&LocationId::new("atlantis")));
    }

    #[test]
    fn simulated_snapshot_uses_reference_tables() {
        let provider = SimulatedProvider::new();
        let snap = provider.snapshot(&LocationId::new("cuiaba"));
        assert!(snap.is_ok());
        let Ok(snap) = snap else { return };
        assert!(close(snap.soil_moisture, 35.0));
        assert!(close(snap.vegetation_index, 0.45));
        assert_eq!(snap.temperature, 32);
        assert_eq!(snap.precipitation, 0);
        assert_eq!(snap.advice(), FarmAdvice::IrrigatePreventively);
    }

    #[test]
    fn forecast_has_five_labelled_days() {
        let provider = SimulatedProvider::new();
        let days = provider.weather_forecast(&LocationId::new("palmas")).unwrap_or_default();
        assert_eq!(days.len(), FORECAST_DAYS);
        assert_eq!(days.first().map(|d| d.day.as_str()), Some("Today"));
        assert_eq!(days.get(4).map(|d| d.day.as_str()), Some("Day 5"));
        assert_eq!(days.first().map(|d| d.precipitation_pct), Some(40));
    }

    #[test]
    fn unknown_location_is_an_error() {
        let provider = SimulatedProvider::new();
        assert_eq!(
            provider.snapshot(&LocationId::new("atlantis")),
            Err(ProviderError::UnknownLocation(LocationId::new("atlantis")))
        );
    }

    #[test]
    fn drift_stays_within_bounds() {
        let mut provider = SimulatedProvider::new();
        let mut rng = StdRng::seed_from_u64(7);
        for cycle in 1..=400 {
            provider.drift(cycle, 365, &mut rng);
        }
        for location in locations() {
            let Ok(snap) = provider.snapshot(&location.id) else {
                continue;
            };
            assert!((0.0..=100.0).contains(&snap.soil_moisture));
            assert!((0.0..=1.0).contains(&snap.vegetation_index));
            let days = provider.weather_forecast(&location.id).unwrap_or_default();
            for day in days {
                assert!(day.precipitation_pct <= 100);
                assert!((20..=33).contains(&day.temperature));
            }
        }
    }

    #[test]
    fn fallback_serves_simulated_values_when_primary_fails() {
        let provider = FallbackProvider::with_primary(Offline, SimulatedProvider::new());
        let location = LocationId::new("goiania");
        let snap = provider.snapshot(&location);
        assert_eq!(snap, SimulatedProvider::new().snapshot(&location));
        assert_eq!(provider.weather_forecast(&location).map(|d| d.len()), Ok(FORECAST_DAYS));
    }

    #[test]
    fn advice_priority() {
        let mut snap = EnvironmentalSnapshot {
            location: LocationId::new("brasilia"),
            soil_moisture: 20.0,
            vegetation_index: 0.5,
            temperature: 35,
            precipitation: 80,
        };
        assert_eq!(snap.advice(), FarmAdvice::IrrigateUrgently);
        snap.soil_moisture = 70.0;
        assert_eq!(snap.advice(), FarmAdvice::WatchHeatStress);
        snap.temperature = 25;
        assert_eq!(snap.advice(), FarmAdvice::CheckDrainage);
        snap.precipitation = 10;
        assert_eq!(snap.advice(), FarmAdvice::Favorable);
    }
}
