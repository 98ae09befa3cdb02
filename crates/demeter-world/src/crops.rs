//! Crop definitions and the runtime-extensible crop catalog.
//!
//! The catalog starts with the three base crops. Technologies may insert
//! further crops while the game runs; entries are never removed, so a crop
//! id held by a plot always resolves.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use demeter_types::CropId;

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// CropDefinition
// ---------------------------------------------------------------------------

/// Static properties of one crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropDefinition {
    /// Catalog key.
    pub id: CropId,
    /// Display name.
    pub name: String,
    /// Cycles from planting to ready.
    pub growth_time: u32,
    /// Reference irrigation demand in litres. Informational: irrigation
    /// charges the flat per-plot fee from [`ActionCosts`](crate::ActionCosts).
    pub water_needed: Decimal,
    /// Base harvest payout.
    pub value: Decimal,
    /// Signed sustainability change applied when the crop is planted.
    pub sustainability_impact: Decimal,
}

impl CropDefinition {
    /// Build a crop definition, checking its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidCrop`] if `growth_time` is zero or
    /// `water_needed` / `value` are not strictly positive.
    pub fn new(
        id: CropId,
        name: impl Into<String>,
        growth_time: u32,
        water_needed: Decimal,
        value: Decimal,
        sustainability_impact: Decimal,
    ) -> Result<Self, WorldError> {
        let def = Self {
            id,
            name: name.into(),
            growth_time,
            water_needed,
            value,
            sustainability_impact,
        };
        def.validate()?;
        Ok(def)
    }

    /// Check the bounds of a definition built by hand or deserialized.
    ///
    /// # Errors
    ///
    /// See [`CropDefinition::new`].
    pub fn validate(&self) -> Result<(), WorldError> {
        let invalid = |reason| WorldError::InvalidCrop {
            crop: self.id.clone(),
            reason,
        };
        if self.growth_time == 0 {
            return Err(invalid("growth time must be at least one cycle"));
        }
        if self.water_needed <= Decimal::ZERO {
            return Err(invalid("water needed must be positive"));
        }
        if self.value <= Decimal::ZERO {
            return Err(invalid("value must be positive"));
        }
        Ok(())
    }
}

/// Shorthand for the built-in tables; the values are known to be valid.
fn crop(id: &str, name: &str, growth_time: u32, water: i64, value: i64, impact: i64) -> CropDefinition {
    CropDefinition {
        id: CropId::new(id),
        name: name.to_owned(),
        growth_time,
        water_needed: Decimal::new(water, 0),
        value: Decimal::new(value, 0),
        sustainability_impact: Decimal::new(impact, 0),
    }
}

/// The crops available from the first cycle: maize, soy and wheat.
pub fn base_crops() -> Vec<CropDefinition> {
    vec![
        crop("maize", "Maize", 3, 20, 50, 0),
        crop("soy", "Soy", 2, 15, 40, 5),
        crop("wheat", "Wheat", 4, 25, 60, -5),
    ]
}

/// Rice, added by the rice research technology.
pub fn rice() -> CropDefinition {
    crop("rice", "Rice", 3, 30, 55, 0)
}

/// Cotton, added by the cotton research technology.
pub fn cotton() -> CropDefinition {
    crop("cotton", "Cotton", 5, 35, 80, -10)
}

// ---------------------------------------------------------------------------
// CropCatalog
// ---------------------------------------------------------------------------

/// Registry of plantable crops keyed by [`CropId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropCatalog {
    /// All known crops.
    crops: BTreeMap<CropId, CropDefinition>,
}

impl CropCatalog {
    /// Create an empty catalog.
    pub const fn empty() -> Self {
        Self {
            crops: BTreeMap::new(),
        }
    }

    /// Create a catalog seeded with [`base_crops`].
    pub fn with_base_crops() -> Self {
        let crops = base_crops().into_iter().map(|c| (c.id.clone(), c)).collect();
        Self { crops }
    }

    /// Look up a crop.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownCrop`] if the id is not registered.
    pub fn get(&self, id: &CropId) -> Result<&CropDefinition, WorldError> {
        self.crops
            .get(id)
            .ok_or_else(|| WorldError::UnknownCrop(id.clone()))
    }

    /// Whether the crop is registered.
    pub fn contains(&self, id: &CropId) -> bool {
        self.crops.contains_key(id)
    }

    /// Register a new crop.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateCrop`] if the id already exists and
    /// [`WorldError::InvalidCrop`] if the definition is out of bounds.
    pub fn insert(&mut self, def: CropDefinition) -> Result<(), WorldError> {
        def.validate()?;
        if self.crops.contains_key(&def.id) {
            return Err(WorldError::DuplicateCrop(def.id));
        }
        self.crops.insert(def.id.clone(), def);
        Ok(())
    }

    /// Iterate over the registered crops in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CropDefinition> {
        self.crops.values()
    }

    /// Number of registered crops.
    pub fn len(&self) -> usize {
        self.crops.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }
}

impl Default for CropCatalog {
    fn default() -> Self {
        Self::with_base_crops()
    }
}
