//! Soil Profile Parameters
//!
//! Layer geometry of the profile, static properties of every layer and the
//! initial values used when a column is built.

use crate::capabilities::HydraulicLimits;
use crate::errors::{ensure_non_negative, SoilError, SoilResult};
use crate::units::{FloatValue, SOM_TO_C};
use serde::{Deserialize, Serialize};

/// Profile-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralParameters {
    /// Thickness of every layer from the surface downwards
    /// unit: m
    /// default: 20 layers of 0.1
    pub layer_thickness: Vec<FloatValue>,

    /// Depth down to which layers take part in the organic matter turnover
    /// unit: m
    /// default: 0.4
    pub max_mineralisation_depth: FloatValue,

    /// Depth down to which soil moisture is checked by the irrigation trigger
    /// unit: m
    /// default: 0.3
    pub critical_moisture_depth: FloatValue,

    /// Depth of the groundwater table below the surface
    /// unit: m
    /// default: 70.0 (below the profile)
    pub groundwater_depth: FloatValue,
}

impl Default for GeneralParameters {
    fn default() -> Self {
        Self::uniform(20, 0.1)
    }
}

impl GeneralParameters {
    /// Profile of `layer_count` layers of equal thickness.
    pub fn uniform(layer_count: usize, thickness: FloatValue) -> Self {
        Self {
            layer_thickness: vec![thickness; layer_count],
            max_mineralisation_depth: 0.4,
            critical_moisture_depth: 0.3,
            groundwater_depth: 70.0,
        }
    }

    pub fn number_of_layers(&self) -> usize {
        self.layer_thickness.len()
    }

    /// Total depth of the profile [m].
    pub fn profile_depth(&self) -> FloatValue {
        self.layer_thickness.iter().sum()
    }

    pub fn validate(&self) -> SoilResult<()> {
        if self.layer_thickness.is_empty() {
            return Err(SoilError::EmptyProfile);
        }
        for thickness in &self.layer_thickness {
            ensure_non_negative("layer thickness", *thickness)?;
            if *thickness == 0.0 {
                return Err(SoilError::InvalidMagnitude {
                    quantity: "layer thickness",
                    value: *thickness,
                });
            }
        }
        ensure_non_negative("max mineralisation depth", self.max_mineralisation_depth)?;
        ensure_non_negative("critical moisture depth", self.critical_moisture_depth)?;
        ensure_non_negative("groundwater depth", self.groundwater_depth)?;
        Ok(())
    }
}

/// Organic content of a layer.
///
/// Only one representation is authoritative, the other one is derived with
/// the fixed conversion [`SOM_TO_C`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganicContent {
    /// Organic carbon [kg C kg-1]
    OrganicCarbon(FloatValue),
    /// Organic matter [kg OM kg-1]
    OrganicMatter(FloatValue),
}

impl OrganicContent {
    pub fn organic_carbon(&self) -> FloatValue {
        match self {
            OrganicContent::OrganicCarbon(c) => *c,
            OrganicContent::OrganicMatter(om) => om * SOM_TO_C,
        }
    }

    pub fn organic_matter(&self) -> FloatValue {
        match self {
            OrganicContent::OrganicCarbon(c) => c / SOM_TO_C,
            OrganicContent::OrganicMatter(om) => *om,
        }
    }

    /// Same representation as `self`, holding the given carbon content.
    pub fn with_organic_carbon(&self, carbon: FloatValue) -> Self {
        match self {
            OrganicContent::OrganicCarbon(_) => OrganicContent::OrganicCarbon(carbon),
            OrganicContent::OrganicMatter(_) => OrganicContent::OrganicMatter(carbon / SOM_TO_C),
        }
    }

    fn stored_value(&self) -> FloatValue {
        match self {
            OrganicContent::OrganicCarbon(v) | OrganicContent::OrganicMatter(v) => *v,
        }
    }
}

/// Density of a layer as given in the soil profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilDensity {
    /// Bulk density [kg m-3]
    Bulk(FloatValue),
    /// Raw density [kg m-3], corrected for clay to obtain the bulk density
    Raw(FloatValue),
}

impl SoilDensity {
    /// Bulk density [kg m-3] of a layer with the given clay content.
    pub fn bulk_density(&self, clay: FloatValue) -> FloatValue {
        match self {
            SoilDensity::Bulk(bd) => *bd,
            SoilDensity::Raw(raw) => (raw / 1000.0 + 0.009 * 100.0 * clay) * 1000.0,
        }
    }
}

/// Static properties of one soil layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilParameters {
    /// Sand content
    /// unit: kg kg-1
    /// default: 0.4
    pub sand: FloatValue,

    /// Clay content
    /// unit: kg kg-1
    /// default: 0.15
    pub clay: FloatValue,

    /// Stone content
    /// unit: kg kg-1
    /// default: 0.0
    #[serde(default)]
    pub stone: FloatValue,

    /// Soil pH
    /// default: 6.9
    pub ph: FloatValue,

    /// Organic carbon or organic matter content
    /// default: organic carbon 0.012
    pub organic_content: OrganicContent,

    /// Bulk or raw density
    /// default: bulk density 1400.0
    pub density: SoilDensity,

    /// Hydraulic limits taken over as given instead of asking the retention curve
    #[serde(default)]
    pub hydraulic_limits: Option<HydraulicLimits>,

    /// Initial moisture as a fraction of field capacity, overrides the global initial value
    #[serde(default)]
    pub initial_fraction_fc: Option<FloatValue>,

    /// Initial nitrate, overrides the global initial value [kg N m-3]
    #[serde(default)]
    pub initial_nitrate: Option<FloatValue>,

    /// Initial ammonium, overrides the global initial value [kg N m-3]
    #[serde(default)]
    pub initial_ammonium: Option<FloatValue>,
}

impl Default for SoilParameters {
    fn default() -> Self {
        Self {
            sand: 0.4,
            clay: 0.15,
            stone: 0.0,
            ph: 6.9,
            organic_content: OrganicContent::OrganicCarbon(0.012),
            density: SoilDensity::Bulk(1400.0),
            hydraulic_limits: None,
            initial_fraction_fc: None,
            initial_nitrate: None,
            initial_ammonium: None,
        }
    }
}

impl SoilParameters {
    /// Silt content [kg kg-1], the remainder of sand and clay.
    pub fn silt(&self) -> FloatValue {
        (1.0 - self.sand - self.clay).max(0.0)
    }

    pub fn bulk_density(&self) -> FloatValue {
        self.density.bulk_density(self.clay)
    }

    /// Check the texture and magnitudes of the layer at `layer` (used in messages).
    pub fn validate(&self, layer: usize) -> SoilResult<()> {
        let in_unit = |v: FloatValue| (0.0..=1.0).contains(&v);
        if !in_unit(self.sand)
            || !in_unit(self.clay)
            || !in_unit(self.stone)
            || self.sand + self.clay > 1.0 + 1e-9
        {
            return Err(SoilError::InvalidTexture {
                layer,
                sand: self.sand,
                clay: self.clay,
                stone: self.stone,
            });
        }
        ensure_non_negative("soil pH", self.ph)?;
        ensure_non_negative("organic content", self.organic_content.stored_value())?;
        let bulk_density = self.bulk_density();
        if !(bulk_density.is_finite() && bulk_density > 0.0) {
            return Err(SoilError::InvalidMagnitude {
                quantity: "bulk density",
                value: bulk_density,
            });
        }
        if let Some(fraction) = self.initial_fraction_fc {
            ensure_non_negative("initial moisture fraction", fraction)?;
        }
        if let Some(nitrate) = self.initial_nitrate {
            ensure_non_negative("initial nitrate", nitrate)?;
        }
        if let Some(ammonium) = self.initial_ammonium {
            ensure_non_negative("initial ammonium", ammonium)?;
        }
        Ok(())
    }
}

/// Initial values applied to every layer that does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInitialValues {
    /// Initial soil moisture as a fraction of field capacity
    /// unit: dimensionless
    /// default: 0.8
    pub initial_fraction_fc: FloatValue,

    /// Initial soil nitrate
    /// unit: kg NO3-N m-3
    /// default: 0.0001
    pub initial_nitrate: FloatValue,

    /// Initial soil ammonium
    /// unit: kg NH4-N m-3
    /// default: 0.0001
    pub initial_ammonium: FloatValue,
}

impl Default for UserInitialValues {
    fn default() -> Self {
        Self {
            initial_fraction_fc: 0.8,
            initial_nitrate: 0.0001,
            initial_ammonium: 0.0001,
        }
    }
}
