//! Collaborator traits injected into the soil column.
//!
//! The soil column never computes retention curves, decomposition responses or
//! crop growth itself. It consumes them through the traits in this module:
//!
//! - [`RetentionCurve`]: hydraulic limits and pressure head of a layer
//! - [`DecompositionEnvironment`]: temperature and moisture response of the
//!   decomposition of added organic matter
//! - [`CropGrowth`]: the crop currently on the field, held by the column
//!   through a weak reference only

use crate::units::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Characteristic moisture thresholds of a layer [m3 m-3].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydraulicLimits {
    pub saturation: FloatValue,
    pub field_capacity: FloatValue,
    pub permanent_wilting_point: FloatValue,
}

impl HydraulicLimits {
    /// Maximum plant available water per unit volume [m3 m-3].
    pub fn available_water_capacity(&self) -> FloatValue {
        (self.field_capacity - self.permanent_wilting_point).max(0.0)
    }
}

/// Static description of a layer as seen by a retention curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilDescription {
    /// Sand content [kg kg-1]
    pub sand: FloatValue,
    /// Clay content [kg kg-1]
    pub clay: FloatValue,
    /// Stone content [kg kg-1]
    pub stone: FloatValue,
    /// Bulk density [kg m-3]
    pub bulk_density: FloatValue,
    /// Organic carbon [kg C kg-1]
    pub organic_carbon: FloatValue,
}

/// Soil water retention capability.
///
/// Implementations derive the static hydraulic limits from the soil
/// description and convert a moisture content into a pressure head expressed
/// as pF (common logarithm of the head in cm water column).
pub trait RetentionCurve: Debug {
    fn hydraulic_limits(&self, soil: &SoilDescription) -> HydraulicLimits;

    fn pressure_head_pf(
        &self,
        soil: &SoilDescription,
        limits: &HydraulicLimits,
        moisture: FloatValue,
    ) -> FloatValue;
}

/// Environmental modifiers of the decomposition of added organic matter.
///
/// Both responses are dimensionless multipliers on the standard decomposition
/// coefficients of an organic pool.
pub trait DecompositionEnvironment: Debug {
    /// Response to the layer temperature [°C].
    fn temperature_response(&self, temperature: FloatValue) -> FloatValue;

    /// Response to the layer pressure head [pF].
    fn moisture_response(&self, pressure_head_pf: FloatValue) -> FloatValue;
}

/// The crop growing on the column.
///
/// The column only ever holds a weak reference to the crop, the crop model
/// is owned by the driver.
pub trait CropGrowth: Debug {
    /// Nitrogen taken up by the crop on the current day [kg N m-2].
    fn daily_n_uptake(&self) -> FloatValue;

    /// Temperature sums between which automatic irrigation is allowed [°C d].
    fn irrigation_heat_sum_window(&self) -> (FloatValue, FloatValue);

    /// Temperature sum accumulated since sowing [°C d].
    fn current_temperature_sum(&self) -> FloatValue;

    /// Current rooting depth [m].
    fn rooting_depth(&self) -> FloatValue;
}
