//! The managed soil column
//!
//! A [`SoilColumn`] owns the layers of one profile and carries the state that
//! belongs to the profile as a whole: surface water, the lower boundary flux,
//! the groundwater table, the fertiliser schedule and the association with
//! the crop currently growing on the field.
//!
//! The management operations are grouped by concern:
//!
//! - `fertiliser`: mineral fertilisation (immediate, NMin method) and the
//!   daily drain of deferred applications
//! - `organic`: organic fertilisation and the added organic matter pools
//! - `irrigation`: automatic and unconditional irrigation
//! - `tillage`: mixing of the topsoil
//! - `crop`: the weak association with the crop model
//!
//! # Daily Order
//!
//! A driver advancing the column by one day drains the fertiliser schedule
//! with [`SoilColumn::apply_scheduled_fertiliser`] before it triggers any new
//! fertilisation of that day.

mod builder;
mod crop;
mod fertiliser;
mod irrigation;
mod organic;
mod schedule;
mod tillage;

pub use builder::SoilColumnBuilder;
pub use organic::DecompositionSummary;
pub use schedule::{DeferredApplication, FertiliserSchedule, ScheduledTask};

use crate::layer::SoilLayer;
use agrosoil_core::capabilities::{CropGrowth, RetentionCurve};
use agrosoil_core::errors::{SoilError, SoilResult};
use agrosoil_core::parameters::{GeneralParameters, SoilParameters, UserInitialValues};
use agrosoil_core::units::{FloatValue, DEPTH_TOLERANCE};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone)]
pub struct SoilColumn {
    layers: Vec<SoilLayer>,

    /// Water ponding on the surface [mm]
    pub surface_water_storage: FloatValue,
    /// Water intercepted by the canopy [mm]
    pub interception_storage: FloatValue,
    /// Water leaving the bottom of the profile [mm]
    pub flux_at_lower_boundary: FloatValue,
    /// [°C]
    pub surface_temperature: FloatValue,
    /// [mm]
    pub snow_depth: FloatValue,

    groundwater_table: usize,
    crop_n_uptake: FloatValue,
    schedule: FertiliserSchedule,
    number_of_organic_layers: usize,
    critical_moisture_depth: FloatValue,
    crop: Option<Weak<dyn CropGrowth>>,
    next_application_id: u64,
}

impl SoilColumn {
    /// Build a column with one layer per entry of `general.layer_thickness`.
    ///
    /// # Errors
    ///
    /// * [`SoilError::EmptyProfile`] for a profile without layers
    /// * [`SoilError::LayerCountMismatch`] when the number of soil parameter
    ///   sets differs from the number of layer thicknesses
    /// * [`SoilError::InvalidTexture`] or [`SoilError::InvalidMagnitude`] for
    ///   invalid layer properties
    pub fn new(
        general: &GeneralParameters,
        soil: &[SoilParameters],
        initial: &UserInitialValues,
        retention: Rc<dyn RetentionCurve>,
    ) -> SoilResult<Self> {
        SoilColumnBuilder::new()
            .with_general_parameters(general.clone())
            .with_soil_parameters(soil.to_vec())
            .with_initial_values(initial.clone())
            .with_retention_curve(retention)
            .build()
    }

    pub(crate) fn from_layers(general: &GeneralParameters, layers: Vec<SoilLayer>) -> SoilResult<Self> {
        if layers.is_empty() {
            return Err(SoilError::EmptyProfile);
        }
        let mut column = Self {
            layers,
            surface_water_storage: 0.0,
            interception_storage: 0.0,
            flux_at_lower_boundary: 0.0,
            surface_temperature: 0.0,
            snow_depth: 0.0,
            groundwater_table: 0,
            crop_n_uptake: 0.0,
            schedule: FertiliserSchedule::default(),
            number_of_organic_layers: 0,
            critical_moisture_depth: general.critical_moisture_depth,
            crop: None,
            next_application_id: 1,
        };
        column.number_of_organic_layers =
            column.layers_down_to(general.max_mineralisation_depth);
        column.groundwater_table = if general.groundwater_depth >= column.profile_depth() {
            column.number_of_layers()
        } else {
            column.layer_number_for_depth(general.groundwater_depth)
        };
        Ok(column)
    }

    pub fn number_of_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Option<&SoilLayer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut SoilLayer> {
        self.layers.get_mut(index)
    }

    pub fn layers(&self) -> &[SoilLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [SoilLayer] {
        &mut self.layers
    }

    /// Total depth of the profile [m].
    pub fn profile_depth(&self) -> FloatValue {
        self.layers.iter().map(SoilLayer::thickness).sum()
    }

    /// Index of the layer containing `depth` [m].
    ///
    /// Depths at or above the surface map to the top layer, depths below the
    /// profile to the last layer. A depth on a layer boundary belongs to the
    /// upper layer.
    pub fn layer_number_for_depth(&self, depth: FloatValue) -> usize {
        if depth <= 0.0 {
            return 0;
        }
        let mut cumulative = 0.0;
        for (index, layer) in self.layers.iter().enumerate() {
            cumulative += layer.thickness();
            if depth <= cumulative + DEPTH_TOLERANCE {
                return index;
            }
        }
        self.layers.len() - 1
    }

    /// Number of layers needed to reach `depth`, at least one.
    fn layers_down_to(&self, depth: FloatValue) -> usize {
        self.layer_number_for_depth(depth) + 1
    }

    /// Layers taking part in the organic matter turnover.
    pub fn number_of_organic_layers(&self) -> usize {
        self.number_of_organic_layers
    }

    /// Depth down to which the irrigation trigger inspects the moisture [m].
    pub fn critical_moisture_depth(&self) -> FloatValue {
        self.critical_moisture_depth
    }

    /// Index of the first layer below the groundwater table.
    ///
    /// Equal to the number of layers when the table lies below the profile.
    pub fn groundwater_table(&self) -> usize {
        self.groundwater_table
    }

    pub fn set_groundwater_table(&mut self, index: usize) {
        self.groundwater_table = index.min(self.number_of_layers());
    }

    pub fn fertiliser_schedule(&self) -> &FertiliserSchedule {
        &self.schedule
    }

    /// Mineral nitrogen [kg N ha-1] between the surface and `depth`.
    ///
    /// A layer cut by `depth` contributes the share of its thickness above it.
    pub fn mineral_nitrogen_kg_per_ha(&self, depth: FloatValue) -> FloatValue {
        let mut top = 0.0;
        let mut total = 0.0;
        for layer in &self.layers {
            if top >= depth {
                break;
            }
            let bottom = top + layer.thickness();
            let share = ((depth.min(bottom) - top) / layer.thickness()).clamp(0.0, 1.0);
            total += layer.mineral_nitrogen_kg_per_ha() * share;
            top = bottom;
        }
        total
    }

    /// Mineral nitrogen [kg N ha-1] of the whole profile.
    pub fn total_mineral_nitrogen_kg_per_ha(&self) -> FloatValue {
        self.layers
            .iter()
            .map(SoilLayer::mineral_nitrogen_kg_per_ha)
            .sum()
    }

    /// Sum of the temperatures of the uppermost `layers` layers [°C].
    pub fn sum_soil_temperature(&self, layers: usize) -> FloatValue {
        self.layers
            .iter()
            .take(layers)
            .map(SoilLayer::temperature)
            .sum()
    }

    /// Water held by the profile [mm].
    pub fn total_water_mm(&self) -> FloatValue {
        self.layers.iter().map(SoilLayer::water_mm).sum()
    }

    /// Keep today's moisture of every layer as the previous-day value.
    pub fn roll_moisture_day(&mut self) {
        for layer in &mut self.layers {
            layer.roll_moisture_day();
        }
    }

    fn allocate_application_id(&mut self) -> u64 {
        let id = self.next_application_id;
        self.next_application_id += 1;
        id
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use agrosoil_core::capabilities::HydraulicLimits;

    pub const LIMITS: HydraulicLimits = HydraulicLimits {
        saturation: 0.45,
        field_capacity: 0.3,
        permanent_wilting_point: 0.1,
    };

    /// Column of equally thick layers with prescribed hydraulic limits and
    /// no initial mineral nitrogen.
    pub fn column(layer_count: usize, thickness: FloatValue) -> SoilColumn {
        let soil = SoilParameters {
            hydraulic_limits: Some(LIMITS),
            ..Default::default()
        };
        SoilColumnBuilder::new()
            .with_general_parameters(GeneralParameters::uniform(layer_count, thickness))
            .with_soil_parameters(vec![soil; layer_count])
            .with_initial_values(UserInitialValues {
                initial_fraction_fc: 0.8,
                initial_nitrate: 0.0,
                initial_ammonium: 0.0,
            })
            .build()
            .unwrap()
    }
}
