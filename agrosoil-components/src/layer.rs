//! A single soil layer
//!
//! A [`SoilLayer`] carries the coupled water, temperature, nitrogen and
//! organic matter state of one horizontal slice of the profile. All
//! concentrations are per unit soil volume [kg m-3].
//!
//! Two derived quantities are cached:
//!
//! - the hydraulic limits, invalidated whenever the organic content changes
//! - the pressure head (pF), invalidated by every moisture change and by
//!   invalidation of the limits

use crate::organic_pool::OrganicPool;
use agrosoil_core::capabilities::{HydraulicLimits, RetentionCurve, SoilDescription};
use agrosoil_core::errors::{ensure_non_negative, SoilResult};
use agrosoil_core::parameters::{OrganicContent, SoilParameters, UserInitialValues};
use agrosoil_core::units::{kg_per_m3_to_kg_per_ha, moisture_to_mm, FloatValue};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Nitrogen and carbon pools held as concentrations by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constituent {
    /// Urea nitrogen [kg N m-3]
    Carbamide,
    /// [kg N m-3]
    Ammonium,
    /// [kg N m-3]
    Nitrite,
    /// [kg N m-3]
    Nitrate,
    /// Slow soil organic matter [kg C m-3]
    SomSlow,
    /// Fast soil organic matter [kg C m-3]
    SomFast,
    /// Slow soil microbial biomass [kg C m-3]
    SmbSlow,
    /// Fast soil microbial biomass [kg C m-3]
    SmbFast,
}

impl Constituent {
    pub const ALL: [Constituent; 8] = [
        Constituent::Carbamide,
        Constituent::Ammonium,
        Constituent::Nitrite,
        Constituent::Nitrate,
        Constituent::SomSlow,
        Constituent::SomFast,
        Constituent::SmbSlow,
        Constituent::SmbFast,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn quantity(self) -> &'static str {
        match self {
            Constituent::Carbamide => "carbamide concentration",
            Constituent::Ammonium => "NH4 concentration",
            Constituent::Nitrite => "NO2 concentration",
            Constituent::Nitrate => "NO3 concentration",
            Constituent::SomSlow => "slow SOM concentration",
            Constituent::SomFast => "fast SOM concentration",
            Constituent::SmbSlow => "slow SMB concentration",
            Constituent::SmbFast => "fast SMB concentration",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SoilLayer {
    thickness: FloatValue,
    sand: FloatValue,
    clay: FloatValue,
    stone: FloatValue,
    ph: FloatValue,
    bulk_density: FloatValue,
    organic_content: OrganicContent,

    moisture: FloatValue,
    moisture_old: FloatValue,
    temperature: FloatValue,
    frozen: bool,
    constituents: [FloatValue; 8],

    retention: Rc<dyn RetentionCurve>,
    prescribed_limits: Option<HydraulicLimits>,
    limits_cache: Cell<Option<HydraulicLimits>>,
    pf_cache: Cell<Option<FloatValue>>,

    aom_pools: Vec<OrganicPool>,
}

impl SoilLayer {
    /// Create a layer at its initial state.
    ///
    /// Moisture starts at the configured fraction of field capacity, NO3 and
    /// NH4 at the configured concentrations (per-layer overrides win over
    /// the profile-wide initial values). The soil parameters are checked by
    /// the column before layers are built.
    pub fn new(
        thickness: FloatValue,
        params: &SoilParameters,
        initial: &UserInitialValues,
        retention: Rc<dyn RetentionCurve>,
    ) -> SoilResult<Self> {
        ensure_non_negative("layer thickness", thickness)?;
        let nitrate = ensure_non_negative(
            "initial nitrate",
            params.initial_nitrate.unwrap_or(initial.initial_nitrate),
        )?;
        let ammonium = ensure_non_negative(
            "initial ammonium",
            params.initial_ammonium.unwrap_or(initial.initial_ammonium),
        )?;
        let fraction_fc = ensure_non_negative(
            "initial moisture fraction",
            params.initial_fraction_fc.unwrap_or(initial.initial_fraction_fc),
        )?;

        let mut constituents = [0.0; 8];
        constituents[Constituent::Nitrate.index()] = nitrate;
        constituents[Constituent::Ammonium.index()] = ammonium;

        let mut layer = Self {
            thickness,
            sand: params.sand,
            clay: params.clay,
            stone: params.stone,
            ph: params.ph,
            bulk_density: params.bulk_density(),
            organic_content: params.organic_content,
            moisture: 0.0,
            moisture_old: 0.0,
            temperature: 0.0,
            frozen: false,
            constituents,
            retention,
            prescribed_limits: params.hydraulic_limits,
            limits_cache: Cell::new(None),
            pf_cache: Cell::new(None),
            aom_pools: Vec::new(),
        };
        layer.moisture = fraction_fc * layer.field_capacity();
        layer.moisture_old = layer.moisture;
        Ok(layer)
    }

    /// Thickness [m]
    pub fn thickness(&self) -> FloatValue {
        self.thickness
    }

    pub fn sand(&self) -> FloatValue {
        self.sand
    }

    pub fn clay(&self) -> FloatValue {
        self.clay
    }

    pub fn silt(&self) -> FloatValue {
        (1.0 - self.sand - self.clay).max(0.0)
    }

    pub fn stone(&self) -> FloatValue {
        self.stone
    }

    pub fn ph(&self) -> FloatValue {
        self.ph
    }

    /// Bulk density [kg m-3]
    pub fn bulk_density(&self) -> FloatValue {
        self.bulk_density
    }

    pub fn organic_content(&self) -> OrganicContent {
        self.organic_content
    }

    /// Organic carbon [kg C kg-1]
    pub fn organic_carbon(&self) -> FloatValue {
        self.organic_content.organic_carbon()
    }

    /// Organic matter [kg OM kg-1]
    pub fn organic_matter(&self) -> FloatValue {
        self.organic_content.organic_matter()
    }

    /// Make organic carbon the authoritative organic content.
    pub fn set_organic_carbon(&mut self, carbon: FloatValue) -> SoilResult<()> {
        let carbon = ensure_non_negative("organic carbon", carbon)?;
        self.replace_organic_content(OrganicContent::OrganicCarbon(carbon));
        Ok(())
    }

    /// Make organic matter the authoritative organic content.
    pub fn set_organic_matter(&mut self, matter: FloatValue) -> SoilResult<()> {
        let matter = ensure_non_negative("organic matter", matter)?;
        self.replace_organic_content(OrganicContent::OrganicMatter(matter));
        Ok(())
    }

    pub(crate) fn replace_organic_content(&mut self, content: OrganicContent) {
        self.organic_content = content;
        self.invalidate_hydraulic_limits();
    }

    /// Organic carbon per unit area [kg C m-2].
    pub fn organic_carbon_mass(&self) -> FloatValue {
        self.organic_carbon() * self.bulk_density * self.thickness
    }

    pub fn soil_description(&self) -> SoilDescription {
        SoilDescription {
            sand: self.sand,
            clay: self.clay,
            stone: self.stone,
            bulk_density: self.bulk_density,
            organic_carbon: self.organic_carbon(),
        }
    }

    /// Hydraulic limits computed afresh, bypassing the cache.
    ///
    /// Limits prescribed by the soil parameters are returned as given.
    pub fn derive_hydraulic_limits(&self) -> HydraulicLimits {
        match self.prescribed_limits {
            Some(limits) => limits,
            None => self.retention.hydraulic_limits(&self.soil_description()),
        }
    }

    pub fn hydraulic_limits(&self) -> HydraulicLimits {
        if let Some(limits) = self.limits_cache.get() {
            return limits;
        }
        let limits = self.derive_hydraulic_limits();
        self.limits_cache.set(Some(limits));
        limits
    }

    pub fn invalidate_hydraulic_limits(&self) {
        self.limits_cache.set(None);
        self.pf_cache.set(None);
    }

    /// Saturated moisture [m3 m-3]
    pub fn saturation(&self) -> FloatValue {
        self.hydraulic_limits().saturation
    }

    /// Field capacity [m3 m-3]
    pub fn field_capacity(&self) -> FloatValue {
        self.hydraulic_limits().field_capacity
    }

    /// Permanent wilting point [m3 m-3]
    pub fn permanent_wilting_point(&self) -> FloatValue {
        self.hydraulic_limits().permanent_wilting_point
    }

    /// Pressure head of the current moisture as pF.
    pub fn pressure_head_pf(&self) -> FloatValue {
        if let Some(pf) = self.pf_cache.get() {
            return pf;
        }
        let limits = self.hydraulic_limits();
        let pf = self
            .retention
            .pressure_head_pf(&self.soil_description(), &limits, self.moisture);
        self.pf_cache.set(Some(pf));
        pf
    }

    /// Volumetric moisture [m3 m-3]
    pub fn moisture(&self) -> FloatValue {
        self.moisture
    }

    /// Moisture at the end of the previous day [m3 m-3]
    pub fn moisture_old(&self) -> FloatValue {
        self.moisture_old
    }

    pub fn set_moisture(&mut self, moisture: FloatValue) -> SoilResult<()> {
        self.moisture = ensure_non_negative("soil moisture", moisture)?;
        self.pf_cache.set(None);
        Ok(())
    }

    /// Keep the current moisture as the previous-day value.
    pub fn roll_moisture_day(&mut self) {
        self.moisture_old = self.moisture;
    }

    /// Water held by the layer [mm]
    pub fn water_mm(&self) -> FloatValue {
        moisture_to_mm(self.moisture, self.thickness)
    }

    /// Water the layer can still take up before it is saturated [mm]
    pub fn free_pore_space_mm(&self) -> FloatValue {
        moisture_to_mm((self.saturation() - self.moisture).max(0.0), self.thickness)
    }

    /// Temperature [°C]
    pub fn temperature(&self) -> FloatValue {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: FloatValue) {
        self.temperature = temperature;
    }

    pub fn frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn concentration(&self, constituent: Constituent) -> FloatValue {
        self.constituents[constituent.index()]
    }

    /// Set a concentration, rejecting negative and non-finite values.
    pub fn set_concentration(
        &mut self,
        constituent: Constituent,
        value: FloatValue,
    ) -> SoilResult<()> {
        self.constituents[constituent.index()] = ensure_non_negative(constituent.quantity(), value)?;
        Ok(())
    }

    pub(crate) fn add_concentration(&mut self, constituent: Constituent, delta: FloatValue) {
        let slot = &mut self.constituents[constituent.index()];
        *slot = (*slot + delta).max(0.0);
    }

    pub fn carbamide(&self) -> FloatValue {
        self.concentration(Constituent::Carbamide)
    }

    pub fn nh4(&self) -> FloatValue {
        self.concentration(Constituent::Ammonium)
    }

    pub fn no2(&self) -> FloatValue {
        self.concentration(Constituent::Nitrite)
    }

    pub fn no3(&self) -> FloatValue {
        self.concentration(Constituent::Nitrate)
    }

    /// NH4 + NO2 + NO3 [kg N m-3]
    pub fn mineral_nitrogen(&self) -> FloatValue {
        self.nh4() + self.no2() + self.no3()
    }

    /// Mineral nitrogen per unit area [kg N ha-1].
    pub fn mineral_nitrogen_kg_per_ha(&self) -> FloatValue {
        kg_per_m3_to_kg_per_ha(self.mineral_nitrogen(), self.thickness)
    }

    pub fn aom_pools(&self) -> &[OrganicPool] {
        &self.aom_pools
    }

    pub fn aom_pools_mut(&mut self) -> &mut Vec<OrganicPool> {
        &mut self.aom_pools
    }

    /// Carbon of all added organic matter pools [kg C m-3].
    pub fn aom_carbon(&self) -> FloatValue {
        self.aom_pools.iter().map(OrganicPool::total_carbon).sum()
    }

    /// Remove exhausted pools, returning how many were dropped.
    pub fn collect_exhausted_pools(&mut self) -> usize {
        let before = self.aom_pools.len();
        self.aom_pools.retain(|pool| !pool.is_exhausted());
        before - self.aom_pools.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::VanGenuchtenRetention;
    use agrosoil_core::errors::SoilError;
    use is_close::is_close;

    fn layer_with(params: SoilParameters) -> SoilLayer {
        SoilLayer::new(
            0.1,
            &params,
            &UserInitialValues::default(),
            Rc::new(VanGenuchtenRetention::default()),
        )
        .unwrap()
    }

    fn prescribed() -> SoilParameters {
        SoilParameters {
            hydraulic_limits: Some(HydraulicLimits {
                saturation: 0.45,
                field_capacity: 0.3,
                permanent_wilting_point: 0.1,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_state() {
        let layer = layer_with(prescribed());
        assert!(is_close!(layer.moisture(), 0.24));
        assert_eq!(layer.moisture_old(), layer.moisture());
        assert_eq!(layer.no3(), 0.0001);
        assert_eq!(layer.nh4(), 0.0001);
        assert_eq!(layer.no2(), 0.0);
        assert!(layer.aom_pools().is_empty());
    }

    #[test]
    fn test_per_layer_initial_values_override() {
        let layer = layer_with(SoilParameters {
            initial_fraction_fc: Some(1.0),
            initial_nitrate: Some(0.002),
            ..prescribed()
        });
        assert!(is_close!(layer.moisture(), 0.3));
        assert_eq!(layer.no3(), 0.002);
    }

    #[test]
    fn test_mineral_nitrogen_is_sum_of_forms() {
        let mut layer = layer_with(prescribed());
        layer.set_concentration(Constituent::Ammonium, 0.01).unwrap();
        layer.set_concentration(Constituent::Nitrite, 0.002).unwrap();
        layer.set_concentration(Constituent::Nitrate, 0.03).unwrap();
        assert!(is_close!(layer.mineral_nitrogen(), 0.042));
        // 0.042 kg m-3 over 0.1 m
        assert!(is_close!(layer.mineral_nitrogen_kg_per_ha(), 42.0));
    }

    #[test]
    fn test_setters_reject_negative_values() {
        let mut layer = layer_with(prescribed());
        assert!(matches!(
            layer.set_concentration(Constituent::Nitrate, -0.1),
            Err(SoilError::InvalidMagnitude { .. })
        ));
        assert_eq!(layer.no3(), 0.0001);
        assert!(layer.set_moisture(-0.01).is_err());
        assert!(layer.set_organic_carbon(FloatValue::NAN).is_err());
    }

    #[test]
    fn test_organic_content_switches_representation() {
        let mut layer = layer_with(prescribed());
        layer.set_organic_matter(0.02).unwrap();
        assert!(matches!(
            layer.organic_content(),
            OrganicContent::OrganicMatter(_)
        ));
        assert!(is_close!(layer.organic_carbon(), 0.0114));

        layer.set_organic_carbon(0.0057).unwrap();
        assert!(is_close!(layer.organic_matter(), 0.01));
    }

    #[test]
    fn test_organic_carbon_change_invalidates_limits() {
        let mut layer = layer_with(SoilParameters::default());
        let before = layer.hydraulic_limits();
        layer.set_organic_carbon(0.04).unwrap();
        let after = layer.hydraulic_limits();
        assert_ne!(before, after);
        assert_eq!(after, layer.derive_hydraulic_limits());
    }

    #[test]
    fn test_pf_follows_moisture() {
        let mut layer = layer_with(SoilParameters::default());
        let wet = layer.pressure_head_pf();
        layer.set_moisture(layer.permanent_wilting_point() + 0.005).unwrap();
        let dry = layer.pressure_head_pf();
        assert!(dry > wet, "pF should rise as the layer dries: {} vs {}", dry, wet);
    }

    #[test]
    fn test_roll_moisture_day() {
        let mut layer = layer_with(prescribed());
        layer.set_moisture(0.35).unwrap();
        assert!(is_close!(layer.moisture_old(), 0.24));
        layer.roll_moisture_day();
        assert_eq!(layer.moisture_old(), 0.35);
    }

    #[test]
    fn test_water_and_free_pore_space() {
        let layer = layer_with(prescribed());
        assert!(is_close!(layer.water_mm(), 24.0));
        assert!(is_close!(layer.free_pore_space_mm(), 21.0));
    }

    #[test]
    fn test_organic_carbon_mass() {
        let layer = layer_with(prescribed());
        // 0.012 kg kg-1 * 1400 kg m-3 * 0.1 m
        assert!(is_close!(layer.organic_carbon_mass(), 1.68));
    }
}
