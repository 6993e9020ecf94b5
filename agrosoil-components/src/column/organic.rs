//! Organic fertilisation and the added organic matter pools
//!
//! An organic application is converted to dry matter, its mineral nitrogen
//! goes straight to the mineral pools and its carbon is split into the slow
//! and fast pools of a new [`OrganicPool`]. Surface applications reach the
//! top layer only, incorporated ones are spread at a uniform concentration
//! over the organic layers.

use super::SoilColumn;
use crate::layer::Constituent;
use crate::organic_pool::{DecompositionFlux, OrganicPool};
use agrosoil_core::capabilities::DecompositionEnvironment;
use agrosoil_core::errors::{ensure_non_negative, SoilResult};
use agrosoil_core::parameters::OrganicMatterParameters;
use agrosoil_core::units::{kg_per_ha_to_kg_per_m3, FloatValue, AOM_TO_C};
use log::debug;

/// Column totals of one decomposition step.
///
/// Carbon flows are per unit area [kg C m-2].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecompositionSummary {
    pub decomposed: FloatValue,
    pub to_smb_slow: FloatValue,
    pub to_smb_fast: FloatValue,
    /// Released as CO2
    pub respired: FloatValue,
    /// Pools dropped after falling below the epsilon
    pub pools_removed: usize,
}

impl SoilColumn {
    /// Apply an organic fertiliser.
    ///
    /// # Arguments
    ///
    /// * `params` - Properties of the organic fertiliser
    /// * `amount` - Fresh matter applied [kg FM ha-1]
    /// * `incorporation` - Whether the fertiliser is worked into the soil
    ///
    /// # Returns
    ///
    /// The identifier shared by the pools created in every receiving layer
    pub fn apply_organic_fertiliser(
        &mut self,
        params: &OrganicMatterParameters,
        amount: FloatValue,
        incorporation: bool,
    ) -> SoilResult<u64> {
        ensure_non_negative("organic fertiliser amount", amount)?;
        params.validate()?;

        let dry_matter = amount * params.dry_matter_content;
        let carbon = dry_matter * AOM_TO_C;
        let receiving = if incorporation {
            self.number_of_organic_layers
        } else {
            1
        };
        let depth: FloatValue = self.layers[..receiving]
            .iter()
            .map(|layer| layer.thickness())
            .sum();

        // Same concentration in every receiving layer [kg m-3]
        let per_volume = |kg_per_ha: FloatValue| kg_per_ha_to_kg_per_m3(kg_per_ha, depth);
        let slow = per_volume(carbon * params.part_aom_to_aom_slow);
        let fast = per_volume(carbon * params.part_aom_to_aom_fast);

        let application_id = self.allocate_application_id();
        for layer in &mut self.layers[..receiving] {
            layer.add_concentration(
                Constituent::Ammonium,
                per_volume(dry_matter * params.nh4_content),
            );
            layer.add_concentration(
                Constituent::Nitrate,
                per_volume(dry_matter * params.no3_content),
            );
            layer.add_concentration(
                Constituent::Carbamide,
                per_volume(dry_matter * params.carbamide_content),
            );
            layer.aom_pools_mut().push(OrganicPool::from_application(
                application_id,
                params,
                slow,
                fast,
                incorporation,
            ));
        }

        debug!(
            "Applied {:.1} kg ha-1 of organic fertiliser '{}' ({:.1} kg C ha-1) to {} layers",
            amount, params.name, carbon, receiving
        );
        Ok(application_id)
    }

    /// Remove every added organic matter pool of the column.
    pub fn delete_aom_pools(&mut self) {
        for layer in &mut self.layers {
            layer.aom_pools_mut().clear();
        }
        debug!("Deleted all added organic matter pools");
    }

    /// Remove pools whose carbon fell below the epsilon.
    pub fn collect_exhausted_pools(&mut self) -> usize {
        self.layers
            .iter_mut()
            .map(|layer| layer.collect_exhausted_pools())
            .sum()
    }

    /// Decompose the added organic matter of every layer for one day.
    ///
    /// The decomposed carbon feeds the microbial biomass of the layer it was
    /// found in. Exhausted pools are removed afterwards.
    pub fn decompose_organic_pools(
        &mut self,
        environment: &dyn DecompositionEnvironment,
    ) -> DecompositionSummary {
        let mut summary = DecompositionSummary::default();

        for layer in &mut self.layers {
            if layer.aom_pools().is_empty() {
                continue;
            }
            let modifier = if layer.frozen() {
                0.0
            } else {
                environment.temperature_response(layer.temperature())
                    * environment.moisture_response(layer.pressure_head_pf())
            };

            let mut flux = DecompositionFlux::default();
            for pool in layer.aom_pools_mut() {
                flux += pool.decompose(modifier);
            }
            layer.add_concentration(Constituent::SmbSlow, flux.to_smb_slow);
            layer.add_concentration(Constituent::SmbFast, flux.to_smb_fast);

            let thickness = layer.thickness();
            summary.decomposed += flux.decomposed() * thickness;
            summary.to_smb_slow += flux.to_smb_slow * thickness;
            summary.to_smb_fast += flux.to_smb_fast * thickness;
            summary.respired += flux.respired * thickness;
        }

        summary.pools_removed = self.collect_exhausted_pools();
        summary
    }

    /// Carbon in all added organic matter pools [kg C m-2].
    pub fn total_aom_carbon(&self) -> FloatValue {
        self.layers
            .iter()
            .map(|layer| layer.aom_carbon() * layer.thickness())
            .sum()
    }
}
