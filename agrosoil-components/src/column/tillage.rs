//! Tillage
//!
//! Tillage homogenises the layers down to the tillage depth. Organic carbon
//! is averaged by soil mass (bulk density × thickness), every other state
//! variable by thickness:
//!
//! $$\bar{x} = \frac{\sum_i x_i\,w_i}{\sum_i w_i}$$
//!
//! Added organic matter pools are matched across the mixed layers by their
//! application id. Each matched pool ends up at the same concentration in
//! every mixed layer, pools missing from a layer are created there. Pools
//! are only mixed within the organic layers, so tilling below the
//! mineralisation depth leaves the deeper layers without pools.

use super::SoilColumn;
use crate::layer::{Constituent, SoilLayer};
use crate::organic_pool::OrganicPool;
use agrosoil_core::errors::{ensure_non_negative, SoilResult};
use agrosoil_core::units::FloatValue;
use log::debug;

/// Weighted mean of `value` over `layers`.
fn weighted_mean<W, V>(layers: &[SoilLayer], weight: W, value: V) -> FloatValue
where
    W: Fn(&SoilLayer) -> FloatValue,
    V: Fn(&SoilLayer) -> FloatValue,
{
    let total_weight: FloatValue = layers.iter().map(&weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    layers.iter().map(|l| value(l) * weight(l)).sum::<FloatValue>() / total_weight
}

impl SoilColumn {
    /// Mix the layers between the surface and `depth` [m].
    pub fn apply_tillage(&mut self, depth: FloatValue) -> SoilResult<()> {
        ensure_non_negative("tillage depth", depth)?;
        let last = self.layer_number_for_depth(depth);
        let organic = (last + 1).min(self.number_of_organic_layers);
        let thickness = |l: &SoilLayer| l.thickness();
        let soil_mass = |l: &SoilLayer| l.bulk_density() * l.thickness();

        let mixed = &self.layers[..=last];
        let organic_carbon = weighted_mean(mixed, soil_mass, SoilLayer::organic_carbon);
        let moisture = weighted_mean(mixed, thickness, SoilLayer::moisture);
        let temperature = weighted_mean(mixed, thickness, SoilLayer::temperature);
        let constituents: Vec<(Constituent, FloatValue)> = Constituent::ALL
            .iter()
            .map(|&c| (c, weighted_mean(mixed, thickness, |l| l.concentration(c))))
            .collect();
        let pools = mixed_pools(&mixed[..organic]);

        for (index, layer) in self.layers[..=last].iter_mut().enumerate() {
            let content = layer.organic_content().with_organic_carbon(organic_carbon);
            layer.replace_organic_content(content);
            layer.set_moisture(moisture)?;
            layer.set_temperature(temperature);
            for (constituent, value) in &constituents {
                layer.set_concentration(*constituent, *value)?;
            }
            if index < organic {
                *layer.aom_pools_mut() = pools.clone();
            }
        }

        debug!(
            "Tillage down to {:.2} m mixed {} layers ({} organic matter pools)",
            depth,
            last + 1,
            pools.len()
        );
        Ok(())
    }
}

/// Pools of the mixed layers at the concentration they take after mixing.
///
/// Pools are ordered by first appearance from the top layer down.
fn mixed_pools(layers: &[SoilLayer]) -> Vec<OrganicPool> {
    let depth: FloatValue = layers.iter().map(SoilLayer::thickness).sum();
    let mut mixed: Vec<OrganicPool> = Vec::new();

    for layer in layers {
        let thickness = layer.thickness();
        for pool in layer.aom_pools() {
            let slow = pool.slow * thickness / depth;
            let fast = pool.fast * thickness / depth;
            match mixed
                .iter_mut()
                .find(|m| m.application_id == pool.application_id)
            {
                Some(existing) => {
                    existing.slow += slow;
                    existing.fast += fast;
                }
                None => mixed.push(pool.with_carbon(slow, fast)),
            }
        }
    }
    mixed
}
