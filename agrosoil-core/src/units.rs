//! Float alias and unit conversions shared across the workspace.
//!
//! State is held per unit soil volume ([kg m-3]) while management amounts are
//! given per unit area ([kg ha-1], [mm]).

pub type FloatValue = f64;

/// Square metres per hectare.
pub const M2_PER_HA: FloatValue = 10_000.0;

/// Millimetres of water per metre of water column.
pub const MM_PER_M: FloatValue = 1000.0;

/// Conversion from soil organic matter to soil organic carbon [kg C kg-1 OM].
pub const SOM_TO_C: FloatValue = 0.57;

/// Carbon fraction of added organic matter dry mass [kg C kg-1 DM].
pub const AOM_TO_C: FloatValue = 0.45;

/// Pools whose summed slow and fast carbon falls below this are removed [kg C m-3].
pub const AOM_POOL_EPSILON: FloatValue = 1.0e-5;

/// Depth of the secondary NMin sampling horizon [m].
pub const NMIN_SECONDARY_DEPTH: FloatValue = 0.3;

/// Tolerance when comparing cumulative depths [m].
pub const DEPTH_TOLERANCE: FloatValue = 1.0e-9;

/// Convert an areal amount [kg ha-1] into a concentration [kg m-3] of a layer.
pub fn kg_per_ha_to_kg_per_m3(amount: FloatValue, thickness: FloatValue) -> FloatValue {
    amount / (M2_PER_HA * thickness)
}

/// Convert a layer concentration [kg m-3] into an areal amount [kg ha-1].
pub fn kg_per_m3_to_kg_per_ha(concentration: FloatValue, thickness: FloatValue) -> FloatValue {
    concentration * M2_PER_HA * thickness
}

/// Water held in a layer [mm] for a volumetric moisture [m3 m-3].
pub fn moisture_to_mm(moisture: FloatValue, thickness: FloatValue) -> FloatValue {
    moisture * thickness * MM_PER_M
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areal_conversion_is_invertible() {
        let conc = kg_per_ha_to_kg_per_m3(40.0, 0.1);
        assert!((conc - 0.04).abs() < 1e-12);
        assert!((kg_per_m3_to_kg_per_ha(conc, 0.1) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_moisture_to_mm() {
        assert!((moisture_to_mm(0.25, 0.1) - 25.0).abs() < 1e-12);
    }
}
