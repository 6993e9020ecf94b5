//! Organic Matter Parameters
//!
//! Properties of an organic fertiliser (manure, slurry, crop residues) used to
//! create the added organic matter pools of the soil layers.
//!
//! # Carbon Flows
//!
//! ```text
//!                 part_aom_to_aom_slow
//!   [ADDED OM] ------------------------> [AOM SLOW] --+--> [SMB SLOW]
//!        |                                             |
//!        |        part_aom_to_aom_fast                 +--> [SMB FAST]
//!        +-----------------------------> [AOM FAST] --+
//!                                                      +--> CO2
//! ```

use crate::errors::{ensure_non_negative, SoilError, SoilResult};
use crate::units::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters of an organic fertiliser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganicMatterParameters {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Dry matter content of the fresh matter
    /// unit: kg DM kg-1 FM
    /// default: 0.289 (cattle manure)
    pub dry_matter_content: FloatValue,

    /// Ammonium content of the dry matter
    /// unit: kg N kg-1 DM
    /// default: 0.007
    pub nh4_content: FloatValue,

    /// Nitrate content of the dry matter
    /// unit: kg N kg-1 DM
    /// default: 0.0
    pub no3_content: FloatValue,

    /// Carbamide content of the dry matter
    /// unit: kg N kg-1 DM
    /// default: 0.0
    pub carbamide_content: FloatValue,

    /// Decomposition coefficient of the slow pool at standard conditions
    /// unit: d-1
    /// default: 0.0012
    pub slow_dec_coeff_standard: FloatValue,

    /// Decomposition coefficient of the fast pool at standard conditions
    /// unit: d-1
    /// default: 0.05
    pub fast_dec_coeff_standard: FloatValue,

    /// Share of the added carbon entering the slow pool
    /// unit: kg kg-1
    /// default: 0.72
    pub part_aom_to_aom_slow: FloatValue,

    /// Share of the added carbon entering the fast pool
    /// unit: kg kg-1
    /// default: 0.18
    pub part_aom_to_aom_fast: FloatValue,

    /// C to N ratio of the slow pool
    /// unit: dimensionless
    /// default: 100.0
    pub cn_ratio_aom_slow: FloatValue,

    /// C to N ratio of the fast pool
    /// unit: dimensionless
    /// default: 6.5
    pub cn_ratio_aom_fast: FloatValue,

    /// Share of decomposed carbon consumed by the slow microbial biomass
    /// unit: kg kg-1
    /// default: 0.0
    pub part_aom_slow_to_smb_slow: FloatValue,

    /// Share of decomposed carbon consumed by the fast microbial biomass
    /// unit: kg kg-1
    /// default: 1.0
    pub part_aom_slow_to_smb_fast: FloatValue,
}

impl Default for OrganicMatterParameters {
    fn default() -> Self {
        Self {
            id: "CAM".to_string(),
            name: "cattle manure".to_string(),
            dry_matter_content: 0.289,
            nh4_content: 0.007,
            no3_content: 0.0,
            carbamide_content: 0.0,
            slow_dec_coeff_standard: 0.0012,
            fast_dec_coeff_standard: 0.05,
            part_aom_to_aom_slow: 0.72,
            part_aom_to_aom_fast: 0.18,
            cn_ratio_aom_slow: 100.0,
            cn_ratio_aom_fast: 6.5,
            part_aom_slow_to_smb_slow: 0.0,
            part_aom_slow_to_smb_fast: 1.0,
        }
    }
}

impl OrganicMatterParameters {
    /// Carbon share of the addition that is lost immediately (neither pool).
    pub fn part_aom_lost(&self) -> FloatValue {
        (1.0 - self.part_aom_to_aom_slow - self.part_aom_to_aom_fast).max(0.0)
    }

    pub fn validate(&self) -> SoilResult<()> {
        ensure_non_negative("dry matter content", self.dry_matter_content)?;
        ensure_non_negative("NH4 content", self.nh4_content)?;
        ensure_non_negative("NO3 content", self.no3_content)?;
        ensure_non_negative("carbamide content", self.carbamide_content)?;
        ensure_non_negative("slow decomposition coefficient", self.slow_dec_coeff_standard)?;
        ensure_non_negative("fast decomposition coefficient", self.fast_dec_coeff_standard)?;
        ensure_non_negative("slow C:N ratio", self.cn_ratio_aom_slow)?;
        ensure_non_negative("fast C:N ratio", self.cn_ratio_aom_fast)?;

        for (name, pair) in [
            (
                "AOM pool",
                (self.part_aom_to_aom_slow, self.part_aom_to_aom_fast),
            ),
            (
                "microbial biomass",
                (
                    self.part_aom_slow_to_smb_slow,
                    self.part_aom_slow_to_smb_fast,
                ),
            ),
        ] {
            let (a, b) = pair;
            if !(0.0..=1.0).contains(&a) || !(0.0..=1.0).contains(&b) || a + b > 1.0 + 1e-12 {
                return Err(SoilError::InvalidPartition {
                    reason: format!("{name} partition ({a}, {b}) must lie in [0, 1] and sum to at most 1"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = OrganicMatterParameters::default();
        assert!(params.validate().is_ok());
        assert!((params.part_aom_lost() - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_pool_shares_above_one_rejected() {
        let params = OrganicMatterParameters {
            part_aom_to_aom_slow: 0.8,
            part_aom_to_aom_fast: 0.3,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SoilError::InvalidPartition { .. })
        ));
    }

    #[test]
    fn test_negative_dry_matter_rejected() {
        let params = OrganicMatterParameters {
            dry_matter_content: -0.2,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
