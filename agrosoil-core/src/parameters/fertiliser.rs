//! Mineral Fertiliser Parameters
//!
//! Partition of a mineral fertiliser into its nitrogen forms and the request
//! driving the NMin fertilisation method.

use crate::errors::{ensure_non_negative, SoilError, SoilResult};
use crate::units::FloatValue;
use is_close::is_close;
use serde::{Deserialize, Serialize};

/// Composition of a mineral fertiliser.
///
/// Each fraction is the share of the applied nitrogen [kg N kg-1 N] that
/// enters the corresponding soil pool. The fractions of a real fertiliser sum
/// to one, a smaller sum is accepted and the rest is treated as inert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineralFertiliserPartition {
    /// Identifier used in management files
    #[serde(default)]
    pub id: String,

    /// Human readable name
    #[serde(default)]
    pub name: String,

    /// Carbamide (urea) share
    /// unit: kg kg-1
    /// default: 0.0
    #[serde(default)]
    pub carbamide: FloatValue,

    /// Ammonium share
    /// unit: kg kg-1
    /// default: 0.0
    #[serde(default)]
    pub nh4: FloatValue,

    /// Nitrate share
    /// unit: kg kg-1
    /// default: 0.0
    #[serde(default)]
    pub no3: FloatValue,
}

impl MineralFertiliserPartition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        carbamide: FloatValue,
        nh4: FloatValue,
        no3: FloatValue,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            carbamide,
            nh4,
            no3,
        }
    }

    /// Partition of a pure nitrate fertiliser.
    pub fn nitrate() -> Self {
        Self::new("N", "Nitrate", 0.0, 0.0, 1.0)
    }

    /// Calcium ammonium nitrate, half ammonium and half nitrate.
    pub fn calcium_ammonium_nitrate() -> Self {
        Self::new("CAN", "Calcium ammonium nitrate", 0.0, 0.5, 0.5)
    }

    /// Partition of urea.
    pub fn urea() -> Self {
        Self::new("U", "Urea", 1.0, 0.0, 0.0)
    }

    /// Sum of all fractions.
    pub fn total_fraction(&self) -> FloatValue {
        self.carbamide + self.nh4 + self.no3
    }

    /// Check that every fraction lies in [0, 1] and that they sum to at most one.
    pub fn validate(&self) -> SoilResult<()> {
        for (form, fraction) in [
            ("carbamide", self.carbamide),
            ("NH4", self.nh4),
            ("NO3", self.no3),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(SoilError::InvalidPartition {
                    reason: format!("{form} fraction {fraction} outside [0, 1]"),
                });
            }
        }

        let total = self.total_fraction();
        if total > 1.0 && !is_close!(total, 1.0) {
            return Err(SoilError::InvalidPartition {
                reason: format!("fractions sum to {total}, expected at most 1"),
            });
        }
        Ok(())
    }
}

impl Default for MineralFertiliserPartition {
    fn default() -> Self {
        Self::nitrate()
    }
}

/// Request for a fertilisation following the NMin method.
///
/// The soil mineral nitrogen is sampled down to `sampling_depth` and down to
/// 30 cm. The fertiliser demand is the larger shortfall against the two
/// targets, bounded by the minimum and maximum application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NMinRequest {
    /// Depth down to which the soil mineral nitrogen is sampled
    /// unit: m
    /// default: 0.9
    pub sampling_depth: FloatValue,

    /// Mineral nitrogen the crop requires down to the sampling depth
    /// unit: kg N ha-1
    /// default: 0.0
    pub target_n: FloatValue,

    /// Mineral nitrogen the crop requires down to 30 cm
    /// unit: kg N ha-1
    /// default: 0.0
    pub target_n_30: FloatValue,

    /// Threshold below which an application is not economically reasonable
    /// unit: kg N ha-1
    /// default: 10.0
    pub min_application: FloatValue,

    /// Largest application before the crop is damaged
    /// unit: kg N ha-1
    /// default: 100.0
    pub max_application: FloatValue,

    /// Days by which the top-dressing share of the application is delayed
    /// unit: d
    /// default: 0
    #[serde(default)]
    pub top_dressing_delay_days: u32,

    /// Share of a delayed application given immediately, the rest is top-dressed
    /// unit: kg kg-1
    /// default: 0.0
    #[serde(default)]
    pub immediate_fraction: FloatValue,
}

impl Default for NMinRequest {
    fn default() -> Self {
        Self {
            sampling_depth: 0.9,
            target_n: 0.0,
            target_n_30: 0.0,
            min_application: 10.0,
            max_application: 100.0,
            top_dressing_delay_days: 0,
            immediate_fraction: 0.0,
        }
    }
}

impl NMinRequest {
    pub fn validate(&self) -> SoilResult<()> {
        ensure_non_negative("NMin sampling depth", self.sampling_depth)?;
        ensure_non_negative("NMin target", self.target_n)?;
        ensure_non_negative("NMin 30 cm target", self.target_n_30)?;
        ensure_non_negative("minimum fertiliser application", self.min_application)?;
        ensure_non_negative("maximum fertiliser application", self.max_application)?;
        if self.min_application > self.max_application {
            return Err(SoilError::Error(format!(
                "Minimum fertiliser application {} exceeds the maximum {}",
                self.min_application, self.max_application
            )));
        }
        if !(0.0..=1.0).contains(&self.immediate_fraction) {
            return Err(SoilError::InvalidPartition {
                reason: format!(
                    "immediate fraction {} outside [0, 1]",
                    self.immediate_fraction
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_partitions_are_valid() {
        for partition in [
            MineralFertiliserPartition::nitrate(),
            MineralFertiliserPartition::calcium_ammonium_nitrate(),
            MineralFertiliserPartition::urea(),
        ] {
            assert!(partition.validate().is_ok(), "{:?}", partition);
            assert!((partition.total_fraction() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_partition_rejects_out_of_range_fraction() {
        let partition = MineralFertiliserPartition::new("x", "x", 0.0, -0.1, 1.0);
        assert!(matches!(
            partition.validate(),
            Err(SoilError::InvalidPartition { .. })
        ));
    }

    #[test]
    fn test_partition_rejects_sum_above_one() {
        let partition = MineralFertiliserPartition::new("x", "x", 0.4, 0.4, 0.4);
        assert!(partition.validate().is_err());
    }

    #[test]
    fn test_partition_accepts_rounding_noise() {
        let partition = MineralFertiliserPartition::new("x", "x", 0.1, 0.2, 0.7000000000000001);
        assert!(partition.validate().is_ok());
    }

    #[test]
    fn test_nmin_request_bounds() {
        let mut request = NMinRequest::default();
        assert!(request.validate().is_ok());

        request.min_application = 120.0;
        assert!(request.validate().is_err());

        let request = NMinRequest {
            target_n: -5.0,
            ..NMinRequest::default()
        };
        assert!(matches!(
            request.validate(),
            Err(SoilError::InvalidMagnitude { .. })
        ));
    }

    #[test]
    fn test_nmin_request_from_json() {
        let json = r#"{
            "sampling_depth": 0.6,
            "target_n": 50.0,
            "target_n_30": 20.0,
            "min_application": 10.0,
            "max_application": 60.0,
            "top_dressing_delay_days": 3
        }"#;
        let request: NMinRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.top_dressing_delay_days, 3);
        assert_eq!(request.immediate_fraction, 0.0);
        assert!(request.validate().is_ok());
    }
}
