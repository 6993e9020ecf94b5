//! Automatic Irrigation Parameters

use crate::errors::{ensure_non_negative, SoilResult};
use crate::units::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters of the irrigation trigger.
///
/// Irrigation fires when the plant available water fraction of the layers
/// down to the critical moisture depth drops strictly below `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomaticIrrigationParameters {
    /// Water given per irrigation event
    /// unit: mm
    /// default: 17.0
    pub amount: FloatValue,

    /// Plant available water fraction below which irrigation is triggered
    /// unit: dimensionless
    /// default: 0.35
    pub threshold: FloatValue,

    /// Nitrate-N dissolved in the irrigation water
    /// unit: mg N l-1
    /// default: 0.0
    #[serde(default)]
    pub n_concentration: FloatValue,
}

impl Default for AutomaticIrrigationParameters {
    fn default() -> Self {
        Self {
            amount: 17.0,
            threshold: 0.35,
            n_concentration: 0.0,
        }
    }
}

impl AutomaticIrrigationParameters {
    pub fn validate(&self) -> SoilResult<()> {
        ensure_non_negative("irrigation amount", self.amount)?;
        ensure_non_negative("irrigation threshold", self.threshold)?;
        ensure_non_negative("irrigation N concentration", self.n_concentration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = AutomaticIrrigationParameters::default();
        assert!((params.amount - 17.0).abs() < 1e-10);
        assert!((params.threshold - 0.35).abs() < 1e-10);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let params = AutomaticIrrigationParameters {
            amount: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
