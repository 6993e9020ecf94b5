//! Van Genuchten retention curve with Vereecken pedotransfer parameters
//!
//! Reference implementation of [`RetentionCurve`]. The curve parameters are
//! estimated from texture, bulk density and organic carbon (Vereecken et al.,
//! 1989):
//!
//! $$\theta_s = 0.81 - 0.283\,\rho_b + 0.001\,clay$$
//! $$\theta_r = 0.015 + 0.005\,clay + 0.014\,C$$
//! $$\ln\alpha = -2.486 + 0.025\,sand - 0.351\,C - 2.617\,\rho_b - 0.023\,clay$$
//! $$\ln n = 0.053 - 0.009\,sand - 0.013\,clay + 0.00015\,sand^2$$
//!
//! with sand, clay and C in percent and $\rho_b$ in g cm-3. The moisture at a
//! pressure head $h$ [cm] follows
//!
//! $$\theta(h) = \theta_r + \frac{\theta_s - \theta_r}{1 + (\alpha h)^n}$$
//!
//! Field capacity is read at pF 2.5 and the permanent wilting point at pF 4.2.
//! Stones hold no water, all volumetric limits are scaled by `1 - stone`.

use agrosoil_core::capabilities::{HydraulicLimits, RetentionCurve, SoilDescription};
use agrosoil_core::units::FloatValue;
use serde::{Deserialize, Serialize};

/// Pressure head used for a layer at or below its residual moisture [cm].
const DRY_PRESSURE_HEAD: FloatValue = 5.0e7;

/// pF reported for a saturated layer.
const SATURATED_PF: FloatValue = 5.0e-7;

/// Shape parameters of the Van Genuchten curve for one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VanGenuchtenShape {
    pub theta_saturation: FloatValue,
    pub theta_residual: FloatValue,
    /// unit: cm-1
    pub alpha: FloatValue,
    pub n: FloatValue,
}

impl VanGenuchtenShape {
    /// Moisture held at the given pressure head [cm].
    pub fn moisture_at(&self, head: FloatValue) -> FloatValue {
        self.theta_residual
            + (self.theta_saturation - self.theta_residual) / (1.0 + (self.alpha * head).powf(self.n))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VanGenuchtenRetention {
    /// pF at which field capacity is read
    /// default: 2.5
    pub field_capacity_pf: FloatValue,

    /// pF at which the permanent wilting point is read
    /// default: 4.2
    pub wilting_point_pf: FloatValue,
}

impl Default for VanGenuchtenRetention {
    fn default() -> Self {
        Self {
            field_capacity_pf: 2.5,
            wilting_point_pf: 4.2,
        }
    }
}

impl VanGenuchtenRetention {
    /// Estimate the curve parameters of a layer.
    pub fn shape(&self, soil: &SoilDescription) -> VanGenuchtenShape {
        let sand = soil.sand * 100.0;
        let clay = soil.clay * 100.0;
        let carbon = soil.organic_carbon * 100.0;
        let bulk_density = soil.bulk_density / 1000.0;

        let theta_saturation = 0.81 - 0.283 * bulk_density + 0.001 * clay;
        let theta_residual = 0.015 + 0.005 * clay + 0.014 * carbon;
        let ln_alpha =
            -2.486 + 0.025 * sand - 0.351 * carbon - 2.617 * bulk_density - 0.023 * clay;
        let ln_n = 0.053 - 0.009 * sand - 0.013 * clay + 0.00015 * sand.powi(2);

        VanGenuchtenShape {
            theta_saturation,
            theta_residual: theta_residual.min(theta_saturation),
            alpha: ln_alpha.exp(),
            n: ln_n.exp(),
        }
    }
}

impl RetentionCurve for VanGenuchtenRetention {
    fn hydraulic_limits(&self, soil: &SoilDescription) -> HydraulicLimits {
        let shape = self.shape(soil);
        let water_filled = 1.0 - soil.stone;

        HydraulicLimits {
            saturation: shape.theta_saturation * water_filled,
            field_capacity: shape.moisture_at(10.0_f64.powf(self.field_capacity_pf)) * water_filled,
            permanent_wilting_point: shape.moisture_at(10.0_f64.powf(self.wilting_point_pf))
                * water_filled,
        }
    }

    fn pressure_head_pf(
        &self,
        soil: &SoilDescription,
        limits: &HydraulicLimits,
        moisture: FloatValue,
    ) -> FloatValue {
        let shape = self.shape(soil);
        let theta_saturation = limits.saturation;
        let theta_residual = limits.permanent_wilting_point;

        if moisture >= theta_saturation {
            return SATURATED_PF;
        }
        let head = if moisture <= theta_residual {
            DRY_PRESSURE_HEAD
        } else {
            ((theta_saturation - theta_residual) / (moisture - theta_residual) - 1.0)
                .powf(1.0 / shape.n)
                / shape.alpha
        };

        let pf = head.log10();
        if pf.is_finite() && pf >= 0.0 {
            pf
        } else {
            SATURATED_PF
        }
    }
}
