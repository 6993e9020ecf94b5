//! Standard environmental responses of organic matter decomposition
//!
//! # Temperature Response
//!
//! No decomposition in frozen or freezing soil, a linear rise up to 20 °C and
//! an exponential response above:
//!
//! $$f_T = \begin{cases} 0 & T \le 0 \\ 0.1\,T & 0 < T \le 20 \\ e^{0.47 - 0.027T + 0.00193T^2} & T > 20 \end{cases}$$
//!
//! # Moisture Response
//!
//! Piecewise linear in pF: 0.6 in very wet soil (pF ≤ 1), rising to the
//! optimum of 1 at field capacity (pF 2.5) and falling to 0 at pF 6.5.

use agrosoil_core::capabilities::DecompositionEnvironment;
use agrosoil_core::units::FloatValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDecompositionEnvironment {
    /// Moisture response in saturated soil
    /// default: 0.6
    pub wet_response: FloatValue,

    /// pF below which the wet response applies
    /// default: 1.0
    pub wet_pf: FloatValue,

    /// pF of optimal moisture
    /// default: 2.5
    pub optimum_pf: FloatValue,

    /// pF at and above which decomposition stops
    /// default: 6.5
    pub dry_pf: FloatValue,
}

impl Default for StandardDecompositionEnvironment {
    fn default() -> Self {
        Self {
            wet_response: 0.6,
            wet_pf: 1.0,
            optimum_pf: 2.5,
            dry_pf: 6.5,
        }
    }
}

impl DecompositionEnvironment for StandardDecompositionEnvironment {
    fn temperature_response(&self, temperature: FloatValue) -> FloatValue {
        if temperature <= 0.0 {
            0.0
        } else if temperature <= 20.0 {
            0.1 * temperature
        } else {
            (0.47 - 0.027 * temperature + 0.00193 * temperature.powi(2)).exp()
        }
    }

    fn moisture_response(&self, pressure_head_pf: FloatValue) -> FloatValue {
        let pf = pressure_head_pf;
        if pf <= self.wet_pf {
            self.wet_response
        } else if pf <= self.optimum_pf {
            self.wet_response
                + (1.0 - self.wet_response) * (pf - self.wet_pf) / (self.optimum_pf - self.wet_pf)
        } else if pf < self.dry_pf {
            1.0 - (pf - self.optimum_pf) / (self.dry_pf - self.optimum_pf)
        } else {
            0.0
        }
    }
}
