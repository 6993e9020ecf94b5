//! Added organic matter pools
//!
//! Every organic fertiliser application creates one [`OrganicPool`] in each
//! layer it reaches. The pool tracks the carbon of that addition in a slowly
//! and a rapidly decomposing fraction until it is exhausted.
//!
//! # Daily Step
//!
//! For each pool:
//!
//! 1. Adjust the standard coefficients by the environmental modifier:
//!    $$k = k_{std} \times f_T \times f_\theta$$
//!
//! 2. Remove the decomposed carbon from both fractions (explicit daily step,
//!    bounded by the pool):
//!    $$\Delta C = C \times \min(k, 1)$$
//!
//! 3. Route the decomposed carbon to the slow and fast microbial biomass by
//!    the partition fractions, the remainder is respired as CO2.

use agrosoil_core::parameters::OrganicMatterParameters;
use agrosoil_core::units::{FloatValue, AOM_POOL_EPSILON};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Decomposing carbon of one organic matter addition in one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganicPool {
    /// Identifier shared by all layer instances created by one application
    pub application_id: u64,

    /// Carbon in the slowly decomposing fraction [kg C m-3]
    pub slow: FloatValue,
    /// Carbon in the rapidly decomposing fraction [kg C m-3]
    pub fast: FloatValue,

    /// Decomposition coefficient of the slow fraction at standard conditions [d-1]
    pub slow_dec_coeff_standard: FloatValue,
    /// Decomposition coefficient of the fast fraction at standard conditions [d-1]
    pub fast_dec_coeff_standard: FloatValue,
    /// Slow coefficient adjusted to the environment of the last step [d-1]
    pub slow_dec_coeff: FloatValue,
    /// Fast coefficient adjusted to the environment of the last step [d-1]
    pub fast_dec_coeff: FloatValue,

    /// Share of decomposed carbon consumed by the slow microbial biomass
    pub part_to_smb_slow: FloatValue,
    /// Share of decomposed carbon consumed by the fast microbial biomass
    pub part_to_smb_fast: FloatValue,

    pub cn_ratio_slow: FloatValue,
    pub cn_ratio_fast: FloatValue,

    pub days_after_application: u32,
    /// Dry matter content of the addition [kg DM kg-1 FM]
    pub dry_matter_content: FloatValue,
    /// Ammonium content of the addition [kg N kg-1 DM]
    pub nh4_content: FloatValue,

    /// Change of the slow fraction in the last step [kg C m-3]
    pub slow_delta: FloatValue,
    /// Change of the fast fraction in the last step [kg C m-3]
    pub fast_delta: FloatValue,

    /// True if the addition was mixed into the soil rather than left on the surface
    pub incorporated: bool,
}

/// Carbon leaving a pool in one decomposition step [kg C m-3].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecompositionFlux {
    pub to_smb_slow: FloatValue,
    pub to_smb_fast: FloatValue,
    pub respired: FloatValue,
}

impl DecompositionFlux {
    /// Total carbon removed from the pool.
    pub fn decomposed(&self) -> FloatValue {
        self.to_smb_slow + self.to_smb_fast + self.respired
    }
}

impl AddAssign for DecompositionFlux {
    fn add_assign(&mut self, other: Self) {
        self.to_smb_slow += other.to_smb_slow;
        self.to_smb_fast += other.to_smb_fast;
        self.respired += other.respired;
    }
}

impl OrganicPool {
    /// Create the pool of one layer for an application of organic matter.
    ///
    /// # Arguments
    ///
    /// * `application_id` - Identifier of the application event
    /// * `params` - Properties of the organic fertiliser
    /// * `slow` - Carbon entering the slow fraction [kg C m-3]
    /// * `fast` - Carbon entering the fast fraction [kg C m-3]
    /// * `incorporated` - Whether the addition was mixed into the soil
    pub fn from_application(
        application_id: u64,
        params: &OrganicMatterParameters,
        slow: FloatValue,
        fast: FloatValue,
        incorporated: bool,
    ) -> Self {
        Self {
            application_id,
            slow: slow.max(0.0),
            fast: fast.max(0.0),
            slow_dec_coeff_standard: params.slow_dec_coeff_standard,
            fast_dec_coeff_standard: params.fast_dec_coeff_standard,
            slow_dec_coeff: 0.0,
            fast_dec_coeff: 0.0,
            part_to_smb_slow: params.part_aom_slow_to_smb_slow,
            part_to_smb_fast: params.part_aom_slow_to_smb_fast,
            cn_ratio_slow: params.cn_ratio_aom_slow,
            cn_ratio_fast: params.cn_ratio_aom_fast,
            days_after_application: 0,
            dry_matter_content: params.dry_matter_content,
            nh4_content: params.nh4_content,
            slow_delta: 0.0,
            fast_delta: 0.0,
            incorporated,
        }
    }

    /// Carbon held by both fractions [kg C m-3].
    pub fn total_carbon(&self) -> FloatValue {
        self.slow + self.fast
    }

    /// Organic nitrogen bound in the pool [kg N m-3].
    pub fn nitrogen(&self) -> FloatValue {
        let ratio = |carbon: FloatValue, cn: FloatValue| if cn > 0.0 { carbon / cn } else { 0.0 };
        ratio(self.slow, self.cn_ratio_slow) + ratio(self.fast, self.cn_ratio_fast)
    }

    /// True once the pool holds too little carbon to be worth tracking.
    pub fn is_exhausted(&self) -> bool {
        self.total_carbon() < AOM_POOL_EPSILON
    }

    /// Same pool with its carbon replaced, used when layers are mixed.
    pub(crate) fn with_carbon(&self, slow: FloatValue, fast: FloatValue) -> Self {
        Self {
            slow,
            fast,
            ..self.clone()
        }
    }

    /// Decompose the pool for one day.
    ///
    /// # Arguments
    ///
    /// * `modifier` - Product of the environmental responses (dimensionless, ≥ 0)
    ///
    /// # Returns
    ///
    /// The carbon removed from the pool and where it went
    pub fn decompose(&mut self, modifier: FloatValue) -> DecompositionFlux {
        let modifier = modifier.max(0.0);
        self.slow_dec_coeff = self.slow_dec_coeff_standard * modifier;
        self.fast_dec_coeff = self.fast_dec_coeff_standard * modifier;

        let decomposed_slow = self.slow * self.slow_dec_coeff.min(1.0);
        let decomposed_fast = self.fast * self.fast_dec_coeff.min(1.0);

        self.slow = (self.slow - decomposed_slow).max(0.0);
        self.fast = (self.fast - decomposed_fast).max(0.0);
        self.slow_delta = -decomposed_slow;
        self.fast_delta = -decomposed_fast;
        self.days_after_application += 1;

        let decomposed = decomposed_slow + decomposed_fast;
        let to_smb_slow = decomposed * self.part_to_smb_slow;
        let to_smb_fast = decomposed * self.part_to_smb_fast;

        DecompositionFlux {
            to_smb_slow,
            to_smb_fast,
            respired: (decomposed - to_smb_slow - to_smb_fast).max(0.0),
        }
    }
}
