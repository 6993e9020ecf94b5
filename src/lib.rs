//! Daily soil-column state for agricultural crop simulations.
//!
//! `agrosoil` re-exports the two workspace crates:
//!
//! - [`agrosoil_core`]: errors, units, configuration and the collaborator traits
//! - [`agrosoil_components`]: organic pools, soil layers and the managed soil column
//!
//! The [`prelude`] gathers the types a simulation driver needs.
//!
//! # Example
//!
//! ```
//! use agrosoil::prelude::*;
//!
//! let mut column = SoilColumnBuilder::new()
//!     .with_general_parameters(GeneralParameters::uniform(10, 0.1))
//!     .with_soil_parameters(vec![SoilParameters::default(); 10])
//!     .build()
//!     .unwrap();
//!
//! column.apply_scheduled_fertiliser();
//! column
//!     .apply_mineral_fertiliser(&MineralFertiliserPartition::calcium_ammonium_nitrate(), 40.0)
//!     .unwrap();
//! column.apply_tillage(0.2).unwrap();
//! ```

pub use agrosoil_components;
pub use agrosoil_core;

pub mod prelude {
    pub use agrosoil_components::column::{
        DecompositionSummary, DeferredApplication, FertiliserSchedule, ScheduledTask, SoilColumn,
        SoilColumnBuilder,
    };
    pub use agrosoil_components::decomposition::StandardDecompositionEnvironment;
    pub use agrosoil_components::layer::{Constituent, SoilLayer};
    pub use agrosoil_components::organic_pool::OrganicPool;
    pub use agrosoil_components::retention::VanGenuchtenRetention;
    pub use agrosoil_core::capabilities::{
        CropGrowth, DecompositionEnvironment, HydraulicLimits, RetentionCurve, SoilDescription,
    };
    pub use agrosoil_core::errors::{SoilError, SoilResult};
    pub use agrosoil_core::parameters::*;
    pub use agrosoil_core::units::FloatValue;
}
