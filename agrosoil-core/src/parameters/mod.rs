//! Soil column parameters
//!
//! This module contains the configuration structures consumed by the soil
//! column. Every struct provides defaults matching a loamy arable profile so a
//! column can be built with only the values that differ from them. Loading
//! the structs from files is left to the caller, they all implement
//! `serde::Deserialize`.

mod fertiliser;
mod irrigation;
mod organic_matter;
mod profile;

pub use fertiliser::{MineralFertiliserPartition, NMinRequest};
pub use irrigation::AutomaticIrrigationParameters;
pub use organic_matter::OrganicMatterParameters;
pub use profile::{GeneralParameters, OrganicContent, SoilDensity, SoilParameters, UserInitialValues};
