//! Core types for the daily soil-column simulation.
//!
//! This crate holds everything the soil column shares with its collaborators:
//!
//! - `errors`: the error type returned by every fallible column operation
//! - `units`: the float alias and the unit conversion constants
//! - `parameters`: configuration structs for the profile, the layers and the
//!   management events (fertiliser, irrigation)
//! - `capabilities`: traits for the injected collaborators (retention curve,
//!   decomposition environment, crop growth)

pub mod capabilities;
pub mod errors;
pub mod parameters;
pub mod units;
