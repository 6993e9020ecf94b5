//! Soil column components
//!
//! This crate provides the state of a layered soil profile and the management
//! operations acting on it.
//!
//! # Module Organisation
//!
//! Components are organised from the leaves up:
//! - `organic_pool`: decomposing carbon of one organic matter addition
//! - `layer`: water, temperature, nitrogen and carbon state of one layer
//! - `column`: the profile with fertilisation, irrigation and tillage
//!
//! Reference implementations of the injected capabilities:
//! - `retention`: Van Genuchten retention curve with Vereecken parameters
//! - `decomposition`: standard temperature and moisture responses

pub mod column;
pub mod decomposition;
pub mod layer;
pub mod organic_pool;
pub mod retention;
