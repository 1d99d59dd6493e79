//! `smartair-core`: shared vocabulary for the SmartAir services.
//!
//! This crate contains **pure** primitives (no I/O): the air-quality category
//! table, the supported cities and their pollution profiles, and identifiers.

pub mod aqi;
pub mod city;
pub mod error;
pub mod id;

pub use aqi::{AirQualityIndex, AqiCategory};
pub use city::City;
pub use error::{CoreError, CoreResult};
pub use id::RunId;
