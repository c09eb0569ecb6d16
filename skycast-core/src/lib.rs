//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Process-wide configuration (credential and endpoint)
//! - The current-weather client and its three lookup modes
//! - The display-facing reading model
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::{WeatherClient, WeatherLookup};
pub use config::{ClientConfig, Config};
pub use error::RequestError;
pub use model::{DEFAULT_UNITS, Query, WeatherReading};
