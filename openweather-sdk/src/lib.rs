//! Client SDK for the OpenWeather current-weather API.
//!
//! This crate defines:
//! - A per-API-key [`WeatherClient`] with a bounded, freshness-aware cache
//!   and optional background polling
//! - An [`SdkRegistry`] that deduplicates clients by API key
//! - Normalization of raw provider payloads into a stable report schema
//!
//! It is used by `openweather-cli`, but can also be embedded in other
//! binaries or services.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod registry;

pub use client::{FRESHNESS_WINDOW_SECS, MIN_POLL_INTERVAL_SECS, Mode, WeatherClient};
pub use config::Config;
pub use error::WeatherError;
pub use fetch::{OpenWeatherFetcher, WeatherFetcher};
pub use model::WeatherReport;
pub use registry::SdkRegistry;
