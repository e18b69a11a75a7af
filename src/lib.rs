//! # elgato_lights_rs
//!
//! An async Rust library for discovering and controlling Elgato Key Lights.
//!
//! Lights are found on the local network through mDNS (`_elg._tcp.local.`)
//! and controlled through their HTTP REST API.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use elgato_lights_rs::{DiscoveryConfig, discover};
//!
//! async fn control_lights() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DiscoveryConfig::new().timeout(Duration::from_secs(5));
//!     for light in discover(&config).await? {
//!         light.power_on().await?;
//!         light.set_brightness(30).await?;
//!         light.increment_temperature(-500).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Discovery**: Find lights on your network with [`discover`]
//! - **Power Control**: Turn lights on/off or toggle with [`PowerMode`]
//! - **Brightness**: 0-100% using [`Brightness`]
//! - **Color Temperature**: 2900K-7000K using [`Kelvin`]
//! - **Status Cache**: Each [`Light`] remembers the last status it was told
//! - **Pluggable I/O**: Swap the HTTP [`Transport`] or mDNS [`ServiceBrowser`]
//!
//! ## Communication
//!
//! Lights serve a REST API on port 9123 under `/elgato/`. Status lives at
//! `lights`, static device details at `accessory-info`.
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade. Invalid
//! values passed to [`Light::set_status`] are reported at error level and
//! left out of the request rather than failing the call.

mod config;
mod discovery;
mod errors;
mod light;
mod mdns;
pub mod runtime;
mod status;
mod transport;
mod types;
mod update;

// Re-export public API
pub use config::{DEFAULT_PORT, DiscoveryConfig, SERVICE_TYPE};
pub use discovery::{discover, discover_with};
pub use errors::Error;
pub use light::Light;
pub use mdns::{MdnsBrowser, ResolvedAddress, ResolvedService, ServiceBrowser};
pub use status::{AccessoryInfo, LightStatus};
pub use transport::{Endpoint, HttpTransport, Transport};
pub use types::{Brightness, Kelvin, PowerMode, device_to_kelvin, kelvin_to_device};
pub use update::StatusUpdate;
