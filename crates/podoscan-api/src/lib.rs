//! Async Rust client for the Podoscan clinic API.
//!
//! Two transports live here:
//!
//! - **REST** ([`PodoscanClient`]): bearer-authenticated JSON endpoints for
//!   patients, doctors, devices, families, appointments and sessions. Entity
//!   endpoints are generic over [`Resource`]; appointment-specific calls
//!   (clinical data edit, photo upload) are inherent methods.
//! - **MQTT** ([`MqttLink`]): a publish-only connection to the sensing
//!   device's broker, opened lazily on first publish.
//!
//! The client holds no cache and applies no retry policy; both belong to
//! `podoscan-core`.

pub mod appointments;
pub mod auth;
pub mod client;
pub mod error;
pub mod mqtt;
pub mod resource;
pub mod transport;
pub mod types;

pub use client::PodoscanClient;
pub use error::Error;
pub use mqtt::{MqttConfig, MqttLink};
pub use resource::{PatientScoped, Resource, Writable};
pub use transport::{TlsMode, TransportConfig};
pub use types::*;
