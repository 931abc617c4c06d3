// ── Runtime clinic configuration ──
//
// These types describe *how* to reach the clinic API and the device broker.
// They carry credential data and tuning, but never touch disk.
// The CLI builds a `ClinicConfig` from its profile and hands it in.

use std::time::Duration;

use podoscan_api::transport::{TlsMode, TransportConfig};
use podoscan_api::MqttConfig;
use secrecy::SecretString;
use url::Url;

/// Default session refresh period while the charts view is visible.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Login credentials for the clinic API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed clinic servers).
    DangerAcceptInvalid,
}

/// Everything a [`Clinic`](crate::Clinic) needs to talk to its backends.
#[derive(Debug, Clone)]
pub struct ClinicConfig {
    /// API base URL (e.g. `http://localhost:3000`).
    pub api_url: Url,
    /// Credentials used by [`Clinic::connect`](crate::Clinic::connect).
    /// `None` leaves the client unauthenticated.
    pub credentials: Option<Credentials>,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Device broker URL (`ws://host:9001`, `mqtt://host:1883`, ...).
    pub mqtt_url: String,
    /// Session polling period for the charts view.
    pub poll_interval: Duration,
}

impl ClinicConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            mqtt_url: MqttConfig::default().url,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    pub(crate) fn mqtt(&self) -> MqttConfig {
        MqttConfig {
            url: self.mqtt_url.clone(),
            ..MqttConfig::default()
        }
    }
}
