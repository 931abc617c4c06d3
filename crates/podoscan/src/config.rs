//! CLI configuration: thin wrapper around `podoscan_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --login-email, --insecure, ...).

use std::time::Duration;

use secrecy::SecretString;

use podoscan_core::{ClinicConfig, Credentials, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use podoscan_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build a `ClinicConfig` from the config file, active profile and flags.
pub fn build_clinic_config(global: &GlobalOpts) -> Result<ClinicConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    // No profile: build from flags / env vars alone.
    let Some(api_url) = global.api_url.clone() else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };
    let profile = Profile {
        api_url,
        ..Profile::default()
    };
    resolve_profile(&profile, &profile_name, &cfg.defaults, global)
}

/// Translate a `Profile` + global flags into a `ClinicConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ClinicConfig, CliError> {
    // 1. API URL (flag > env > profile)
    let url_str = global.api_url.as_deref().unwrap_or(&profile.api_url);
    let api_url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let mut config = ClinicConfig::new(api_url);

    // 2. Credentials (flags first, then the shared chain)
    config.credentials = resolve_credentials(profile, profile_name, global)?;

    // 3. TLS verification
    config.tls = if global.insecure || profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 4. Timeouts and polling
    config.timeout = Duration::from_secs(global.timeout);
    config.poll_interval =
        Duration::from_millis(profile.poll_interval_ms.unwrap_or(defaults.poll_interval_ms));

    // 5. Device broker (flag > env > profile > built-in default)
    if let Some(mqtt_url) = global.mqtt_url.as_ref().or(profile.mqtt_url.as_ref()) {
        config.mqtt_url.clone_from(mqtt_url);
    }

    Ok(config)
}

fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<Option<Credentials>, CliError> {
    let email = global
        .login_email
        .clone()
        .or_else(|| profile.email.clone());

    match (email, global.login_password.as_ref()) {
        (Some(email), Some(password)) => Ok(Some(Credentials {
            email,
            password: SecretString::from(password.clone()),
        })),
        (Some(email), None) => {
            let password = podoscan_config::resolve_password(profile, profile_name)?;
            Ok(Some(Credentials { email, password }))
        }
        (None, _) => Ok(None),
    }
}
