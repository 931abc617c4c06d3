// ── Core error types ──
//
// User-facing errors from podoscan-core. Consumers never match on HTTP
// statuses or JSON failures directly; the `From<podoscan_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach clinic API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Request rejected by server: {message}")]
    Rejected { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Device channel error: {message}")]
    Device { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the caller should log in again before retrying.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<podoscan_api::Error> for CoreError {
    fn from(err: podoscan_api::Error) -> Self {
        use podoscan_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::Api { status: 401, message } => CoreError::AuthenticationFailed { message },
            ApiError::Api {
                status: 400..=499,
                message,
            } => CoreError::Rejected { message },
            ApiError::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::NotFound { path } => {
                let mut segments = path.trim_matches('/').rsplit('/');
                let identifier = segments.next().unwrap_or_default().to_owned();
                let entity_type = segments.next().unwrap_or("resource").to_owned();
                CoreError::NotFound {
                    entity_type,
                    identifier,
                }
            }
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            ApiError::Io(e) => CoreError::OperationFailed {
                message: e.to_string(),
            },
            ApiError::Mqtt(message) => CoreError::Device { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_become_rejections() {
        let err: CoreError = podoscan_api::Error::Api {
            status: 400,
            message: "email must be an email".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Rejected { ref message } if message == "email must be an email"));
    }

    #[test]
    fn server_errors_stay_api_errors() {
        let err: CoreError = podoscan_api::Error::Api {
            status: 503,
            message: "down".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(503), .. }));
    }

    #[test]
    fn not_found_path_is_split() {
        let err: CoreError = podoscan_api::Error::NotFound {
            path: "/api/appoinments/a9".into(),
        }
        .into();
        match err {
            CoreError::NotFound {
                entity_type,
                identifier,
            } => {
                assert_eq!(entity_type, "appoinments");
                assert_eq!(identifier, "a9");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unauthorized_is_auth() {
        let err: CoreError = podoscan_api::Error::Authentication {
            message: "jwt expired".into(),
        }
        .into();
        assert!(err.is_auth());
    }
}
