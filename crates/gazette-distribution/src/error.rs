//! Error types for the distribution subsystem.

use gazette_secrets::SecretError;

/// Errors raised while distributing publications to third-party recipients.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    /// A credential could not be resolved from the secret store.
    #[error("failed to resolve credential '{name}': {source}")]
    CredentialResolution {
        name: String,
        #[source]
        source: SecretError,
    },

    /// The recipient's token endpoint was unreachable or returned an
    /// unusable response.
    #[error("token acquisition failed for recipient '{recipient}': {detail}")]
    TokenAcquisition { recipient: String, detail: String },

    /// A single request attempt failed (transport error or non-2xx status).
    #[error("request to {url} failed{}: {detail}", fmt_status(.status))]
    Request {
        url: String,
        /// HTTP status, if the failure was a response rather than a
        /// transport error.
        status: Option<u16>,
        detail: String,
    },

    /// All configured attempts of an outbound call failed.
    #[error("request to {url} failed after {attempts} attempt(s){}: {detail}", fmt_status(.status))]
    RetryExhausted {
        url: String,
        status: Option<u16>,
        attempts: u32,
        detail: String,
    },

    /// The artefact store could not supply publication content.
    #[error("artefact store error for publication {publication_id}: {detail}")]
    Artefact {
        publication_id: uuid::Uuid,
        detail: String,
    },

    /// Invalid process-wide configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type DistributionResult<T> = Result<T, DistributionError>;

/// Terminal failure of a liveness probe.
///
/// Unlike content-delivery failures, which are logged and swallowed so one
/// dead recipient cannot block the rest of a round, a failed health check
/// is the caller's primary signal and must surface.
#[derive(Debug, thiserror::Error)]
#[error("health check failed for recipient '{recipient}' at {url} after {attempts} attempt(s){}: {detail}", fmt_status(.status))]
pub struct HealthCheckFailure {
    pub recipient: String,
    pub url: String,
    pub status: Option<u16>,
    pub attempts: u32,
    pub detail: String,
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_exhausted_display_with_status() {
        let err = DistributionError::RetryExhausted {
            url: "https://recipient.example/api".to_string(),
            status: Some(404),
            attempts: 4,
            detail: "HTTP 404".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request to https://recipient.example/api failed after 4 attempt(s) (status 404): HTTP 404"
        );
    }

    #[test]
    fn request_display_without_status() {
        let err = DistributionError::Request {
            url: "https://recipient.example/api".to_string(),
            status: None,
            detail: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request to https://recipient.example/api failed: connection refused"
        );
    }

    #[test]
    fn health_check_failure_display() {
        let err = HealthCheckFailure {
            recipient: "courts-portal".to_string(),
            url: "https://recipient.example/api".to_string(),
            status: Some(503),
            attempts: 3,
            detail: "HTTP 503".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("courts-portal"));
        assert!(rendered.contains("3 attempt(s)"));
        assert!(rendered.contains("status 503"));
    }
}
