//! Connection settings for the AWS transport.

use std::env;
use std::time::Duration;

/// Static credentials used instead of the default provider chain.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// Settings of an [`SdkTransport`](crate::transport::SdkTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsTransportConfig {
    /// Region requests are signed for.
    pub region: String,
    /// Endpoint override, e.g. a local emulator.
    pub endpoint_url: Option<String>,
    /// Credentials; `None` uses the SDK's default provider chain.
    pub credentials: Option<StaticCredentials>,
    /// Per-operation timeout enforced by the SDK, retries included.
    pub operation_timeout: Option<Duration>,
    /// Attempts per operation, the first one included.
    pub max_retry_attempts: u32,
    /// Upper bound of the exponential backoff between attempts.
    pub max_retry_backoff: Duration,
}

impl Default for AwsTransportConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_owned(),
            endpoint_url: None,
            credentials: None,
            operation_timeout: Some(Duration::from_millis(3000)),
            max_retry_attempts: 3,
            max_retry_backoff: Duration::from_millis(2000),
        }
    }
}

impl AwsTransportConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let credentials = match (env::var("AWS_ACCESS_KEY_ID"), env::var("AWS_SECRET_ACCESS_KEY")) {
            (Ok(access_key_id), Ok(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: env::var("AWS_SESSION_TOKEN").ok(),
            }),
            _ => None,
        };
        Self {
            region: env::var("AWS_REGION")
                .or_else(|_| env::var("DEFAULT_REGION"))
                .unwrap_or(defaults.region),
            endpoint_url: env::var("TABLEKIT_ENDPOINT_URL").ok(),
            credentials,
            operation_timeout: match env_u64("TABLEKIT_TIMEOUT_MS") {
                Some(0) => None,
                Some(ms) => Some(Duration::from_millis(ms)),
                None => defaults.operation_timeout,
            },
            max_retry_attempts: env_u64("TABLEKIT_MAX_RETRY_ATTEMPTS")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(defaults.max_retry_attempts),
            max_retry_backoff: env_u64("TABLEKIT_MAX_RETRY_BACKOFF_MS")
                .map_or(defaults.max_retry_backoff, Duration::from_millis),
        }
    }

    /// Point the transport at a local endpoint with dummy credentials.
    #[must_use]
    pub fn local(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
            credentials: Some(StaticCredentials {
                access_key_id: "test".to_owned(),
                secret_access_key: "test".to_owned(),
                session_token: None,
            }),
            ..Self::default()
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_to_sdk_credentials_chain() {
        let config = AwsTransportConfig::default();
        assert_eq!(config.region, "us-east-1");
        assert!(config.credentials.is_none());
        assert_eq!(config.max_retry_attempts, 3);
    }

    #[test]
    fn test_should_use_dummy_credentials_for_local_endpoints() {
        let config = AwsTransportConfig::local("http://localhost:4566");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(
            config.credentials.as_ref().map(|c| c.access_key_id.as_str()),
            Some("test")
        );
    }

    #[test]
    fn test_should_hide_secrets_in_debug_output() {
        let config = AwsTransportConfig::local("http://localhost:4566");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("access_key_id"));
        assert!(!rendered.contains("secret_access_key"));
    }
}
