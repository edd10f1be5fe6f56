//! HTTP client builder for backend calls.

use std::time::Duration;

use crate::error::Error;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout. `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: format!("profile-portal/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for the reqwest client shared by the auth gateway and profile sync.
///
/// Requests are never retried here; a failure is reported to the caller as-is.
pub struct ClientBuilder {
    config: HttpClientConfig,
}

impl ClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(self.config.user_agent);

        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.build()?)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let builder = ClientBuilder::new();
        assert_eq!(builder.config.timeout, None);
        assert!(builder.config.user_agent.starts_with("profile-portal/"));
    }

    #[test]
    fn test_builder_with_timeout() {
        let builder = ClientBuilder::new().with_timeout(Some(Duration::from_secs(60)));
        assert_eq!(builder.config.timeout, Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_build_client() {
        let builder = ClientBuilder::new().with_user_agent("tests".to_string());
        let result = builder.build();
        assert!(result.is_ok());
    }
}
