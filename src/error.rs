use thiserror::Error;

/// Failures talking to the media server
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Required settings are missing; retrying will not help
    #[error("Jellyfin is not configured: {0}")]
    Configuration(String),

    #[error("Request to {endpoint} failed: {source}")]
    Fetch {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Jellyfin returned status {status} for {endpoint}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("Could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl GatewayError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Failures delivering a notification
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Notification channel is not configured: {0}")]
    NotConfigured(String),

    #[error("Delivery request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Channel rejected message with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Used by in-process notifiers (tests, dry runs)
    #[error("Delivery failed: {0}")]
    Other(String),
}
