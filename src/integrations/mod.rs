pub mod discord;
pub mod jellyfin;

use crate::data::{Item, Session};
use crate::error::{DeliveryError, GatewayError};
use crate::format::RichMessage;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Upstream fetches that take longer than this count as failed
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client for all API requests to enable connection pooling
pub static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    build_http_client(DEFAULT_REQUEST_TIMEOUT).expect("Failed to create HTTP client")
});

/// Client for notification delivery. Only connecting is bounded: a post
/// that times out after the server accepted it would be re-sent by the
/// session watcher as a duplicate.
pub static DELIVERY_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    client_builder(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
});

pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    client_builder(timeout).timeout(timeout).build()
}

fn client_builder(connect_timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout.min(Duration::from_secs(10)))
        .pool_max_idle_per_host(5)
        .user_agent(concat!("jellywatch/", env!("CARGO_PKG_VERSION")))
}

/// Read access to the media server.
///
/// Every call either returns structured data or a [`GatewayError`]; callers
/// decide whether to skip a tick or disable themselves.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// All sessions known to the server, playing or not
    async fn list_sessions(&self) -> Result<Vec<Session>, GatewayError>;

    /// Latest library additions visible to `user_id`.
    ///
    /// Fails with [`GatewayError::Configuration`] when no user is given.
    async fn list_latest_items(&self, user_id: Option<&str>) -> Result<Vec<Item>, GatewayError>;

    /// URL of an item's artwork. Pure, never touches the network.
    fn image_url(&self, item_id: &str, image_type: &str) -> String;
}

/// Destination for rich notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Confirm the destination is configured and resolvable
    async fn ready(&self) -> Result<(), DeliveryError>;

    async fn send(&self, message: &RichMessage) -> Result<(), DeliveryError>;
}
