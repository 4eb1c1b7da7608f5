//! HTTP client for the Jellyfin API
//!
//! Only the read endpoints the watchers need: `/Sessions` and
//! `/Users/{id}/Items/Latest`. Image URLs are built locally.

use super::{build_http_client, MediaGateway, DEFAULT_REQUEST_TIMEOUT, HTTP_CLIENT};
use crate::config::JellyfinConfig;
use crate::data::{Item, Session};
use crate::error::GatewayError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JellyfinClient {
    server_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl JellyfinClient {
    /// Create a client, failing when the server URL or API key is missing
    pub fn from_config(config: &JellyfinConfig) -> Result<Self, GatewayError> {
        Self::with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(config: &JellyfinConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let (Some(server_url), Some(api_key)) = (&config.server_url, &config.api_key) else {
            return Err(GatewayError::Configuration(
                "JELLYFIN_SERVER_URL and JELLYFIN_API_KEY must be set".to_string(),
            ));
        };

        let http = if timeout == DEFAULT_REQUEST_TIMEOUT {
            HTTP_CLIENT.clone()
        } else {
            build_http_client(timeout).map_err(|e| {
                GatewayError::Configuration(format!("could not build HTTP client: {}", e))
            })?
        };

        Ok(Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
            http,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn auth_header(&self) -> String {
        format!("MediaBrowser Token=\"{}\"", self.api_key)
    }

    /// GET an endpoint and return the raw JSON body
    pub async fn get_raw(&self, endpoint: &str) -> Result<serde_json::Value, GatewayError> {
        self.get(endpoint).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.server_url, endpoint);

        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| GatewayError::Fetch {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| GatewayError::Fetch {
            endpoint: endpoint.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|e| GatewayError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl MediaGateway for JellyfinClient {
    async fn list_sessions(&self) -> Result<Vec<Session>, GatewayError> {
        self.get("/Sessions").await
    }

    async fn list_latest_items(&self, user_id: Option<&str>) -> Result<Vec<Item>, GatewayError> {
        let Some(user_id) = user_id else {
            return Err(GatewayError::Configuration(
                "JELLYFIN_USER_ID is not set, cannot fetch latest items".to_string(),
            ));
        };

        let endpoint = format!("/Users/{}/Items/Latest", urlencoding::encode(user_id));
        self.get(&endpoint).await
    }

    fn image_url(&self, item_id: &str, image_type: &str) -> String {
        format!(
            "{}/Items/{}/Images/{}",
            self.server_url,
            urlencoding::encode(item_id),
            urlencoding::encode(image_type)
        )
    }
}
