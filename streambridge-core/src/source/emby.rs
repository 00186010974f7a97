use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use streambridge_model::{ItemsPage, PlaybackInfo, RawItem};
use tracing::{debug, warn};
use url::Url;

use super::{ItemSource, ItemsQuery, SourceConnector, SourceCredentials};
use crate::error::{BridgeError, Result};

/// Client identity and transport knobs shared by every Emby connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub client_name: String,
    pub device_name: String,
    pub device_id: String,
    pub version: String,
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            client_name: "StreamBridge".to_string(),
            device_name: "StreamBridge".to_string(),
            device_id: "stremio-addon-device-id".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientSettings {
    fn authorization_header(&self) -> String {
        format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
            self.client_name, self.device_name, self.device_id, self.version
        )
    }
}

/// [`ItemSource`] backed by the Emby REST API of one user.
#[derive(Clone)]
pub struct EmbyClient {
    client: Client,
    base: Url,
    user_id: String,
    access_token: String,
    authorization: String,
}

impl fmt::Debug for EmbyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbyClient")
            .field("base", &self.base.as_str())
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl EmbyClient {
    pub fn new(credentials: &SourceCredentials, settings: &ClientSettings) -> Result<Self> {
        let base = Url::parse(credentials.server_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(BridgeError::Unsupported(format!(
                "server url cannot carry a path: {base}"
            )));
        }
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            base,
            user_id: credentials.user_id.clone(),
            access_token: credentials.access_token.clone(),
            authorization: settings.authorization_header(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BridgeError::Unsupported(format!("server url {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<Option<T>> {
        debug!(url = %url, "emby request");
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .header("X-Emby-Token", &self.access_token)
            .header("X-Emby-Authorization", &self.authorization)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.bytes().await?;
                Ok(Some(serde_json::from_slice(&body)?))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                warn!(url = %url, status = status.as_u16(), "emby request failed");
                Err(BridgeError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                })
            }
        }
    }

    async fn get_page(&self, url: Url, query: &[(&'static str, String)]) -> Result<ItemsPage> {
        let missing = url.to_string();
        self.get_json(url, query).await?.ok_or(BridgeError::Status {
            status: StatusCode::NOT_FOUND.as_u16(),
            url: missing,
        })
    }
}

#[async_trait]
impl ItemSource for EmbyClient {
    async fn fetch_items(&self, query: &ItemsQuery) -> Result<ItemsPage> {
        let url = self.endpoint(&["Users", &self.user_id, "Items"])?;
        self.get_page(url, &query.to_pairs()).await
    }

    async fn fetch_item(&self, item_id: &str) -> Result<Option<RawItem>> {
        let url = self.endpoint(&["Users", &self.user_id, "Items", item_id])?;
        self.get_json(url, &[]).await
    }

    async fn fetch_views(&self) -> Result<ItemsPage> {
        let url = self.endpoint(&["Users", &self.user_id, "Views"])?;
        self.get_page(url, &[]).await
    }

    async fn fetch_series_episodes(&self, series_id: &str) -> Result<ItemsPage> {
        let url = self.endpoint(&["Shows", series_id, "Episodes"])?;
        let query = [
            ("UserId", self.user_id.clone()),
            (
                "Fields",
                "Overview,PremiereDate,ImageTags,ParentIndexNumber,IndexNumber".to_string(),
            ),
        ];
        self.get_page(url, &query).await
    }

    async fn fetch_playback_info(&self, item_id: &str) -> Result<PlaybackInfo> {
        let url = self.endpoint(&["Items", item_id, "PlaybackInfo"])?;
        let query = [("UserId", self.user_id.clone())];
        Ok(self.get_json(url, &query).await?.unwrap_or_default())
    }
}

/// Opens an [`EmbyClient`] per set of credentials.
#[derive(Debug, Clone, Default)]
pub struct EmbyConnector {
    settings: ClientSettings,
}

impl EmbyConnector {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

impl SourceConnector for EmbyConnector {
    fn connect(&self, credentials: &SourceCredentials) -> Result<Arc<dyn ItemSource>> {
        let client: Arc<dyn ItemSource> = Arc::new(EmbyClient::new(credentials, &self.settings)?);
        Ok(client)
    }
}
