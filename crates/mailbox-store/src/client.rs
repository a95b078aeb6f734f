//! REST client for the hosted document store.
//!
//! Records live at `<base>/<collection>/<partition>/<folder>/<id>.json`.
//! Reading a whole folder uses `<base>/<collection>/<partition>/<folder>.json`.

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::folder::{Folder, PartitionKey};
use crate::record::{MessageRecord, NewMessage, RemoteFolder, normalize};
use crate::store::MailStore;

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database root URL.
    pub base_url: Url,
    /// Top-level collection holding every user's folders.
    pub collection: String,
}

impl StoreConfig {
    /// Collection used when none is configured.
    pub const DEFAULT_COLLECTION: &'static str = "mails";

    /// Creates a configuration for the given database root.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or cannot carry a path.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "{base_url} cannot be used as a database root"
            )));
        }
        Ok(Self {
            base_url,
            collection: Self::DEFAULT_COLLECTION.to_string(),
        })
    }

    /// Sets the collection name.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// URL of a whole folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn folder_url(&self, user: &PartitionKey, folder: Folder) -> Result<Url> {
        self.build_url(&[user.as_str(), &format!("{folder}.json")])
    }

    /// URL of one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn record_url(&self, user: &PartitionKey, folder: Folder, id: &str) -> Result<Url> {
        self.build_url(&[user.as_str(), folder.as_str(), &format!("{id}.json")])
    }

    fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidConfig(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .push(&self.collection)
            .extend(segments);
        Ok(url)
    }
}

/// Response to a `POST`: the key the store generated.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// HTTP implementation of [`MailStore`].
#[derive(Debug, Clone)]
pub struct StoreClient {
    config: StoreConfig,
    auth_token: Option<String>,
    http_client: Client,
}

impl StoreClient {
    /// Creates a new client.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            auth_token: None,
            http_client: Client::new(),
        }
    }

    /// Attaches an id token, sent as the `auth` query parameter.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// The configuration this client talks to.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn authorize(&self, mut url: Url) -> Url {
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        url
    }
}

impl MailStore for StoreClient {
    async fn list(&self, user: &PartitionKey, folder: Folder) -> Result<Vec<MessageRecord>> {
        let url = self.authorize(self.config.folder_url(user, folder)?);
        debug!("GET {folder} for {user}");

        let response = ensure_success(self.http_client.get(url).send().await?).await?;
        let body = response.text().await?;
        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body)?
        };

        Ok(normalize(RemoteFolder::from_value(value), folder.default_read()))
    }

    async fn create(
        &self,
        user: &PartitionKey,
        folder: Folder,
        message: &NewMessage,
    ) -> Result<String> {
        let url = self.authorize(self.config.folder_url(user, folder)?);
        debug!("POST {folder} for {user}");

        let response =
            ensure_success(self.http_client.post(url).json(message).send().await?).await?;
        let pushed: PushResponse = response.json().await?;
        Ok(pushed.name)
    }

    async fn set_read(
        &self,
        user: &PartitionKey,
        folder: Folder,
        id: &str,
        read: bool,
    ) -> Result<()> {
        let url = self.authorize(self.config.record_url(user, folder, id)?);
        debug!("PATCH {folder}/{id} for {user}: read={read}");

        ensure_success(
            self.http_client
                .patch(url)
                .json(&json!({ "read": read }))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, user: &PartitionKey, folder: Folder, id: &str) -> Result<()> {
        let url = self.authorize(self.config.record_url(user, folder, id)?);
        debug!("DELETE {folder}/{id} for {user}");

        ensure_success(self.http_client.delete(url).send().await?).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("Store request failed with {status}");
    Err(Error::status(status.as_u16(), body))
}
