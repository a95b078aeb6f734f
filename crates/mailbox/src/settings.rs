//! Persisted client settings and on-disk locations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mailbox_auth::{DEFAULT_IDENTITY_URL, IdentityClient, IdentityConfig};
use mailbox_core::{Session, SessionSlot};
use mailbox_store::{StoreClient, StoreConfig};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "mailbox";

/// Connection settings for the hosted services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Base URL of the document store.
    pub store_url: Option<String>,
    /// Top-level collection holding every mailbox.
    pub collection: String,
    /// Web API key of the identity provider.
    pub api_key: Option<String>,
    /// Identity provider endpoint.
    pub identity_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            store_url: None,
            collection: StoreConfig::DEFAULT_COLLECTION.to_string(),
            api_key: None,
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
        }
    }
}

impl AppSettings {
    /// Store client acting for `session`, authenticated with its id token.
    pub fn store_client(&self, session: Option<&Session>) -> Result<StoreClient> {
        let Some(url) = self.store_url.as_deref() else {
            bail!("Store URL is not configured; run `mailbox config --store-url <URL>`");
        };
        let config = StoreConfig::new(url)
            .context("Invalid store URL")?
            .with_collection(&self.collection);

        let client = StoreClient::new(config);
        Ok(match session.and_then(Session::id_token) {
            Some(token) => client.with_auth_token(token),
            None => client,
        })
    }

    /// Identity provider client.
    pub fn identity_client(&self) -> Result<IdentityClient> {
        let Some(key) = self.api_key.as_deref() else {
            bail!("API key is not configured; run `mailbox config --api-key <KEY>`");
        };
        let config = IdentityConfig::with_base_url(key, &self.identity_url)
            .context("Invalid identity provider URL")?;
        Ok(IdentityClient::new(config))
    }
}

/// `<config_dir>/mailbox/settings.json`.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("settings.json")
}

/// The session slot at `<data_dir>/mailbox/session.json`.
pub fn session_slot() -> SessionSlot {
    let path = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("session.json");
    SessionSlot::new(path)
}

/// Load settings, falling back to defaults when the file does not exist.
pub async fn load_settings(path: &Path) -> Result<AppSettings> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(AppSettings::default());
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&contents).with_context(|| format!("Invalid settings in {}", path.display()))
}

/// Save settings, creating the directory if needed.
pub async fn save_settings(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }

    let contents = serde_json::to_string_pretty(settings)?;
    tokio::fs::write(path, contents).await?;

    tracing::info!("Settings saved to {:?}", path);
    Ok(())
}
