// src/storage/credentials.rs - Google Cloud Storage credentials
//
// Stored at ~/.beergame/credentials/gcs.json and overridable from the
// environment. Either a ready access token or an OAuth2 refresh-token triple
// (client id, client secret, refresh token) is required.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::CoachError;
use crate::infra::paths;

const CREDENTIALS_FILE: &str = "gcs.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GcsCredentials {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

/// The refresh-token grant inputs, present only when all three are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshGrant {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_uri: String,
}

impl GcsCredentials {
    /// Load from disk (if present), then apply environment overrides.
    pub fn load() -> Result<Self, CoachError> {
        let mut creds = Self::load_from(&credentials_path())?;
        creds.apply_env_overrides();
        Ok(creds)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoachError> {
        if !path.exists() {
            return Ok(Self {
                token_uri: default_token_uri(),
                ..Default::default()
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("GCS_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Ok(id) = std::env::var("GCS_CLIENT_ID") {
            self.client_id = Some(id);
        }
        if let Ok(secret) = std::env::var("GCS_CLIENT_SECRET") {
            self.client_secret = Some(secret);
        }
        if let Ok(refresh) = std::env::var("GCS_REFRESH_TOKEN") {
            self.refresh_token = Some(refresh);
        }
    }

    pub fn refresh_grant(&self) -> Option<RefreshGrant> {
        Some(RefreshGrant {
            client_id: non_empty(&self.client_id)?,
            client_secret: non_empty(&self.client_secret)?,
            refresh_token: non_empty(&self.refresh_token)?,
            token_uri: self.token_uri.clone(),
        })
    }

    pub fn static_token(&self) -> Option<String> {
        non_empty(&self.access_token)
    }

    pub fn is_usable(&self) -> bool {
        self.static_token().is_some() || self.refresh_grant().is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn credentials_path() -> PathBuf {
    paths::credentials_dir().join(CREDENTIALS_FILE)
}
