// src/storage/gcs.rs - Google Cloud Storage blob store (JSON API + OAuth2)
//
// Uses the Cloud Storage JSON API (https://cloud.google.com/storage/docs/json_api).
// Uploads are single-request media uploads; an existing object with the same
// name is replaced.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::Path;
use tokio::sync::Mutex;

use super::credentials::{GcsCredentials, RefreshGrant};
use super::BlobStore;
use crate::infra::errors::CoachError;

const STORAGE_API_BASE: &str = "https://storage.googleapis.com";

pub struct GcsBlobStore {
    client: Client,
    api_base: String,
    bucket: String,
    project: String,
    label: String,
    grant: Option<RefreshGrant>,
    access_token: Mutex<Option<String>>,
}

impl GcsBlobStore {
    /// Build a store and confirm the bucket is reachable.
    pub async fn connect(
        bucket: &str,
        project: &str,
        creds: GcsCredentials,
    ) -> Result<Self, CoachError> {
        Self::connect_with_base(STORAGE_API_BASE, bucket, project, creds).await
    }

    pub async fn connect_with_base(
        api_base: &str,
        bucket: &str,
        project: &str,
        creds: GcsCredentials,
    ) -> Result<Self, CoachError> {
        let store = Self::new(api_base, bucket, project, creds)?;
        store.check_bucket().await?;
        tracing::info!(bucket = %store.bucket, project = %store.project, "Connected to GCS bucket");
        Ok(store)
    }

    fn new(
        api_base: &str,
        bucket: &str,
        project: &str,
        creds: GcsCredentials,
    ) -> Result<Self, CoachError> {
        if !creds.is_usable() {
            return Err(CoachError::Config(
                "GCS credentials missing: set GCS_ACCESS_TOKEN or GCS_CLIENT_ID, \
                 GCS_CLIENT_SECRET and GCS_REFRESH_TOKEN"
                    .into(),
            ));
        }
        if bucket.trim().is_empty() {
            return Err(CoachError::Config("[storage] bucket must be set".into()));
        }
        Ok(Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            project: project.to_string(),
            label: format!("GCP bucket {bucket}"),
            grant: creds.refresh_grant(),
            access_token: Mutex::new(creds.static_token()),
        })
    }

    async fn check_bucket(&self) -> Result<(), CoachError> {
        let url = format!("{}/storage/v1/b/{}", self.api_base, self.bucket);
        let status = self
            .authorized(|token| self.client.get(&url).bearer_auth(token))
            .await
            .map_err(|e| CoachError::Config(format!("GCP setup failed: {e}")))?;
        if !status.is_success() {
            return Err(CoachError::Config(format!(
                "GCP setup failed: bucket '{}' returned HTTP {}",
                self.bucket, status
            )));
        }
        Ok(())
    }

    /// Current access token, fetching one through the refresh grant when needed.
    async fn token(&self, force_refresh: bool) -> Result<String, CoachError> {
        let mut guard = self.access_token.lock().await;
        if let (Some(token), false) = (guard.as_ref(), force_refresh) {
            return Ok(token.clone());
        }
        let grant = match &self.grant {
            Some(g) => g,
            None => {
                return (*guard)
                    .clone()
                    .ok_or_else(|| CoachError::storage("gcs", "no access token available"))
            }
        };

        #[derive(Deserialize)]
        struct TokenResp {
            access_token: String,
        }

        let resp = self
            .client
            .post(&grant.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", grant.refresh_token.as_str()),
                ("client_id", grant.client_id.as_str()),
                ("client_secret", grant.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CoachError::storage("gcs", format!("token refresh failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(CoachError::storage(
                "gcs",
                format!("token refresh failed: HTTP {}", resp.status()),
            ));
        }
        let token: TokenResp = resp
            .json()
            .await
            .map_err(|e| CoachError::storage("gcs", format!("token response: {e}")))?;

        *guard = Some(token.access_token.clone());
        Ok(token.access_token)
    }

    /// Send a request with a bearer token, refreshing once on HTTP 401.
    async fn authorized<F>(&self, build: F) -> Result<StatusCode, CoachError>
    where
        F: Fn(&str) -> reqwest::RequestBuilder,
    {
        let token = self.token(false).await?;
        let resp = build(&token)
            .send()
            .await
            .map_err(|e| CoachError::storage("gcs", e.to_string()))?;
        if resp.status() != StatusCode::UNAUTHORIZED || self.grant.is_none() {
            return Ok(resp.status());
        }

        tracing::debug!("GCS token rejected, refreshing");
        let token = self.token(true).await?;
        let resp = build(&token)
            .send()
            .await
            .map_err(|e| CoachError::storage("gcs", e.to_string()))?;
        Ok(resp.status())
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    fn name(&self) -> &str {
        &self.label
    }

    async fn upload_file(&self, blob_name: &str, local_path: &Path) -> Result<(), CoachError> {
        let bytes = tokio::fs::read(local_path).await?;
        let url = format!("{}/upload/storage/v1/b/{}/o", self.api_base, self.bucket);

        let status = self
            .authorized(|token| {
                self.client
                    .post(&url)
                    .bearer_auth(token)
                    .query(&[("uploadType", "media"), ("name", blob_name)])
                    .header(reqwest::header::CONTENT_TYPE, "text/csv")
                    .body(bytes.clone())
            })
            .await?;

        if !status.is_success() {
            return Err(CoachError::storage(
                "gcs",
                format!("upload of '{blob_name}' returned HTTP {status}"),
            ));
        }
        tracing::info!(bucket = %self.bucket, blob = blob_name, "Uploaded transcript");
        Ok(())
    }
}
