// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Credential kinds and [Application Default Credentials] resolution.
//!
//! A [Credential] is a cheap-to-clone handle over one of three variants:
//! a service-account key, a user refresh token, or the platform metadata
//! service. [CredentialService] constructs them, resolves the application
//! default when no source is supplied, and memoizes every construction so
//! that identical input yields the identical instance.
//!
//! [Application Default Credentials]: https://google.aip.dev/auth/4110

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::constants::{
    GCLOUD_CONFIG_DIR, GOOGLE_APPLICATION_CREDENTIALS, WELL_KNOWN_CREDENTIALS_FILE,
};
use crate::errors::CredentialError;
use crate::token::AccessToken;

mod jws;
mod metadata;
mod records;
mod service_account;
mod user_refresh;

pub use records::{RefreshTokenRecord, ServiceAccountRecord};

use metadata::MetadataCredential;
use service_account::ServiceAccountCredential;
use user_refresh::RefreshTokenCredential;

/// A `Result` alias where the `Err` case is
/// [CredentialError](crate::errors::CredentialError).
pub type Result<T> = std::result::Result<T, CredentialError>;

/// A source of access tokens for Google Cloud APIs.
///
/// Clones share the same underlying credential; two handles obtained from
/// the same [CredentialService] input are the same instance.
#[derive(Clone, Debug)]
pub struct Credential {
    inner: Arc<Inner>,
}

#[derive(Debug)]
enum Inner {
    ServiceAccount(ServiceAccountCredential),
    RefreshToken(RefreshTokenCredential),
    Metadata(MetadataCredential),
}

impl Credential {
    fn from_inner(inner: Inner) -> Self {
        Credential {
            inner: Arc::new(inner),
        }
    }

    /// Exchanges this credential for a fresh [AccessToken].
    ///
    /// Every call is an independent network round trip; the crate performs
    /// no token caching and no in-flight deduplication.
    pub async fn access_token(&self) -> Result<AccessToken> {
        match self.inner.as_ref() {
            Inner::ServiceAccount(c) => c.access_token().await,
            Inner::RefreshToken(c) => c.access_token().await,
            Inner::Metadata(c) => c.access_token().await,
        }
    }

    /// The project this credential belongs to.
    ///
    /// Service-account credentials carry the project in their key record.
    /// Metadata credentials fetch it from the metadata service once and
    /// remember it for the lifetime of the instance. Refresh-token
    /// credentials have no associated project and always fail.
    pub async fn project_id(&self) -> Result<String> {
        match self.inner.as_ref() {
            Inner::ServiceAccount(c) => Ok(c.project_id().to_string()),
            Inner::RefreshToken(_) => Err(CredentialError::new(
                "Failed to determine project ID: refresh token credentials are not associated with a project",
            )),
            Inner::Metadata(c) => c.project_id().await,
        }
    }

    /// True when this credential was discovered by application-default
    /// resolution rather than constructed from an explicit record.
    ///
    /// Metadata credentials are always considered application-default.
    pub fn is_application_default(&self) -> bool {
        match self.inner.as_ref() {
            Inner::ServiceAccount(c) => c.is_implicit(),
            Inner::RefreshToken(c) => c.is_implicit(),
            Inner::Metadata(_) => true,
        }
    }
}

/// The input to an explicit credential construction: an inline JSON record
/// or a path to a file holding one.
#[derive(Clone, Debug)]
pub enum CredentialSource {
    /// Read and parse the record from this file.
    File(PathBuf),
    /// Use this JSON value as the record.
    Inline(Value),
}

impl CredentialSource {
    /// The memoization key: the path string for files, the canonical JSON
    /// serialization for inline records.
    fn cache_key(&self) -> String {
        match self {
            CredentialSource::File(path) => path.display().to_string(),
            CredentialSource::Inline(value) => value.to_string(),
        }
    }

    async fn load(&self, context: &str) -> Result<Value> {
        match self {
            CredentialSource::File(path) => {
                let contents = tokio::fs::read(path)
                    .await
                    .map_err(|e| CredentialError::wrap(context, e))?;
                serde_json::from_slice(&contents).map_err(|e| CredentialError::wrap(context, e))
            }
            CredentialSource::Inline(value) => Ok(value.clone()),
        }
    }
}

impl From<Value> for CredentialSource {
    fn from(value: Value) -> Self {
        CredentialSource::Inline(value)
    }
}

impl From<PathBuf> for CredentialSource {
    fn from(path: PathBuf) -> Self {
        CredentialSource::File(path)
    }
}

impl From<&Path> for CredentialSource {
    fn from(path: &Path) -> Self {
        CredentialSource::File(path.to_path_buf())
    }
}

impl From<&str> for CredentialSource {
    fn from(path: &str) -> Self {
        CredentialSource::File(PathBuf::from(path))
    }
}

/// Constructs and memoizes [Credential] instances.
///
/// The service owns all construction caches: one slot for the application
/// default and one table per explicit credential kind, keyed by the exact
/// serialized input. Identical input returns the identical instance;
/// nothing is ever evicted. The host application is expected to keep one
/// service per tenant for as long as it needs credentials.
///
/// ```no_run
/// # use gcp_credentials::credentials::CredentialService;
/// # tokio_test::block_on(async {
/// let service = CredentialService::new();
/// let credential = service
///     .service_account("/path/to/service-account.json")
///     .await?;
/// let token = credential.access_token().await?;
/// # Ok::<(), gcp_credentials::errors::CredentialError>(())
/// # });
/// ```
pub struct CredentialService {
    client: Client,
    default_slot: Mutex<Option<Credential>>,
    service_accounts: Mutex<HashMap<String, Credential>>,
    refresh_tokens: Mutex<HashMap<String, Credential>>,
}

impl Default for CredentialService {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialService {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Uses the given HTTP client for every exchange issued by credentials
    /// this service constructs.
    pub fn with_client(client: Client) -> Self {
        CredentialService {
            client,
            default_slot: Mutex::new(None),
            service_accounts: Mutex::new(HashMap::new()),
            refresh_tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves the application-default credential.
    ///
    /// Precedence, first match wins:
    /// 1. The file named by `GOOGLE_APPLICATION_CREDENTIALS`. Once the
    ///    variable is set the file must exist, parse, and carry a supported
    ///    `type` (`service_account` or `authorized_user`).
    /// 2. The gcloud well-known file
    ///    `<config dir>/gcloud/application_default_credentials.json`. A
    ///    missing file is skipped silently; a malformed one is an error.
    /// 3. The metadata service. Its failures, if any, surface only when a
    ///    token is requested.
    ///
    /// The resolution runs once per service; later calls return the cached
    /// instance.
    pub async fn application_default(&self) -> Result<Credential> {
        let mut slot = self.default_slot.lock().await;
        if let Some(credential) = slot.as_ref() {
            return Ok(credential.clone());
        }
        let credential = self.resolve_default().await?;
        *slot = Some(credential.clone());
        Ok(credential)
    }

    /// Constructs a credential from a service-account key record or a path
    /// to one.
    pub async fn service_account(&self, source: impl Into<CredentialSource>) -> Result<Credential> {
        let source = source.into();
        let mut table = self.service_accounts.lock().await;
        if let Some(credential) = table.get(&source.cache_key()) {
            return Ok(credential.clone());
        }
        let value = source.load("Failed to parse service account json file").await?;
        let record = ServiceAccountRecord::from_value(&value)?;
        let credential = Credential::from_inner(Inner::ServiceAccount(
            ServiceAccountCredential::new(record, false, self.client.clone())?,
        ));
        table.insert(source.cache_key(), credential.clone());
        Ok(credential)
    }

    /// Constructs a credential from a refresh-token record or a path to
    /// one.
    pub async fn refresh_token(&self, source: impl Into<CredentialSource>) -> Result<Credential> {
        let source = source.into();
        let mut table = self.refresh_tokens.lock().await;
        if let Some(credential) = table.get(&source.cache_key()) {
            return Ok(credential.clone());
        }
        let value = source.load("Failed to parse refresh token file").await?;
        let record = RefreshTokenRecord::from_value(&value)?;
        let credential = Credential::from_inner(Inner::RefreshToken(RefreshTokenCredential::new(
            record,
            false,
            self.client.clone(),
        )));
        table.insert(source.cache_key(), credential.clone());
        Ok(credential)
    }

    async fn resolve_default(&self) -> Result<Credential> {
        if let Some(path) = std::env::var(GOOGLE_APPLICATION_CREDENTIALS)
            .ok()
            .filter(|p| !p.is_empty())
        {
            return self.from_named_file(Path::new(&path)).await;
        }
        if let Some(path) = well_known_file() {
            match tokio::fs::read(&path).await {
                Ok(contents) => {
                    let value: Value = serde_json::from_slice(&contents)
                        .map_err(|e| CredentialError::wrap("Failed to parse refresh token file", e))?;
                    let record = RefreshTokenRecord::from_value(&value)?;
                    return Ok(Credential::from_inner(Inner::RefreshToken(
                        RefreshTokenCredential::new(record, true, self.client.clone()),
                    )));
                }
                // Absence of the well-known file is the one silent skip in
                // the whole resolution.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(CredentialError::wrap(
                        format!("Failed to read credentials file {}", path.display()),
                        e,
                    ));
                }
            }
        }
        Ok(Credential::from_inner(Inner::Metadata(
            MetadataCredential::new(self.client.clone()),
        )))
    }

    // Step 1 of the resolution: a file named by the environment may not be
    // silently absent or malformed.
    async fn from_named_file(&self, path: &Path) -> Result<Credential> {
        let contents = tokio::fs::read(path).await.map_err(|e| {
            CredentialError::wrap(
                format!("Failed to read credentials file {}", path.display()),
                e,
            )
        })?;
        let value: Value = serde_json::from_slice(&contents).map_err(|e| {
            CredentialError::wrap("Failed to parse contents of the credentials file", e)
        })?;
        match value.get("type").and_then(Value::as_str) {
            Some("service_account") => {
                let record = ServiceAccountRecord::from_value(&value)?;
                Ok(Credential::from_inner(Inner::ServiceAccount(
                    ServiceAccountCredential::new(record, true, self.client.clone())?,
                )))
            }
            Some("authorized_user") => {
                let record = RefreshTokenRecord::from_value(&value)?;
                Ok(Credential::from_inner(Inner::RefreshToken(
                    RefreshTokenCredential::new(record, true, self.client.clone()),
                )))
            }
            other => Err(CredentialError::new(format!(
                "Invalid credentials file: unsupported type \"{}\"",
                other.unwrap_or("")
            ))),
        }
    }
}

/// The per-user configuration directory holding gcloud state: the roaming
/// app-data directory on Windows, `$HOME/.config` elsewhere.
fn config_dir(os: &str, home: Option<&str>, app_data: Option<&str>) -> Option<PathBuf> {
    if os == "windows" {
        app_data.map(PathBuf::from)
    } else {
        home.map(|home| Path::new(home).join(".config"))
    }
}

fn well_known_file() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok();
    let app_data = std::env::var("APPDATA").ok();
    config_dir(std::env::consts::OS, home.as_deref(), app_data.as_deref())
        .map(|dir| dir.join(GCLOUD_CONFIG_DIR).join(WELL_KNOWN_CREDENTIALS_FILE))
}
