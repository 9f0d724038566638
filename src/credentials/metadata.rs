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

//! Metadata-service credentials.
//!
//! Google Cloud environments (GCE, GKE, Cloud Run) expose a VM-local
//! metadata service that mints tokens for the identity the workload runs
//! as. No key material is involved; both the token and the project id come
//! from fixed paths on the metadata host.

use http::header::{HeaderName, HeaderValue};
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::constants::{
    METADATA_FLAVOR, METADATA_FLAVOR_VALUE, METADATA_PROJECT_ID_PATH, METADATA_ROOT,
    METADATA_TOKEN_PATH,
};
use crate::credentials::Result;
use crate::errors::CredentialError;
use crate::exchange::{self, TokenRequest};
use crate::token::AccessToken;

#[derive(Debug)]
pub(crate) struct MetadataCredential {
    endpoint: String,
    client: Client,
    // Fetched once per credential instance, then served from memory for the
    // rest of the process lifetime. A failed fetch is not cached; the next
    // call retries.
    project_id: OnceCell<String>,
}

impl MetadataCredential {
    pub(crate) fn new(client: Client) -> Self {
        MetadataCredential {
            endpoint: METADATA_ROOT.to_string(),
            client,
            project_id: OnceCell::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub(crate) async fn access_token(&self) -> Result<AccessToken> {
        let request = TokenRequest::get(format!("{}{}", self.endpoint, METADATA_TOKEN_PATH))
            .with_header(
                HeaderName::from_static(METADATA_FLAVOR),
                HeaderValue::from_static(METADATA_FLAVOR_VALUE),
            );
        exchange::exchange(&self.client, request).await
    }

    pub(crate) async fn project_id(&self) -> Result<String> {
        self.project_id
            .get_or_try_init(|| self.fetch_project_id())
            .await
            .cloned()
    }

    async fn fetch_project_id(&self) -> Result<String> {
        let request = TokenRequest::get(format!("{}{}", self.endpoint, METADATA_PROJECT_ID_PATH))
            .with_header(
                HeaderName::from_static(METADATA_FLAVOR),
                HeaderValue::from_static(METADATA_FLAVOR_VALUE),
            );
        exchange::fetch_text(&self.client, request)
            .await
            .map_err(|e| CredentialError::wrap("Failed to determine project ID", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::matchers::{all_of, contains, request};
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};

    type TestResult = anyhow::Result<()>;

    #[tokio::test]
    async fn access_token_sends_metadata_flavor() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", METADATA_TOKEN_PATH),
                request::headers(contains(("metadata-flavor", "Google"))),
            ])
            .respond_with(json_encoded(serde_json::json!({
                "access_token": "tok1",
                "expires_in": 3600,
            }))),
        );

        let credential = MetadataCredential::new(Client::new())
            .with_endpoint(format!("http://{}", server.addr()));
        let token = credential.access_token().await?;
        assert_eq!(token.token, "tok1");
        assert_eq!(token.expires_in, 3600);
        Ok(())
    }

    #[tokio::test]
    async fn project_id_fetched_once() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", METADATA_PROJECT_ID_PATH),
                request::headers(contains(("metadata-flavor", "Google"))),
            ])
            .times(1)
            .respond_with(status_code(200).body("test-project")),
        );

        let credential = MetadataCredential::new(Client::new())
            .with_endpoint(format!("http://{}", server.addr()));
        assert_eq!(credential.project_id().await?, "test-project");
        assert_eq!(credential.project_id().await?, "test-project");
        Ok(())
    }

    #[tokio::test]
    async fn project_id_failure_is_not_cached() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", METADATA_PROJECT_ID_PATH))
                .times(2)
                .respond_with(status_code(503).body("metadata unavailable")),
        );

        let credential = MetadataCredential::new(Client::new())
            .with_endpoint(format!("http://{}", server.addr()));
        let e = credential.project_id().await.unwrap_err();
        assert!(
            e.message().contains("Failed to determine project ID"),
            "{e}"
        );
        assert!(e.message().contains("metadata unavailable"), "{e}");
        // Still uninitialized, so the next call hits the server again.
        credential.project_id().await.unwrap_err();
        Ok(())
    }
}
