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

//! User refresh-token credentials.
//!
//! A refresh token is a long-lived, user-delegated secret, typically minted
//! by `gcloud auth application-default login`. Its token exchange is the
//! standard OAuth2 `refresh_token` grant.

use reqwest::Client;

use crate::constants::{REFRESH_TOKEN_ENDPOINT, REFRESH_TOKEN_GRANT};
use crate::credentials::records::RefreshTokenRecord;
use crate::credentials::Result;
use crate::exchange::{self, TokenRequest};
use crate::token::AccessToken;

#[derive(Debug)]
pub(crate) struct RefreshTokenCredential {
    record: RefreshTokenRecord,
    implicit: bool,
    endpoint: String,
    client: Client,
}

impl RefreshTokenCredential {
    pub(crate) fn new(record: RefreshTokenRecord, implicit: bool, client: Client) -> Self {
        RefreshTokenCredential {
            record,
            implicit,
            endpoint: REFRESH_TOKEN_ENDPOINT.to_string(),
            client,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub(crate) fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub(crate) async fn access_token(&self) -> Result<AccessToken> {
        let request = TokenRequest::post_form(
            self.endpoint.clone(),
            vec![
                ("client_id", self.record.client_id.clone()),
                ("client_secret", self.record.client_secret.clone()),
                ("refresh_token", self.record.refresh_token.clone()),
                ("grant_type", REFRESH_TOKEN_GRANT.to_string()),
            ],
        );
        exchange::exchange(&self.client, request).await
    }
}
