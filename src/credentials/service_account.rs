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

//! Service-account credentials.
//!
//! A service account is a non-human identity holding an asymmetric signing
//! key. Its token exchange signs an RS256 assertion over the fixed scope set
//! and trades it for an access token via the [JWT bearer grant].
//!
//! [JWT bearer grant]: https://google.aip.dev/auth/4112

use reqwest::Client;
use time::OffsetDateTime;

use crate::constants::{
    ASSERTION_LIFETIME_SECS, AUTH_SCOPES, GOOGLE_AUTH_TOKEN_ENDPOINT, GOOGLE_TOKEN_AUDIENCE,
    JWT_BEARER_GRANT,
};
use crate::credentials::jws::{self, JwsClaims, JwsHeader};
use crate::credentials::records::ServiceAccountRecord;
use crate::credentials::Result;
use crate::exchange::{self, TokenRequest};
use crate::token::AccessToken;

#[derive(Debug)]
pub(crate) struct ServiceAccountCredential {
    record: ServiceAccountRecord,
    implicit: bool,
    endpoint: String,
    client: Client,
}

impl ServiceAccountCredential {
    /// Builds a credential from a validated record, checking the key's
    /// structure up front so a bad key fails at construction rather than at
    /// the first token request.
    pub(crate) fn new(record: ServiceAccountRecord, implicit: bool, client: Client) -> Result<Self> {
        jws::validate_private_key(&record.private_key)?;
        Ok(ServiceAccountCredential {
            record,
            implicit,
            endpoint: GOOGLE_AUTH_TOKEN_ENDPOINT.to_string(),
            client,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub(crate) fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub(crate) fn project_id(&self) -> &str {
        &self.record.project_id
    }

    pub(crate) async fn access_token(&self) -> Result<AccessToken> {
        let assertion = self.assertion()?;
        let request = TokenRequest::post_form(
            self.endpoint.clone(),
            vec![
                ("grant_type", JWT_BEARER_GRANT.to_string()),
                ("assertion", assertion),
            ],
        );
        exchange::exchange(&self.client, request).await
    }

    // Signing does not suspend; only the exchange that follows does.
    fn assertion(&self) -> Result<String> {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let scope = AUTH_SCOPES.join(" ");
        let header = JwsHeader {
            alg: "RS256",
            typ: "JWT",
        };
        let claims = JwsClaims {
            iss: &self.record.client_email,
            scope: &scope,
            aud: GOOGLE_TOKEN_AUDIENCE,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        jws::sign(&header, &claims, &self.record.private_key)
    }
}
