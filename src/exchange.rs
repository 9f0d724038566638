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

//! Executes token requests and normalizes every failure into
//! [CredentialError].
//!
//! Each credential kind builds a [TokenRequest] describing the wire call for
//! its grant; [exchange] performs the call, validates the response shape,
//! and produces an [AccessToken]. A single attempt per call, no retries.

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::credentials::Result;
use crate::errors::CredentialError;
use crate::token::AccessToken;

const MISSING_ERROR_PAYLOAD: &str = "missing error payload";

/// A fully-formed description of one token request.
#[derive(Debug)]
pub(crate) struct TokenRequest {
    method: Method,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    form: Option<Vec<(&'static str, String)>>,
}

impl TokenRequest {
    /// A form-encoded `POST`, as used by the OAuth2 grant exchanges.
    pub(crate) fn post_form(url: String, form: Vec<(&'static str, String)>) -> Self {
        TokenRequest {
            method: Method::POST,
            url,
            headers: vec![(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )],
            form: Some(form),
        }
    }

    /// A bare `GET`, as used by the metadata service endpoints.
    pub(crate) fn get(url: String) -> Self {
        TokenRequest {
            method: Method::GET,
            url,
            headers: Vec::new(),
            form: None,
        }
    }

    pub(crate) fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// Performs the described request and validates the token response shape.
///
/// The response must be a 2xx JSON body carrying `access_token` and a
/// positive `expires_in`; anything else is a [CredentialError].
pub(crate) async fn exchange(client: &Client, request: TokenRequest) -> Result<AccessToken> {
    let body = execute(client, request).await?;
    let body: Value = serde_json::from_str(&body)
        .map_err(|e| CredentialError::wrap("Unexpected response while fetching access token", e))?;
    let token = body.get("access_token").and_then(Value::as_str);
    let expires_in = body.get("expires_in").and_then(Value::as_u64);
    match (token, expires_in) {
        (Some(token), Some(expires_in)) if expires_in > 0 => Ok(AccessToken {
            token: token.to_string(),
            expires_in,
        }),
        _ => Err(CredentialError::new(format!(
            "Unexpected response while fetching access token: {body}"
        ))),
    }
}

/// Performs the described request and returns the raw 2xx body text.
///
/// Used for metadata endpoints that answer in plain text. Failures follow
/// the same normalization as [exchange].
pub(crate) async fn fetch_text(client: &Client, request: TokenRequest) -> Result<String> {
    execute(client, request).await
}

async fn execute(client: &Client, request: TokenRequest) -> Result<String> {
    let mut builder = client.request(request.method, &request.url);
    for (name, value) in request.headers {
        builder = builder.header(name, value);
    }
    if let Some(form) = &request.form {
        builder = builder.form(form);
    }
    let response = builder
        .send()
        .await
        .map_err(|e| CredentialError::wrap("Error fetching access token", e))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CredentialError::wrap("Error fetching access token", e))?;
    if !status.is_success() {
        return Err(CredentialError::new(format!(
            "Error fetching access token: {}",
            error_detail(&body)
        )));
    }
    Ok(body)
}

/// Extracts a human-readable detail from an error response body.
///
/// A JSON body with an `error` field yields `error`, with the
/// `error_description` appended in parentheses when present. Any other
/// non-empty body is passed through as-is; an empty body yields a fixed
/// marker.
fn error_detail(body: &str) -> String {
    if body.is_empty() {
        return MISSING_ERROR_PAYLOAD.to_string();
    }
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    match json.get("error").and_then(Value::as_str) {
        Some(error) => match json.get("error_description").and_then(Value::as_str) {
            Some(description) => format!("{error} ({description})"),
            None => error.to_string(),
        },
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::matchers::{all_of, contains, request, url_decoded};
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};

    type TestResult = anyhow::Result<()>;

    #[tokio::test]
    async fn exchange_success() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/token"),
                request::body(url_decoded(contains(("grant_type", "refresh_token")))),
            ])
            .respond_with(json_encoded(serde_json::json!({
                "access_token": "tok1",
                "token_type": "Bearer",
                "expires_in": 3600,
            }))),
        );

        let request = TokenRequest::post_form(
            server.url_str("/token"),
            vec![("grant_type", "refresh_token".to_string())],
        );
        let token = exchange(&Client::new(), request).await?;
        assert_eq!(token.token, "tok1");
        assert_eq!(token.expires_in, 3600);
        Ok(())
    }

    #[tokio::test]
    async fn exchange_server_error_with_description() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/token")).respond_with(
                status_code(400).body(
                    serde_json::json!({
                        "error": "invalid_grant",
                        "error_description": "Bad Request",
                    })
                    .to_string(),
                ),
            ),
        );

        let request = TokenRequest::post_form(server.url_str("/token"), vec![]);
        let e = exchange(&Client::new(), request).await.unwrap_err();
        assert!(e.message().contains("invalid_grant (Bad Request)"), "{e}");
        Ok(())
    }

    #[tokio::test]
    async fn exchange_server_error_without_description() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/token")).respond_with(
                status_code(403).body(serde_json::json!({"error": "access_denied"}).to_string()),
            ),
        );

        let request = TokenRequest::post_form(server.url_str("/token"), vec![]);
        let e = exchange(&Client::new(), request).await.unwrap_err();
        assert!(e.message().contains("access_denied"), "{e}");
        assert!(!e.message().contains('('), "{e}");
        Ok(())
    }

    #[tokio::test]
    async fn exchange_server_error_plain_text_body() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/token"))
                .respond_with(status_code(502).body("upstream exploded")),
        );

        let request = TokenRequest::post_form(server.url_str("/token"), vec![]);
        let e = exchange(&Client::new(), request).await.unwrap_err();
        assert!(e.message().contains("upstream exploded"), "{e}");
        Ok(())
    }

    #[tokio::test]
    async fn exchange_server_error_empty_body() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/token"))
                .respond_with(status_code(500)),
        );

        let request = TokenRequest::post_form(server.url_str("/token"), vec![]);
        let e = exchange(&Client::new(), request).await.unwrap_err();
        assert!(e.message().contains("missing error payload"), "{e}");
        Ok(())
    }

    #[tokio::test]
    async fn exchange_incomplete_token_response() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/token")).respond_with(
                json_encoded(serde_json::json!({"access_token": "tok1"})),
            ),
        );

        let request = TokenRequest::post_form(server.url_str("/token"), vec![]);
        let e = exchange(&Client::new(), request).await.unwrap_err();
        assert!(
            e.message()
                .contains("Unexpected response while fetching access token"),
            "{e}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn exchange_rejects_zero_expiry() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/token")).respond_with(
                json_encoded(serde_json::json!({"access_token": "tok1", "expires_in": 0})),
            ),
        );

        let request = TokenRequest::post_form(server.url_str("/token"), vec![]);
        let e = exchange(&Client::new(), request).await.unwrap_err();
        assert!(
            e.message()
                .contains("Unexpected response while fetching access token"),
            "{e}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn exchange_non_json_success_body() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/token"))
                .respond_with(status_code(200).body("not json")),
        );

        let request = TokenRequest::post_form(server.url_str("/token"), vec![]);
        let e = exchange(&Client::new(), request).await.unwrap_err();
        assert!(
            e.message()
                .contains("Unexpected response while fetching access token"),
            "{e}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn exchange_connection_refused() {
        // Bind-then-drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = TokenRequest::post_form(format!("http://{addr}/token"), vec![]);
        let e = exchange(&Client::new(), request).await.unwrap_err();
        assert!(e.message().contains("Error fetching access token"), "{e}");
    }

    #[tokio::test]
    async fn fetch_text_success() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/project-id"))
                .respond_with(status_code(200).body("test-project")),
        );

        let request = TokenRequest::get(server.url_str("/project-id"));
        let body = fetch_text(&Client::new(), request).await?;
        assert_eq!(body, "test-project");
        Ok(())
    }

    #[test]
    fn error_detail_variants() {
        assert_eq!(error_detail(""), "missing error payload");
        assert_eq!(error_detail("plain text"), "plain text");
        assert_eq!(
            error_detail(r#"{"error":"invalid_grant"}"#),
            "invalid_grant"
        );
        assert_eq!(
            error_detail(r#"{"error":"invalid_grant","error_description":"Bad Request"}"#),
            "invalid_grant (Bad Request)"
        );
        // JSON without an error field passes through verbatim.
        assert_eq!(error_detail(r#"{"status":"down"}"#), r#"{"status":"down"}"#);
    }
}
