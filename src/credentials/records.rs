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

//! The two JSON credential record shapes.
//!
//! Google emits these records with snake_case field names
//! (`project_id`), while hand-written configuration often uses camelCase
//! (`projectId`). Both are accepted for every field; the camelCase name is
//! canonical and wins when both are present and set.

use serde_json::Value;

use crate::credentials::Result;
use crate::errors::CredentialError;

/// A parsed service-account key record.
#[derive(Clone, PartialEq)]
pub struct ServiceAccountRecord {
    /// The project the service account belongs to.
    pub project_id: String,
    /// The PEM-encoded private key associated with the service account.
    pub private_key: String,
    /// The service account's email address; used as the assertion issuer.
    pub client_email: String,
}

impl ServiceAccountRecord {
    pub(crate) fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(CredentialError::new("Service account must be an object"));
        }
        Ok(ServiceAccountRecord {
            project_id: required_string(value, "projectId", "project_id", "Service account")?,
            private_key: required_string(value, "privateKey", "private_key", "Service account")?,
            client_email: required_string(value, "clientEmail", "client_email", "Service account")?,
        })
    }
}

impl std::fmt::Debug for ServiceAccountRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountRecord")
            .field("project_id", &self.project_id)
            .field("private_key", &"[censored]")
            .field("client_email", &self.client_email)
            .finish()
    }
}

/// A parsed authorized-user refresh token record.
#[derive(Clone, PartialEq)]
pub struct RefreshTokenRecord {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// The record's `type` marker, e.g. `authorized_user`.
    pub record_type: String,
}

impl RefreshTokenRecord {
    pub(crate) fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(CredentialError::new("Refresh token must be an object"));
        }
        Ok(RefreshTokenRecord {
            client_id: required_string(value, "clientId", "client_id", "Refresh token")?,
            client_secret: required_string(value, "clientSecret", "client_secret", "Refresh token")?,
            refresh_token: required_string(value, "refreshToken", "refresh_token", "Refresh token")?,
            record_type: required_string(value, "type", "type", "Refresh token")?,
        })
    }
}

impl std::fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[censored]")
            .field("refresh_token", &"[censored]")
            .field("record_type", &self.record_type)
            .finish()
    }
}

/// Looks up a field under its canonical name, falling back to the alternate
/// spelling. A field counts as set when it is non-null and, for strings,
/// non-empty.
pub(crate) fn field<'a>(source: &'a Value, canonical: &str, alt: &str) -> Option<&'a Value> {
    [canonical, alt]
        .iter()
        .find_map(|name| source.get(name).filter(|v| is_set(v)))
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn required_string(source: &Value, canonical: &str, alt: &str, record: &str) -> Result<String> {
    field(source, canonical, alt)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            CredentialError::new(format!(
                "{record} must contain a string \"{alt}\" property"
            ))
        })
}
