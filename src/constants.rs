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

pub(crate) const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub(crate) const WELL_KNOWN_CREDENTIALS_FILE: &str = "application_default_credentials.json";
pub(crate) const GCLOUD_CONFIG_DIR: &str = "gcloud";

pub(crate) const GOOGLE_TOKEN_AUDIENCE: &str = "https://accounts.google.com/o/oauth2/token";
pub(crate) const GOOGLE_AUTH_TOKEN_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/token";
pub(crate) const REFRESH_TOKEN_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v4/token";

pub(crate) const METADATA_ROOT: &str = "http://metadata.google.internal";
pub(crate) const METADATA_TOKEN_PATH: &str =
    "/computeMetadata/v1/instance/service-accounts/default/token";
pub(crate) const METADATA_PROJECT_ID_PATH: &str = "/computeMetadata/v1/project/project-id";
pub(crate) const METADATA_FLAVOR: &str = "metadata-flavor";
pub(crate) const METADATA_FLAVOR_VALUE: &str = "Google";

pub(crate) const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub(crate) const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// Every minted token requests exactly this scope set.
pub(crate) const AUTH_SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/firebase.database",
    "https://www.googleapis.com/auth/firebase.messaging",
    "https://www.googleapis.com/auth/identitytoolkit",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Lifetime of a signed service-account assertion, in seconds.
pub(crate) const ASSERTION_LIFETIME_SECS: i64 = 3600;
