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

//! Application-default credential resolution and OAuth2 access token exchange
//! for Google Cloud service APIs.
//!
//! A backend process authenticates to Google Cloud with short-lived bearer
//! tokens. This crate discovers which credential source to use when none is
//! supplied explicitly ([Application Default Credentials]), represents the
//! three supported credential kinds behind one [Credential] capability, and
//! exchanges each kind for an [AccessToken] over the appropriate wire
//! protocol:
//!
//! * a service-account key, exchanged via a signed [JWT bearer assertion],
//! * a user refresh token, exchanged via the standard OAuth2
//!   `refresh_token` grant,
//! * the platform [metadata service], queried directly for tokens.
//!
//! The usual entry point is [CredentialService]:
//!
//! ```no_run
//! # use gcp_credentials::credentials::CredentialService;
//! # tokio_test::block_on(async {
//! let service = CredentialService::new();
//! let credential = service.application_default().await?;
//! let token = credential.access_token().await?;
//! println!("expires in {}s", token.expires_in);
//! # Ok::<(), gcp_credentials::errors::CredentialError>(())
//! # });
//! ```
//!
//! Every failure, from an unreadable key file to a malformed token response,
//! surfaces as a single [errors::CredentialError]; nothing is retried and
//! nothing is fatal to the process.
//!
//! [AccessToken]: token::AccessToken
//! [Application Default Credentials]: https://google.aip.dev/auth/4110
//! [Credential]: credentials::Credential
//! [CredentialService]: credentials::CredentialService
//! [JWT bearer assertion]: https://google.aip.dev/auth/4112
//! [metadata service]: https://cloud.google.com/compute/docs/metadata/overview

/// The error type shared by every operation in this crate.
pub mod errors;

/// Credential kinds, application-default resolution, and the service that
/// memoizes constructed credentials.
pub mod credentials;

/// The access token value object.
pub mod token;

pub(crate) mod constants;

/// Token request execution and response normalization.
pub(crate) mod exchange;
