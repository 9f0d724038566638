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

//! The access token value object.

/// A short-lived bearer token for Google Cloud APIs.
///
/// Produced fresh on every exchange and never mutated. The crate performs no
/// expiry tracking: `expires_in` is relative to the moment the token was
/// minted by the server, and callers must request a new token before that
/// window elapses.
#[derive(Clone, PartialEq)]
pub struct AccessToken {
    /// The opaque token string, as used in `Authorization:` headers.
    pub token: String,

    /// Seconds until the token expires. Always positive.
    pub expires_in: u64,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[censored]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
