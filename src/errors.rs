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

//! Errors surfaced while constructing or using a
//! [Credential](crate::credentials::Credential).

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The single error type for every operation in this crate.
///
/// A `CredentialError` always means the credential is invalid or could not
/// produce a token: a missing or malformed key file, an unsupported
/// credential type, a failed token exchange, or a malformed token response.
/// Lower-level failures are wrapped at their origin with context prepended
/// to the message; the original failure, when there is one, is preserved as
/// [std::error::Error::source].
///
/// Nothing is retried internally. Callers that want retries must issue a new
/// call themselves.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct CredentialError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl CredentialError {
    /// Creates an error from a message alone.
    pub(crate) fn new<S: Into<String>>(message: S) -> Self {
        CredentialError {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying failure, prepending `context` to its message.
    pub(crate) fn wrap<S, E>(context: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        let source = source.into();
        CredentialError {
            message: format!("{}: {}", context.into(), source),
            source: Some(source),
        }
    }

    /// The human-readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn from_message() {
        let e = CredentialError::new("test-only-err-123");
        assert_eq!(e.message(), "test-only-err-123");
        assert!(e.source().is_none(), "{e:?}");
        assert_eq!(format!("{e}"), "test-only-err-123");
    }

    #[test]
    fn wrapped() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let e = CredentialError::wrap("Failed to read credentials file", io);
        assert!(e.source().is_some(), "{e:?}");
        let got = format!("{e}");
        assert!(got.contains("Failed to read credentials file"), "{got}");
        assert!(got.contains("no such file"), "{got}");
    }
}
