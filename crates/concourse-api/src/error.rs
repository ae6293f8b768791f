use std::fmt;

use thiserror::Error;

use crate::validation::Violations;

/// The kind of resource a navigate operation was looking for.
///
/// Rendered lowercase in [`Error::NotFound`] messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Team,
    Pipeline,
    Job,
    Resource,
    Build,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Team => "team",
            Self::Pipeline => "pipeline",
            Self::Job => "job",
            Self::Resource => "resource",
            Self::Build => "build",
        };
        f.write_str(name)
    }
}

/// Top-level error type for the `concourse-api` crate.
///
/// Validation failures are raised before any request is made. Everything
/// the server or the network reports comes back untranslated, except the
/// 404 seen by a navigate operation (`for_job`, `for_pipeline`, ...), which
/// becomes [`Error::NotFound`].
#[derive(Debug, Error)]
pub enum Error {
    // ── Arguments ───────────────────────────────────────────────────
    /// Construction or call arguments violate their schema.
    #[error("{violations}")]
    Validation { violations: Violations },

    // ── Navigation ──────────────────────────────────────────────────
    /// A navigate operation asked for a child that does not exist.
    #[error("No {kind} with name: {name}")]
    NotFound { kind: ResourceKind, name: String },

    // ── Authentication ──────────────────────────────────────────────
    /// The token endpoint refused the basic credentials.
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status the operation does not accept.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// Options could not be turned into JSON for validation.
    #[error("Failed to serialize options: {0}")]
    Serialization(serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the server reported HTTP 404.
    ///
    /// [`Error::NotFound`] is the translated form and does not count.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the credentials were rejected.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Api { status: 401, .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// The individual violations, if this is a validation error.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::Validation { violations } => Some(violations),
            _ => None,
        }
    }
}

impl From<Violations> for Error {
    fn from(violations: Violations) -> Self {
        Self::Validation { violations }
    }
}

/// Translate a 404 from a get-by-name call into [`Error::NotFound`].
///
/// Only navigate operations route their lookups through here.
pub(crate) fn not_found_as<T>(
    result: Result<T, Error>,
    kind: ResourceKind,
    name: &str,
) -> Result<T, Error> {
    result.map_err(|e| {
        if e.is_not_found() {
            Error::NotFound {
                kind,
                name: name.to_owned(),
            }
        } else {
            e
        }
    })
}
