// Credential exchange
//
// Basic credentials are traded for a bearer token at
// `/api/v1/teams/{team}/auth/token`. Tokens are never cached: every
// authenticated request made through `Transport` asks for a fresh one.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::trace;

use crate::error::Error;
use crate::transport::{Transport, preview};

/// Team used for the token exchange when none is configured.
pub const DEFAULT_TEAM: &str = "main";

/// Basic credentials plus the team they authenticate against.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub team: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: SecretString,
        team: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password,
            team: team.into(),
        }
    }
}

/// Token endpoint response: `{"type": "Bearer", "value": "..."}`.
#[derive(Deserialize)]
struct TokenResponse {
    value: String,
}

impl Transport {
    /// Exchange the stored basic credentials for a bearer token.
    ///
    /// `GET /api/v1/teams/{team}/auth/token` with HTTP basic auth. Any
    /// non-2xx answer is reported as [`Error::Authentication`] so that a
    /// 404 for an unknown team is never mistaken for a missing resource.
    pub(crate) async fn bearer_token(&self) -> Result<SecretString, Error> {
        let credentials = self.credentials();
        let url = self.api().token(&credentials.team);
        trace!(team = %credentials.team, "exchanging credentials for a bearer token");

        let resp = self
            .http()
            .get(url)
            .basic_auth(
                &credentials.username,
                Some(credentials.password.expose_secret()),
            )
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Authentication {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("invalid token response: {e}"),
                body,
            })?;

        trace!("bearer token issued");
        Ok(SecretString::from(token.value))
    }
}
