// HTTP transport shared by every scoped client.
//
// `TransportConfig` builds the `reqwest::Client`; `Transport` pairs that
// client with the API root and the caller's credentials. Cloning a
// `Transport` is cheap, and every scoped client carries its own clone.
// Each authenticated request performs its own token exchange first.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::normalize::normalize;
use crate::urls::ApiUrl;

const USER_AGENT: &str = concat!("concourse-api/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed CI servers).
    DangerAcceptInvalid,
}

/// Settings used to build the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Authenticated access to one Concourse server.
///
/// Holds no mutable state: the HTTP client, API root and credentials are
/// shared read-only between every clone.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    api: ApiUrl,
    credentials: Arc<Credentials>,
}

impl Transport {
    /// Build a transport with a fresh HTTP client from `config`.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = config.build_client()?;
        Self::with_client(http, base_url, credentials)
    }

    /// Build a transport around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            api: ApiUrl::new(base_url)?,
            credentials: Arc::new(credentials),
        })
    }

    /// Same server and HTTP client, different credentials.
    pub(crate) fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            http: self.http.clone(),
            api: self.api.clone(),
            credentials: Arc::new(credentials),
        }
    }

    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Authenticated GET returning the normalized JSON body.
    pub(crate) async fn get_json(&self, url: Url) -> Result<Value, Error> {
        let token = self.bearer_token().await?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let body = success_body(resp).await?;
        let value: Value = serde_json::from_str(&body).map_err(|e| deserialization(&e, body))?;
        Ok(normalize(value))
    }

    /// Authenticated GET deserialized into `T` after normalization.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let value = self.get_json(url).await?;
        T::deserialize(&value).map_err(|e| deserialization(&e, value.to_string()))
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Authenticated PUT without a body, expecting `expected`.
    pub(crate) async fn put(&self, url: Url, expected: StatusCode) -> Result<(), Error> {
        self.write(Method::PUT, url, expected).await
    }

    /// Authenticated DELETE, expecting `expected`.
    pub(crate) async fn delete(&self, url: Url, expected: StatusCode) -> Result<(), Error> {
        self.write(Method::DELETE, url, expected).await
    }

    async fn write(&self, method: Method, url: Url, expected: StatusCode) -> Result<(), Error> {
        let token = self.bearer_token().await?;
        debug!("{method} {url}");

        let resp = self
            .http
            .request(method, url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let status = resp.status();
        if status == expected {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            message: preview(&body),
        })
    }
}

// ── Response helpers ─────────────────────────────────────────────────

/// Read the body of a 2xx response, or turn any other status into `Error::Api`.
async fn success_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message: preview(&body),
        });
    }

    Ok(resp.text().await?)
}

pub(crate) fn preview(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((end, _)) => format!("{}...", &trimmed[..end]),
        None => trimmed.to_owned(),
    }
}

fn deserialization(err: &serde_json::Error, body: String) -> Error {
    Error::Deserialization {
        message: format!("{err} (body preview: {:?})", preview(&body)),
        body,
    }
}
