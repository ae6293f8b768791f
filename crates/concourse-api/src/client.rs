// Session client
//
// Entry point for a Concourse server. `Client` owns the credentials used
// for every token exchange and offers the unscoped reads (info, teams,
// cross-team pipeline and build listings) plus navigation into the
// team and build scopes.

use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::{Credentials, DEFAULT_TEAM};
use crate::error::{Error, ResourceKind, not_found_as};
use crate::models::{Build, Info, Job, Pipeline, Team};
use crate::query::{BuildsQuery, PipelineScope};
use crate::scope::{BuildClient, BuildClientOptions, TeamClient, TeamClientOptions};
use crate::transport::{Transport, TransportConfig};
use crate::urls::with_limit;
use crate::validation::{Field, Schema, Validate, check_name, redacted, required};

// ── Options ──────────────────────────────────────────────────────────

/// Construction options for [`Client`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "redacted"
    )]
    password: Option<SecretString>,
    #[serde(skip)]
    transport: TransportConfig,
    #[serde(skip)]
    http: Option<reqwest::Client>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL of the server, e.g. `https://ci.example.com`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Team used for the token exchange. Defaults to `main`.
    pub fn team_name(mut self, team: impl Into<String>) -> Self {
        self.team_name = Some(team.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    /// Timeout and TLS settings for the HTTP client.
    pub fn transport(mut self, config: TransportConfig) -> Self {
        self.transport = config;
        self
    }

    /// Use a pre-built HTTP client instead of building one from
    /// [`ClientOptions::transport`].
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }
}

impl Validate for ClientOptions {
    fn schema() -> Schema {
        Schema::new()
            .field(Field::uri("url").required())
            .field(Field::string("teamName").non_empty().default(DEFAULT_TEAM))
            .field(Field::string("username").required().non_empty())
            .field(Field::string("password").required())
    }
}

/// Credentials for [`Client::login`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "redacted"
    )]
    password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_name: Option<String>,
}

impl LoginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    /// Team to authenticate against. Defaults to the current client's team.
    pub fn team_name(mut self, team: impl Into<String>) -> Self {
        self.team_name = Some(team.into());
        self
    }
}

impl Validate for LoginOptions {
    fn schema() -> Schema {
        Schema::new()
            .field(Field::string("username").required().non_empty())
            .field(Field::string("password").required())
            .field(Field::string("teamName").non_empty())
    }
}

fn check_build_id(id: i64) -> Result<(), Error> {
    let schema = Schema::new().field(Field::integer("buildId").required().min(1));
    let mut options = Map::new();
    options.insert("buildId".into(), Value::from(id));
    schema.check(&Value::Object(options))?;
    Ok(())
}

// ── Client ───────────────────────────────────────────────────────────

/// Authenticated session against one Concourse server.
///
/// Cheap to clone. No I/O happens until an operation is called, and each
/// operation performs its own token exchange.
#[derive(Debug, Clone)]
pub struct Client {
    transport: Transport,
}

impl Client {
    /// Validate `options` and build a client. Performs no requests.
    pub fn new(options: ClientOptions) -> Result<Self, Error> {
        options.validate()?;

        let url = required(options.url, "url")?;
        let credentials = Credentials::new(
            required(options.username, "username")?,
            required(options.password, "password")?,
            options.team_name.unwrap_or_else(|| DEFAULT_TEAM.to_owned()),
        );

        let transport = match options.http {
            Some(http) => Transport::with_client(http, &url, credentials)?,
            None => Transport::new(&url, credentials, &options.transport)?,
        };

        Ok(Self { transport })
    }

    /// Team the session authenticates against.
    pub fn team_name(&self) -> &str {
        &self.transport.credentials().team
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Return a new client bound to other credentials.
    ///
    /// The server and HTTP client are shared; `self` is left untouched.
    /// Nothing is sent until the new client is used.
    pub fn login(&self, options: LoginOptions) -> Result<Self, Error> {
        options.validate()?;

        let credentials = Credentials::new(
            required(options.username, "username")?,
            required(options.password, "password")?,
            options
                .team_name
                .unwrap_or_else(|| self.team_name().to_owned()),
        );
        debug!(team = %credentials.team, "switching credentials");

        Ok(Self {
            transport: self.transport.with_credentials(credentials),
        })
    }

    // ── Server ───────────────────────────────────────────────────────

    /// `GET /api/v1/info`
    pub async fn info(&self) -> Result<Info, Error> {
        debug!("fetching server info");
        self.transport.get(self.transport.api().info()).await
    }

    // ── Teams ────────────────────────────────────────────────────────

    /// `GET /api/v1/teams`
    pub async fn list_teams(&self) -> Result<Vec<Team>, Error> {
        debug!("listing teams");
        self.transport.get(self.transport.api().teams()).await
    }

    /// `GET /api/v1/teams/{team}`
    ///
    /// A missing team comes back as the server's 404.
    pub async fn get_team(&self, name: &str) -> Result<Team, Error> {
        check_name("teamName", name)?;
        debug!(team = name, "fetching team");
        self.transport.get(self.transport.api().team(name)).await
    }

    /// Fetch team `name` and return a client scoped to it.
    pub async fn for_team(&self, name: &str) -> Result<TeamClient, Error> {
        let team = not_found_as(self.get_team(name).await, ResourceKind::Team, name)?;
        TeamClient::new(TeamClientOptions::new(self.transport.clone()).team(team))
    }

    // ── Pipelines & jobs ─────────────────────────────────────────────

    /// `GET /api/v1/teams/{team}/pipelines` or, across teams,
    /// `GET /api/v1/pipelines`.
    pub async fn list_pipelines(&self, scope: PipelineScope) -> Result<Vec<Pipeline>, Error> {
        let api = self.transport.api();
        let url = match scope {
            PipelineScope::CurrentTeam => api.team_pipelines(self.team_name()),
            PipelineScope::AllTeams => api.all_pipelines(),
        };
        debug!(?scope, "listing pipelines");
        self.transport.get(url).await
    }

    /// `GET /api/v1/teams/{team}/pipelines/{pipeline}/jobs` for the
    /// session's team.
    pub async fn list_jobs(&self, pipeline: &str) -> Result<Vec<Job>, Error> {
        check_name("pipelineName", pipeline)?;
        let url = self
            .transport
            .api()
            .team_pipeline_jobs(self.team_name(), pipeline);
        debug!(pipeline, "listing jobs");
        self.transport.get(url).await
    }

    // ── Builds ───────────────────────────────────────────────────────

    /// List builds, narrowed by `query` to a job, a pipeline, the session's
    /// team, or (by default) every build on the server.
    pub async fn list_builds(&self, query: &BuildsQuery) -> Result<Vec<Build>, Error> {
        let (scope, limit) = query.resolve()?;
        let url = with_limit(scope.url(self.transport.api(), self.team_name()), limit);
        debug!(?scope, ?limit, "listing builds");
        self.transport.get(url).await
    }

    /// `GET /api/v1/builds/{id}`
    pub async fn get_build(&self, id: i64) -> Result<Build, Error> {
        check_build_id(id)?;
        debug!(build = id, "fetching build");
        self.transport.get(self.transport.api().build(id)).await
    }

    /// Fetch build `id` and return a client scoped to it.
    pub async fn for_build(&self, id: i64) -> Result<BuildClient, Error> {
        let build = not_found_as(
            self.get_build(id).await,
            ResourceKind::Build,
            &id.to_string(),
        )?;
        BuildClient::new(BuildClientOptions::new(self.transport.clone()).build(build))
    }
}
