// Team-scoped client
//
// Pipelines and builds under `/api/v1/teams/{team}`.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, ResourceKind, not_found_as};
use crate::models::{Build, Pipeline, Team};
use crate::query::{Count, resolve_count};
use crate::scope::pipeline::{TeamPipelineClient, TeamPipelineClientOptions};
use crate::transport::Transport;
use crate::urls::with_limit;
use crate::validation::{Schema, Validate, check_name, entity, required};

/// Construction options for [`TeamClient`].
#[derive(Debug, Clone, Serialize)]
pub struct TeamClientOptions {
    #[serde(skip)]
    transport: Transport,
    #[serde(skip_serializing_if = "Option::is_none")]
    team: Option<Team>,
}

impl TeamClientOptions {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            team: None,
        }
    }

    pub fn team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }
}

impl Validate for TeamClientOptions {
    fn schema() -> Schema {
        Schema::new().field(entity("team"))
    }
}

/// Client bound to one team.
#[derive(Debug, Clone)]
pub struct TeamClient {
    transport: Transport,
    team: Team,
}

impl TeamClient {
    pub fn new(options: TeamClientOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            team: required(options.team, "team")?,
            transport: options.transport,
        })
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    // ── Pipelines ────────────────────────────────────────────────────

    /// `GET /api/v1/teams/{team}/pipelines`
    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>, Error> {
        let url = self.transport.api().team_pipelines(&self.team.name);
        debug!(team = %self.team.name, "listing pipelines");
        self.transport.get(url).await
    }

    /// `GET /api/v1/teams/{team}/pipelines/{pipeline}`
    ///
    /// A missing pipeline comes back as the server's 404.
    pub async fn get_pipeline(&self, name: &str) -> Result<Pipeline, Error> {
        check_name("pipelineName", name)?;
        let url = self.transport.api().team_pipeline(&self.team.name, name);
        debug!(team = %self.team.name, pipeline = name, "fetching pipeline");
        self.transport.get(url).await
    }

    /// Fetch `name` and return a client scoped to it.
    pub async fn for_pipeline(&self, name: &str) -> Result<TeamPipelineClient, Error> {
        let pipeline = not_found_as(self.get_pipeline(name).await, ResourceKind::Pipeline, name)?;

        TeamPipelineClient::new(
            TeamPipelineClientOptions::new(self.transport.clone())
                .team(self.team.clone())
                .pipeline(pipeline),
        )
    }

    // ── Builds ───────────────────────────────────────────────────────

    /// `GET /api/v1/teams/{team}/builds[?limit=N]`
    pub async fn list_builds(&self, count: impl Into<Count>) -> Result<Vec<Build>, Error> {
        let limit = resolve_count(count.into())?;
        let url = with_limit(self.transport.api().team_builds(&self.team.name), limit);
        debug!(team = %self.team.name, ?limit, "listing team builds");
        self.transport.get(url).await
    }
}
