// Pipeline-scoped client
//
// Everything under `/api/v1/teams/{team}/pipelines/{pipeline}`: the
// pipeline's own pause/unpause/delete, and its jobs, resources, resource
// types and builds.

use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, ResourceKind, not_found_as};
use crate::models::{Build, Job, Pipeline, Resource, ResourceType, Team};
use crate::query::{Count, resolve_count};
use crate::scope::job::{TeamPipelineJobClient, TeamPipelineJobClientOptions};
use crate::scope::resource::{TeamPipelineResourceClient, TeamPipelineResourceClientOptions};
use crate::transport::Transport;
use crate::urls::with_limit;
use crate::validation::{Schema, Validate, check_name, entity, required};

/// Construction options for [`TeamPipelineClient`].
#[derive(Debug, Clone, Serialize)]
pub struct TeamPipelineClientOptions {
    #[serde(skip)]
    transport: Transport,
    #[serde(skip_serializing_if = "Option::is_none")]
    team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<Pipeline>,
}

impl TeamPipelineClientOptions {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            team: None,
            pipeline: None,
        }
    }

    pub fn team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }
}

impl Validate for TeamPipelineClientOptions {
    fn schema() -> Schema {
        Schema::new().field(entity("team")).field(entity("pipeline"))
    }
}

/// Client bound to one pipeline of one team.
#[derive(Debug, Clone)]
pub struct TeamPipelineClient {
    transport: Transport,
    team: Team,
    pipeline: Pipeline,
}

impl TeamPipelineClient {
    pub fn new(options: TeamPipelineClientOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            team: required(options.team, "team")?,
            pipeline: required(options.pipeline, "pipeline")?,
            transport: options.transport,
        })
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    // ── Pipeline state ───────────────────────────────────────────────

    /// `PUT /api/v1/teams/{team}/pipelines/{pipeline}/pause`, expecting 200.
    pub async fn pause(&self) -> Result<(), Error> {
        let url = self
            .transport
            .api()
            .team_pipeline_pause(&self.team.name, &self.pipeline.name);
        debug!(pipeline = %self.pipeline.name, "pausing pipeline");
        self.transport.put(url, StatusCode::OK).await
    }

    /// `PUT /api/v1/teams/{team}/pipelines/{pipeline}/unpause`, expecting 200.
    pub async fn unpause(&self) -> Result<(), Error> {
        let url = self
            .transport
            .api()
            .team_pipeline_unpause(&self.team.name, &self.pipeline.name);
        debug!(pipeline = %self.pipeline.name, "unpausing pipeline");
        self.transport.put(url, StatusCode::OK).await
    }

    /// `DELETE /api/v1/teams/{team}/pipelines/{pipeline}`, expecting 204.
    pub async fn delete(&self) -> Result<(), Error> {
        let url = self
            .transport
            .api()
            .team_pipeline(&self.team.name, &self.pipeline.name);
        debug!(pipeline = %self.pipeline.name, "deleting pipeline");
        self.transport.delete(url, StatusCode::NO_CONTENT).await
    }

    // ── Jobs ─────────────────────────────────────────────────────────

    /// `GET .../pipelines/{pipeline}/jobs`
    pub async fn list_jobs(&self) -> Result<Vec<Job>, Error> {
        let url = self
            .transport
            .api()
            .team_pipeline_jobs(&self.team.name, &self.pipeline.name);
        debug!(pipeline = %self.pipeline.name, "listing jobs");
        self.transport.get(url).await
    }

    /// `GET .../pipelines/{pipeline}/jobs/{job}`
    ///
    /// A missing job comes back as the server's 404.
    pub async fn get_job(&self, name: &str) -> Result<Job, Error> {
        check_name("jobName", name)?;
        let url = self
            .transport
            .api()
            .team_pipeline_job(&self.team.name, &self.pipeline.name, name);
        debug!(pipeline = %self.pipeline.name, job = name, "fetching job");
        self.transport.get(url).await
    }

    /// Fetch job `name` and return a client scoped to it.
    pub async fn for_job(&self, name: &str) -> Result<TeamPipelineJobClient, Error> {
        let job = not_found_as(self.get_job(name).await, ResourceKind::Job, name)?;

        TeamPipelineJobClient::new(
            TeamPipelineJobClientOptions::new(self.transport.clone())
                .team(self.team.clone())
                .pipeline(self.pipeline.clone())
                .job(job),
        )
    }

    // ── Resources ────────────────────────────────────────────────────

    /// `GET .../pipelines/{pipeline}/resources`
    pub async fn list_resources(&self) -> Result<Vec<Resource>, Error> {
        let url = self
            .transport
            .api()
            .team_pipeline_resources(&self.team.name, &self.pipeline.name);
        debug!(pipeline = %self.pipeline.name, "listing resources");
        self.transport.get(url).await
    }

    /// `GET .../pipelines/{pipeline}/resources/{resource}`
    ///
    /// A missing resource comes back as the server's 404.
    pub async fn get_resource(&self, name: &str) -> Result<Resource, Error> {
        check_name("resourceName", name)?;
        let url = self
            .transport
            .api()
            .team_pipeline_resource(&self.team.name, &self.pipeline.name, name);
        debug!(pipeline = %self.pipeline.name, resource = name, "fetching resource");
        self.transport.get(url).await
    }

    /// Fetch resource `name` and return a client scoped to it.
    pub async fn for_resource(&self, name: &str) -> Result<TeamPipelineResourceClient, Error> {
        let resource = not_found_as(self.get_resource(name).await, ResourceKind::Resource, name)?;

        TeamPipelineResourceClient::new(
            TeamPipelineResourceClientOptions::new(self.transport.clone())
                .team(self.team.clone())
                .pipeline(self.pipeline.clone())
                .resource(resource),
        )
    }

    /// `GET .../pipelines/{pipeline}/resource-types`
    pub async fn list_resource_types(&self) -> Result<Vec<ResourceType>, Error> {
        let url = self
            .transport
            .api()
            .team_pipeline_resource_types(&self.team.name, &self.pipeline.name);
        debug!(pipeline = %self.pipeline.name, "listing resource types");
        self.transport.get(url).await
    }

    // ── Builds ───────────────────────────────────────────────────────

    /// `GET .../pipelines/{pipeline}/builds[?limit=N]`
    pub async fn list_builds(&self, count: impl Into<Count>) -> Result<Vec<Build>, Error> {
        let limit = resolve_count(count.into())?;
        let url = with_limit(
            self.transport
                .api()
                .team_pipeline_builds(&self.team.name, &self.pipeline.name),
            limit,
        );
        debug!(pipeline = %self.pipeline.name, ?limit, "listing pipeline builds");
        self.transport.get(url).await
    }
}
