// Job-scoped client
//
// Builds and pause state of `/api/v1/teams/{team}/pipelines/{pipeline}/jobs/{job}`.

use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::models::{Build, Job, Pipeline, Team};
use crate::query::{Count, resolve_count};
use crate::transport::Transport;
use crate::urls::with_limit;
use crate::validation::{Schema, Validate, check_name, entity, required};

/// Construction options for [`TeamPipelineJobClient`].
#[derive(Debug, Clone, Serialize)]
pub struct TeamPipelineJobClientOptions {
    #[serde(skip)]
    transport: Transport,
    #[serde(skip_serializing_if = "Option::is_none")]
    team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<Pipeline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    job: Option<Job>,
}

impl TeamPipelineJobClientOptions {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            team: None,
            pipeline: None,
            job: None,
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

    pub fn job(mut self, job: Job) -> Self {
        self.job = Some(job);
        self
    }
}

impl Validate for TeamPipelineJobClientOptions {
    fn schema() -> Schema {
        Schema::new()
            .field(entity("team"))
            .field(entity("pipeline"))
            .field(entity("job"))
    }
}

/// Client bound to one job.
#[derive(Debug, Clone)]
pub struct TeamPipelineJobClient {
    transport: Transport,
    team: Team,
    pipeline: Pipeline,
    job: Job,
}

impl TeamPipelineJobClient {
    pub fn new(options: TeamPipelineJobClientOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            team: required(options.team, "team")?,
            pipeline: required(options.pipeline, "pipeline")?,
            job: required(options.job, "job")?,
            transport: options.transport,
        })
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `GET .../jobs/{job}/builds[?limit=N]`
    pub async fn list_builds(&self, count: impl Into<Count>) -> Result<Vec<Build>, Error> {
        let limit = resolve_count(count.into())?;
        let url = with_limit(
            self.transport.api().team_pipeline_job_builds(
                &self.team.name,
                &self.pipeline.name,
                &self.job.name,
            ),
            limit,
        );
        debug!(job = %self.job.name, ?limit, "listing job builds");
        self.transport.get(url).await
    }

    /// `GET .../jobs/{job}/builds/{build}`, where `name` is the per-job
    /// build number.
    pub async fn get_build(&self, name: &str) -> Result<Build, Error> {
        check_name("buildName", name)?;
        let url = self.transport.api().team_pipeline_job_build(
            &self.team.name,
            &self.pipeline.name,
            &self.job.name,
            name,
        );
        debug!(job = %self.job.name, build = name, "fetching job build");
        self.transport.get(url).await
    }

    /// `PUT .../jobs/{job}/pause`, expecting 200.
    pub async fn pause(&self) -> Result<(), Error> {
        let url = self.transport.api().team_pipeline_job_pause(
            &self.team.name,
            &self.pipeline.name,
            &self.job.name,
        );
        debug!(job = %self.job.name, "pausing job");
        self.transport.put(url, StatusCode::OK).await
    }

    /// `PUT .../jobs/{job}/unpause`, expecting 200.
    pub async fn unpause(&self) -> Result<(), Error> {
        let url = self.transport.api().team_pipeline_job_unpause(
            &self.team.name,
            &self.pipeline.name,
            &self.job.name,
        );
        debug!(job = %self.job.name, "unpausing job");
        self.transport.put(url, StatusCode::OK).await
    }
}
