// Resource-scoped client

use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::models::{Pipeline, Resource, ResourceVersion, Team};
use crate::transport::Transport;
use crate::validation::{Schema, Validate, entity, required};

/// Construction options for [`TeamPipelineResourceClient`].
#[derive(Debug, Clone, Serialize)]
pub struct TeamPipelineResourceClientOptions {
    #[serde(skip)]
    transport: Transport,
    #[serde(skip_serializing_if = "Option::is_none")]
    team: Option<Team>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<Pipeline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<Resource>,
}

impl TeamPipelineResourceClientOptions {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            team: None,
            pipeline: None,
            resource: None,
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

    pub fn resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }
}

impl Validate for TeamPipelineResourceClientOptions {
    fn schema() -> Schema {
        Schema::new()
            .field(entity("team"))
            .field(entity("pipeline"))
            .field(entity("resource"))
    }
}

/// Client bound to one resource of a pipeline.
#[derive(Debug, Clone)]
pub struct TeamPipelineResourceClient {
    transport: Transport,
    team: Team,
    pipeline: Pipeline,
    resource: Resource,
}

impl TeamPipelineResourceClient {
    pub fn new(options: TeamPipelineResourceClientOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            team: required(options.team, "team")?,
            pipeline: required(options.pipeline, "pipeline")?,
            resource: required(options.resource, "resource")?,
            transport: options.transport,
        })
    }

    pub fn team(&self) -> &Team {
        &self.team
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `GET .../resources/{resource}/versions`
    pub async fn list_versions(&self) -> Result<Vec<ResourceVersion>, Error> {
        let url = self.transport.api().team_pipeline_resource_versions(
            &self.team.name,
            &self.pipeline.name,
            &self.resource.name,
        );
        debug!(resource = %self.resource.name, "listing resource versions");
        self.transport.get(url).await
    }
}
