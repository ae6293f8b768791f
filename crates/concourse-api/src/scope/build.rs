// Build-scoped client
//
// Builds are addressed by their global numeric id (`/api/v1/builds/{id}`),
// not by their position under a job.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::models::{Build, BuildResources};
use crate::transport::Transport;
use crate::validation::{Field, Schema, Validate, required};

/// Construction options for [`BuildClient`].
#[derive(Debug, Clone, Serialize)]
pub struct BuildClientOptions {
    #[serde(skip)]
    transport: Transport,
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<Build>,
}

impl BuildClientOptions {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            build: None,
        }
    }

    pub fn build(mut self, build: Build) -> Self {
        self.build = Some(build);
        self
    }
}

impl Validate for BuildClientOptions {
    fn schema() -> Schema {
        Schema::new().field(
            Field::object("build")
                .required()
                .schema(Schema::new().field(Field::integer("id").required().min(1))),
        )
    }
}

/// Client bound to one build.
#[derive(Debug, Clone)]
pub struct BuildClient {
    transport: Transport,
    build: Build,
}

impl BuildClient {
    pub fn new(options: BuildClientOptions) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            build: required(options.build, "build")?,
            transport: options.transport,
        })
    }

    pub fn build(&self) -> &Build {
        &self.build
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `GET /api/v1/builds/{id}/resources`
    pub async fn list_resources(&self) -> Result<BuildResources, Error> {
        let url = self.transport.api().build_resources(self.build.id);
        debug!(build = self.build.id, "listing build resources");
        self.transport.get(url).await
    }

    /// `GET /api/v1/builds/{id}/plan`
    ///
    /// The plan is a deeply nested step tree, returned as normalized JSON.
    pub async fn get_plan(&self) -> Result<Value, Error> {
        let url = self.transport.api().build_plan(self.build.id);
        debug!(build = self.build.id, "fetching build plan");
        self.transport.get_json(url).await
    }
}
