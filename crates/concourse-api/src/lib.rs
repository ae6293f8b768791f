// concourse-api: Async Rust client for the Concourse CI REST API
//
// `Client` is the session entry point; `for_team` / `for_pipeline` /
// `for_job` / `for_resource` / `for_build` descend into immutable scoped
// clients that share one `Transport`.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod normalize;
pub mod query;
pub mod scope;
pub mod transport;
pub mod urls;
pub mod validation;

pub use auth::{Credentials, DEFAULT_TEAM};
pub use client::{Client, ClientOptions, LoginOptions};
pub use error::{Error, ResourceKind};
pub use models::{
    Build, BuildResources, Info, Job, Pipeline, Resource, ResourceType, ResourceVersion, Team,
};
pub use query::{BuildsQuery, Count, DEFAULT_BUILD_COUNT, PipelineScope};
pub use scope::{
    BuildClient, BuildClientOptions, TeamClient, TeamClientOptions, TeamPipelineClient,
    TeamPipelineClientOptions, TeamPipelineJobClient, TeamPipelineJobClientOptions,
    TeamPipelineResourceClient, TeamPipelineResourceClientOptions,
};
pub use transport::{TlsMode, Transport, TransportConfig};
pub use urls::ApiUrl;
pub use validation::{Violation, Violations};

// Re-exported so callers can build passwords without a direct dependency.
pub use secrecy::SecretString;
