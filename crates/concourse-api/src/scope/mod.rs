// Scoped clients
//
// One immutable client per level of the server's resource hierarchy:
// team -> pipeline -> job / resource, plus builds. Each level owns a
// `Transport` clone and copies of its ancestor entities, validates them at
// construction, and descends by building the next level's client from a
// fetched entity. Navigate operations (`for_*`) are the only place a 404
// turns into `Error::NotFound`.

pub mod build;
pub mod job;
pub mod pipeline;
pub mod resource;
pub mod team;

pub use build::{BuildClient, BuildClientOptions};
pub use job::{TeamPipelineJobClient, TeamPipelineJobClientOptions};
pub use pipeline::{TeamPipelineClient, TeamPipelineClientOptions};
pub use resource::{TeamPipelineResourceClient, TeamPipelineResourceClientOptions};
pub use team::{TeamClient, TeamClientOptions};
