// API entity types
//
// All entities are deserialized from already-normalized (camelCase) JSON.
// Fields use `#[serde(default)]` where older servers omit them, and every
// type keeps the keys it doesn't model in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Server ───────────────────────────────────────────────────────────

/// Server version information from `/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub version: String,
    #[serde(default)]
    pub worker_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Teams ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Pipelines ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Jobs ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub pipeline_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub next_build: Option<Build>,
    #[serde(default)]
    pub finished_build: Option<Build>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Resources ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub pipeline_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    /// Unix timestamp of the last successful check.
    #[serde(default)]
    pub last_checked: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A custom resource type declared by a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    pub name: String,
    #[serde(default, rename = "type")]
    pub base_type: Option<String>,
    #[serde(default)]
    pub source: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One discovered version of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceVersion {
    pub id: i64,
    #[serde(default)]
    pub version: Map<String, Value>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Builds ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: i64,
    /// Per-job build number (a string: reruns are named `12.1`).
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub pipeline_name: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inputs and outputs of a build, as loosely-typed JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildResources {
    #[serde(default)]
    pub inputs: Vec<Value>,
    #[serde(default)]
    pub outputs: Vec<Value>,
}
