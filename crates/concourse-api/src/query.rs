// Listing arguments
//
// `Count` and `BuildsQuery` serialize to the option objects their schemas
// check: an omitted count picks up the default of 50, an explicit `null`
// lifts the limit entirely.

use serde::{Serialize, Serializer};
use serde_json::Value;
use url::Url;

use crate::error::Error;
use crate::urls::ApiUrl;
use crate::validation::{Field, JOB_REFERENCE, Schema, Validate};

/// Number of builds returned when the caller doesn't say.
pub const DEFAULT_BUILD_COUNT: i64 = 50;

/// How many builds a listing should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Count {
    /// Use [`DEFAULT_BUILD_COUNT`].
    #[default]
    Default,
    /// Send no `limit` at all.
    Unbounded,
    /// At most this many (must be at least 1).
    Limit(i64),
}

impl Count {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl From<i64> for Count {
    fn from(limit: i64) -> Self {
        Self::Limit(limit)
    }
}

impl From<Option<i64>> for Count {
    fn from(limit: Option<i64>) -> Self {
        limit.map_or(Self::Unbounded, Self::Limit)
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Limit(n) => serializer.serialize_i64(*n),
            Self::Default | Self::Unbounded => serializer.serialize_none(),
        }
    }
}

fn count_field() -> Field {
    Field::integer("count")
        .min(1)
        .nullable()
        .default(DEFAULT_BUILD_COUNT)
}

fn checked_limit(checked: &Value) -> Option<i64> {
    checked.get("count").and_then(Value::as_i64)
}

#[derive(Serialize)]
struct CountOptions {
    #[serde(skip_serializing_if = "Count::is_default")]
    count: Count,
}

impl Validate for CountOptions {
    fn schema() -> Schema {
        Schema::new().field(count_field())
    }
}

/// Validate `count` and return the `limit` to send, if any.
pub(crate) fn resolve_count(count: Count) -> Result<Option<i64>, Error> {
    let checked = CountOptions { count }.validate()?;
    Ok(checked_limit(&checked))
}

// ── Pipelines ────────────────────────────────────────────────────────

/// Which pipelines a session-level listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineScope {
    /// Pipelines of the session's team.
    #[default]
    CurrentTeam,
    /// Pipelines of every team visible to the caller.
    AllTeams,
}

// ── Builds ───────────────────────────────────────────────────────────

/// Filters for a session-level build listing.
///
/// Scope precedence: `job` (as `"pipeline/job"`), then `pipeline`, then
/// the current team, then every build on the server. `job` and `pipeline`
/// cannot be combined.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildsQuery {
    #[serde(skip_serializing_if = "Count::is_default")]
    count: Count,
    #[serde(skip_serializing_if = "Option::is_none")]
    job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    team: bool,
}

impl BuildsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(mut self, count: impl Into<Count>) -> Self {
        self.count = count.into();
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.count = Count::Unbounded;
        self
    }

    /// Narrow to one job, given as `"pipeline/job"`.
    pub fn job(mut self, reference: impl Into<String>) -> Self {
        self.job = Some(reference.into());
        self
    }

    pub fn pipeline(mut self, name: impl Into<String>) -> Self {
        self.pipeline = Some(name.into());
        self
    }

    /// Narrow to the session's team when neither job nor pipeline is set.
    pub fn current_team(mut self) -> Self {
        self.team = true;
        self
    }

    /// Validate the query and work out where it points.
    pub(crate) fn resolve(&self) -> Result<(BuildScope, Option<i64>), Error> {
        let checked = self.validate()?;
        let limit = checked_limit(&checked);

        let scope = if let Some((pipeline, job)) =
            self.job.as_deref().and_then(|reference| reference.split_once('/'))
        {
            BuildScope::Job {
                pipeline: pipeline.to_owned(),
                job: job.to_owned(),
            }
        } else if let Some(pipeline) = &self.pipeline {
            BuildScope::Pipeline(pipeline.clone())
        } else if self.team {
            BuildScope::Team
        } else {
            BuildScope::Global
        };

        Ok((scope, limit))
    }
}

impl Validate for BuildsQuery {
    fn schema() -> Schema {
        Schema::new()
            .field(count_field())
            .field(Field::string("job").non_empty().pattern(&JOB_REFERENCE))
            .field(Field::string("pipeline").non_empty())
            .field(Field::boolean("team"))
            .without("job", "pipeline")
    }
}

/// Where a build listing points once its query is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BuildScope {
    Job { pipeline: String, job: String },
    Pipeline(String),
    Team,
    Global,
}

impl BuildScope {
    pub(crate) fn url(&self, api: &ApiUrl, team: &str) -> Url {
        match self {
            Self::Job { pipeline, job } => api.team_pipeline_job_builds(team, pipeline, job),
            Self::Pipeline(pipeline) => api.team_pipeline_builds(team, pipeline),
            Self::Team => api.team_builds(team),
            Self::Global => api.builds(),
        }
    }
}
