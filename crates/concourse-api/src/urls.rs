// Resource URL composition
//
// Pure mapping from the API root plus hierarchy segments to absolute URLs.
// Segments go through `path_segments_mut`, so names are percent-encoded as
// single path segments and the base URL's trailing slash never doubles up.

use url::Url;

use crate::error::Error;

const API_ROOT: [&str; 2] = ["api", "v1"];

/// The `/api/v1` root of a Concourse server.
///
/// Guaranteed to be a base URL (it can take path segments), which is what
/// lets every template below be infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Derive the API root from the server's base URL.
    ///
    /// `https://ci.example.com` and `https://ci.example.com/` both yield
    /// `https://ci.example.com/api/v1`; a path prefix such as
    /// `https://example.com/concourse/` is preserved.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let mut root = Self(base);
        root.0.set_query(None);
        root.0.set_fragment(None);
        root.0 = root.compose(&API_ROOT);
        Ok(root)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Append `segments` to the API root.
    pub fn compose(&self, segments: &[&str]) -> Url {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── Server ───────────────────────────────────────────────────────

    pub fn info(&self) -> Url {
        self.compose(&["info"])
    }

    /// Token exchange endpoint for `team`.
    pub fn token(&self, team: &str) -> Url {
        self.compose(&["teams", team, "auth", "token"])
    }

    // ── Teams ────────────────────────────────────────────────────────

    pub fn teams(&self) -> Url {
        self.compose(&["teams"])
    }

    pub fn team(&self, team: &str) -> Url {
        self.compose(&["teams", team])
    }

    // ── Pipelines ────────────────────────────────────────────────────

    /// Pipelines across every team visible to the caller.
    pub fn all_pipelines(&self) -> Url {
        self.compose(&["pipelines"])
    }

    pub fn team_pipelines(&self, team: &str) -> Url {
        self.compose(&["teams", team, "pipelines"])
    }

    pub fn team_pipeline(&self, team: &str, pipeline: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline])
    }

    pub fn team_pipeline_pause(&self, team: &str, pipeline: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "pause"])
    }

    pub fn team_pipeline_unpause(&self, team: &str, pipeline: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "unpause"])
    }

    // ── Jobs ─────────────────────────────────────────────────────────

    pub fn team_pipeline_jobs(&self, team: &str, pipeline: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "jobs"])
    }

    pub fn team_pipeline_job(&self, team: &str, pipeline: &str, job: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "jobs", job])
    }

    pub fn team_pipeline_job_pause(&self, team: &str, pipeline: &str, job: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "jobs", job, "pause"])
    }

    pub fn team_pipeline_job_unpause(&self, team: &str, pipeline: &str, job: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "jobs", job, "unpause"])
    }

    // ── Resources ────────────────────────────────────────────────────

    pub fn team_pipeline_resources(&self, team: &str, pipeline: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "resources"])
    }

    pub fn team_pipeline_resource(&self, team: &str, pipeline: &str, resource: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "resources", resource])
    }

    pub fn team_pipeline_resource_versions(
        &self,
        team: &str,
        pipeline: &str,
        resource: &str,
    ) -> Url {
        self.compose(&[
            "teams", team, "pipelines", pipeline, "resources", resource, "versions",
        ])
    }

    pub fn team_pipeline_resource_types(&self, team: &str, pipeline: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "resource-types"])
    }

    // ── Builds ───────────────────────────────────────────────────────

    pub fn builds(&self) -> Url {
        self.compose(&["builds"])
    }

    pub fn team_builds(&self, team: &str) -> Url {
        self.compose(&["teams", team, "builds"])
    }

    pub fn team_pipeline_builds(&self, team: &str, pipeline: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "builds"])
    }

    pub fn team_pipeline_job_builds(&self, team: &str, pipeline: &str, job: &str) -> Url {
        self.compose(&["teams", team, "pipelines", pipeline, "jobs", job, "builds"])
    }

    pub fn team_pipeline_job_build(
        &self,
        team: &str,
        pipeline: &str,
        job: &str,
        build: &str,
    ) -> Url {
        self.compose(&[
            "teams", team, "pipelines", pipeline, "jobs", job, "builds", build,
        ])
    }

    pub fn build(&self, id: i64) -> Url {
        self.compose(&["builds", &id.to_string()])
    }

    pub fn build_resources(&self, id: i64) -> Url {
        self.compose(&["builds", &id.to_string(), "resources"])
    }

    pub fn build_plan(&self, id: i64) -> Url {
        self.compose(&["builds", &id.to_string(), "plan"])
    }
}

/// Attach the `limit` query parameter; `None` leaves the URL unbounded.
pub fn with_limit(mut url: Url, limit: Option<i64>) -> Url {
    if let Some(limit) = limit {
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api() -> ApiUrl {
        ApiUrl::new("https://ci.example.com").unwrap()
    }

    #[test]
    fn api_root_ignores_trailing_slash() {
        assert_eq!(
            ApiUrl::new("https://ci.example.com/").unwrap().as_url().as_str(),
            "https://ci.example.com/api/v1"
        );
        assert_eq!(api().as_url().as_str(), "https://ci.example.com/api/v1");
    }

    #[test]
    fn api_root_keeps_path_prefix() {
        let api = ApiUrl::new("https://example.com/concourse/").unwrap();
        assert_eq!(
            api.teams().as_str(),
            "https://example.com/concourse/api/v1/teams"
        );
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected() {
        assert!(matches!(
            ApiUrl::new("mailto:ci@example.com"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn pipeline_templates() {
        let api = api();
        assert_eq!(
            api.team_pipelines("main").as_str(),
            "https://ci.example.com/api/v1/teams/main/pipelines"
        );
        assert_eq!(
            api.team_pipeline_pause("main", "deploy").as_str(),
            "https://ci.example.com/api/v1/teams/main/pipelines/deploy/pause"
        );
        assert_eq!(
            api.team_pipeline_resource_types("main", "deploy").as_str(),
            "https://ci.example.com/api/v1/teams/main/pipelines/deploy/resource-types"
        );
    }

    #[test]
    fn build_templates() {
        let api = api();
        assert_eq!(api.builds().as_str(), "https://ci.example.com/api/v1/builds");
        assert_eq!(
            api.team_pipeline_job_builds("main", "deploy", "unit").as_str(),
            "https://ci.example.com/api/v1/teams/main/pipelines/deploy/jobs/unit/builds"
        );
        assert_eq!(
            api.build_plan(42).as_str(),
            "https://ci.example.com/api/v1/builds/42/plan"
        );
    }

    #[test]
    fn token_endpoint_is_team_scoped() {
        assert_eq!(
            api().token("main").as_str(),
            "https://ci.example.com/api/v1/teams/main/auth/token"
        );
    }

    #[test]
    fn names_are_encoded_as_single_segments() {
        assert_eq!(
            api().team_pipeline("main", "a b/c").as_str(),
            "https://ci.example.com/api/v1/teams/main/pipelines/a%20b%2Fc"
        );
    }

    #[test]
    fn limit_is_optional() {
        let api = api();
        assert_eq!(
            with_limit(api.builds(), Some(50)).as_str(),
            "https://ci.example.com/api/v1/builds?limit=50"
        );
        assert_eq!(
            with_limit(api.builds(), None).as_str(),
            "https://ci.example.com/api/v1/builds"
        );
    }
}
