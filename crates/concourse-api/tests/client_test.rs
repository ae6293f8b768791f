#![allow(clippy::unwrap_used)]
// Integration tests for the session-level `Client` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

use concourse_api::{
    BuildsQuery, Client, ClientOptions, Error, LoginOptions, PipelineScope, ResourceKind,
    SecretString,
};

// ── Helpers ─────────────────────────────────────────────────────────

const ADMIN_BASIC: &str = "Basic YWRtaW46aHVudGVyMg==";
const VIEWER_BASIC: &str = "Basic dmlld2VyOnNlY3JldA==";

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let client = Client::new(
        ClientOptions::new()
            .url(server.uri())
            .username("admin")
            .password(SecretString::from("hunter2"))
            .http_client(reqwest::Client::new()),
    )
    .unwrap();
    (server, client)
}

fn token_endpoint(team: &str, basic: &str) -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/teams/{team}/auth/token")))
        .and(header("authorization", basic))
}

async fn mount_token(server: &MockServer) {
    token_endpoint("main", ADMIN_BASIC)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "type": "Bearer", "value": "tok" })),
        )
        .mount(server)
        .await;
}

fn authed_get(route: &str) -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", "Bearer tok"))
}

fn build_list() -> serde_json::Value {
    json!([{ "id": 1, "name": "1", "status": "succeeded" }])
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_every_operation_exchanges_its_own_token() {
    let (server, client) = setup().await;

    token_endpoint("main", ADMIN_BASIC)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "tok" })))
        .expect(2)
        .mount(&server)
        .await;
    authed_get("/api/v1/teams")
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "name": "main" }])),
        )
        .expect(2)
        .mount(&server)
        .await;

    client.list_teams().await.unwrap();
    client.list_teams().await.unwrap();
}

#[tokio::test]
async fn test_rejected_credentials() {
    let (server, client) = setup().await;

    token_endpoint("main", ADMIN_BASIC)
        .respond_with(ResponseTemplate::new(401).set_body_string("not authorized"))
        .mount(&server)
        .await;

    let result = client.list_teams().await;
    assert!(
        matches!(result, Err(Error::Authentication { status: 401, .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(result.unwrap_err().is_auth_failure());
}

#[tokio::test]
async fn test_login_uses_new_credentials_and_leaves_original() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    token_endpoint("ops", VIEWER_BASIC)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "viewer-tok" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/teams/ops/pipelines"))
        .and(header("authorization", "Bearer viewer-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    authed_get("/api/v1/teams/main/pipelines")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let viewer = client
        .login(
            LoginOptions::new()
                .username("viewer")
                .password(SecretString::from("secret"))
                .team_name("ops"),
        )
        .unwrap();

    viewer.list_pipelines(PipelineScope::CurrentTeam).await.unwrap();
    client.list_pipelines(PipelineScope::CurrentTeam).await.unwrap();
    assert_eq!(client.team_name(), "main");
}

#[tokio::test]
async fn test_login_makes_no_request() {
    let (server, client) = setup().await;

    let _viewer = client
        .login(
            LoginOptions::new()
                .username("viewer")
                .password(SecretString::from("secret")),
        )
        .unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Server & teams ──────────────────────────────────────────────────

#[tokio::test]
async fn test_info() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/info")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "7.11.2",
            "worker_version": "2.5",
            "external_url": "https://ci.example.com"
        })))
        .mount(&server)
        .await;

    let info = client.info().await.unwrap();
    assert_eq!(info.version, "7.11.2");
    assert_eq!(info.worker_version.as_deref(), Some("2.5"));
    assert_eq!(info.extra["externalUrl"], "https://ci.example.com");
}

#[tokio::test]
async fn test_for_team_navigates() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/teams/ops")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "name": "ops" })))
        .mount(&server)
        .await;

    let team = client.for_team("ops").await.unwrap();
    assert_eq!(team.team().id, 3);
    assert_eq!(team.team().name, "ops");
}

#[tokio::test]
async fn test_for_team_translates_404() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/teams/ghost")
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.for_team("ghost").await.unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound {
            kind: ResourceKind::Team,
            ..
        }
    ));
    assert_eq!(err.to_string(), "No team with name: ghost");
}

#[tokio::test]
async fn test_get_team_keeps_404() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/teams/ghost")
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = client.get_team("ghost").await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 404, .. }), "got: {err:?}");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_empty_team_name_fails_before_any_request() {
    let (server, client) = setup().await;

    let err = client.get_team("").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid parameter(s): [\"teamName\" is not allowed to be empty]."
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Pipelines & jobs ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_pipelines_normalizes_keys() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/teams/main/pipelines")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "name": "deploy",
            "paused": true,
            "team_name": "main",
            "last_updated": 1_700_000_000
        }])))
        .mount(&server)
        .await;

    let pipelines = client
        .list_pipelines(PipelineScope::CurrentTeam)
        .await
        .unwrap();
    assert_eq!(pipelines.len(), 1);
    assert!(pipelines[0].paused);
    assert_eq!(pipelines[0].team_name.as_deref(), Some("main"));
    assert_eq!(pipelines[0].extra["lastUpdated"], 1_700_000_000);
}

#[tokio::test]
async fn test_list_pipelines_across_teams() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/pipelines")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "deploy", "team_name": "main" },
            { "id": 2, "name": "nightly", "team_name": "ops" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let pipelines = client.list_pipelines(PipelineScope::AllTeams).await.unwrap();
    assert_eq!(pipelines.len(), 2);
}

#[tokio::test]
async fn test_list_jobs() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/teams/main/pipelines/deploy/jobs")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 9,
            "name": "unit",
            "pipeline_name": "deploy",
            "next_build": { "id": 100, "name": "12", "status": "pending" }
        }])))
        .mount(&server)
        .await;

    let jobs = client.list_jobs("deploy").await.unwrap();
    assert_eq!(jobs[0].name, "unit");
    assert_eq!(jobs[0].pipeline_name.as_deref(), Some("deploy"));
    assert_eq!(jobs[0].next_build.as_ref().unwrap().status, "pending");
}

// ── Builds ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_builds_defaults_to_global_with_limit_50() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/builds")
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_list()))
        .expect(1)
        .mount(&server)
        .await;

    let builds = client.list_builds(&BuildsQuery::new()).await.unwrap();
    assert_eq!(builds[0].status, "succeeded");
}

#[tokio::test]
async fn test_list_builds_unbounded_sends_no_limit() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/builds")
        .and(query_param_is_missing("limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_list()))
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_builds(&BuildsQuery::new().unbounded())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_builds_for_job_reference() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/teams/main/pipelines/deploy/jobs/unit/builds")
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_list()))
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_builds(&BuildsQuery::new().job("deploy/unit").count(5_i64))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_builds_for_pipeline() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/teams/main/pipelines/deploy/builds")
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_list()))
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_builds(&BuildsQuery::new().pipeline("deploy").current_team())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_builds_for_current_team() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/teams/main/builds")
        .respond_with(ResponseTemplate::new(200).set_body_json(build_list()))
        .expect(1)
        .mount(&server)
        .await;

    client
        .list_builds(&BuildsQuery::new().current_team())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_builds_rejects_job_with_pipeline() {
    let (server, client) = setup().await;

    let err = client
        .list_builds(&BuildsQuery::new().job("deploy/unit").pipeline("deploy"))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid parameter(s): [\"job\" conflict with forbidden peer \"pipeline\"]."
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_builds_collects_every_violation() {
    let (server, client) = setup().await;

    let err = client
        .list_builds(&BuildsQuery::new().count(0_i64).job("unit"))
        .await
        .unwrap_err();

    assert_eq!(err.violations().unwrap().len(), 2);
    assert_eq!(
        err.to_string(),
        "Invalid parameter(s): [\"count\" must be larger than or equal to 1, \
         \"job\" with value \"unit\" fails to match the required pattern: ^[^/]+/[^/]+$]."
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_for_build_navigates() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/builds/42")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "name": "7",
            "status": "failed",
            "job_name": "unit"
        })))
        .mount(&server)
        .await;

    let build = client.for_build(42).await.unwrap();
    assert_eq!(build.build().job_name.as_deref(), Some("unit"));
}

#[tokio::test]
async fn test_for_build_translates_404() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/builds/42")
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.for_build(42).await.unwrap_err();
    assert_eq!(err.to_string(), "No build with name: 42");
}

#[tokio::test]
async fn test_server_error_is_propagated() {
    let (server, client) = setup().await;
    mount_token(&server).await;

    authed_get("/api/v1/builds/42")
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.for_build(42).await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, .. }), "got: {err:?}");
    assert!(err.is_transient());
}
