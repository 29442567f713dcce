use std::sync::Arc;

use directory::{ClientCredentialProvider, DirectoryError, GroupName, GroupService, OwnerAssignment, TokenProvider};
use integration_tests::*;
use serde_json::json;

async fn mocks(identity: IdentityMock, graph: GraphMock) -> (MockIdentityProvider, MockGraph, Vec<Shutdown>) {
    let (identity, identity_shutdown) = identity.spawn().await;
    let (graph, graph_shutdown) = graph.spawn().await;

    (identity, graph, vec![Shutdown(identity_shutdown), Shutdown(graph_shutdown)])
}

/// Stops a mock when the test ends.
struct Shutdown(tokio_util::sync::CancellationToken);

impl Drop for Shutdown {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

fn service(config: &config::DirectoryConfig) -> GroupService {
    let http = directory::build_http_client().unwrap();
    let tokens: Arc<dyn TokenProvider> = Arc::new(ClientCredentialProvider::new(config, http.clone()));

    GroupService::new(config, tokens, http)
}

#[tokio::test]
async fn patch_sends_bearer_json() {
    let (identity, graph, _shutdown) = mocks(IdentityMock::new(), GraphMock::new()).await;
    let config = directory_config(&identity, &graph, "");

    let client = service(&config).connect().await.unwrap();

    let response = client
        .patch("/groups/g1", &json!({ "description": "Finance approvers" }))
        .await
        .unwrap();

    assert_eq!(response.status(), 204);

    let requests = graph.requests();
    assert_eq!(requests.len(), 1);

    insta::assert_debug_snapshot!(
        (
            requests[0].method.as_str(),
            requests[0].path.as_str(),
            requests[0].authorization.as_deref(),
            requests[0].content_type.as_deref(),
        ),
        @r#"
    (
        "PATCH",
        "/v1.0/groups/g1",
        Some(
            "Bearer test-token",
        ),
        Some(
            "application/json",
        ),
    )
    "#
    );

    assert_eq!(requests[0].body, json!({ "description": "Finance approvers" }));
}

#[tokio::test]
async fn every_connect_fetches_a_new_token() {
    let (identity, graph, _shutdown) = mocks(IdentityMock::new(), GraphMock::new()).await;
    let config = directory_config(&identity, &graph, "");
    let service = service(&config);

    service.connect().await.unwrap();
    service.connect().await.unwrap();

    assert_eq!(identity.request_count(), 2);
}

#[tokio::test]
async fn rejected_credentials_fail_to_connect() {
    let (identity, graph, _shutdown) = mocks(IdentityMock::rejecting(), GraphMock::new()).await;
    let config = directory_config(&identity, &graph, "");

    let error = service(&config).connect().await.unwrap_err();

    assert!(matches!(error, DirectoryError::TokenAcquisition(_)));
    insta::assert_snapshot!(error.client_message(), @"Failed to initialize Graph client");
    assert!(error.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn created_group_carries_the_directory_id() {
    let (identity, graph, _shutdown) = mocks(IdentityMock::new(), GraphMock::new()).await;
    let config = directory_config(&identity, &graph, "");

    let name = GroupName::parse("Finance Team").unwrap();
    let group = service(&config).create_security_group(&name, None).await.unwrap();

    insta::assert_debug_snapshot!(group, @r#"
    CreatedGroup {
        id: Some(
            "g1",
        ),
        display_name: "Finance Team",
        owner: Unassigned,
    }
    "#);

    insta::assert_snapshot!(group.message(), @"Security group 'Finance Team' created successfully");
}

#[tokio::test]
async fn add_group_owner_reports_success_by_status() {
    let (identity, graph, _shutdown) = mocks(IdentityMock::new(), GraphMock::new()).await;
    let config = directory_config(&identity, &graph, "");

    assert!(service(&config).add_group_owner("g1", "u1").await);

    let requests = graph.requests();
    assert_eq!(requests[0].path, "/v1.0/groups/g1/owners/$ref");
    assert_eq!(requests[0].body, json!({ "@odata.id": graph.directory_object_url("u1") }));
}

#[tokio::test]
async fn add_group_owner_failure_is_false() {
    let (identity, graph, _shutdown) = mocks(
        IdentityMock::new(),
        GraphMock::new().with_owner_response(404, r#"{"error":{"code":"Request_ResourceNotFound"}}"#),
    )
    .await;

    let config = directory_config(&identity, &graph, "");

    assert!(!service(&config).add_group_owner("g1", "u1").await);
}

#[tokio::test]
async fn add_group_owner_without_token_is_false() {
    let (identity, graph, _shutdown) = mocks(IdentityMock::rejecting(), GraphMock::new()).await;
    let config = directory_config(&identity, &graph, "");

    assert!(!service(&config).add_group_owner("g1", "u1").await);
    assert_eq!(graph.request_count(), 0);
}

#[tokio::test]
async fn follow_up_binding_marks_failed_owner() {
    let (identity, graph, _shutdown) = mocks(
        IdentityMock::new(),
        GraphMock::new().with_owner_response(400, "Bad Request"),
    )
    .await;

    let config = directory_config(&identity, &graph, r#"owner_binding = "follow_up""#);

    let name = GroupName::parse("Finance").unwrap();
    let group = service(&config).create_security_group(&name, Some("u1")).await.unwrap();

    assert_eq!(group.owner, OwnerAssignment::Failed("u1".to_string()));
}
