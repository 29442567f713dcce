use base64::{Engine, engine::general_purpose::STANDARD};
use integration_tests::*;
use serde_json::json;

#[tokio::test]
async fn direct_header_binds_owner_inline() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL-ID", "abc")
        .send()
        .await;

    insta::assert_debug_snapshot!(submission.flash(), @r#"
    Flash {
        category: "success",
        message: "Security group 'Finance' created successfully with owner abc",
    }
    "#);

    let requests = graph.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body["owners@odata.bind"], json!([graph.directory_object_url("abc")]));
}

#[tokio::test]
async fn direct_header_wins_over_garbage_principal() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL-ID", "abc")
        .header("X-MS-CLIENT-PRINCIPAL", "%%% not base64 %%%")
        .send()
        .await;

    assert_eq!(submission.flash().category, "success");
    assert_eq!(
        graph.requests()[0].body["owners@odata.bind"],
        json!([graph.directory_object_url("abc")])
    );
}

#[tokio::test]
async fn encoded_principal_is_the_fallback() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    let principal = STANDARD.encode(r#"{"oid":"xyz"}"#);

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL", &principal)
        .send()
        .await;

    assert_eq!(
        submission.flash().message,
        "Security group 'Finance' created successfully with owner xyz"
    );

    assert_eq!(
        graph.requests()[0].body["owners@odata.bind"],
        json!([graph.directory_object_url("xyz")])
    );
}

#[tokio::test]
async fn app_service_claims_envelope_is_understood() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    let principal = STANDARD.encode(
        json!({
            "auth_typ": "aad",
            "claims": [
                { "typ": "name", "val": "Ada" },
                { "typ": "http://schemas.microsoft.com/identity/claims/objectidentifier", "val": "oid-1" }
            ],
            "name_typ": "name",
            "role_typ": "roles"
        })
        .to_string(),
    );

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL", &principal)
        .send()
        .await;

    assert_eq!(
        submission.flash().message,
        "Security group 'Finance' created successfully with owner oid-1"
    );
}

#[tokio::test]
async fn undecodable_principal_means_no_owner() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL", "%%% not base64 %%%")
        .send()
        .await;

    assert_eq!(submission.flash().category, "warning");
    assert!(graph.requests()[0].body.get("owners@odata.bind").is_none());
}

#[tokio::test]
async fn follow_up_binding_adds_owner_after_creation() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;
    builder.directory_setting(r#"owner_binding = "follow_up""#);

    let server = builder.build("").await;

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL-ID", "u1")
        .send()
        .await;

    insta::assert_debug_snapshot!(submission.flash(), @r#"
    Flash {
        category: "success",
        message: "Security group 'Finance' created successfully with owner u1",
    }
    "#);

    let requests = graph.requests();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].path, "/v1.0/groups");
    assert!(requests[0].body.get("owners@odata.bind").is_none());

    assert_eq!(requests[1].path, "/v1.0/groups/g1/owners/$ref");
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer test-token"));
    assert_eq!(requests[1].body, json!({ "@odata.id": graph.directory_object_url("u1") }));
}

#[tokio::test]
async fn follow_up_owner_failure_is_a_degraded_success() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    let graph = builder
        .spawn_graph(GraphMock::new().with_owner_response(400, r#"{"error":{"code":"Request_BadRequest"}}"#))
        .await;
    builder.directory_setting(r#"owner_binding = "follow_up""#);

    let server = builder.build("").await;

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL-ID", "u1")
        .send()
        .await;

    insta::assert_debug_snapshot!(submission.flash(), @r#"
    Flash {
        category: "warning",
        message: "Security group 'Finance' created successfully, but owner u1 could not be added",
    }
    "#);

    assert_eq!(graph.request_count(), 2);
}

#[tokio::test]
async fn follow_up_without_caller_makes_no_owner_call() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;
    builder.directory_setting(r#"owner_binding = "follow_up""#);

    let server = builder.build("").await;

    let submission = server.create_group("Finance").send().await;

    assert_eq!(submission.flash().category, "warning");
    assert_eq!(graph.request_count(), 1);
}
