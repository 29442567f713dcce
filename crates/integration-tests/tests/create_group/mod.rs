mod owners;

use indoc::indoc;
use integration_tests::*;

#[tokio::test]
async fn created_without_owner_warns() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    let submission = server.create_group("Finance Team").send().await;

    assert_eq!(submission.status, 303);
    assert_eq!(submission.location.as_deref(), Some("/"));

    insta::assert_debug_snapshot!(submission.flash(), @r#"
    Flash {
        category: "warning",
        message: "Security group 'Finance Team' created successfully, but no owner was assigned because the signed-in user could not be determined",
    }
    "#);

    let requests = graph.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v1.0/groups");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-token"));

    insta::assert_json_snapshot!(requests[0].body, @r#"
    {
      "displayName": "Finance Team",
      "groupTypes": [],
      "mailEnabled": false,
      "mailNickname": "financeteam",
      "securityEnabled": true
    }
    "#);
}

#[tokio::test]
async fn token_request_uses_client_credentials() {
    let mut builder = TestServer::builder();
    let identity = builder.spawn_identity(IdentityMock::new()).await;
    builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    server.create_group("Ops").send().await;

    insta::assert_debug_snapshot!(identity.requests(), @r#"
    [
        TokenRequest {
            tenant: "test-tenant",
            form: {
                "client_id": "test-client",
                "client_secret": "test-secret",
                "grant_type": "client_credentials",
                "scope": "https://graph.microsoft.com/.default",
            },
        },
    ]
    "#);
}

#[tokio::test]
async fn configured_scope_is_requested() {
    let mut builder = TestServer::builder();
    let identity = builder.spawn_identity(IdentityMock::new()).await;
    builder.spawn_graph(GraphMock::new()).await;
    builder.directory_setting(r#"scope = "api://directory/.default""#);

    let server = builder.build("").await;

    server.create_group("Ops").send().await;

    let requests = identity.requests();
    assert_eq!(requests[0].form["scope"], "api://directory/.default");
}

#[tokio::test]
async fn forbidden_reports_directory_response() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    builder.spawn_graph(GraphMock::new().with_create_response(403, "Forbidden")).await;

    let server = builder.build("").await;

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL-ID", "u1")
        .send()
        .await;

    insta::assert_debug_snapshot!(submission.flash(), @r#"
    Flash {
        category: "error",
        message: "Failed to create group: Forbidden",
    }
    "#);
}

#[tokio::test]
async fn directory_error_body_is_shown_verbatim() {
    let body = r#"{"error":{"code":"Request_BadRequest","message":"Another object with the same value for property mailNickname already exists."}}"#;

    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    builder.spawn_graph(GraphMock::new().with_create_response(400, body)).await;

    let server = builder.build("").await;

    let submission = server.create_group("Finance").send().await;

    assert_eq!(submission.flash().category, "error");
    assert_eq!(submission.flash().message, format!("Failed to create group: {body}"));
}

#[tokio::test]
async fn rejected_credentials_skip_the_directory() {
    let mut builder = TestServer::builder();
    let identity = builder.spawn_identity(IdentityMock::rejecting()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    let submission = server
        .create_group("Finance")
        .header("X-MS-CLIENT-PRINCIPAL-ID", "u1")
        .send()
        .await;

    insta::assert_debug_snapshot!(submission.flash(), @r#"
    Flash {
        category: "error",
        message: "Failed to initialize Graph client",
    }
    "#);

    assert_eq!(identity.request_count(), 1);
    assert_eq!(graph.request_count(), 0);
}

#[tokio::test]
async fn token_response_without_token_skips_the_directory() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::without_token()).await;
    let graph = builder.spawn_graph(GraphMock::new()).await;

    let server = builder.build("").await;

    let submission = server.create_group("Finance").send().await;

    assert_eq!(submission.flash().message, "Failed to initialize Graph client");
    assert_eq!(graph.request_count(), 0);
}

#[tokio::test]
async fn unreachable_directory_reports_transport_error() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;

    let server = builder.build("").await;

    let submission = server.create_group("Finance").send().await;

    assert_eq!(submission.flash().category, "error");
    assert!(
        submission.flash().message.starts_with("Error creating group: "),
        "{}",
        submission.flash().message
    );
}

#[tokio::test]
async fn created_with_unreadable_body_is_still_success() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    builder.spawn_graph(GraphMock::new().with_create_response(201, "not json")).await;

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
}

#[tokio::test]
async fn non_created_success_status_is_an_error() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    builder
        .spawn_graph(GraphMock::new().with_create_response(200, r#"{"id":"g1"}"#))
        .await;

    let server = builder.build("").await;

    let submission = server.create_group("Finance").send().await;

    insta::assert_debug_snapshot!(submission.flash(), @r#"
    Flash {
        category: "error",
        message: "Failed to create group: {\"id\":\"g1\"}",
    }
    "#);
}

#[tokio::test]
async fn flash_survives_without_session_secret() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;
    builder.spawn_graph(GraphMock::new()).await;

    let server = builder
        .build(indoc! {r#"
            [session]
        "#})
        .await;

    let submission = server.create_group("").send().await;

    assert_eq!(submission.flash().message, "Please enter a group name");
}
