use indoc::indoc;
use integration_tests::*;

#[tokio::test]
async fn healthy_when_a_token_can_be_fetched() {
    let mut builder = TestServer::builder();
    let identity = builder.spawn_identity(IdentityMock::new()).await;

    let server = builder.build("").await;

    let (status, body) = server.health().await;

    assert_eq!(status, 200);
    insta::assert_json_snapshot!(body, @r#"
    {
      "status": "healthy"
    }
    "#);

    // every probe performs a real token round-trip
    server.health().await;
    assert_eq!(identity.request_count(), 2);
}

#[tokio::test]
async fn unhealthy_when_credentials_are_rejected() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::rejecting()).await;

    let server = builder.build("").await;

    let (status, body) = server.health().await;

    assert_eq!(status, 500);
    insta::assert_json_snapshot!(body, @r#"
    {
      "details": "Could not initialize Graph client",
      "status": "unhealthy"
    }
    "#);
}

#[tokio::test]
async fn unhealthy_when_identity_provider_is_down() {
    let server = TestServer::builder().build("").await;

    let (status, body) = server.health().await;

    assert_eq!(status, 500);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn custom_path() {
    let mut builder = TestServer::builder();
    builder.spawn_identity(IdentityMock::new()).await;

    let server = builder
        .build(indoc! {r#"
            [server.health]
            path = "/healthz"
        "#})
        .await;

    let (status, _) = server.health().await;
    assert_eq!(status, 200);

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn disabled() {
    let mut builder = TestServer::builder();
    let identity = builder.spawn_identity(IdentityMock::new()).await;

    let server = builder
        .build(indoc! {r#"
            [server.health]
            enabled = false
        "#})
        .await;

    let response = server.client.get("/health").await;

    assert_eq!(response.status(), 404);
    assert_eq!(identity.request_count(), 0);
}
