pub mod mocks;

use std::{net::SocketAddr, sync::Once, time::Duration};

use config::Config;
use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue, LOCATION, SET_COOKIE};
use server::{LogStyle, ServeConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use mocks::{GraphMock, GraphRequest, IdentityMock, MockGraph, MockIdentityProvider, TokenRequest};

/// Credentials every test server authenticates with.
pub const TENANT_ID: &str = "test-tenant";
pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";

/// An address nothing listens on.
const UNREACHABLE: &str = "http://127.0.0.1:9";

static INIT: Once = Once::new();

#[ctor::ctor]
fn init_crypto_provider() {
    INIT.call_once(|| {
        rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .expect("Failed to install default crypto provider");
    });
}

/// Directory settings pointing at the given mocks, with the test credentials.
pub fn directory_config(identity: &MockIdentityProvider, graph: &MockGraph, extra: &str) -> config::DirectoryConfig {
    let toml = indoc::formatdoc! {r#"
        tenant_id = "{TENANT_ID}"
        client_id = "{CLIENT_ID}"
        client_secret = "{CLIENT_SECRET}"
        authority = "{authority}"
        graph_url = "{graph_url}"
        {extra}
    "#, authority = identity.authority(), graph_url = graph.graph_url()};

    toml::from_str(&toml).unwrap()
}

/// Test client for making HTTP requests to the test server. Redirects are not followed.
#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self { base_url, client }
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.try_get(path).await.unwrap()
    }

    /// Send a GET request to the given path, returning Result instead of panicking
    pub async fn try_get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(format!("{}{}", self.base_url, path)).send().await
    }

    /// Send a GET request carrying the given `Cookie` header
    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header(COOKIE, cookie)
            .send()
            .await
            .unwrap()
    }

    /// Create a request with the given method and path
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }
}

/// A flash message as rendered on the form page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

/// What the browser sees after submitting the form and following the redirect.
#[derive(Debug)]
pub struct Submission {
    pub status: u16,
    pub location: Option<String>,
    pub flashes: Vec<Flash>,
}

impl Submission {
    /// The single flash the submission produced.
    pub fn flash(&self) -> &Flash {
        assert_eq!(self.flashes.len(), 1, "expected exactly one flash: {:?}", self.flashes);
        &self.flashes[0]
    }
}

/// Builder for form submissions with fluent API for headers
pub struct CreateGroupRequest<'a> {
    test_server: &'a TestServer,
    form: Vec<(String, String)>,
    headers: HeaderMap,
}

impl CreateGroupRequest<'_> {
    /// Add a header to the request
    pub fn header(mut self, key: &str, value: &str) -> Self {
        let header_name = HeaderName::from_bytes(key.as_bytes()).unwrap();
        let header_value = HeaderValue::from_str(value).unwrap();
        self.headers.insert(header_name, header_value);
        self
    }

    /// Submit the form, then load the page the redirect points to with the flash cookie.
    pub async fn send(self) -> Submission {
        let response = self
            .test_server
            .client
            .request(reqwest::Method::POST, "/create_group")
            .headers(self.headers)
            .form(&self.form)
            .send()
            .await
            .unwrap();

        let status = response.status().as_u16();

        let location = response
            .headers()
            .get(LOCATION)
            .map(|value| value.to_str().unwrap().to_string());

        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .map(|value| value.to_str().unwrap().split(';').next().unwrap().to_string());

        let flashes = match cookie {
            Some(cookie) => {
                let page = self.test_server.client.get_with_cookie("/", &cookie).await;
                assert_eq!(page.status(), 200);

                parse_flashes(&page.text().await.unwrap())
            }
            None => Vec::new(),
        };

        Submission {
            status,
            location,
            flashes,
        }
    }
}

/// Extracts the flash messages of a rendered form page.
pub fn parse_flashes(html: &str) -> Vec<Flash> {
    html.lines()
        .filter_map(|line| line.strip_prefix(r#"<div class="flash flash-"#))
        .filter_map(|rest| {
            let (category, rest) = rest.split_once('"')?;
            let message = rest.strip_prefix(r#" role="alert">"#)?.strip_suffix("</div>")?;

            Some(Flash {
                category: category.to_string(),
                message: unescape(message),
            })
        })
        .collect()
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    /// Configuration used by this test server
    pub config: Config,
    /// Cancellation tokens for the mock services
    mock_tokens: Vec<CancellationToken>,
    /// Handle to the portal server task
    _server_task_handle: tokio::task::JoinHandle<()>,
    /// Shutdown signal for the portal server
    shutdown_signal: CancellationToken,
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    /// Start a new test server with the given TOML configuration
    async fn start(config_toml: &str, mock_tokens: Vec<CancellationToken>) -> Self {
        // Go through the real loader so validation runs too
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, config_toml).unwrap();

        let config = Config::load(&config_path).unwrap();

        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let shutdown_signal = CancellationToken::new();

        let serve_config = ServeConfig {
            listen_address: address,
            config: config.clone(),
            shutdown_signal: shutdown_signal.clone(),
            log_filter: "server=debug,directory=debug,context=debug,config=debug".to_string(),
            log_style: LogStyle::Text,
        };

        let (tx, mut rx) = tokio::sync::oneshot::channel();

        let server_task_handle = tokio::spawn(async move {
            // Drop the listener so the server can bind to the address
            drop(listener);

            let _ = tx.send(server::serve(serve_config).await);
        });

        let client = TestClient::new(format!("http://{address}"));

        // Probe the form page; the health route would spend a token request
        let mut retries = 30;

        loop {
            #[allow(clippy::panic)]
            if let Ok(Err(e)) = rx.try_recv() {
                panic!("Server failed to start: {e}");
            }

            match client.try_get("/").await {
                Ok(_) => break,
                #[allow(clippy::panic)]
                Err(e) if retries == 0 => panic!("Server failed to become ready after 30 retries: {e}"),
                Err(_) => retries -= 1,
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        TestServer {
            client,
            address,
            config,
            mock_tokens,
            _server_task_handle: server_task_handle,
            shutdown_signal,
        }
    }

    /// Start a form submission with the given group name
    pub fn create_group(&self, group_name: &str) -> CreateGroupRequest<'_> {
        CreateGroupRequest {
            test_server: self,
            form: vec![("group_name".to_string(), group_name.to_string())],
            headers: HeaderMap::new(),
        }
    }

    /// Start a form submission without the group name field
    pub fn create_group_without_name(&self) -> CreateGroupRequest<'_> {
        CreateGroupRequest {
            test_server: self,
            form: Vec::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Call the health route of this server's configuration
    pub async fn health(&self) -> (u16, serde_json::Value) {
        let response = self.client.get(&self.config.server.health.path).await;
        let status = response.status().as_u16();

        (status, response.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        for token in &self.mock_tokens {
            token.cancel();
        }

        self.shutdown_signal.cancel();
    }
}

#[derive(Default)]
pub struct TestServerBuilder {
    authority: Option<String>,
    graph_url: Option<String>,
    directory: String,
    mock_tokens: Vec<CancellationToken>,
}

impl TestServerBuilder {
    /// Spawn an identity provider mock and point the portal at it
    pub async fn spawn_identity(&mut self, mock: IdentityMock) -> MockIdentityProvider {
        let (provider, token) = mock.spawn().await;

        self.authority = Some(provider.authority());
        self.mock_tokens.push(token);

        provider
    }

    /// Spawn a directory API mock and point the portal at it
    pub async fn spawn_graph(&mut self, mock: GraphMock) -> MockGraph {
        let (graph, token) = mock.spawn().await;

        self.graph_url = Some(graph.graph_url());
        self.mock_tokens.push(token);

        graph
    }

    /// Add a `key = value` line to the `[directory]` table
    pub fn directory_setting(&mut self, line: &str) {
        self.directory.push_str(line);
        self.directory.push('\n');
    }

    /// Start the server. `config` may hold any table other than `[directory]`.
    pub async fn build(self, config: &str) -> TestServer {
        let authority = self.authority.as_deref().unwrap_or(UNREACHABLE);
        let graph_url = self.graph_url.unwrap_or_else(|| format!("{UNREACHABLE}/v1.0"));

        let mut final_config = config.to_string();

        if !config.contains("[session]") {
            final_config.push_str(indoc::indoc! {r#"

                [session]
                secret = "integration-test-secret"
            "#});
        }

        final_config.push_str(&indoc::formatdoc! {r#"

            [directory]
            tenant_id = "{TENANT_ID}"
            client_id = "{CLIENT_ID}"
            client_secret = "{CLIENT_SECRET}"
            authority = "{authority}"
            graph_url = "{graph_url}"
        "#});

        final_config.push_str(&self.directory);

        TestServer::start(&final_config, self.mock_tokens).await
    }
}
