//! HTTP front end of the group portal: the creation form, its submission handler and a health probe.

mod access_log;
mod error;
mod flash;
mod handlers;
mod logger;
mod page;
mod state;

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use config::Config;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use error::Error;
pub use logger::{LogStyle, init as init_logger};

use crate::{access_log::AccessLogLayer, state::AppState};

pub type Result<T> = std::result::Result<T, error::Error>;

pub struct ServeConfig {
    pub listen_address: SocketAddr,
    pub config: Config,
    /// Cancel to stop accepting connections and drain in-flight requests.
    pub shutdown_signal: CancellationToken,
    pub log_filter: String,
    pub log_style: LogStyle,
}

fn router(config: &Config, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::index))
        .route("/create_group", post(handlers::create_group));

    if config.server.health.enabled {
        app = app.route(&config.server.health.path, get(handlers::health));
    }

    app.layer(AccessLogLayer).with_state(state)
}

pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter,
        log_style,
    }: ServeConfig,
) -> crate::Result<()> {
    logger::init(&log_filter, log_style);

    let state = AppState::new(&config)?;
    let app = router(&config, state);

    let listener = TcpListener::bind(listen_address).await.map_err(Error::Bind)?;

    match &config.server.tls {
        Some(tls_config) => {
            let rustls_config = RustlsConfig::from_pem_file(&tls_config.certificate, &tls_config.key)
                .await
                .map_err(|e| Error::Tls(e.to_string()))?;

            log::info!("Group portal listening on https://{listen_address}");

            let handle = Handle::new();

            tokio::spawn({
                let handle = handle.clone();

                async move {
                    shutdown_signal.cancelled().await;
                    log::info!("Shutting down");
                    handle.graceful_shutdown(None);
                }
            });

            // Convert tokio listener to std listener for axum-server
            let std_listener = listener.into_std().map_err(Error::Bind)?;

            axum_server::from_tcp_rustls(std_listener, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(Error::Server)?;
        }
        None => {
            log::info!("Group portal listening on http://{listen_address}");

            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_signal.cancelled().await;
                    log::info!("Shutting down");
                })
                .await
                .map_err(Error::Server)?;
        }
    }

    Ok(())
}
