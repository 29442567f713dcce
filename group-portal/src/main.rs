use anyhow::Context;
use args::Args;
use clap::Parser;
use config::Config;
use server::ServeConfig;
use tokio_util::sync::CancellationToken;

mod args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    server::init_logger(&args.log, args.log_style.into());

    if rustls::crypto::aws_lc_rs::default_provider().install_default().is_err() {
        log::debug!("A rustls crypto provider was already installed");
    }

    let config = match &args.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::from_env().context("Failed to load configuration from the environment")?,
    };

    let listen_address = args.listen_address.unwrap_or_else(|| config.server.listen_address());

    let shutdown_signal = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown_signal.clone()));

    server::serve(ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter: args.log,
        log_style: args.log_style.into(),
    })
    .await?;

    Ok(())
}

async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    token.cancel();
}
