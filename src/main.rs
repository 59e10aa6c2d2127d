use std::sync::Arc;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info};

use warden::router::{debug_router, init_router};
use warden::state::AppState;
use warden_auth::{Auth, AuthSettings, KeyStore};
use warden_config::{AuthConfig, LogConfig, ServerConfig};
use warden_observability::{Metrics, init_metrics, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let _log_guard = init_tracing(&LogConfig::from_env());

    if let Err(err) = run().await {
        error!(error = %format!("{err:#}"), "startup failed");
        return Err(err);
    }

    Ok(())
}

async fn run() -> Result<()> {
    let auth_config = AuthConfig::from_env();
    let server_config = ServerConfig::from_env();

    info!(
        keys_folder = %auth_config.keys_folder.display(),
        issuer = %auth_config.issuer,
        signing_method = %auth_config.signing_method,
        "starting service"
    );

    let mut store = KeyStore::new();
    store
        .load_rsa_keys(&auth_config.keys_folder)
        .with_context(|| format!("loading keys from {}", auth_config.keys_folder.display()))?;

    if let Some(kid) = &auth_config.active_kid {
        if !store.contains(kid) {
            bail!("active kid {kid} is not in the key store");
        }
    }
    info!(kids = ?store.kids(), "key store ready");

    let auth = Auth::new(AuthSettings::from_config(&auth_config), Arc::new(store))
        .context("constructing auth")?;

    let metrics = Metrics::shared();
    let prometheus = init_metrics();
    let state = AppState::new(auth, Arc::clone(&metrics));

    // Debug listener: not part of graceful shutdown.
    let debug_listener = TcpListener::bind(&server_config.debug_host)
        .await
        .with_context(|| format!("binding debug listener {}", server_config.debug_host))?;
    let debug_app = debug_router(metrics, prometheus);
    info!(host = %server_config.debug_host, "debug listener started");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(debug_listener, debug_app).await {
            error!(error = %e, "debug listener stopped");
        }
    });

    let api_listener = TcpListener::bind(&server_config.api_host)
        .await
        .with_context(|| format!("binding api listener {}", server_config.api_host))?;
    let api_app = init_router(state);
    info!(host = %server_config.api_host, "api listener started");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut api_task = tokio::spawn(async move {
        axum::serve(api_listener, api_app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut api_task => {
            joined??;
            bail!("api listener stopped unexpectedly");
        }
        _ = shutdown_signal() => {}
    }

    info!(timeout = ?server_config.shutdown_timeout, "shutdown started");
    let _ = stop_tx.send(());

    match tokio::time::timeout(server_config.shutdown_timeout, api_task).await {
        Ok(joined) => joined??,
        Err(_) => bail!(
            "could not stop the api listener within {:?}",
            server_config.shutdown_timeout
        ),
    }

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "installing ctrl-c handler");
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
                error!(error = %e, "installing SIGTERM handler");
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
}
