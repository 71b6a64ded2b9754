use crate::config::build_config::BuildConfig;
use crate::core::proxy::{self, ProxyTable};
use crate::utils::error::{DashError, Result};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::services::ServeDir;

#[derive(Clone)]
struct DevServerState {
    root: Arc<std::path::PathBuf>,
    proxy: Arc<ProxyTable>,
    client: reqwest::Client,
}

/// Proxied prefixes go to their backend, everything else is a static file
/// below the project root.
pub fn router(config: &BuildConfig) -> Result<Router> {
    let state = DevServerState {
        root: Arc::new(config.root.clone()),
        proxy: Arc::new(ProxyTable::from_rules(&config.server.proxy)?),
        // Redirects go back to the browser untouched.
        client: reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?,
    };

    Ok(Router::new().fallback(handle).with_state(state))
}

async fn handle(State(state): State<DevServerState>, req: Request) -> Response {
    let path = req.uri().path().to_string();

    if let Some(target) = state.proxy.match_path(&path) {
        return match proxy::forward(&state.client, target, req).await {
            Ok(response) => response,
            Err(e @ DashError::PayloadTooLarge { .. }) => {
                tracing::warn!("rejected request for {}: {}", path, e);
                (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response()
            }
            Err(e) => {
                tracing::warn!("proxy error for {}: {}", path, e);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Proxy to {} failed: {}", target.target, e),
                )
                    .into_response()
            }
        };
    }

    match ServeDir::new(state.root.as_path()).oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Bind `127.0.0.1:<port>` and serve until Ctrl-C.
pub async fn serve(config: &BuildConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|e| DashError::ServerError {
            message: format!("Cannot bind port {}: {}", port, e),
        })?;

    tracing::info!("Dev server listening on http://127.0.0.1:{}", port);
    for (prefix, rule) in &config.server.proxy {
        tracing::info!(
            "Proxying {} -> {} (change origin: {})",
            prefix,
            rule.target,
            rule.change_origin
        );
    }

    run(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, config: &BuildConfig, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = router(config)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| DashError::ServerError {
            message: e.to_string(),
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down dev server");
}
