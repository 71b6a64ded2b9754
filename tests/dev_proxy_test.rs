use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use httpmock::prelude::*;
use stock_dash::config::build_config::{BuildConfig, ProxyRule};
use stock_dash::core::dev_server;
use stock_dash::core::proxy::MAX_BODY_BYTES;
use tempfile::TempDir;
use tower::ServiceExt;

fn config_with_backend(root: &std::path::Path, target: String, change_origin: bool) -> BuildConfig {
    let mut config = BuildConfig {
        root: root.to_path_buf(),
        ..Default::default()
    };
    config.server.proxy.insert(
        "/api".to_string(),
        ProxyRule {
            target,
            change_origin,
        },
    );
    config
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_api_requests_are_forwarded_with_origin_rewritten() -> Result<()> {
    let backend = MockServer::start_async().await;
    let mock = backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/stocks/list")
                .header("host", backend.address().to_string())
                .header("origin", backend.base_url());
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"stocks": ["AAPL"]}));
        })
        .await;

    let root = TempDir::new()?;
    let app = dev_server::router(&config_with_backend(root.path(), backend.base_url(), true))?;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stocks/list")
                .header(header::HOST, "localhost:5173")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await)?;
    assert_eq!(body, serde_json::json!({"stocks": ["AAPL"]}));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_host_is_kept_without_change_origin() -> Result<()> {
    let backend = MockServer::start_async().await;
    let mock = backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/market/daily-summary")
                .query_param("start_date", "2024-01-01")
                .header("host", "localhost:5173")
                .header("origin", "http://localhost:5173");
            then.status(200).json_body(serde_json::json!({"data": []}));
        })
        .await;

    let root = TempDir::new()?;
    let app = dev_server::router(&config_with_backend(root.path(), backend.base_url(), false))?;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/market/daily-summary?start_date=2024-01-01")
                .header(header::HOST, "localhost:5173")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_backend_status_and_body_are_relayed() -> Result<()> {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(POST).path("/api/echo").body("ping");
            then.status(418).body("short and stout");
        })
        .await;

    let root = TempDir::new()?;
    let app = dev_server::router(&config_with_backend(root.path(), backend.base_url(), true))?;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/echo")
                .body(Body::from("ping"))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(body_text(response).await, "short and stout");
    Ok(())
}

#[tokio::test]
async fn test_backend_redirect_is_passed_through() -> Result<()> {
    let backend = MockServer::start_async().await;
    let redirect = backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/stocks/list");
            then.status(301).header("location", "/api/stocks/list/");
        })
        .await;
    let followed = backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/stocks/list/");
            then.status(200).body("followed");
        })
        .await;

    let root = TempDir::new()?;
    let app = dev_server::router(&config_with_backend(root.path(), backend.base_url(), true))?;

    let response = app
        .oneshot(Request::builder().uri("/api/stocks/list").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/api/stocks/list/"
    );
    redirect.assert_async().await;
    assert_eq!(followed.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_oversized_body_is_payload_too_large() -> Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let target = format!("http://{}", listener.local_addr()?);
    drop(listener);

    let root = TempDir::new()?;
    let app = dev_server::router(&config_with_backend(root.path(), target, true))?;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload")
                .body(Body::from(vec![0u8; MAX_BODY_BYTES + 1]))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() -> Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let target = format!("http://{}", listener.local_addr()?);
    drop(listener);

    let root = TempDir::new()?;
    let app = dev_server::router(&config_with_backend(root.path(), target, true))?;

    let response = app
        .oneshot(Request::builder().uri("/api/stocks/list").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    Ok(())
}

#[tokio::test]
async fn test_other_paths_are_served_from_root() -> Result<()> {
    let root = TempDir::new()?;
    std::fs::write(root.path().join("index.html"), "<div id=\"app\"></div>")?;
    std::fs::create_dir_all(root.path().join("src"))?;
    std::fs::write(root.path().join("src/main.js"), "createApp(App)")?;

    let config = BuildConfig {
        root: root.path().to_path_buf(),
        ..Default::default()
    };
    let app = dev_server::router(&config)?;

    let index = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(body_text(index).await, "<div id=\"app\"></div>");

    let script = app
        .clone()
        .oneshot(Request::builder().uri("/src/main.js").body(Body::empty())?)
        .await?;
    assert_eq!(body_text(script).await, "createApp(App)");

    let missing = app
        .oneshot(Request::builder().uri("/nope.css").body(Body::empty())?)
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_serves_over_tcp_until_shutdown() -> Result<()> {
    let backend = MockServer::start_async().await;
    let mock = backend
        .mock_async(|when, then| {
            when.method(GET).path("/api/stocks/AAPL/detail");
            then.status(200).json_body(serde_json::json!({"data": []}));
        })
        .await;

    let root = TempDir::new()?;
    let config = config_with_backend(root.path(), backend.base_url(), true);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        dev_server::run(listener, &config, async move {
            let _ = stop_rx.await;
        })
        .await
    });

    let api = stock_dash::StockApi::new(&format!("http://{}", addr))?;
    let body = api
        .get_detail("AAPL", stock_dash::QueryParams::new())
        .await?;
    assert_eq!(body, serde_json::json!({"data": []}));
    mock.assert_async().await;
    drop(api);

    stop_tx.send(()).ok();
    server.await??;
    Ok(())
}
