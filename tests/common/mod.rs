use axum::extract::Request;
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Backend stand-in that answers `{}` to everything and remembers the raw
/// request target (`path?query`) of each call.
pub struct RecordingBackend {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingBackend {
    pub async fn start() -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();

        let app = Router::new().fallback(move |req: Request| {
            let recorder = recorder.clone();
            async move {
                let target = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default();
                recorder.lock().unwrap().push(target);
                axum::Json(serde_json::json!({}))
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, seen }
    }

    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}
