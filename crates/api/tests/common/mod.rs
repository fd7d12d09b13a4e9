use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use vam_api::config::{LogFormat, QueueConfig, ServerConfig};
use vam_api::health::HealthChecker;
use vam_api::router::build_app_router;
use vam_api::state::AppState;
use vam_queue::{ConnectivityCheck, QueueError};

/// Build a test `ServerConfig` with safe defaults and a 30-second request
/// timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        service_name: "next-video-annotations-mapper".to_string(),
        app_name: "Next Video Annotations Mapper".to_string(),
        system_code: "next-video-annotations-mapper".to_string(),
        panic_guide: "https://runbooks.in.ft.com/up-nvam".to_string(),
        queue: QueueConfig {
            addrs: vec!["http://localhost:8080".to_string()],
            group: "videoAnnotationsMapper".to_string(),
            read_topic: "NativeCmsPublicationEvents".to_string(),
            read_queue: "kafka".to_string(),
            write_topic: "V1ConceptAnnotations".to_string(),
            write_queue: "kafka".to_string(),
            authorization: None,
            poll_interval: Duration::from_secs(1),
        },
        request_timeout_secs: 30,
        log_format: LogFormat::Text,
    }
}

/// Connectivity check with a fixed answer.
pub struct StubCheck {
    pub name: &'static str,
    pub reachable: bool,
}

#[async_trait]
impl ConnectivityCheck for StubCheck {
    async fn connectivity_check(&self) -> Result<(), QueueError> {
        if self.reachable {
            Ok(())
        } else {
            Err(QueueError::TopicNotFound(self.name.to_string()))
        }
    }

    fn describe(&self) -> String {
        format!("queue address http://localhost:8080, topic {}", self.name)
    }
}

/// Build the full application router with all middleware layers, with the
/// queue proxy reported as reachable or not.
pub fn build_test_app(proxy_reachable: bool) -> Router {
    let producer = Arc::new(StubCheck {
        name: "V1ConceptAnnotations",
        reachable: proxy_reachable,
    });
    let consumer: Arc<dyn ConnectivityCheck> = Arc::new(StubCheck {
        name: "NativeCmsPublicationEvents",
        reachable: proxy_reachable,
    });

    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        health: Arc::new(HealthChecker::new(producer, vec![consumer])),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_body(app: Router, uri: &str, body: &str, tid: Option<&str>) -> Response<Body> {
    let mut request = Request::post(uri).header("content-type", "application/json");
    if let Some(tid) = tid {
        request = request.header("x-request-id", tid);
    }
    app.oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
