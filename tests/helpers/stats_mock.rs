//! Mock stats service
//!
//! A wiremock double for the view-stats service: `POST /hit` always
//! succeeds, `GET /stats` replies with whatever lines the test stubs.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct StatsMock {
    pub server: MockServer,
}

impl StatsMock {
    /// Start the double with hits accepted and no view lines.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hit"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Replace the `GET /stats` reply with the given view lines.
    pub async fn stub_views(&self, lines: Value) {
        self.server.reset().await;
        Mock::given(method("POST"))
            .and(path("/hit"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(lines))
            .mount(&self.server)
            .await;
    }

    /// Make every stats endpoint fail, for failure-policy tests.
    pub async fn go_dark(&self) {
        self.server.reset().await;
        Mock::given(method("POST"))
            .and(path("/hit"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }

    /// Hits recorded so far.
    pub async fn recorded_hits(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.method.as_str() == "POST" && request.url.path() == "/hit")
            .map(|request| serde_json::from_slice(&request.body).expect("hit body is JSON"))
            .collect()
    }

    /// Hit recording is fire-and-forget; poll until the expected number of
    /// hits has arrived or a short deadline passes.
    pub async fn wait_for_hits(&self, expected: usize) -> Vec<Value> {
        for _ in 0..40 {
            let hits = self.recorded_hits().await;
            if hits.len() >= expected {
                return hits;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.recorded_hits().await
    }
}
