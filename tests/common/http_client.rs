//! HTTP client helpers for tests.

use std::time::Duration;

use quizsim::constants::QUIZSIM_STATUS_HEADER;
use serde_json::Value;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

/// Status code, `X-Quizsim-Status` header and JSON body of one response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub status_header: String,
    pub body: Value,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn collect(resp: reqwest::Response) -> Result<TestResponse, reqwest::Error> {
        let status = resp.status().as_u16();
        let status_header = resp
            .headers()
            .get(QUIZSIM_STATUS_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let body = resp.json().await?;

        Ok(TestResponse {
            status,
            status_header,
            body,
        })
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<TestResponse, reqwest::Error> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Self::collect(resp).await
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> Result<TestResponse, reqwest::Error> {
        let resp = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?;
        Self::collect(resp).await
    }

    pub async fn similarity(
        &self,
        answer: &str,
        correct_answer: &str,
    ) -> Result<TestResponse, reqwest::Error> {
        self.post(
            "/similarity",
            &serde_json::json!({"answer": answer, "correct_answer": correct_answer}),
        )
        .await
    }

    pub async fn get(&self, path: &str) -> Result<TestResponse, reqwest::Error> {
        let resp = self.client.get(self.url(path)).send().await?;
        Self::collect(resp).await
    }
}
