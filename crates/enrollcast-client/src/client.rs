//! Forecast API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::types::*;

/// Operations offered by the forecasting backend.
#[async_trait]
pub trait ForecastApi: Send + Sync {
    /// Send a user utterance for server-side interpretation.
    async fn chat(&self, request: &ChatRequest) -> ClientResult<ChatReply>;

    /// Run a forecast for one term.
    async fn run_forecast(&self, request: &ForecastRequest) -> ClientResult<ForecastResponse>;

    /// List uploaded enrollment data files.
    async fn data_files(&self) -> ClientResult<Vec<DataFile>>;

    /// Fetch the server-side forecast defaults.
    async fn server_config(&self) -> ClientResult<ServerConfig>;

    /// Update server-side forecast defaults. Returns the backend's success flag.
    async fn update_server_config(&self, update: &ConfigUpdate) -> ClientResult<bool>;

    /// Check backend health.
    async fn health(&self) -> ClientResult<HealthStatus>;
}

/// [`ForecastApi`] over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpForecastApi {
    client: Client,
    /// Base URL, e.g. "http://localhost:8000".
    base_url: String,
}

impl HttpForecastApi {
    /// Create a client. Without a timeout, requests wait until the backend
    /// answers or the connection fails.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a request, classifying connect failures separately.
    async fn send(&self, url: &str, request: RequestBuilder) -> ClientResult<Response> {
        tracing::debug!(url, "Forecast API request");
        request.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else {
                ClientError::Request(e)
            }
        })
    }

    /// Parse a 2xx body as JSON, or turn a non-2xx into [`ClientError::Api`].
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = error_detail(&body)
                .unwrap_or_else(|| format!("API request failed: {}", status.as_u16()));
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Extract the `detail` string from an error body, if there is one.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl ForecastApi for HttpForecastApi {
    async fn chat(&self, request: &ChatRequest) -> ClientResult<ChatReply> {
        let url = self.url("/api/chat");
        let response = self.send(&url, self.client.post(&url).json(request)).await?;
        self.handle_response(response).await
    }

    async fn run_forecast(&self, request: &ForecastRequest) -> ClientResult<ForecastResponse> {
        let url = self.url("/api/forecast");
        let response = self.send(&url, self.client.post(&url).json(request)).await?;
        self.handle_response(response).await
    }

    async fn data_files(&self) -> ClientResult<Vec<DataFile>> {
        let url = self.url("/api/data/files");
        let response = self.send(&url, self.client.get(&url)).await?;
        let body: DataFilesResponse = self.handle_response(response).await?;
        Ok(body.files)
    }

    async fn server_config(&self) -> ClientResult<ServerConfig> {
        let url = self.url("/api/config");
        let response = self.send(&url, self.client.get(&url)).await?;
        self.handle_response(response).await
    }

    async fn update_server_config(&self, update: &ConfigUpdate) -> ClientResult<bool> {
        let url = self.url("/api/config");
        let response = self.send(&url, self.client.put(&url).json(update)).await?;
        let body: UpdateResponse = self.handle_response(response).await?;
        Ok(body.success)
    }

    async fn health(&self) -> ClientResult<HealthStatus> {
        let url = self.url("/api/health");
        let response = self.send(&url, self.client.get(&url)).await?;
        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use enrollcast_core::{ForecastConfig, ForecastMethod};
    use serde_json::json;

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn api(base_url: &str) -> HttpForecastApi {
        HttpForecastApi::new(base_url, Some(Duration::from_secs(5))).unwrap()
    }

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = HttpForecastApi::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/health"), "http://localhost:8000/api/health");
    }

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail": "Term not found"}"#),
            Some("Term not found".to_string())
        );
        assert_eq!(error_detail(r#"{"detail": [{"loc": ["body"]}]}"#), None);
        assert_eq!(error_detail("Internal Server Error"), None);
        assert_eq!(error_detail(""), None);
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let router = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "message": format!("echo: {}", body["message"].as_str().unwrap_or("")),
                    "parsedCommand": {
                        "intent": "forecast",
                        "parameters": {"term": "Fall 2026"},
                        "confidence": 0.85,
                        "raw_message": body["message"]
                    }
                }))
            }),
        );
        let base = spawn_backend(router).await;

        let reply = api(&base)
            .chat(&ChatRequest::new("forecast fall 2026"))
            .await
            .unwrap();
        assert_eq!(reply.message, "echo: forecast fall 2026");
        assert!(reply.is_forecast());
        let cmd = reply.parsed_command.unwrap();
        assert_eq!(cmd.term(), Some("Fall 2026"));
        assert_eq!(cmd.raw_message, "forecast fall 2026");
    }

    #[tokio::test]
    async fn test_run_forecast_sends_config() {
        let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let router = Router::new()
            .route(
                "/api/forecast",
                post(
                    |State(seen): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                        *seen.lock().unwrap() = Some(body);
                        Json(json!({
                            "results": [
                                {"course": "FOUN 110", "campus": "Savannah", "projectedSeats": 380.0, "sections": 19, "change": 5.0}
                            ],
                            "summary": {
                                "totalStudents": 380.0,
                                "totalSections": 19,
                                "coursesForecasted": 1,
                                "method": "sequence"
                            }
                        }))
                    },
                ),
            )
            .with_state(Arc::clone(&captured));
        let base = spawn_backend(router).await;

        let config = ForecastConfig {
            capacity: 25,
            ..ForecastConfig::default()
        };
        let response = api(&base)
            .run_forecast(&ForecastRequest {
                term: "Spring 2026".into(),
                method: ForecastMethod::Sequence,
                config: Some(ForecastSettings::from(&config)),
            })
            .await
            .unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].sections, 19);
        assert_eq!(response.summary.method, "sequence");

        let body = captured.lock().unwrap().clone().unwrap();
        assert_eq!(body["term"], "Spring 2026");
        assert_eq!(body["method"], "sequence");
        assert_eq!(body["config"]["capacity"], 25);
        assert_eq!(body["config"]["progressionRate"], 0.95);
    }

    #[tokio::test]
    async fn test_non_success_uses_detail_message() {
        let router = Router::new().route(
            "/api/forecast",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "No data for Winter 2030"})),
                )
            }),
        );
        let base = spawn_backend(router).await;

        let err = api(&base)
            .run_forecast(&ForecastRequest {
                term: "Winter 2030".into(),
                method: ForecastMethod::Sequence,
                config: None,
            })
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "No data for Winter 2030");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_success_without_detail() {
        let router = Router::new().route(
            "/api/health",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_backend(router).await;

        let err = api(&base).health().await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "API request failed: 500");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let router = Router::new().route("/api/chat", post(|| async { "definitely not json" }));
        let base = spawn_backend(router).await;

        let err = api(&base).chat(&ChatRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_failure() {
        // Bind and immediately release a port so nothing is listening on it.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = api(&format!("http://{}", addr))
            .chat(&ChatRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ConnectionFailed { .. }));
    }

    #[tokio::test]
    async fn test_passthrough_endpoints() {
        let router = Router::new()
            .route(
                "/api/data/files",
                get(|| async {
                    Json(json!({"files": [
                        {"name": "fall25.csv", "term": "Fall 2025", "records": 1200, "uploadedAt": "2025-10-01"}
                    ]}))
                }),
            )
            .route(
                "/api/config",
                get(|| async {
                    Json(json!({
                        "capacity": 20,
                        "progressionRate": 0.95,
                        "bufferPercent": 0.0,
                        "quartersToForecast": 2
                    }))
                })
                .put(|Json(body): Json<Value>| async move {
                    Json(json!({"success": body.get("capacity").is_some()}))
                }),
            )
            .route("/api/health", get(|| async { Json(json!({"status": "healthy"})) }));
        let base = spawn_backend(router).await;
        let client = api(&base);

        let files = client.data_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].term, "Fall 2025");
        assert_eq!(files[0].records, 1200);

        let config = client.server_config().await.unwrap();
        assert_eq!(config.capacity, 20);
        assert_eq!(config.quarters_to_forecast, 2);

        let ok = client
            .update_server_config(&ConfigUpdate::from(&ForecastConfig::default()))
            .await
            .unwrap();
        assert!(ok);

        assert_eq!(client.health().await.unwrap().status, "healthy");
    }
}
