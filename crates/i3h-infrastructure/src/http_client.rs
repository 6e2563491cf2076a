//! reqwest-backed JSON client.

use async_trait::async_trait;
use i3h_core::error::{PortalError, Result};
use i3h_core::http::{HttpMethod, JsonClient, RequestOptions};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

/// [`JsonClient`] implementation on top of `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestJsonClient {
    client: Client,
    timeout: Duration,
}

impl ReqwestJsonClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Reuses an existing `reqwest::Client` (connection pool, proxies, TLS).
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn build_headers(options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(options.content_type())
                .map_err(|e| PortalError::internal(format!("Invalid Content-Type: {}", e)))?,
        );
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| PortalError::internal(format!("Invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| PortalError::internal(format!("Invalid value for {}: {}", name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl Default for ReqwestJsonClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(
            i3h_core::config::DEFAULT_REQUEST_TIMEOUT_SECS,
        ))
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl JsonClient for ReqwestJsonClient {
    async fn send(&self, url: &str, options: RequestOptions) -> Result<Value> {
        let headers = Self::build_headers(&options)?;

        let mut request = self
            .client
            .request(to_reqwest_method(options.method), url)
            .headers(headers)
            .timeout(self.timeout);

        if let Some(body) = options.effective_body() {
            request = request.body(serde_json::to_vec(body)?);
        }

        tracing::debug!("[JsonClient] {} {}", options.method, redact(url));

        let response = request
            .send()
            .await
            .map_err(|e| PortalError::transport(format!("{} {}: {}", options.method, redact(url), e.without_url())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PortalError::transport(format!("Failed to read response body: {}", e.without_url())))?;

        if !status.is_success() {
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or("").to_string()
            } else {
                text
            };
            tracing::debug!("[JsonClient] {} {} -> {}", options.method, redact(url), status);
            return Err(PortalError::http(status.as_u16(), message));
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Drops the query string so `api_key` tokens never reach the logs.
fn redact(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Bytes;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::{any, get};
    use i3h_core::http::{get_json, send_auth_json};
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Echoes method, selected headers and body back as JSON.
    async fn echo(method: axum::http::Method, headers: AxumHeaders, body: Bytes) -> axum::Json<Value> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        axum::Json(json!({
            "method": method.as_str(),
            "contentType": header("content-type"),
            "authorization": header("authorization"),
            "body": String::from_utf8_lossy(&body),
        }))
    }

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/echo", any(echo))
            .route("/empty", get(|| async { StatusCode::OK }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/denied",
                get(|| async { (StatusCode::FORBIDDEN, "token revoked") }),
            )
            .route("/garbage", get(|| async { "not json" }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_get_sends_json_content_type_and_no_body() {
        let base = spawn_stub().await;
        let client = ReqwestJsonClient::default();

        let options = RequestOptions::get().with_body(json!({"dropped": true}));
        let echoed = client.send(&format!("{base}/echo"), options).await.unwrap();

        assert_eq!(echoed["method"], "GET");
        assert_eq!(echoed["contentType"], "application/json");
        assert_eq!(echoed["body"], "");
    }

    #[tokio::test]
    async fn test_post_serializes_body() {
        let base = spawn_stub().await;
        let client = ReqwestJsonClient::default();

        let options = RequestOptions::new(HttpMethod::Post).with_body(json!({"name": "cohort"}));
        let echoed = client.send(&format!("{base}/echo"), options).await.unwrap();

        assert_eq!(echoed["method"], "POST");
        let body: Value = serde_json::from_str(echoed["body"].as_str().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "cohort"}));
    }

    #[tokio::test]
    async fn test_content_type_override() {
        let base = spawn_stub().await;
        let client = ReqwestJsonClient::default();

        let options = RequestOptions::new(HttpMethod::Put)
            .with_header("content-type", "application/x-amz-json-1.1")
            .with_body(json!({}));
        let echoed = client.send(&format!("{base}/echo"), options).await.unwrap();

        assert_eq!(echoed["contentType"], "application/x-amz-json-1.1");
    }

    #[tokio::test]
    async fn test_bearer_variant() {
        let base = spawn_stub().await;
        let client = ReqwestJsonClient::default();

        let echoed: Value = send_auth_json(&client, &format!("{base}/echo"), "abc", RequestOptions::get())
            .await
            .unwrap();
        assert_eq!(echoed["authorization"], "Bearer abc");
    }

    #[tokio::test]
    async fn test_empty_success_body_is_empty_object() {
        let base = spawn_stub().await;
        let client = ReqwestJsonClient::default();

        let value: Value = get_json(&client, &format!("{base}/empty")).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_error_with_empty_body_uses_reason_phrase() {
        let base = spawn_stub().await;
        let client = ReqwestJsonClient::default();

        let err = client
            .send(&format!("{base}/missing"), RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err, PortalError::http(404, "Not Found"));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_error_carries_response_text() {
        let base = spawn_stub().await;
        let client = ReqwestJsonClient::default();

        let err = client
            .send(&format!("{base}/denied?api_key=secret"), RequestOptions::get())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 403: token revoked");
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_invalid_json_is_serialization_error() {
        let base = spawn_stub().await;
        let client = ReqwestJsonClient::default();

        let err = client
            .send(&format!("{base}/garbage"), RequestOptions::get())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ReqwestJsonClient::new(Duration::from_secs(2));
        let err = client
            .send(&format!("http://{addr}/user?api_key=secret"), RequestOptions::get())
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("https://api.pennsieve.net/user?api_key=t"), "https://api.pennsieve.net/user");
        assert_eq!(redact("https://api.pennsieve.net/user"), "https://api.pennsieve.net/user");
    }
}
