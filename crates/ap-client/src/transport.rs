//! JSON-over-HTTP transport
//!
//! The clients and the authorization middleware never talk to reqwest
//! directly; they build an [`HttpRequest`] and hand it to an
//! [`HttpTransport`]. Timeouts, connection pooling and cancellation are the
//! transport's business, not the core's.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use ap_core::error::{Error, Result};

/// HTTP method of an outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// An outgoing JSON request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a `Authorization: Bearer <token>` header
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Attach a JSON body
    pub fn json(mut self, body: &impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::Transport(format!("failed to serialize request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Look up a request header, case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response, body kept raw for diagnostics
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-2xx response into a `RemoteService` error
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::RemoteService {
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::Transport(format!("failed to decode response body: {}", e)))
    }
}

/// The single seam between the clients and the network
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one request/response round trip
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production transport backed by `reqwest`
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing reqwest client (pool, timeouts, proxy settings)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "remote call");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(format!("request to remote service failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {}", e)))?;

        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::post("https://example.com/api")
            .header("X-API-Key", "proj_123")
            .bearer("tok");

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header_value("x-api-key"), Some("proj_123"));
        assert_eq!(request.header_value("authorization"), Some("Bearer tok"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_json_body() {
        #[derive(Serialize)]
        struct Body {
            token: &'static str,
        }

        let request = HttpRequest::post("https://example.com")
            .json(&Body { token: "abc" })
            .unwrap();
        assert_eq!(request.body, Some(serde_json::json!({ "token": "abc" })));
    }

    #[test]
    fn test_error_for_status() {
        assert!(HttpResponse::new(204, "").error_for_status().is_ok());

        let err = HttpResponse::new(500, "boom").error_for_status().unwrap_err();
        match err {
            Error::RemoteService { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_decode() {
        #[derive(Deserialize)]
        struct Payload {
            id: i64,
        }

        let response = HttpResponse::new(200, r#"{"id": 7}"#);
        let payload: Payload = response.json().unwrap();
        assert_eq!(payload.id, 7);

        let bad = HttpResponse::new(200, "not json");
        assert!(matches!(bad.json::<Payload>(), Err(Error::Transport(_))));
    }
}
