use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use super::error::ApiError;
use crate::storage::SessionStore;

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

/// An outbound request, expressed independently of any HTTP library so
/// tests can substitute the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON. An empty body parses as `null`.
    pub fn json(&self) -> Result<Value, ApiError> {
        if self.body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::Malformed(format!("invalid JSON body: {}", e)))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Production transport over reqwest. Attaches a bearer token from the
/// session store when one is present.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent("aurelane-client")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);

        tracing::debug!("{} {}", request.method.as_str(), url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?
            .to_vec();

        tracing::debug!("{} {} -> {}", request.method.as_str(), url, status);

        Ok(ApiResponse { status, body })
    }
}

/// Map a non-success response to the right error kind: field-level
/// validation errors when the body carries them, otherwise the server's
/// top-level message.
pub(crate) fn status_error(status: u16, body: &Value) -> ApiError {
    if let Some(fields) = validation_fields(body) {
        if !fields.is_empty() {
            return ApiError::Validation { status, fields };
        }
    }

    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status));

    ApiError::Server { status, message }
}

/// Backends report validation failures either as an array of
/// `{path, message}` objects or as a `{field: message}` map.
fn validation_fields(body: &Value) -> Option<Vec<(String, String)>> {
    let errors = body.get("errors")?;

    if let Some(list) = errors.as_array() {
        return Some(
            list.iter()
                .filter_map(|item| {
                    let path = item.get("path").or_else(|| item.get("field"))?.as_str()?;
                    let message = item.get("message")?.as_str()?;
                    Some((path.to_string(), message.to_string()))
                })
                .collect(),
        );
    }

    if let Some(map) = errors.as_object() {
        return Some(
            map.iter()
                .filter_map(|(field, message)| {
                    Some((field.clone(), message.as_str()?.to_string()))
                })
                .collect(),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_error_maps_error_array() {
        let body = json!({
            "errors": [
                {"path": "pincode", "message": "must be 6 digits"},
                {"path": "phone", "message": "required"}
            ]
        });
        match status_error(400, &body) {
            ApiError::Validation { status, fields } => {
                assert_eq!(status, 400);
                assert_eq!(fields[0].0, "pincode");
                assert_eq!(fields[1].1, "required");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_error_maps_error_map() {
        let body = json!({"errors": {"email": "already registered"}});
        match status_error(409, &body) {
            ApiError::Validation { fields, .. } => {
                assert_eq!(fields, vec![("email".to_string(), "already registered".to_string())]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_error_falls_back_to_message() {
        let body = json!({"message": "gem not found"});
        match status_error(404, &body) {
            ApiError::Server { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "gem not found");
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_error_without_body_detail() {
        match status_error(502, &Value::Null) {
            ApiError::Server { message, .. } => assert!(message.contains("502")),
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_body_parses_as_null() {
        let response = ApiResponse {
            status: 204,
            body: Vec::new(),
        };
        assert_eq!(response.json().unwrap(), Value::Null);
    }
}
