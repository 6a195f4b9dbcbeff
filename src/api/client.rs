//! Fluent HTTP API client.
//!
//! A thin request-builder wrapper over `reqwest` for driving REST endpoints
//! from tests: accumulate headers, query parameters, body, and credentials,
//! then issue a verb against an endpoint relative to the configured base
//! URL. Builder state persists across requests until [`ApiClient::reset`],
//! so a test can issue several calls with shared headers.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, info};

/// Errors surfaced by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not valid JSON for the requested type.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
enum Auth {
    Basic { username: String, password: String },
    Bearer(String),
}

/// A received HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as string pairs.
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: String,
}

impl ApiResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Fluent REST client bound to a base URL.
///
/// # Example
///
/// ```rust,no_run
/// use webdriver_harness::api::ApiClient;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = ApiClient::new("https://api.example.com")
///     .add_header("Accept", "application/json")
///     .add_bearer_token("token-123");
///
/// let response = client
///     .add_body(json!({"name": "morpheus", "job": "leader"}))
///     .post("/users")
///     .await?;
/// assert_eq!(response.status, 201);
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    auth: Option<Auth>,
}

impl ApiClient {
    /// Creates a client bound to the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        info!(base_url, "API client initialized");
        Self {
            base_url,
            client: reqwest::Client::new(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            auth: None,
        }
    }

    /// Adds a single header to subsequent requests.
    pub fn add_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Adds a map of headers to subsequent requests.
    pub fn add_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Adds a single query parameter to subsequent requests.
    pub fn add_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a map of query parameters to subsequent requests.
    pub fn add_query_params(mut self, params: HashMap<String, String>) -> Self {
        self.query.extend(params);
        self
    }

    /// Sets the JSON request body.
    pub fn add_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds basic authentication credentials.
    pub fn add_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(Auth::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Adds a bearer token.
    pub fn add_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(Auth::Bearer(token.into()));
        self
    }

    /// Clears all accumulated request state.
    pub fn reset(&mut self) {
        self.headers.clear();
        self.query.clear();
        self.body = None;
        self.auth = None;
        info!("Request state reset");
    }

    /// Performs a GET request against the endpoint.
    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.execute(Method::GET, endpoint).await
    }

    /// Performs a POST request against the endpoint.
    pub async fn post(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.execute(Method::POST, endpoint).await
    }

    /// Performs a PUT request against the endpoint.
    pub async fn put(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.execute(Method::PUT, endpoint).await
    }

    /// Performs a PATCH request against the endpoint.
    pub async fn patch(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.execute(Method::PATCH, endpoint).await
    }

    /// Performs a DELETE request against the endpoint.
    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.execute(Method::DELETE, endpoint).await
    }

    /// Full URL for an endpoint relative to the base.
    fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Assembles a request with all accumulated state applied.
    fn build(&self, method: Method, endpoint: &str) -> Result<reqwest::Request, ApiError> {
        let mut builder = self.client.request(method, self.url_for(endpoint));

        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if let Some(ref body) = self.body {
            builder = builder.json(body);
        }
        builder = match &self.auth {
            Some(Auth::Basic { username, password }) => {
                builder.basic_auth(username, Some(password))
            }
            Some(Auth::Bearer(token)) => builder.bearer_auth(token),
            None => builder,
        };

        Ok(builder.build()?)
    }

    async fn execute(&self, method: Method, endpoint: &str) -> Result<ApiResponse, ApiError> {
        let method_name = method.to_string();
        let request = self.build(method, endpoint)?;

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                error!(method = method_name, endpoint, error = %err, "Request failed");
                return Err(err.into());
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(key, value)| {
                (
                    key.to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.text().await?;

        info!(method = method_name, endpoint, status, "Request executed");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("https://api.example.com/");
        assert_eq!(client.url_for("/users"), "https://api.example.com/users");
        assert_eq!(client.url_for("users"), "https://api.example.com/users");

        let client = ApiClient::new("https://api.example.com/v2");
        assert_eq!(client.url_for("/users/7"), "https://api.example.com/v2/users/7");
    }

    #[test]
    fn test_build_applies_headers_and_query() {
        let client = ApiClient::new("https://api.example.com")
            .add_header("Accept", "application/json")
            .add_header("X-Request-Id", "42")
            .add_query_param("page", "2")
            .add_query_param("limit", "10");

        let request = client.build(Method::GET, "/users").unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().path(), "/users");
        assert_eq!(request.url().query(), Some("page=2&limit=10"));
        assert_eq!(
            request.headers().get("Accept").unwrap(),
            "application/json"
        );
        assert_eq!(request.headers().get("X-Request-Id").unwrap(), "42");
    }

    #[test]
    fn test_build_applies_json_body() {
        let client = ApiClient::new("https://api.example.com")
            .add_body(json!({"name": "morpheus"}));

        let request = client.build(Method::POST, "/users").unwrap();
        assert_eq!(
            request.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert!(request.body().is_some());
    }

    #[test]
    fn test_build_applies_basic_auth() {
        let client = ApiClient::new("https://api.example.com").add_basic_auth("user", "pass");

        let request = client.build(Method::GET, "/me").unwrap();
        let auth = request.headers().get("authorization").unwrap().to_str().unwrap();
        assert!(auth.starts_with("Basic "));
    }

    #[test]
    fn test_build_applies_bearer_token() {
        let client = ApiClient::new("https://api.example.com").add_bearer_token("token-123");

        let request = client.build(Method::GET, "/me").unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer token-123"
        );
    }

    #[test]
    fn test_reset_clears_accumulated_state() {
        let mut client = ApiClient::new("https://api.example.com")
            .add_header("X-Token", "secret")
            .add_query_param("page", "1")
            .add_body(json!({"k": "v"}))
            .add_bearer_token("token");

        client.reset();

        let request = client.build(Method::GET, "/users").unwrap();
        assert!(request.headers().get("X-Token").is_none());
        assert!(request.headers().get("authorization").is_none());
        assert!(request.url().query().is_none());
        assert!(request.body().is_none());
    }

    #[test]
    fn test_response_json_decoding() {
        let response = ApiResponse {
            status: 200,
            headers: HashMap::new(),
            body: r#"{"id": 7, "name": "morpheus"}"#.to_string(),
        };

        assert!(response.is_success());
        let value: Value = response.json().unwrap();
        assert_eq!(value["id"], 7);

        let broken = ApiResponse {
            status: 500,
            headers: HashMap::new(),
            body: "<html>error</html>".to_string(),
        };
        assert!(!broken.is_success());
        assert!(broken.json::<Value>().is_err());
    }
}
