//! HTTP transport shared by every endpoint service
//!
//! The single place where the bearer token is attached to outbound requests
//! and where authorization failures tear down the session. Individual
//! services never duplicate this logic.

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

use rently_core::{ApiConfig, ErrorContext, RentlyError, RentlyResult};

/// Read-side view of the session state the transport needs.
///
/// The session store itself lives a layer above this crate; the trait keeps
/// the dependency pointing in one direction. The token is read through it at
/// call time, so a token rotated mid-session is picked up on the next call.
pub trait SessionHandle: Send + Sync {
    /// Current bearer token, if any
    fn token(&self) -> Option<String>;

    /// Tear down the session after an authorization failure
    fn force_logout(&self);
}

/// Session handle for unauthenticated flows (registration, tooling)
pub struct NoSession;

impl SessionHandle for NoSession {
    fn token(&self) -> Option<String> {
        None
    }

    fn force_logout(&self) {}
}

/// HTTP transport over the Rently REST API
pub struct ApiTransport {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionHandle>,
}

impl ApiTransport {
    /// Create a new transport against the configured base URL
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionHandle>) -> RentlyResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|e| RentlyError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("api_transport").with_operation("new"),
            })?,
        );

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| RentlyError::Config {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("api_transport").with_operation("new"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Base URL this transport talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generic request entry point every convenience wrapper funnels through
    ///
    /// Merges `Content-Type: application/json` and, when a token exists,
    /// `Authorization: Bearer <token>` with caller-supplied headers; caller
    /// headers win on conflict. Any 401/403 clears the whole session before
    /// the call fails.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> RentlyResult<T> {
        let response = self.execute(method, endpoint, body, extra_headers).await?;

        response.json::<T>().await.map_err(|e| RentlyError::Network {
            message: format!("Failed to decode response body: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("api_transport").with_operation(endpoint),
        })
    }

    /// Like [`request`](Self::request), for endpoints whose success body is
    /// empty or irrelevant
    pub async fn request_empty(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> RentlyResult<()> {
        self.execute(method, endpoint, body, extra_headers).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> RentlyResult<T> {
        self.request(Method::GET, endpoint, None, None).await
    }

    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RentlyResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, endpoint, Some(body), None).await
    }

    /// POST with no body, discarding the response
    pub async fn post_empty(&self, endpoint: &str) -> RentlyResult<()> {
        self.request_empty(Method::POST, endpoint, None, None).await
    }

    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RentlyResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, endpoint, Some(body), None).await
    }

    pub async fn patch<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RentlyResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, endpoint, Some(body), None)
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> RentlyResult<()> {
        self.request_empty(Method::DELETE, endpoint, None, None)
            .await
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> RentlyResult<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .headers(self.build_headers(endpoint, extra_headers)?);

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| RentlyError::Network {
            message: format!("Request to {} failed: {}", url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("api_transport").with_operation(endpoint),
        })?;

        let status = response.status();

        // Any single unauthorized response tears down the whole session,
        // regardless of the response body.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(
                "Authorization failure ({}) from {}, clearing session",
                status.as_u16(),
                url
            );
            self.session.force_logout();
            return Err(RentlyError::Unauthorized {
                message: "Token is invalid or expired".to_string(),
                context: ErrorContext::new("api_transport")
                    .with_operation(endpoint)
                    .with_suggestion("Log in again"),
            });
        }

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(RentlyError::Http {
                status: status.as_u16(),
                message: if body_text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    body_text
                },
                context: ErrorContext::new("api_transport").with_operation(endpoint),
            });
        }

        Ok(response)
    }

    fn build_headers(
        &self,
        endpoint: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> RentlyResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Token is read at call time, not at construction time
        if let Some(token) = self.session.token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                RentlyError::Internal {
                    message: format!("Invalid bearer token: {}", e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("api_transport").with_operation(endpoint),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        // Caller-supplied headers take precedence on conflict
        if let Some(extra) = extra_headers {
            for (key, value) in extra {
                let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    RentlyError::Internal {
                        message: format!("Invalid header name '{}': {}", key, e),
                        source: Some(Box::new(e)),
                        context: ErrorContext::new("api_transport").with_operation(endpoint),
                    }
                })?;
                let value = HeaderValue::from_str(value).map_err(|e| RentlyError::Internal {
                    message: format!("Invalid header value for '{}': {}", key, e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("api_transport").with_operation(endpoint),
                })?;
                headers.insert(name, value);
            }
        }

        Ok(headers)
    }
}
