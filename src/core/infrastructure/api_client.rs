//! Authenticated HTTP access to the API.
//!
//! [`ProxmoxApi`] is the seam between the services and the transport;
//! [`ApiClient`] implements it over an open [`Session`].

use crate::core::domain::{
    error::{ApiError, ApiResult},
    model::{RateLimitConfig, Session},
    value_object::CSRF_HEADER,
};
use async_trait::async_trait;
use futures::future::join_all;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, header::COOKIE};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Read and delete operations the inventory and cleanup services rely on.
///
/// Paths are relative to `/api2/json`, e.g. `nodes/pve/qemu`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProxmoxApi: Send + Sync {
    /// Fetches one path and returns the `data` member of the response envelope.
    async fn get(&self, path: &str) -> ApiResult<Value>;

    /// Fetches every path concurrently.
    ///
    /// The output has one entry per input path, in input order; a failed
    /// request only affects its own entry.
    async fn get_many(&self, paths: &[String]) -> Vec<(String, ApiResult<Value>)> {
        let results = join_all(paths.iter().map(|path| self.get(path))).await;
        paths.iter().cloned().zip(results).collect()
    }

    /// Issues one DELETE and returns the task id (UPID) if the server started one.
    async fn delete(&self, path: &str) -> ApiResult<Option<String>>;
}

/// Decodes the `data` member of a response into a typed model.
pub(crate) fn decode<T: DeserializeOwned>(data: Value) -> ApiResult<T> {
    serde_json::from_value(data).map_err(|e| ApiError::Decode {
        message: e.to_string(),
    })
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
}

/// HTTP client bound to one authenticated [`Session`].
///
/// Every request carries the session cookie and CSRF token. The session is
/// never refreshed; requests made after the ticket lifetime are still sent
/// and the server's answer is reported as-is.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    session: Arc<Session>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    pub(crate) fn new(
        http_client: Client,
        session: Session,
        rate_limit: Option<RateLimitConfig>,
    ) -> Self {
        let rate_limiter = rate_limit.map(|rl| {
            let quota = Quota::per_second(rl.requests_per_second).allow_burst(rl.burst_size);
            Arc::new(DefaultDirectRateLimiter::direct(quota))
        });

        Self {
            http_client,
            session: Arc::new(session),
            rate_limiter,
        }
    }

    /// The session every request is made with.
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[instrument(skip(self))]
    async fn execute_request(&self, method: Method, path: &str) -> ApiResult<Value> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
        if self.session.is_expired() {
            warn!("session ticket is past its lifetime; the server may reject the request");
        }

        let url = self.session.url().api_url(path);
        let response = self
            .http_client
            .request(method, &url)
            .header(COOKIE, self.session.ticket().as_cookie_header())
            .header(CSRF_HEADER, self.session.csrf_token().as_str())
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "request failed without a response");
                ApiError::transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            debug!(status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope = response.json::<Envelope>().await.map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ProxmoxApi for ApiClient {
    async fn get(&self, path: &str) -> ApiResult<Value> {
        self.execute_request(Method::GET, path).await
    }

    async fn delete(&self, path: &str) -> ApiResult<Option<String>> {
        let data = self.execute_request(Method::DELETE, path).await?;
        Ok(data.as_str().map(str::to_string))
    }
}
