pub mod social;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::{debug, log_enabled, trace, warn};
use reqwest::{header, Client, Method, StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde_json::Value;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::{
    config::Config,
    error::{ErrorInfo, ProblemDetail},
};

pub use social::SocialApi;

const RETRY_LIMIT: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request/response channel to the social API.
///
/// Implementations own timeouts and retries; callers only see success or an [`ErrorInfo`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ErrorInfo>;

    async fn get(&self, path: &str) -> Result<Value, ErrorInfo> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ErrorInfo> {
        self.send(Method::POST, path, body).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> Result<Value, ErrorInfo> {
        self.send(Method::PUT, path, body).await
    }

    async fn delete(&self, path: &str) -> Result<Value, ErrorInfo> {
        self.send(Method::DELETE, path, None).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    semaphore: Arc<Semaphore>,
    base: Url,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, ErrorInfo> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ErrorInfo::connection)?;

        // `Url::join` drops the last segment unless the base ends with a slash
        let mut base = config.api_url().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| ErrorInfo::connection(format!("invalid api url: {}", e)))?;

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.limit().max(1))),
            base,
            token: config.token(),
        })
    }

    async fn client(&self) -> Result<(ClientWithMiddleware, SemaphorePermit), ErrorInfo> {
        let permit = self.semaphore.acquire().await.map_err(ErrorInfo::connection)?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(RETRY_LIMIT);
        let client = ClientBuilder::new(self.client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Ok((client, permit))
    }

    fn url(&self, path: &str) -> Result<Url, ErrorInfo> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ErrorInfo::connection(format!("invalid path {}: {}", path, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ErrorInfo> {
        let url = self.url(path)?;
        let (client, _permit) = self.client().await?;

        debug!("{} {}", method, url);
        let mut request = client.request(method, url);
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(ErrorInfo::connection)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ErrorInfo::connection)?;

        if !status.is_success() {
            let info = error_info(status, &bytes);
            if info.is_unauthorized() {
                warn!("The token is invalid or expired");
            }
            return Err(info);
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        // some endpoints answer with plain text
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        if log_enabled!(log::Level::Trace) {
            trace!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        }

        Ok(value)
    }
}

/// Builds the error for a failed response from its status and body.
///
/// A problem document supplies whatever fields it carries. Anything missing falls back
/// to the HTTP status and its reason phrase.
fn error_info(status: StatusCode, body: &[u8]) -> ErrorInfo {
    let problem = serde_json::from_slice::<ProblemDetail>(body).ok();
    let reason = || {
        status
            .canonical_reason()
            .unwrap_or("An unexpected error occurred.")
            .to_string()
    };

    match problem {
        Some(problem) => ErrorInfo {
            status: problem.status.unwrap_or(status.as_u16()),
            detail: problem.detail.unwrap_or_else(reason),
            title: problem.title,
        },
        None => ErrorInfo::new(status.as_u16(), reason()),
    }
}
