use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::LINK;
use serde_json::Value;
use url::Url;

use crate::canvas::error::{CanvasError, CanvasResult};
use crate::canvas::item::{RemoteItem, ResourceKind};
use crate::canvas::link::next_link;
use crate::config::CanvasConfig;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CanvasClient {
    client: Client,
    api_root: String,
    token: String,
    course_id: u64,
    max_pages: usize,
    retry: RetryPolicy,
}

struct Page {
    values: Vec<Value>,
    next: Option<Url>,
}

impl CanvasClient {
    pub fn new(
        base_url: &str,
        token: String,
        course_id: u64,
        timeout: Duration,
        max_pages: usize,
        retry: RetryPolicy,
    ) -> CanvasResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CanvasError::Transport(err.to_string()))?;
        let trimmed = base_url.trim_end_matches('/');
        let api_root = if trimmed.ends_with("/api/v1") {
            trimmed.to_string()
        } else {
            format!("{trimmed}/api/v1")
        };
        Ok(Self {
            client,
            api_root,
            token,
            course_id,
            max_pages: max_pages.max(1),
            retry,
        })
    }

    pub fn from_config(config: &CanvasConfig) -> CanvasResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| CanvasError::InvalidUrl("missing base url".to_string()))?;
        Self::new(
            base_url,
            config.token.clone().unwrap_or_default(),
            config.course_id.unwrap_or_default(),
            config.request_timeout(),
            config.max_pages(),
            RetryPolicy {
                max_attempts: config.max_attempts(),
                base_backoff: config.base_backoff(),
                max_backoff: config.max_backoff(),
            },
        )
    }

    pub fn endpoint_url(&self, kind: ResourceKind) -> CanvasResult<Url> {
        let raw = format!(
            "{}/courses/{}/{}",
            self.api_root,
            self.course_id,
            kind.endpoint()
        );
        Url::parse(&raw).map_err(|err| CanvasError::InvalidUrl(format!("{raw}: {err}")))
    }

    /// Retrieves every page of the collection for `kind`, in server order.
    pub async fn fetch(&self, kind: ResourceKind) -> CanvasResult<Vec<RemoteItem>> {
        let mut url = self.endpoint_url(kind)?;
        let mut visited = HashSet::new();
        let mut items = Vec::new();
        loop {
            if !visited.insert(url.to_string()) {
                tracing::warn!(
                    event = "pagination_cycle",
                    kind = %kind,
                    url = %url,
                    "next link repeats an earlier page; stopping"
                );
                break;
            }
            if visited.len() > self.max_pages {
                tracing::warn!(
                    event = "pagination_cap",
                    kind = %kind,
                    max_pages = self.max_pages,
                    "page limit reached; stopping"
                );
                break;
            }
            let page = self.get_page_with_retry(&url).await?;
            for value in page.values {
                items.push(RemoteItem::from_json(kind, value)?);
            }
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(items)
    }

    async fn get_page_with_retry(&self, url: &Url) -> CanvasResult<Page> {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.get_page(url).await {
                Ok(page) => return Ok(page),
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let backoff = compute_backoff(attempt, &self.retry);
                    tracing::debug!(
                        event = "canvas_retry",
                        url = %url,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "retrying Canvas request"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_page(&self, url: &Url) -> CanvasResult<Page> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|err| CanvasError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CanvasError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| next_link(value, url));
        let body = response
            .text()
            .await
            .map_err(|err| CanvasError::Transport(err.to_string()))?;
        let parsed: Value =
            serde_json::from_str(&body).map_err(|err| CanvasError::Decode(err.to_string()))?;
        let values = match parsed {
            Value::Array(values) => values,
            Value::Object(_) => vec![parsed],
            other => {
                return Err(CanvasError::Decode(format!(
                    "expected a JSON list or object, got {other}"
                )));
            }
        };
        Ok(Page { values, next })
    }
}

fn compute_backoff(attempt: usize, policy: &RetryPolicy) -> Duration {
    let exp = attempt.saturating_sub(1) as u32;
    let multiplier = 1u64.checked_shl(exp.min(10)).unwrap_or(u64::MAX);
    let base = policy.base_backoff.as_millis() as u64;
    let backoff = base.saturating_mul(multiplier);
    let max = policy.max_backoff.as_millis() as u64;
    Duration::from_millis(std::cmp::min(backoff, max))
}
