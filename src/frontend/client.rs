//! HTTP client for the backend api.
//!
//! Every call opens a client span under the caller's context and sends
//! that span's context in the `traceparent` header, so the backend's server
//! span becomes its child.

use std::time::Duration;

use opentelemetry::KeyValue;
use reqwest::header::HeaderMap;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use super::error::FrontendError;
use crate::config::BackendConfig;
use crate::store::Entry;
use crate::telemetry::{propagation, ActiveSpan, Context, SpanKind, Tracer};

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct AddEntryBody<'a> {
    key: &'a str,
    value: &'a str,
}

/// Client for `POST /add` and `GET /get_all`.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
    tracer: Tracer,
}

impl BackendClient {
    pub fn new(config: &BackendConfig, tracer: Tracer) -> Result<Self, ClientBuildError> {
        let mut base = Url::parse(&config.api_url).map_err(|source| ClientBuildError::InvalidUrl {
            url: config.api_url.clone(),
            source,
        })?;
        // Url::join replaces the last path segment unless the base ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { http, base, tracer })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `POST /add` with a JSON body.
    pub async fn add_entry(&self, cx: &Context, key: &str, value: &str) -> Result<(), FrontendError> {
        let (url, mut span) = self.prepare("POST", "add", cx)?;

        let request = self
            .http
            .post(url)
            .headers(propagation_headers(&span))
            .json(&AddEntryBody { key, value });

        let result = self.send(request, &mut span).await.map(|_| ());
        span.end();
        result
    }

    /// `GET /get_all`, decoded into entries.
    pub async fn list_entries(&self, cx: &Context) -> Result<Vec<Entry>, FrontendError> {
        let (url, mut span) = self.prepare("GET", "get_all", cx)?;

        let request = self.http.get(url).headers(propagation_headers(&span));

        let result = match self.send(request, &mut span).await {
            Ok(response) => match response.json::<Vec<Entry>>().await {
                Ok(entries) => {
                    span.set_attribute(KeyValue::new("kv.entries", entries.len() as i64));
                    Ok(entries)
                }
                Err(e) => {
                    let err = FrontendError::BackendUnavailable(format!("invalid response body: {}", e));
                    span.record_error(&err);
                    Err(err)
                }
            },
            Err(e) => Err(e),
        };
        span.end();
        result
    }

    fn prepare(&self, method: &'static str, path: &str, cx: &Context) -> Result<(Url, ActiveSpan), FrontendError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| FrontendError::BackendUnavailable(e.to_string()))?;

        let span = self
            .tracer
            .start_span(format!("{} /{}", method, path), SpanKind::Client, cx);
        span.set_attribute(KeyValue::new("http.method", method));
        span.set_attribute(KeyValue::new("http.url", url.to_string()));
        Ok((url, span))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        span: &mut ActiveSpan,
    ) -> Result<reqwest::Response, FrontendError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = FrontendError::BackendUnavailable(describe(&e));
                tracing::warn!(error = %e, "Backend request failed");
                span.record_error(&err);
                return Err(err);
            }
        };

        let status = response.status();
        span.set_attribute(KeyValue::new("http.status_code", i64::from(status.as_u16())));
        if !status.is_success() {
            let err = FrontendError::BackendUnavailable(format!("backend returned {}", status));
            tracing::warn!(status = %status, "Backend rejected request");
            span.record_error(&err);
            return Err(err);
        }
        Ok(response)
    }
}

fn propagation_headers(span: &ActiveSpan) -> HeaderMap {
    let mut headers = HeaderMap::new();
    propagation::inject(span.context(), &mut headers);
    headers
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        e.to_string()
    }
}
