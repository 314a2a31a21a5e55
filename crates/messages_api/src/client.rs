use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::config::MessagesApiConfig;
use crate::error::{parse_error_message, MessagesApiError};
use crate::headers::build_headers;
use crate::payload::MessagesRequest;
use crate::response::extract_response_text;
use crate::url::normalize_messages_url;

/// Optional cancellation signal shared with the awaiting request.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct MessagesApiClient {
    http: Client,
    config: MessagesApiConfig,
}

impl MessagesApiClient {
    pub fn new(config: MessagesApiConfig) -> Result<Self, MessagesApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(MessagesApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &MessagesApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_messages_url(&self.config.api_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, MessagesApiError> {
        let headers = build_headers(&self.config)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| MessagesApiError::InvalidHeader(format!("invalid key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    MessagesApiError::InvalidHeader(format!("invalid value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &MessagesRequest,
    ) -> Result<reqwest::RequestBuilder, MessagesApiError> {
        let headers = self.build_headers()?;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(request))
    }

    /// Sends one request and returns the first text element of the response.
    ///
    /// Non-success statuses are returned as [`MessagesApiError::Status`] with the
    /// parsed error message; they are not retried.
    pub async fn send(
        &self,
        request: &MessagesRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<String, MessagesApiError> {
        if is_cancelled(cancellation) {
            return Err(MessagesApiError::Cancelled);
        }

        let response = self.build_request(request)?.send();
        let response = await_or_cancel(response, cancellation)
            .await?
            .map_err(MessagesApiError::from)?;

        let status = response.status();
        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .map_err(MessagesApiError::from)?;

        if !status.is_success() {
            return Err(MessagesApiError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        extract_response_text(&body)
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, MessagesApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(MessagesApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(MessagesApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
