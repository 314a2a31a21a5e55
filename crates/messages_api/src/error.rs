use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum MessagesApiError {
    MissingApiKey,
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    MalformedResponse(String),
    Serde(JsonError),
    Cancelled,
    Unknown(String),
}

impl MessagesApiError {
    /// Returns the HTTP status code for status failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(status, _) => Some(status.as_u16()),
            Self::Request(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

impl ErrorPayloadFields {
    pub fn message_with_type(&self) -> Option<String> {
        let message = self.message.as_deref().and_then(non_empty_string)?;
        match self.type_.as_deref().and_then(non_empty_string) {
            Some(kind) => Some(format!("{kind}: {message}")),
            None => Some(message.to_owned()),
        }
    }
}

impl fmt::Display for MessagesApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::MalformedResponse(message) => write!(f, "malformed response: {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for MessagesApiError {}

impl From<reqwest::Error> for MessagesApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for MessagesApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Turn an error response body into a human-readable message.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.to_string()
        }
    };

    let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) else {
        return fallback();
    };

    parsed
        .value
        .and_then(|error| error.message_with_type())
        .unwrap_or_else(fallback)
}

fn non_empty_string(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
