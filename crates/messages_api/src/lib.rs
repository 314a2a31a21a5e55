//! Transport-only client primitives for the model messages endpoint.
//!
//! This crate owns request building, header construction, and response/error
//! body parsing for one non-streaming request/response exchange. It contains no
//! conversation state and no knowledge of how response text is consumed.
//!
//! A non-success status abandons the request: there is no transport-level
//! retry, the caller decides whether to resend.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod response;
pub mod url;

pub use client::{CancellationSignal, MessagesApiClient};
pub use config::MessagesApiConfig;
pub use error::MessagesApiError;
pub use payload::{MessagesRequest, RequestMessage};
pub use response::extract_response_text;
pub use url::normalize_messages_url;

pub use reqwest::StatusCode;
