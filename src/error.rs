use std::path::PathBuf;

use chat_provider::ProviderFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("API key is not configured")]
    ConfigMissing,

    #[error("{}", describe_transport(.code, .message))]
    Transport { code: Option<u16>, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("content for {path} does not begin with a scene root marker")]
    InvalidDocumentContent { path: PathBuf },

    #[error("failed to write {path} after {attempts} attempt(s): {source}")]
    WriteFailed {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("no scene file is attached; attach a .tscn file first")]
    NoActiveTarget,

    #[error("failed to create directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("script path {path} points outside the project")]
    PathOutsideProject { path: String },

    #[error("cannot attach {path}: {message}")]
    Attachment { path: String, message: String },
}

impl ChatError {
    pub fn attachment(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attachment {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn directory_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreation {
            path: path.into(),
            source,
        }
    }
}

impl From<ProviderFailure> for ChatError {
    fn from(failure: ProviderFailure) -> Self {
        match failure {
            ProviderFailure::ConfigMissing => Self::ConfigMissing,
            ProviderFailure::Transport { code, message } => Self::Transport { code, message },
            ProviderFailure::MalformedResponse { message } => Self::MalformedResponse(message),
        }
    }
}

fn describe_transport(code: &Option<u16>, message: &str) -> String {
    match code {
        Some(code) => format!("API error {code}: {message}"),
        None => format!("transport error: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_includes_status_code_when_known() {
        let error = ChatError::from(ProviderFailure::Transport {
            code: Some(401),
            message: "authentication_error: invalid x-api-key".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "API error 401: authentication_error: invalid x-api-key"
        );

        let error = ChatError::from(ProviderFailure::Transport {
            code: None,
            message: "connection refused".to_string(),
        });
        assert_eq!(error.to_string(), "transport error: connection refused");
    }

    #[test]
    fn provider_failures_map_onto_matching_variants() {
        assert!(matches!(
            ChatError::from(ProviderFailure::ConfigMissing),
            ChatError::ConfigMissing
        ));
        assert!(matches!(
            ChatError::from(ProviderFailure::MalformedResponse {
                message: "no text".to_string(),
            }),
            ChatError::MalformedResponse(message) if message == "no text"
        ));
    }

    #[test]
    fn write_failure_reports_attempts_and_source() {
        let error = ChatError::WriteFailed {
            path: PathBuf::from("scenes/main.tscn"),
            attempts: 3,
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"),
        };
        assert_eq!(
            error.to_string(),
            "failed to write scenes/main.tscn after 3 attempt(s): locked"
        );
        assert!(std::error::Error::source(&error).is_some());
    }
}
