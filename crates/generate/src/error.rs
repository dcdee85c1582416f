use std::time::Duration;

use {framecast_common::FromMessage, reqwest::StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{provider} API key not configured")]
    NotConfigured { provider: &'static str },

    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// The remote job reported an error in its status payload.
    #[error("Operation failed with message: {message}")]
    OperationFailed { code: i32, message: String },

    #[error("No images were generated{}", reason_suffix(.reason))]
    NoImage { reason: Option<String> },

    #[error("No videos were generated{}", reason_suffix(.reason))]
    NoVideo { reason: Option<String> },

    #[error("Generated video is missing a URI.")]
    MissingVideoUri,

    #[error("Failed to fetch video: {status}")]
    Download { status: StatusCode },

    #[error("operation {operation} still running after {}s", .waited.as_secs())]
    Timeout { operation: String, waited: Duration },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error("invalid base64 media payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("{message}")]
    Message { message: String },
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {r}"),
        None => ".".into(),
    }
}

impl Error {
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

framecast_common::impl_context!();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_messages() {
        assert_eq!(
            Error::NoImage { reason: None }.to_string(),
            "No images were generated."
        );
        assert_eq!(
            Error::NoVideo {
                reason: Some("blocked by safety filter".into())
            }
            .to_string(),
            "No videos were generated: blocked by safety filter"
        );
    }

    #[test]
    fn operation_and_download_messages() {
        let err = Error::OperationFailed {
            code: 3,
            message: "prompt rejected".into(),
        };
        assert_eq!(err.to_string(), "Operation failed with message: prompt rejected");

        let err = Error::Download {
            status: StatusCode::FORBIDDEN,
        };
        assert_eq!(err.to_string(), "Failed to fetch video: 403 Forbidden");
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = Error::Timeout {
            operation: "models/veo/operations/1".into(),
            waited: Duration::from_secs(120),
        };
        assert_eq!(
            err.to_string(),
            "operation models/veo/operations/1 still running after 120s"
        );
    }
}
