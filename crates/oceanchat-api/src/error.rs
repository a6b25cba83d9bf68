/// Transport-level failure taxonomy. Payloads are plain strings so values
/// stay `Clone` after crossing the backend seam.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response. `body` is the response text, or the status line's
    /// canonical reason when the body is empty.
    #[error("API {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    /// 2xx response that could not be decoded as the expected JSON shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_matches_wire_convention() {
        let err = ApiError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "API 500: boom");
    }

    #[test]
    fn terminal_errors_have_stable_descriptions() {
        assert_eq!(ApiError::Timeout.to_string(), "Request timed out");
        assert_eq!(ApiError::Cancelled.to_string(), "Request cancelled");
    }
}
