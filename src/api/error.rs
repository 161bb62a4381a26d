use thiserror::Error;

/// Errors produced by the API client and its cache layer.
///
/// The variants are `Clone` because an in-flight request may be shared by
/// several concurrent callers, all of which must observe the same outcome.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request was superseded by a newer request for the same cache key.
    #[error("request cancelled")]
    Cancelled,

    /// No response was received at all.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with field-level validation errors.
    #[error("validation failed: {}", summary(.fields))]
    Validation {
        status: u16,
        fields: Vec<(String, String)>,
    },

    /// The server answered with a non-success status and a plain message.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The response body did not have the shape we expected.
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Message suitable for showing directly to a user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Cancelled => "Request cancelled".to_string(),
            ApiError::Network(_) => {
                "Could not reach the server. Please check your connection.".to_string()
            }
            ApiError::Validation { fields, .. } => summary(fields),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Malformed(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

fn summary(fields: &[(String, String)]) -> String {
    match fields.first() {
        Some((field, message)) => format!("{}: {}", field, message),
        None => "invalid request".to_string(),
    }
}
