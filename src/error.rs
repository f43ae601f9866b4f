use thiserror::Error;

/// Message shown when the description is blank.
pub const EMPTY_DESCRIPTION_MESSAGE: &str = "Please enter a game description.";

/// Failures of the HTTP round trip itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("{0}")]
    Request(String),

    /// The body arrived but is not JSON.
    #[error("{0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// Everything that ends a submit cycle on the error panel.
///
/// `Display` is the exact text the error panel shows.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{}", EMPTY_DESCRIPTION_MESSAGE)]
    Validation,

    /// The server answered with an `error` field.
    #[error("{0}")]
    Application(String),

    #[error("An error occurred: {0}")]
    Transport(#[from] TransportError),
}

impl SubmitError {
    /// Short name used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Validation => "validation",
            SubmitError::Application(_) => "application",
            SubmitError::Transport(_) => "transport",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_panel_text() {
        assert_eq!(
            SubmitError::Validation.to_string(),
            "Please enter a game description."
        );
        assert_eq!(
            SubmitError::Application("bad input".to_string()).to_string(),
            "bad input"
        );
        let err = SubmitError::from(TransportError::Request("connection refused".to_string()));
        assert_eq!(err.to_string(), "An error occurred: connection refused");
        assert_eq!(err.kind(), "transport");
    }
}
