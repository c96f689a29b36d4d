use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failure of one hydrant load cycle. Terminal for that attempt; nothing
/// retries automatically.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("overpass returned HTTP {status}")]
    Transport { status: u16 },
    #[error("overpass request failed: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("overpass response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("overpass returned no elements")]
    EmptyResult,
}

impl LoadError {
    /// Short German message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Transport { status } => format!("HTTP Fehler {status}"),
            // browsers report unreachable hosts as status 0
            LoadError::Unreachable(_) => "HTTP Fehler 0".to_string(),
            LoadError::Decode(_) => "Die Server-Antwort konnte nicht gelesen werden".to_string(),
            LoadError::EmptyResult => {
                "Die Server-Abfrage hat keine Hydranten zurückgeliefert".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("nothing to highlight for the current filter")]
    Disabled,
    #[error("a highlight commit is already in progress")]
    Pending,
}

impl From<CommitError> for AppError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Disabled => AppError::unprocessable(err.to_string()),
            CommitError::Pending => AppError::conflict(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_have_distinct_user_messages() {
        assert_eq!(
            LoadError::Transport { status: 504 }.user_message(),
            "HTTP Fehler 504"
        );
        assert_eq!(
            LoadError::EmptyResult.user_message(),
            "Die Server-Abfrage hat keine Hydranten zurückgeliefert"
        );
        let decode = serde_json::from_str::<serde_json::Value>("<html>")
            .map_err(LoadError::from)
            .expect_err("invalid json");
        assert_ne!(decode.user_message(), LoadError::EmptyResult.user_message());
    }

    #[test]
    fn commit_errors_map_to_http_statuses() {
        assert_eq!(AppError::from(CommitError::Pending).status, StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(CommitError::Disabled).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
