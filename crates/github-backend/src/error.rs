use labelsync_core::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The endpoint answered 200 but reported errors and no data
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("Empty response for {0}")]
    EmptyResponse(String),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

impl From<GitHubError> for SyncError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Http(e) => SyncError::Http(e.to_string()),
            GitHubError::Parse(e) => SyncError::Parse(e.to_string()),
            GitHubError::Io(e) => SyncError::Io(e.to_string()),
            GitHubError::Unauthorized => SyncError::Unauthorized,
            GitHubError::RateLimited => SyncError::Api {
                status: 429,
                message: "GitHub API rate limit exceeded".to_string(),
            },
            GitHubError::Api { status, message } => SyncError::Api { status, message },
            GitHubError::GraphQl(messages) => SyncError::Api {
                status: 200,
                message: messages.join("; "),
            },
            GitHubError::EmptyResponse(what) => SyncError::EmptyResponse(what),
        }
    }
}
