use thiserror::Error;

/// Errors shared by the sync engine and every remote backend
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Authentication failed")]
    Unauthorized,

    #[error(
        "Organization not found: {0}, check your token and the provided org name"
    )]
    OrganizationNotFound(String),

    #[error(
        "Source repository {repository} not found in the org {organization}, please update the source repository setting"
    )]
    SourceRepositoryNotFound {
        organization: String,
        repository: String,
    },

    #[error(
        "Too many errors ({attempts} in a row) when loading {query} from GitHub, stopping the import process"
    )]
    FetchExhausted { query: String, attempts: u32 },

    #[error("Remote returned no usable payload: {0}")]
    EmptyResponse(String),

    #[error("Labels planned for both update and delete: {}", .0.join(", "))]
    ConflictingDirectives(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl SyncError {
    /// Failures where repeating the same request may succeed
    ///
    /// Status 200 is how GraphQL errors without data arrive.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::EmptyResponse(_)
            | SyncError::Http(_)
            | SyncError::Parse(_)
            | SyncError::Io(_) => true,
            SyncError::Api { status, .. } => *status == 200 || *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
