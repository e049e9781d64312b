use thiserror::Error;

pub type AdvisorResult<T> = Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Spreadsheet decode error: {0}")]
    Decode(String),

    #[error("Transcript is empty: no row has both Course_Code and Grade")]
    EmptyTranscript,

    #[error("No advising session found. Run 'curricraft session <STUDENT_ID>' first")]
    MissingSession,

    #[error("Student ID is required")]
    MissingStudentId,

    #[error("Remote call '{operation}' failed: {message}")]
    RemoteCall {
        operation: &'static str,
        message: String,
    },

    #[error("State store error: {0}")]
    State(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl AdvisorError {
    /// Build a [`AdvisorError::RemoteCall`] for the named operation
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        AdvisorError::RemoteCall {
            operation,
            message: message.into(),
        }
    }
}
