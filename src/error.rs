use std::path::PathBuf;

pub type LoginResult<T> = Result<T, LoginError>;

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{command}: failed to launch: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command}: stderr: {stderr}, stdout: {stdout}")]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("missing metadata field: {0}")]
    MissingField(String),

    #[error("no web root found under {}", .0.display())]
    WebRootNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
