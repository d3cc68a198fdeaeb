use thiserror::Error;

/// Top-level error type shared by every crate in the workspace.
///
/// The graph pipeline itself never fails; these variants cover the edges
/// where data enters the process (config files, captures, raw I/O).
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("config error: {0}")]
    Config(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
