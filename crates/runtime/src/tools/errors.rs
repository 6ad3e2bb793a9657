use thiserror::Error;

/// Errors that can occur during tool execution.
///
/// These never cross the registry boundary: the registry turns them into
/// `{error: true, message}` results for the model to read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    /// The tool ran but could not produce a result.
    #[error("Tool failed: {0}")]
    Execution(String),
}
