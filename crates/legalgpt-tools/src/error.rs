use thiserror::Error;

/// Failure modes of a tool invocation.
///
/// All variants are recoverable from the turn's perspective: the caller
/// reports the failure back to the model and the turn continues.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed schema validation; the backing capability was never
    /// contacted.
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    /// The document search backend was unreachable or returned an error.
    #[error("document search unavailable: {0}")]
    SearchUnavailable(String),

    /// The model asked for a tool this dispatcher does not declare.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}
