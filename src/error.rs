//! Error types for the step-coder crate.
//!
//! The taxonomy mirrors how failures surface to callers: protocol and
//! transport errors end the current run; tool failures never reach this
//! enum at all (they become text observations the model can react to).

/// Agent-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The model response was not a valid step object. Terminal for the
    /// current run; carries the raw text for diagnosis.
    #[error("failed to parse model response as a step: {reason}\nraw response: {raw}")]
    Protocol { raw: String, reason: String },

    /// The model emitted a step kind outside the protocol
    /// (not START/PLAN/TOOL/OUTPUT).
    #[error("unrecognized step kind: {kind:?}")]
    UnrecognizedStep { kind: String },

    /// The chat-completions request itself failed (network, auth, quota).
    /// Terminal for the current run; no retry.
    #[error("model request failed: {0}")]
    Transport(String),

    /// The loop hit the configured turn cap without an OUTPUT step.
    #[error("turn limit exceeded: no OUTPUT after {limit} model calls")]
    TurnLimit { limit: usize },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error with context.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for step-coder operations.
pub type AgentResult<T> = Result<T, AgentError>;
