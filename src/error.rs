//! Error types for the sandbox pipeline.
//!
//! Edge cases inside the stages themselves (empty input, stack underflow, unknown
//! symbols) are handled by guards and never surface here. These variants cover
//! caller-contract violations only.

use thiserror::Error;

/// Errors produced while configuring or running the pipeline.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The requested iteration count exceeds the configured maximum.
    #[error("iteration count {requested} exceeds the maximum of {max}")]
    IterationLimit { requested: u32, max: u32 },

    /// A production rule was keyed by a control symbol (`+`, `-`, `[`, `]`).
    #[error("'{0}' is a reserved control symbol and cannot carry a production rule")]
    ReservedSymbol(char),

    /// The draw and move symbols were configured to the same character.
    #[error("'{0}' cannot be both the draw symbol and the move symbol")]
    SymbolClash(char),

    /// The padded viewport has no drawable area left.
    #[error("viewport {width}x{height} has no drawable area with padding {padding}")]
    InvalidViewport { width: f64, height: f64, padding: f64 },

    /// Step length must be finite and strictly positive.
    #[error("invalid step length: {0}")]
    InvalidStep(f64),

    /// Turn angle must be finite.
    #[error("invalid turn angle: {0}")]
    InvalidAngle(f64),

    /// The symbol table refused to intern or store a symbol.
    #[error("symbol table error: {0}")]
    SymbolTable(String),

    /// A scene or configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_limit_mentions_both_bounds() {
        let msg = SandboxError::IterationLimit {
            requested: 20,
            max: 12,
        }
        .to_string();
        assert!(msg.contains("20") && msg.contains("12"), "got: {msg}");
    }

    #[test]
    fn reserved_symbol_names_the_symbol() {
        let msg = SandboxError::ReservedSymbol('[').to_string();
        assert!(msg.contains('['), "got: {msg}");
    }

    #[test]
    fn symbol_clash_names_the_symbol() {
        let msg = SandboxError::SymbolClash('F').to_string();
        assert!(msg.contains('F'), "got: {msg}");
    }

    #[test]
    fn sandbox_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SandboxError>();
    }
}
