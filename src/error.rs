use thiserror::Error;

/// Failure surfaces the core can encounter. The core never bubbles these up
/// to an external caller mid-protocol (see spec §7) - they're used internally
/// by the Probe Engine (to fold transport failures into a timeout) and at the
/// construction/config boundary, where a caller legitimately wants to know
/// why startup failed.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("listener bind failed: {0}")]
    Bind(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
