use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The native subsystem was already set up, typically by a concurrent caller.
    #[error("Bridge already initialized")]
    AlreadyInitialized,

    /// The native subsystem rejected a command because it has not been set up.
    #[error("Bridge not initialized")]
    NotInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
