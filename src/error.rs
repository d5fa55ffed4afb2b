use thiserror::Error;

/// Typed failures of the hierarchy primitives that callers may branch on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("municipality {0} not found in hierarchy")]
    MunicipalityNotFound(u32),

    #[error("UTP {0} not found in hierarchy")]
    UtpNotFound(String),

    #[error("UTP {utp} still has {members} members")]
    UtpNotEmpty { utp: String, members: usize },

    #[error("seat {code} is not a member of UTP {utp}")]
    SeatNotFound { utp: String, code: u32 },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
