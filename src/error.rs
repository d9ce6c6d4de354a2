use thiserror::Error;

/// Narrow error enum for the boundaries that need to match on error kind:
/// transient external / data malformed / invariant violation. Everything
/// above the controller collapses into `anyhow::Error`.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("rpc error: {0}")]
    Rpc(#[from] anyhow::Error),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("decode error: {0}")]
    Decode(#[from] CodecError),

    #[error("invariant violation: {0}")]
    Invariant(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("payload too short: need at least {need} bytes, got {got}")]
    TooShort { need: usize, got: usize },

    #[error("molecule table size mismatch: header says {declared}, slice has {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("unknown opcode {0:#x}")]
    UnknownOpcode(u8),

    #[error("unsupported entry version {0}")]
    UnsupportedVersion(u8),

    #[error("invalid meta type")]
    InvalidMetaType,

    #[error("invalid cota_id: expected a 42-character 0x-prefixed hex string, got {0:?}")]
    InvalidCotaId(String),

    #[error("malformed metadata json: {0}")]
    MalformedJson(String),
}
