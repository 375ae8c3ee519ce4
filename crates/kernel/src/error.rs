//! Kernel error types.
//!
//! Error messages are the caller-facing surface of this layer: clients
//! pattern-match on message text, so the bracketed formats are part of the
//! wire contract.

use thiserror::Error;

use quire_schema::ValidationError;
use quire_versioning::Version;

/// Errors raised while registering content types (setup phase).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Content [{0}] is already registered.")]
    AlreadyRegistered(String),

    #[error("Content type id cannot be empty.")]
    EmptyId,

    #[error("Invalid version [{latest}] for content [{id}]. Versions start at [1].")]
    InvalidLatestVersion { id: String, latest: Version },
}

/// Errors raised by RPC dispatch and procedure execution.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The procedure name resolved to nothing.
    #[error("Procedure [{0}] is not registered.")]
    ProcedureNotRegistered(String),

    /// The input failed the procedure's declared schema. Raised before the
    /// handler runs; handlers never see malformed input.
    #[error(transparent)]
    InputValidation(ValidationError),

    /// The handler's result failed the declared output schema. Indicates a
    /// handler bug and fails loudly rather than returning a bad envelope.
    #[error(transparent)]
    OutputValidation(ValidationError),

    /// The `contentTypeId` has no registration.
    #[error("Content [{0}] is not registered.")]
    ContentTypeNotRegistered(String),

    /// The requested version exceeds the type's latest registered version.
    #[error("Invalid version. Latest version is [{latest}].")]
    InvalidVersion { requested: Version, latest: Version },

    /// A `bulkGet` id batch exceeded the configured cap.
    #[error("Too many ids. Maximum batch size is [{max}].")]
    BulkBatchTooLarge { count: usize, max: usize },

    /// Storage backend failure, propagated unchanged. No retries at this
    /// layer.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
