//! The core procedure implementations.
//!
//! Every handler follows the same shape: deserialize the (already
//! schema-validated) input, resolve the content type, gate the requested
//! version against the registration's latest, build a fresh storage
//! context, delegate to the backend, and wrap the raw result in the
//! procedure's envelope.

mod bulk_get;
mod create;
mod delete;
mod get;
mod search;
mod update;

pub use bulk_get::BulkGet;
pub use create::Create;
pub use delete::Delete;
pub use get::Get;
pub use search::Search;
pub use update::Update;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use quire_schema::{Schema, ValidationError};
use quire_versioning::Version;

use crate::core::registry::ContentTypeDefinition;
use crate::core::storage::{StorageContext, VersionInfo};
use crate::error::RpcError;
use crate::rpc::context::RpcContext;

/// Deserialize a procedure's typed input from the raw payload.
fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, RpcError> {
    serde_json::from_value(input)
        .map_err(|e| RpcError::InputValidation(ValidationError::new(e.to_string())))
}

/// Resolve a content type or fail with the caller-facing message.
fn resolve_content_type(ctx: &RpcContext, id: &str) -> Result<ContentTypeDefinition, RpcError> {
    ctx.registry
        .get(id)
        .ok_or_else(|| RpcError::ContentTypeNotRegistered(id.to_string()))
}

/// Gate the requested version against the registration's latest. A call
/// without an explicit version is served at latest.
fn version_gate(
    definition: &ContentTypeDefinition,
    requested: Option<Version>,
) -> Result<VersionInfo, RpcError> {
    let latest = definition.version.latest;
    let request = requested.unwrap_or(latest);
    if request > latest {
        return Err(RpcError::InvalidVersion {
            requested: request,
            latest,
        });
    }
    Ok(VersionInfo { request, latest })
}

/// Build the per-call storage context.
fn storage_context(ctx: &RpcContext, version: VersionInfo) -> StorageContext {
    StorageContext::new(ctx.request_handler_context.clone(), version)
}

/// The shared output contract: a plain object or an array of plain objects.
fn output_schema() -> Schema {
    Schema::one_of([
        Schema::plain_object(),
        Schema::array_of(Schema::plain_object()),
    ])
}

/// Wire form of a version number: a JSON number or a numeric string.
/// Used on typed inputs via `deserialize_with`.
fn deserialize_version<'de, D>(deserializer: D) -> Result<Option<Version>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| Version::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("Invalid version [{n}]. Must be a positive integer."))
            }),
        Value::String(s) => s.parse::<Version>().map(Some).map_err(|_| {
            serde::de::Error::custom(format!("Invalid version [{s}]. Must be a positive integer."))
        }),
        other => Err(serde::de::Error::custom(format!(
            "Invalid version [{other}]. Must be a positive integer."
        ))),
    }
}
