//! Quire Kernel Library
//!
//! The versioned content-management RPC layer: content-type backends
//! register a storage capability and a latest wire-schema version with the
//! [`core::ContentRegistry`]; callers reach them through the fixed procedure
//! set dispatched by [`rpc::RpcService`], with payloads validated against
//! declared schemas and adapted across schema versions on demand.

pub mod config;
pub mod core;
pub mod error;
pub mod rpc;

pub use config::KernelConfig;
pub use core::{
    ContentEvent, ContentRegistry, ContentStorage, ContentTypeDefinition, ContentTypeVersion,
    EventBus, RequestHandlerContext, StorageContext, StorageContextUtils, SubscriptionId,
    VersionInfo,
};
pub use error::{RegistryError, RpcError};
pub use rpc::{Procedure, ProcedureName, ProcedureSchemas, RpcContext, RpcService};
