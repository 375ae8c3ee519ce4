//! RPC surface: procedure definitions and dispatch.

mod context;
pub mod procedures;
mod service;
mod types;

pub use context::RpcContext;
pub use service::RpcService;
pub use types::{Procedure, ProcedureName, ProcedureSchemas};
