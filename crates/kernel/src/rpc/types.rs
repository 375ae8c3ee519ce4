//! Procedure contract types.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use quire_schema::Schema;

use crate::error::RpcError;
use crate::rpc::context::RpcContext;

/// The closed set of RPC procedures. The set is fixed at compile time; the
/// dispatcher maps wire names onto these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureName {
    Get,
    BulkGet,
    Create,
    Update,
    Delete,
    Search,
}

impl ProcedureName {
    pub const ALL: [Self; 6] = [
        Self::Get,
        Self::BulkGet,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Search,
    ];

    /// Wire name, as callers spell it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::BulkGet => "bulkGet",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
        }
    }

    /// Resolve a wire name. Unknown names resolve to nothing; the
    /// dispatcher turns that into its not-registered error.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for ProcedureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared input/output contract of a procedure, used by the dispatcher to
/// validate both directions and exposed for introspection.
#[derive(Debug, Clone)]
pub struct ProcedureSchemas {
    pub input: Schema,
    pub output: Schema,
}

/// One RPC procedure: a declared contract plus an async handler over the
/// request context.
#[async_trait]
pub trait Procedure: Send + Sync {
    fn name(&self) -> ProcedureName;

    fn schemas(&self) -> &ProcedureSchemas;

    /// Execute the procedure. Input has already passed the declared input
    /// schema when invoked through the dispatcher.
    async fn run(&self, ctx: &RpcContext, input: Value) -> Result<Value, RpcError>;
}
