//! Procedure dispatcher.
//!
//! Resolves a wire name to its procedure, validates the input against the
//! declared schema before the handler ever runs, and validates the handler's
//! result on the way out. Handler errors propagate unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use quire_schema::validate;

use crate::error::RpcError;
use crate::rpc::context::RpcContext;
use crate::rpc::procedures::{BulkGet, Create, Delete, Get, Search, Update};
use crate::rpc::types::{Procedure, ProcedureName, ProcedureSchemas};

/// The RPC dispatch table. The procedure set is closed; construction
/// registers every core procedure.
pub struct RpcService {
    procedures: HashMap<ProcedureName, Arc<dyn Procedure>>,
}

impl RpcService {
    /// Create a service with the full core procedure set registered.
    pub fn new() -> Self {
        let mut service = Self {
            procedures: HashMap::new(),
        };
        service.insert(Arc::new(Get::new()));
        service.insert(Arc::new(BulkGet::new()));
        service.insert(Arc::new(Create::new()));
        service.insert(Arc::new(Update::new()));
        service.insert(Arc::new(Delete::new()));
        service.insert(Arc::new(Search::new()));
        service
    }

    /// Replace a procedure's implementation. The name set stays closed;
    /// this swaps the handler behind an existing name.
    pub fn with_procedure(mut self, procedure: Arc<dyn Procedure>) -> Self {
        self.insert(procedure);
        self
    }

    fn insert(&mut self, procedure: Arc<dyn Procedure>) {
        self.procedures.insert(procedure.name(), procedure);
    }

    /// Registered procedure names.
    pub fn procedure_names(&self) -> Vec<ProcedureName> {
        ProcedureName::ALL
            .into_iter()
            .filter(|name| self.procedures.contains_key(name))
            .collect()
    }

    /// A procedure's declared contract, for introspection.
    pub fn schemas(&self, name: ProcedureName) -> Option<&ProcedureSchemas> {
        self.procedures.get(&name).map(|p| p.schemas())
    }

    /// Dispatch one call.
    pub async fn call(
        &self,
        ctx: &RpcContext,
        name: &str,
        input: Value,
    ) -> Result<Value, RpcError> {
        let procedure_name = ProcedureName::from_name(name)
            .ok_or_else(|| RpcError::ProcedureNotRegistered(name.to_string()))?;
        let procedure = self
            .procedures
            .get(&procedure_name)
            .ok_or_else(|| RpcError::ProcedureNotRegistered(name.to_string()))?;

        validate(&input, &procedure.schemas().input).map_err(RpcError::InputValidation)?;

        let output = procedure.run(ctx, input).await?;

        validate(&output, &procedure.schemas().output).map_err(RpcError::OutputValidation)?;

        debug!(procedure = %procedure_name, "procedure call complete");
        Ok(output)
    }
}

impl Default for RpcService {
    fn default() -> Self {
        Self::new()
    }
}
