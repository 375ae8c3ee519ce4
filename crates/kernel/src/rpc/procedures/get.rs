//! `get` procedure - fetch a single item by id.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use quire_schema::Schema;
use quire_versioning::Version;

use crate::error::RpcError;
use crate::rpc::context::RpcContext;
use crate::rpc::types::{Procedure, ProcedureName, ProcedureSchemas};

use super::{
    deserialize_version, output_schema, parse_input, resolve_content_type, storage_context,
    version_gate,
};

fn input_schema() -> Schema {
    Schema::object([
        ("contentTypeId", Schema::string().required()),
        ("id", Schema::string().min_length(1).required()),
        ("version", Schema::number().required()),
        ("options", Schema::plain_object().optional()),
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetInput {
    content_type_id: String,
    id: String,
    #[serde(default, deserialize_with = "deserialize_version")]
    version: Option<Version>,
    #[serde(default)]
    options: Option<Value>,
}

pub struct Get {
    schemas: ProcedureSchemas,
}

impl Get {
    pub fn new() -> Self {
        Self {
            schemas: ProcedureSchemas {
                input: input_schema(),
                output: output_schema(),
            },
        }
    }
}

impl Default for Get {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Procedure for Get {
    fn name(&self) -> ProcedureName {
        ProcedureName::Get
    }

    fn schemas(&self) -> &ProcedureSchemas {
        &self.schemas
    }

    async fn run(&self, ctx: &RpcContext, input: Value) -> Result<Value, RpcError> {
        let input: GetInput = parse_input(input)?;

        let definition = resolve_content_type(ctx, &input.content_type_id)?;
        let version = version_gate(&definition, input.version)?;

        let storage_ctx = storage_context(ctx, version);
        let item = definition
            .storage
            .get(&storage_ctx, &input.id, input.options)
            .await?;

        debug!(content_type = %input.content_type_id, id = %input.id, "get complete");

        Ok(json!({
            "contentTypeId": input.content_type_id,
            "item": item,
        }))
    }
}
