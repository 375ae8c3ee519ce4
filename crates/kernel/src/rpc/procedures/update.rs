//! `update` procedure - rewrite an existing item.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use quire_schema::Schema;
use quire_versioning::Version;

use crate::core::event_bus::ContentEvent;
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
        ("data", Schema::plain_object().required()),
        ("options", Schema::plain_object().optional()),
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateInput {
    content_type_id: String,
    id: String,
    #[serde(default, deserialize_with = "deserialize_version")]
    version: Option<Version>,
    data: Value,
    #[serde(default)]
    options: Option<Value>,
}

pub struct Update {
    schemas: ProcedureSchemas,
}

impl Update {
    pub fn new() -> Self {
        Self {
            schemas: ProcedureSchemas {
                input: input_schema(),
                output: output_schema(),
            },
        }
    }
}

impl Default for Update {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Procedure for Update {
    fn name(&self) -> ProcedureName {
        ProcedureName::Update
    }

    fn schemas(&self) -> &ProcedureSchemas {
        &self.schemas
    }

    async fn run(&self, ctx: &RpcContext, input: Value) -> Result<Value, RpcError> {
        let input: UpdateInput = parse_input(input)?;

        let definition = resolve_content_type(ctx, &input.content_type_id)?;
        let version = version_gate(&definition, input.version)?;

        let storage_ctx = storage_context(ctx, version);
        let result = definition
            .storage
            .update(&storage_ctx, &input.id, input.data, input.options)
            .await?;

        debug!(content_type = %input.content_type_id, id = %input.id, "update complete");

        ctx.registry.event_bus().emit(&ContentEvent::ItemUpdated {
            content_type_id: input.content_type_id.clone(),
            item_id: input.id.clone(),
            result: result.clone(),
        });

        Ok(json!({
            "contentTypeId": input.content_type_id,
            "result": result,
        }))
    }
}
