//! `create` procedure - store a new item.

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
        ("version", Schema::number().required()),
        ("data", Schema::plain_object().required()),
        ("options", Schema::plain_object().optional()),
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInput {
    content_type_id: String,
    #[serde(default, deserialize_with = "deserialize_version")]
    version: Option<Version>,
    data: Value,
    #[serde(default)]
    options: Option<Value>,
}

pub struct Create {
    schemas: ProcedureSchemas,
}

impl Create {
    pub fn new() -> Self {
        Self {
            schemas: ProcedureSchemas {
                input: input_schema(),
                output: output_schema(),
            },
        }
    }
}

impl Default for Create {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Procedure for Create {
    fn name(&self) -> ProcedureName {
        ProcedureName::Create
    }

    fn schemas(&self) -> &ProcedureSchemas {
        &self.schemas
    }

    async fn run(&self, ctx: &RpcContext, input: Value) -> Result<Value, RpcError> {
        let input: CreateInput = parse_input(input)?;

        let definition = resolve_content_type(ctx, &input.content_type_id)?;
        let version = version_gate(&definition, input.version)?;

        let storage_ctx = storage_context(ctx, version);
        let result = definition
            .storage
            .create(&storage_ctx, input.data, input.options)
            .await?;

        debug!(content_type = %input.content_type_id, "create complete");

        ctx.registry.event_bus().emit(&ContentEvent::ItemCreated {
            content_type_id: input.content_type_id.clone(),
            result: result.clone(),
        });

        Ok(json!({
            "contentTypeId": input.content_type_id,
            "result": result,
        }))
    }
}
