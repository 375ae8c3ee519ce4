//! `search` procedure - query items through the backend's search
//! capability. Query construction is the backend's business; the kernel
//! only carries the query object through, versioned like any other payload.

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
        ("version", Schema::number().required()),
        ("query", Schema::plain_object().required()),
        ("options", Schema::plain_object().optional()),
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchInput {
    content_type_id: String,
    #[serde(default, deserialize_with = "deserialize_version")]
    version: Option<Version>,
    query: Value,
    #[serde(default)]
    options: Option<Value>,
}

pub struct Search {
    schemas: ProcedureSchemas,
}

impl Search {
    pub fn new() -> Self {
        Self {
            schemas: ProcedureSchemas {
                input: input_schema(),
                output: output_schema(),
            },
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Procedure for Search {
    fn name(&self) -> ProcedureName {
        ProcedureName::Search
    }

    fn schemas(&self) -> &ProcedureSchemas {
        &self.schemas
    }

    async fn run(&self, ctx: &RpcContext, input: Value) -> Result<Value, RpcError> {
        let input: SearchInput = parse_input(input)?;

        let definition = resolve_content_type(ctx, &input.content_type_id)?;
        let version = version_gate(&definition, input.version)?;

        let storage_ctx = storage_context(ctx, version);
        let result = definition
            .storage
            .search(&storage_ctx, input.query, input.options)
            .await?;

        debug!(content_type = %input.content_type_id, "search complete");

        Ok(json!({
            "contentTypeId": input.content_type_id,
            "result": result,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use quire_schema::validate;
    use quire_test_utils::RecordingStorage;

    use crate::core::event_bus::EventBus;
    use crate::core::registry::{ContentRegistry, ContentTypeDefinition};
    use crate::core::storage::{ContentStorage, RequestHandlerContext};

    use super::*;

    #[test]
    fn input_schema_requires_a_query_object() {
        let schemas = Search::new().schemas.clone();

        let valid = json!({ "contentTypeId": "foo", "version": 1, "query": { "text": "x" } });
        assert!(validate(&valid, &schemas.input).is_ok());

        let err = validate(
            &json!({ "contentTypeId": "foo", "version": 1, "query": "x" }),
            &schemas.input,
        )
        .unwrap_err();
        assert_eq!(
            err.message,
            "[query]: expected a plain object value, but found [string] instead."
        );
    }

    #[tokio::test]
    async fn passes_the_query_through_and_wraps_the_result() {
        let storage = Arc::new(
            RecordingStorage::new()
                .with_search_result(json!({ "hits": [{ "id": "1" }], "total": 1 })),
        );
        let registry = ContentRegistry::new(EventBus::new());
        registry
            .register(ContentTypeDefinition::new(
                "foo",
                Arc::clone(&storage) as Arc<dyn ContentStorage>,
                2,
            ))
            .unwrap();
        let ctx = RpcContext::new(registry, RequestHandlerContext::new());

        let result = Search::new()
            .run(
                &ctx,
                json!({ "contentTypeId": "foo", "version": 1, "query": { "text": "hello" } }),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            json!({
                "contentTypeId": "foo",
                "result": { "hits": [{ "id": "1" }], "total": 1 },
            })
        );

        let call = storage.last_call().unwrap();
        assert_eq!(call.method, "search");
        assert_eq!(call.context.version.request, 1);
        assert_eq!(call.context.version.latest, 2);
        assert_eq!(
            call.args,
            json!({ "query": { "text": "hello" }, "options": null })
        );
    }
}
