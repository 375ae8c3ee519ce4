//! `bulkGet` procedure - fetch a batch of items by id.

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
        (
            "ids",
            Schema::array_of(Schema::string().min_length(1))
                .min_size(1)
                .required(),
        ),
        ("version", Schema::number().required()),
        ("options", Schema::plain_object().optional()),
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkGetInput {
    content_type_id: String,
    ids: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_version")]
    version: Option<Version>,
    #[serde(default)]
    options: Option<Value>,
}

pub struct BulkGet {
    schemas: ProcedureSchemas,
}

impl BulkGet {
    pub fn new() -> Self {
        Self {
            schemas: ProcedureSchemas {
                input: input_schema(),
                output: output_schema(),
            },
        }
    }
}

impl Default for BulkGet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Procedure for BulkGet {
    fn name(&self) -> ProcedureName {
        ProcedureName::BulkGet
    }

    fn schemas(&self) -> &ProcedureSchemas {
        &self.schemas
    }

    async fn run(&self, ctx: &RpcContext, input: Value) -> Result<Value, RpcError> {
        let input: BulkGetInput = parse_input(input)?;

        let definition = resolve_content_type(ctx, &input.content_type_id)?;
        let version = version_gate(&definition, input.version)?;

        let max = ctx.config.max_bulk_ids;
        if input.ids.len() > max {
            return Err(RpcError::BulkBatchTooLarge {
                count: input.ids.len(),
                max,
            });
        }

        let storage_ctx = storage_context(ctx, version);
        let items = definition
            .storage
            .bulk_get(&storage_ctx, &input.ids, input.options)
            .await?;

        debug!(
            content_type = %input.content_type_id,
            requested = version.request,
            items = items.len(),
            "bulkGet complete"
        );

        Ok(json!({
            "contentTypeId": input.content_type_id,
            "items": items,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use quire_schema::validate;
    use quire_test_utils::{FailingStorage, RecordingStorage};
    use quire_versioning::{InputObjectDef, ProcedureVersionDef, VersionDef, VersionedDefinitions};

    use crate::config::KernelConfig;
    use crate::core::event_bus::EventBus;
    use crate::core::registry::{ContentRegistry, ContentTypeDefinition};
    use crate::core::storage::{ContentStorage, RequestHandlerContext};

    use super::*;

    fn setup_with(storage: Arc<dyn ContentStorage>) -> RpcContext {
        let registry = ContentRegistry::new(EventBus::new());
        registry
            .register(ContentTypeDefinition::new("foo", storage, 2))
            .unwrap();
        RpcContext::new(
            registry,
            RequestHandlerContext::new().with_value("request", json!("mocked")),
        )
    }

    #[test]
    fn input_schema_accepts_and_rejects() {
        let schemas = BulkGet::new().schemas.clone();
        let valid = json!({ "contentTypeId": "foo", "ids": ["123", "456"], "version": 1 });

        let cases: Vec<(Value, Option<&str>)> = vec![
            (valid.clone(), None),
            (
                json!({ "ids": ["123"], "version": 1 }),
                Some("[contentTypeId]: expected value of type [string] but got [undefined]"),
            ),
            (
                json!({ "contentTypeId": "foo", "ids": ["123"] }),
                Some("[version]: expected value of type [number] but got [undefined]"),
            ),
            // A numeric string version is accepted on the wire.
            (
                json!({ "contentTypeId": "foo", "ids": ["123"], "version": "1" }),
                None,
            ),
            (
                json!({ "contentTypeId": "foo", "version": 1 }),
                Some("[ids]: expected value of type [array] but got [undefined]"),
            ),
            (
                json!({ "contentTypeId": "foo", "ids": [], "version": 1 }),
                Some("[ids]: array size is [0], but cannot be smaller than [1]"),
            ),
            (
                json!({ "contentTypeId": "foo", "ids": [""], "version": 1 }),
                Some("[ids.0]: value has length [0] but it must have a minimum length of [1]."),
            ),
            (
                json!({ "contentTypeId": "foo", "ids": 123, "version": 1 }),
                Some("[ids]: expected value of type [array] but got [number]"),
            ),
            (
                json!({ "contentTypeId": "foo", "ids": ["123"], "version": 1, "unknown": "foo" }),
                Some("[unknown]: definition for this key is missing"),
            ),
        ];

        for (input, expected) in cases {
            let result = validate(&input, &schemas.input);
            match expected {
                None => assert!(result.is_ok(), "expected no error for {input}"),
                Some(message) => {
                    assert_eq!(result.unwrap_err().message, message);
                }
            }
        }
    }

    #[test]
    fn input_schema_allows_an_options_object() {
        let schemas = BulkGet::new().schemas.clone();

        let input = json!({
            "contentTypeId": "foo",
            "ids": ["123"],
            "version": 1,
            "options": { "any": "object" },
        });
        assert!(validate(&input, &schemas.input).is_ok());

        let input = json!({
            "contentTypeId": "foo",
            "ids": ["123"],
            "version": 1,
            "options": 123,
        });
        assert_eq!(
            validate(&input, &schemas.input).unwrap_err().message,
            "[options]: expected a plain object value, but found [number] instead."
        );
    }

    #[test]
    fn output_schema_accepts_object_or_array_of_objects() {
        let schemas = BulkGet::new().schemas.clone();

        assert!(validate(&json!({ "any": "object" }), &schemas.output).is_ok());
        assert!(validate(&json!([{ "any": "object" }]), &schemas.output).is_ok());

        let err = validate(&json!(123), &schemas.output).unwrap_err();
        assert!(
            err.message
                .contains("expected a plain object value, but found [number] instead.")
        );
        assert!(
            err.message
                .contains("expected value of type [array] but got [number]")
        );
    }

    #[tokio::test]
    async fn returns_the_storage_result_in_the_envelope() {
        let storage = Arc::new(
            RecordingStorage::new().with_bulk_get_result(vec![json!("Item1"), json!("Item2")]),
        );
        let ctx = setup_with(Arc::clone(&storage) as Arc<dyn ContentStorage>);

        let result = BulkGet::new()
            .run(
                &ctx,
                json!({ "contentTypeId": "foo", "version": 1, "ids": ["123", "456"] }),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            json!({ "contentTypeId": "foo", "items": ["Item1", "Item2"] })
        );

        let call = storage.last_call().unwrap();
        assert_eq!(call.method, "bulkGet");
        assert_eq!(call.context.version.request, 1);
        assert_eq!(call.context.version.latest, 2);
        assert_eq!(
            call.context.request_handler_context.get("request"),
            Some(&json!("mocked"))
        );
        assert_eq!(call.args, json!({ "ids": ["123", "456"], "options": null }));
    }

    #[tokio::test]
    async fn unknown_content_type_is_rejected() {
        let ctx = setup_with(Arc::new(RecordingStorage::new()));

        let err = BulkGet::new()
            .run(&ctx, json!({ "contentTypeId": "unknown", "ids": ["123", "456"] }))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Content [unknown] is not registered.");
    }

    #[tokio::test]
    async fn version_above_latest_is_rejected() {
        let ctx = setup_with(Arc::new(RecordingStorage::new()));

        let err = BulkGet::new()
            .run(
                &ctx,
                json!({ "contentTypeId": "foo", "ids": ["123", "456"], "version": 7 }),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid version. Latest version is [2].");
    }

    #[tokio::test]
    async fn missing_version_defaults_to_latest() {
        let storage = Arc::new(RecordingStorage::new());
        let ctx = setup_with(Arc::clone(&storage) as Arc<dyn ContentStorage>);

        BulkGet::new()
            .run(&ctx, json!({ "contentTypeId": "foo", "ids": ["123"] }))
            .await
            .unwrap();

        let call = storage.last_call().unwrap();
        assert_eq!(call.context.version.request, 2);
        assert_eq!(call.context.version.latest, 2);
    }

    #[tokio::test]
    async fn batch_larger_than_the_cap_is_rejected() {
        let storage = Arc::new(RecordingStorage::new());
        let ctx = setup_with(Arc::clone(&storage) as Arc<dyn ContentStorage>)
            .with_config(KernelConfig { max_bulk_ids: 1 });

        let err = BulkGet::new()
            .run(
                &ctx,
                json!({ "contentTypeId": "foo", "ids": ["123", "456"], "version": 1 }),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Too many ids. Maximum batch size is [1].");
        assert!(storage.calls().is_empty());
    }

    #[tokio::test]
    async fn storage_errors_propagate_unchanged() {
        let ctx = setup_with(Arc::new(FailingStorage::new("backend exploded")));

        let err = BulkGet::new()
            .run(
                &ctx,
                json!({ "contentTypeId": "foo", "ids": ["123"], "version": 1 }),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RpcError::Storage(_)));
        assert_eq!(err.to_string(), "backend exploded");
    }

    #[tokio::test]
    async fn storage_context_exposes_transform_utilities() {
        let storage = Arc::new(RecordingStorage::new());
        let ctx = setup_with(Arc::clone(&storage) as Arc<dyn ContentStorage>);

        BulkGet::new()
            .run(&ctx, json!({ "contentTypeId": "foo", "ids": ["1234"], "version": 1 }))
            .await
            .unwrap();

        let call = storage.last_call().unwrap();

        let definitions = VersionedDefinitions::new()
            .version(
                1,
                VersionDef::new().procedure(
                    "bulkGet",
                    ProcedureVersionDef::new().input(
                        "options",
                        InputObjectDef::new()
                            .schema(Schema::object([("version1", Schema::string().required())]))
                            .up(|mut value| {
                                value["version2"] = json!("added");
                                Ok(value)
                            }),
                    ),
                ),
            )
            .version(2, VersionDef::new());

        let transforms = call.context.utils.transforms(&definitions).unwrap();

        let upped = transforms
            .input("bulkGet", "options")
            .up(json!({ "version1": "foo" }))
            .unwrap();
        assert_eq!(upped, json!({ "version1": "foo", "version2": "added" }));

        let err = transforms
            .input("bulkGet", "options")
            .up(json!({ "version1": 123 }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[version1]: expected value of type [string] but got [number]"
        );

        let err = transforms
            .input("bulkGet", "options")
            .validate(&json!({ "version1": 123 }))
            .unwrap_err();
        assert_eq!(
            err.message,
            "[version1]: expected value of type [string] but got [number]"
        );
    }
}
