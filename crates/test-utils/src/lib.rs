//! Quire test utilities.
//!
//! Storage backends for exercising the RPC layer without a real store: an
//! in-memory [`MemoryStorage`] honoring the latest-version data contract, a
//! [`RecordingStorage`] that captures every call for assertions, and a
//! [`FailingStorage`] for error-propagation tests.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};
use uuid::Uuid;

use quire_kernel::{ContentStorage, StorageContext};

/// Install a fmt subscriber for test debugging. Safe to call from multiple
/// tests; only the first call installs.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// In-memory storage backend keyed by item id.
///
/// Items are whatever JSON objects the caller stores; `create` injects an
/// `id` field when the data carries none.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with items keyed by id.
    pub fn with_items(items: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl ContentStorage for MemoryStorage {
    async fn get(
        &self,
        _ctx: &StorageContext,
        id: &str,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        self.items
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("Content item [{id}] not found."))
    }

    async fn bulk_get(
        &self,
        _ctx: &StorageContext,
        ids: &[String],
        _options: Option<Value>,
    ) -> anyhow::Result<Vec<Value>> {
        let items = self.items.read();
        ids.iter()
            .map(|id| {
                items
                    .get(id)
                    .cloned()
                    .ok_or_else(|| anyhow!("Content item [{id}] not found."))
            })
            .collect()
    }

    async fn create(
        &self,
        _ctx: &StorageContext,
        data: Value,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        let Value::Object(mut fields) = data else {
            bail!("create expects an object payload");
        };
        let id = match fields.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::now_v7().to_string();
                fields.insert("id".to_string(), json!(id));
                id
            }
        };
        let stored = Value::Object(fields);
        self.items.write().insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        _ctx: &StorageContext,
        id: &str,
        data: Value,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        let Value::Object(mut fields) = data else {
            bail!("update expects an object payload");
        };
        let mut items = self.items.write();
        if !items.contains_key(id) {
            bail!("Content item [{id}] not found.");
        }
        fields.insert("id".to_string(), json!(id));
        let stored = Value::Object(fields);
        items.insert(id.to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete(
        &self,
        _ctx: &StorageContext,
        id: &str,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        match self.items.write().remove(id) {
            Some(_) => Ok(json!({ "success": true })),
            None => bail!("Content item [{id}] not found."),
        }
    }

    async fn search(
        &self,
        _ctx: &StorageContext,
        query: Value,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        let needle = query.get("text").and_then(Value::as_str);
        let hits: Vec<Value> = self
            .items
            .read()
            .values()
            .filter(|item| match needle {
                Some(text) => item.to_string().contains(text),
                None => true,
            })
            .cloned()
            .collect();
        Ok(json!({ "total": hits.len(), "hits": hits }))
    }
}

/// One captured storage invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Storage method wire name (`get`, `bulkGet`, ...).
    pub method: String,
    /// The full per-call context the kernel handed over.
    pub context: StorageContext,
    /// Method arguments, serialized for assertion.
    pub args: Value,
}

/// Storage backend returning canned responses and recording every call.
#[derive(Debug)]
pub struct RecordingStorage {
    calls: Mutex<Vec<RecordedCall>>,
    get_result: Value,
    bulk_get_result: Vec<Value>,
    create_result: Value,
    update_result: Value,
    delete_result: Value,
    search_result: Value,
}

impl Default for RecordingStorage {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            get_result: json!({}),
            bulk_get_result: Vec::new(),
            create_result: json!({}),
            update_result: json!({}),
            delete_result: json!({}),
            search_result: json!({}),
        }
    }
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get_result(mut self, result: Value) -> Self {
        self.get_result = result;
        self
    }

    pub fn with_bulk_get_result(mut self, items: Vec<Value>) -> Self {
        self.bulk_get_result = items;
        self
    }

    pub fn with_create_result(mut self, result: Value) -> Self {
        self.create_result = result;
        self
    }

    pub fn with_update_result(mut self, result: Value) -> Self {
        self.update_result = result;
        self
    }

    pub fn with_delete_result(mut self, result: Value) -> Self {
        self.delete_result = result;
        self
    }

    pub fn with_search_result(mut self, result: Value) -> Self {
        self.search_result = result;
        self
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// The most recent call, if any.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }

    fn record(&self, method: &str, ctx: &StorageContext, args: Value) {
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            context: ctx.clone(),
            args,
        });
    }
}

#[async_trait]
impl ContentStorage for RecordingStorage {
    async fn get(
        &self,
        ctx: &StorageContext,
        id: &str,
        options: Option<Value>,
    ) -> anyhow::Result<Value> {
        self.record("get", ctx, json!({ "id": id, "options": options }));
        Ok(self.get_result.clone())
    }

    async fn bulk_get(
        &self,
        ctx: &StorageContext,
        ids: &[String],
        options: Option<Value>,
    ) -> anyhow::Result<Vec<Value>> {
        self.record("bulkGet", ctx, json!({ "ids": ids, "options": options }));
        Ok(self.bulk_get_result.clone())
    }

    async fn create(
        &self,
        ctx: &StorageContext,
        data: Value,
        options: Option<Value>,
    ) -> anyhow::Result<Value> {
        self.record("create", ctx, json!({ "data": data, "options": options }));
        Ok(self.create_result.clone())
    }

    async fn update(
        &self,
        ctx: &StorageContext,
        id: &str,
        data: Value,
        options: Option<Value>,
    ) -> anyhow::Result<Value> {
        self.record(
            "update",
            ctx,
            json!({ "id": id, "data": data, "options": options }),
        );
        Ok(self.update_result.clone())
    }

    async fn delete(
        &self,
        ctx: &StorageContext,
        id: &str,
        options: Option<Value>,
    ) -> anyhow::Result<Value> {
        self.record("delete", ctx, json!({ "id": id, "options": options }));
        Ok(self.delete_result.clone())
    }

    async fn search(
        &self,
        ctx: &StorageContext,
        query: Value,
        options: Option<Value>,
    ) -> anyhow::Result<Value> {
        self.record(
            "search",
            ctx,
            json!({ "query": query, "options": options }),
        );
        Ok(self.search_result.clone())
    }
}

/// Storage backend failing every call with the same message, for
/// error-propagation tests.
#[derive(Debug)]
pub struct FailingStorage {
    message: String,
}

impl FailingStorage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn err(&self) -> anyhow::Error {
        anyhow!("{}", self.message)
    }
}

#[async_trait]
impl ContentStorage for FailingStorage {
    async fn get(
        &self,
        _ctx: &StorageContext,
        _id: &str,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        Err(self.err())
    }

    async fn bulk_get(
        &self,
        _ctx: &StorageContext,
        _ids: &[String],
        _options: Option<Value>,
    ) -> anyhow::Result<Vec<Value>> {
        Err(self.err())
    }

    async fn create(
        &self,
        _ctx: &StorageContext,
        _data: Value,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        Err(self.err())
    }

    async fn update(
        &self,
        _ctx: &StorageContext,
        _id: &str,
        _data: Value,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        Err(self.err())
    }

    async fn delete(
        &self,
        _ctx: &StorageContext,
        _id: &str,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        Err(self.err())
    }

    async fn search(
        &self,
        _ctx: &StorageContext,
        _query: Value,
        _options: Option<Value>,
    ) -> anyhow::Result<Value> {
        Err(self.err())
    }
}
