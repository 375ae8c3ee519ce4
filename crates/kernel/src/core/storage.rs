//! Storage capability and per-call context.
//!
//! Each content type brings its own storage backend, registered as an
//! [`ContentStorage`] trait object. The kernel hands every call a fresh
//! [`StorageContext`] carrying the request-handler capability bag, the
//! version pair for the call, and the transform utilities. Backends receive
//! already-validated input and must honor the latest-version data contract.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use quire_versioning::{ServiceTransforms, Version, VersionedDefinitions, VersioningError};

/// Opaque per-request capability bag, handed through from the transport
/// layer untouched. The kernel never interprets its contents; backends read
/// whatever the host application put in.
#[derive(Debug, Clone, Default)]
pub struct RequestHandlerContext {
    values: HashMap<String, Value>,
}

impl RequestHandlerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for construction sites.
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The version pair for one call: what the caller asked for and what the
/// backend natively speaks. `request <= latest` always holds by the time a
/// backend sees this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub request: Version,
    pub latest: Version,
}

/// Transform utilities bound to the call's requested version.
#[derive(Debug, Clone, Copy)]
pub struct StorageContextUtils {
    request_version: Version,
}

impl StorageContextUtils {
    pub(crate) fn new(request_version: Version) -> Self {
        Self { request_version }
    }

    /// Build transform chains for `definitions` at the call's requested
    /// version.
    pub fn transforms(
        &self,
        definitions: &VersionedDefinitions,
    ) -> Result<ServiceTransforms, VersioningError> {
        ServiceTransforms::build(definitions, self.request_version)
    }

    /// Build transform chains for an explicit version, overriding the
    /// call's requested one.
    pub fn transforms_for(
        &self,
        definitions: &VersionedDefinitions,
        version: Version,
    ) -> Result<ServiceTransforms, VersioningError> {
        ServiceTransforms::build(definitions, version)
    }
}

/// Per-call context passed to every storage method. Created fresh for each
/// procedure invocation and discarded afterwards.
#[derive(Debug, Clone)]
pub struct StorageContext {
    pub request_handler_context: RequestHandlerContext,
    pub version: VersionInfo,
    pub utils: StorageContextUtils,
}

impl StorageContext {
    pub fn new(request_handler_context: RequestHandlerContext, version: VersionInfo) -> Self {
        Self {
            request_handler_context,
            utils: StorageContextUtils::new(version.request),
            version,
        }
    }
}

/// The capability a content-type backend implements.
///
/// All payloads are latest-version shaped by contract. Errors propagate to
/// the caller unchanged; retry policy, if any, lives behind this trait.
#[async_trait]
pub trait ContentStorage: Send + Sync {
    async fn get(
        &self,
        ctx: &StorageContext,
        id: &str,
        options: Option<Value>,
    ) -> anyhow::Result<Value>;

    async fn bulk_get(
        &self,
        ctx: &StorageContext,
        ids: &[String],
        options: Option<Value>,
    ) -> anyhow::Result<Vec<Value>>;

    async fn create(
        &self,
        ctx: &StorageContext,
        data: Value,
        options: Option<Value>,
    ) -> anyhow::Result<Value>;

    async fn update(
        &self,
        ctx: &StorageContext,
        id: &str,
        data: Value,
        options: Option<Value>,
    ) -> anyhow::Result<Value>;

    async fn delete(
        &self,
        ctx: &StorageContext,
        id: &str,
        options: Option<Value>,
    ) -> anyhow::Result<Value>;

    async fn search(
        &self,
        ctx: &StorageContext,
        query: Value,
        options: Option<Value>,
    ) -> anyhow::Result<Value>;
}
