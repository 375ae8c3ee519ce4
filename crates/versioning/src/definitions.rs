//! Versioned service definitions.
//!
//! The definition map is static data authored once per content type and
//! never mutated at runtime. Builders mirror how a backend declares it:
//!
//! ```
//! use quire_schema::Schema;
//! use quire_versioning::{InputObjectDef, ProcedureVersionDef, VersionDef, VersionedDefinitions};
//!
//! let definitions = VersionedDefinitions::new()
//!     .version(
//!         1,
//!         VersionDef::new().procedure(
//!             "bulkGet",
//!             ProcedureVersionDef::new().input(
//!                 "options",
//!                 InputObjectDef::new()
//!                     .schema(Schema::object([("flag", Schema::boolean().optional())]))
//!                     .up(|mut value| {
//!                         value["flag"] = serde_json::json!(false);
//!                         Ok(value)
//!                     }),
//!             ),
//!         ),
//!     )
//!     .version(2, VersionDef::new());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use quire_schema::Schema;

use crate::error::VersioningError;

/// A wire-schema version number. Versions start at 1 and strictly increase
/// toward the latest version a storage backend implements.
pub type Version = u32;

/// A migration step over a JSON payload. Steps are pure functions; failures
/// short-circuit the surrounding chain.
pub type TransformFn = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// Declaration for one named input object (e.g. `options`, `data`) at one
/// version: its schema at that version and the `up` migration to the next.
#[derive(Clone, Default)]
pub struct InputObjectDef {
    pub(crate) schema: Option<Schema>,
    pub(crate) up: Option<TransformFn>,
}

impl InputObjectDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of this object at this version.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Migration converting this version's shape to the next version's.
    pub fn up(mut self, f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static) -> Self {
        self.up = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for InputObjectDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputObjectDef")
            .field("schema", &self.schema.is_some())
            .field("up", &self.up.is_some())
            .finish()
    }
}

/// Declaration for one named output object (e.g. `result`) at one version:
/// its schema at that version and the `down` migration from the next
/// version's shape back to this one.
#[derive(Clone, Default)]
pub struct OutputObjectDef {
    pub(crate) schema: Option<Schema>,
    pub(crate) down: Option<TransformFn>,
}

impl OutputObjectDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of this object at this version.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Migration converting the next version's shape back to this version's.
    pub fn down(
        mut self,
        f: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.down = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for OutputObjectDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputObjectDef")
            .field("schema", &self.schema.is_some())
            .field("down", &self.down.is_some())
            .finish()
    }
}

/// Per-procedure declarations at one version.
#[derive(Debug, Clone, Default)]
pub struct ProcedureVersionDef {
    pub(crate) input: BTreeMap<String, InputObjectDef>,
    pub(crate) output: BTreeMap<String, OutputObjectDef>,
}

impl ProcedureVersionDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a named input object.
    pub fn input(mut self, object: impl Into<String>, def: InputObjectDef) -> Self {
        self.input.insert(object.into(), def);
        self
    }

    /// Declare a named output object.
    pub fn output(mut self, object: impl Into<String>, def: OutputObjectDef) -> Self {
        self.output.insert(object.into(), def);
        self
    }
}

/// All procedure declarations at one version. A procedure with no entry at
/// a version is simply skipped by the chain builder, not an error.
#[derive(Debug, Clone, Default)]
pub struct VersionDef {
    pub(crate) procedures: BTreeMap<String, ProcedureVersionDef>,
}

impl VersionDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare one procedure's objects at this version.
    pub fn procedure(mut self, name: impl Into<String>, def: ProcedureVersionDef) -> Self {
        self.procedures.insert(name.into(), def);
        self
    }
}

/// The full version map for a content type: version number → declarations.
#[derive(Debug, Clone, Default)]
pub struct VersionedDefinitions {
    versions: BTreeMap<Version, VersionDef>,
}

impl VersionedDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one version's declarations.
    pub fn version(mut self, version: Version, def: VersionDef) -> Self {
        self.versions.insert(version, def);
        self
    }

    /// The highest declared version, if any.
    pub fn latest(&self) -> Option<Version> {
        self.versions.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Check the map is well-formed: at least one version, all numbered
    /// from 1 upward.
    pub fn check(&self) -> Result<(), VersioningError> {
        if self.versions.is_empty() {
            return Err(VersioningError::NoVersions);
        }
        if let Some(version) = self.versions.keys().find(|v| **v < 1) {
            return Err(VersioningError::InvalidVersion(*version));
        }
        Ok(())
    }

    pub(crate) fn input_entry(
        &self,
        version: Version,
        procedure: &str,
        object: &str,
    ) -> Option<&InputObjectDef> {
        self.versions
            .get(&version)?
            .procedures
            .get(procedure)?
            .input
            .get(object)
    }

    pub(crate) fn output_entry(
        &self,
        version: Version,
        procedure: &str,
        object: &str,
    ) -> Option<&OutputObjectDef> {
        self.versions
            .get(&version)?
            .procedures
            .get(procedure)?
            .output
            .get(object)
    }
}
