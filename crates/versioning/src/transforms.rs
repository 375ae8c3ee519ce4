//! Composed transform chains for a single request.
//!
//! [`ServiceTransforms`] binds a definition map to one requested version.
//! It is built fresh per call and holds no shared mutable state; the chains
//! are folds over the declared migration steps.

use serde_json::Value;

use quire_schema::{ValidationError, validate};

use crate::definitions::{Version, VersionedDefinitions};
use crate::error::VersioningError;

/// Transform chains bound to a `(definitions, requested_version)` pair.
#[derive(Debug, Clone)]
pub struct ServiceTransforms {
    definitions: VersionedDefinitions,
    requested: Version,
    latest: Version,
}

impl ServiceTransforms {
    /// Build the chains for `requested`. Fails if the map is malformed or
    /// the requested version exceeds the highest declared one.
    pub fn build(
        definitions: &VersionedDefinitions,
        requested: Version,
    ) -> Result<Self, VersioningError> {
        definitions.check()?;
        if requested < 1 {
            return Err(VersioningError::InvalidVersion(requested));
        }
        // check() guarantees at least one version.
        let latest = definitions.latest().ok_or(VersioningError::NoVersions)?;
        if requested > latest {
            return Err(VersioningError::VersionTooHigh { requested, latest });
        }
        Ok(Self {
            definitions: definitions.clone(),
            requested,
            latest,
        })
    }

    pub fn requested_version(&self) -> Version {
        self.requested
    }

    pub fn latest_version(&self) -> Version {
        self.latest
    }

    /// The up/validate pair for one named input object of a procedure.
    pub fn input<'a>(&'a self, procedure: &'a str, object: &'a str) -> InputTransform<'a> {
        InputTransform {
            transforms: self,
            procedure,
            object,
        }
    }

    /// The down transform for one named output object of a procedure.
    pub fn output<'a>(&'a self, procedure: &'a str, object: &'a str) -> OutputTransform<'a> {
        OutputTransform {
            transforms: self,
            procedure,
            object,
        }
    }
}

/// Request-direction chain for one `(procedure, object)` pair.
#[derive(Debug, Clone, Copy)]
pub struct InputTransform<'a> {
    transforms: &'a ServiceTransforms,
    procedure: &'a str,
    object: &'a str,
}

impl InputTransform<'_> {
    /// Validate `value` against the requested version's schema, then apply
    /// each version's `up` step in ascending order up to latest. The first
    /// failure short-circuits the chain.
    pub fn up(&self, value: Value) -> Result<Value, VersioningError> {
        let ServiceTransforms {
            definitions,
            requested,
            latest,
        } = self.transforms;

        self.validate(&value)?;

        let mut current = value;
        for version in *requested..*latest {
            let Some(entry) = definitions.input_entry(version, self.procedure, self.object) else {
                continue;
            };
            let Some(up) = &entry.up else {
                continue;
            };
            current = up(current).map_err(|source| VersioningError::Transform { version, source })?;
        }
        Ok(current)
    }

    /// Validate `value` against this object's schema at the requested
    /// version, independent of any transform. A version with no declared
    /// schema accepts everything.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let entry = self.transforms.definitions.input_entry(
            self.transforms.requested,
            self.procedure,
            self.object,
        );
        match entry.and_then(|e| e.schema.as_ref()) {
            Some(schema) => validate(value, schema),
            None => Ok(()),
        }
    }
}

/// Response-direction chain for one `(procedure, object)` pair.
#[derive(Debug, Clone, Copy)]
pub struct OutputTransform<'a> {
    transforms: &'a ServiceTransforms,
    procedure: &'a str,
    object: &'a str,
}

impl OutputTransform<'_> {
    /// Validate `value` against the latest version's schema, then apply the
    /// `down` steps in descending order back to the requested version. The
    /// first failure short-circuits the chain.
    pub fn down(&self, value: Value) -> Result<Value, VersioningError> {
        let ServiceTransforms {
            definitions,
            requested,
            latest,
        } = self.transforms;

        if let Some(entry) = definitions.output_entry(*latest, self.procedure, self.object) {
            if let Some(schema) = &entry.schema {
                validate(&value, schema)?;
            }
        }

        let mut current = value;
        for version in (*requested..*latest).rev() {
            let Some(entry) = definitions.output_entry(version, self.procedure, self.object) else {
                continue;
            };
            let Some(down) = &entry.down else {
                continue;
            };
            current =
                down(current).map_err(|source| VersioningError::Transform { version, source })?;
        }
        Ok(current)
    }
}
