//! Content type registry.
//!
//! Process-wide mapping from content-type id to its registration record
//! (storage backend, latest wire-schema version). Registration happens once
//! per type during the single-threaded setup phase; after that the registry
//! is read-only and lookups are lock-free.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;

use quire_versioning::Version;

use crate::core::event_bus::{ContentEvent, EventBus};
use crate::core::storage::ContentStorage;
use crate::error::RegistryError;

/// Version metadata for a registered content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTypeVersion {
    /// The newest wire-schema version the storage backend natively
    /// understands. Never decreases once published.
    pub latest: Version,
}

/// A content type's registration record.
#[derive(Clone)]
pub struct ContentTypeDefinition {
    /// Unique, immutable key.
    pub id: String,
    /// The backend implementing the storage capability for this type.
    pub storage: Arc<dyn ContentStorage>,
    pub version: ContentTypeVersion,
}

impl ContentTypeDefinition {
    pub fn new(
        id: impl Into<String>,
        storage: Arc<dyn ContentStorage>,
        latest: Version,
    ) -> Self {
        Self {
            id: id.into(),
            storage,
            version: ContentTypeVersion { latest },
        }
    }
}

impl fmt::Debug for ContentTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentTypeDefinition")
            .field("id", &self.id)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Registry of content types.
///
/// Cheap to clone; all clones share the same map and event bus.
#[derive(Clone)]
pub struct ContentRegistry {
    inner: Arc<ContentRegistryInner>,
}

struct ContentRegistryInner {
    types: DashMap<String, ContentTypeDefinition>,
    event_bus: EventBus,
}

impl ContentRegistry {
    /// Create an empty registry publishing registration events on
    /// `event_bus`.
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            inner: Arc::new(ContentRegistryInner {
                types: DashMap::new(),
                event_bus,
            }),
        }
    }

    /// Register a content type. One-time per id: a duplicate registration
    /// fails rather than overwriting, so setup-phase wiring mistakes
    /// surface immediately.
    pub fn register(&self, definition: ContentTypeDefinition) -> Result<(), RegistryError> {
        if definition.id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if definition.version.latest < 1 {
            return Err(RegistryError::InvalidLatestVersion {
                id: definition.id,
                latest: definition.version.latest,
            });
        }

        let id = definition.id.clone();
        let latest = definition.version.latest;

        match self.inner.types.entry(id.clone()) {
            Entry::Occupied(_) => return Err(RegistryError::AlreadyRegistered(id)),
            Entry::Vacant(entry) => {
                entry.insert(definition);
            }
        }

        info!(content_type = %id, latest, "content type registered");
        self.inner
            .event_bus
            .emit(&ContentEvent::ContentTypeRegistered {
                content_type_id: id,
                latest,
            });
        Ok(())
    }

    /// Get a content type's registration record.
    pub fn get(&self, id: &str) -> Option<ContentTypeDefinition> {
        self.inner.types.get(id).map(|r| r.clone())
    }

    /// Check if a content type is registered.
    pub fn content_type_exists(&self, id: &str) -> bool {
        self.inner.types.contains_key(id)
    }

    /// List registered content type ids.
    pub fn type_ids(&self) -> Vec<String> {
        self.inner.types.iter().map(|r| r.key().clone()).collect()
    }

    /// Get the number of registered content types.
    pub fn len(&self) -> usize {
        self.inner.types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.types.is_empty()
    }

    /// The event bus registration events are published on.
    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }
}
