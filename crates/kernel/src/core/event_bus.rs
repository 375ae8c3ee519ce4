//! Content lifecycle event bus.
//!
//! Synchronous fire-and-forget delivery to the current subscriber list, in
//! subscription order. There is no queue: a subscriber added after an event
//! fires never observes it. A failing subscriber is logged and skipped so
//! it cannot block delivery to the rest, and nothing propagates back to the
//! emitter.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use quire_versioning::Version;

/// A content lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEvent {
    ContentTypeRegistered {
        content_type_id: String,
        latest: Version,
    },
    ItemCreated {
        content_type_id: String,
        result: Value,
    },
    ItemUpdated {
        content_type_id: String,
        item_id: String,
        result: Value,
    },
    ItemDeleted {
        content_type_id: String,
        item_id: String,
    },
}

impl ContentEvent {
    /// Stable event-kind name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ContentTypeRegistered { .. } => "content-type-registered",
            Self::ItemCreated { .. } => "item-created",
            Self::ItemUpdated { .. } => "item-updated",
            Self::ItemDeleted { .. } => "item-deleted",
        }
    }

    /// The content type this event concerns.
    pub fn content_type_id(&self) -> &str {
        match self {
            Self::ContentTypeRegistered {
                content_type_id, ..
            }
            | Self::ItemCreated {
                content_type_id, ..
            }
            | Self::ItemUpdated {
                content_type_id, ..
            }
            | Self::ItemDeleted {
                content_type_id, ..
            } => content_type_id,
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

type Handler = Arc<dyn Fn(&ContentEvent) -> anyhow::Result<()> + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    handler: Handler,
}

/// Publish/subscribe channel for [`ContentEvent`]s.
///
/// Cheap to clone; all clones share the subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to all content events. Handlers run synchronously on the
    /// emitting thread, in subscription order.
    pub fn on(
        &self,
        handler: impl Fn(&ContentEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(Uuid::now_v7());
        self.subscribers.write().push(Subscriber {
            id,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a subscriber. Returns whether it was present.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Deliver `event` to every current subscriber. Failures (error or
    /// panic) are logged per subscriber and never interrupt delivery.
    pub fn emit(&self, event: &ContentEvent) {
        // Snapshot so a handler that subscribes or unsubscribes does not
        // deadlock against the list lock, and so late subscribers are not
        // retroactively delivered to.
        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .iter()
            .map(|s| Arc::clone(&s.handler))
            .collect();

        for handler in &handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(event = event.kind(), error = %e, "event subscriber failed");
                }
                Err(_) => {
                    error!(event = event.kind(), "event subscriber panicked");
                }
            }
        }

        debug!(
            event = event.kind(),
            content_type = %event.content_type_id(),
            subscribers = handlers.len(),
            "event delivered"
        );
    }
}
