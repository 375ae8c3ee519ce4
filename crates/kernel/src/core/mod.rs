//! Core services: content registry, event bus, storage capability.

pub mod event_bus;
pub mod registry;
pub mod storage;

pub use event_bus::{ContentEvent, EventBus, SubscriptionId};
pub use registry::{ContentRegistry, ContentTypeDefinition, ContentTypeVersion};
pub use storage::{
    ContentStorage, RequestHandlerContext, StorageContext, StorageContextUtils, VersionInfo,
};
