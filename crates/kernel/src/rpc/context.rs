//! Per-call RPC context.

use crate::config::KernelConfig;
use crate::core::registry::ContentRegistry;
use crate::core::storage::RequestHandlerContext;

/// Context handed to every procedure invocation.
///
/// Carries the shared registry handle, the opaque request-handler
/// capability bag from the transport layer, and the kernel configuration.
/// Immutable for the lifetime of one call.
#[derive(Clone)]
pub struct RpcContext {
    pub registry: ContentRegistry,
    pub request_handler_context: RequestHandlerContext,
    pub config: KernelConfig,
}

impl RpcContext {
    pub fn new(registry: ContentRegistry, request_handler_context: RequestHandlerContext) -> Self {
        Self {
            registry,
            request_handler_context,
            config: KernelConfig::default(),
        }
    }

    /// Override the default configuration.
    pub fn with_config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }
}
