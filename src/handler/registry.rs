//! Service registry mapping names to handler factories.
//!
//! Each open channel gets its own handler, built by the factory registered
//! under the channel's service name.
//!
//! # Example
//!
//! ```
//! use pvrpc::handler::ServiceRegistry;
//! use pvrpc::service::{HelloService, HelloServiceFactory};
//!
//! let mut registry = ServiceRegistry::new();
//! registry.register(HelloService::NAME, HelloServiceFactory::create);
//!
//! let server = registry.create("hello").unwrap();
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::server::{RpcRequestHandler, RpcServer, RpcService};
use crate::error::{PvRpcError, Result};

/// Construction entry point for a handler.
pub type ServiceFactory = Arc<dyn Fn() -> Box<dyn RpcServer> + Send + Sync>;

/// Registry mapping service names to factories.
pub struct ServiceRegistry {
    /// Factories by service name.
    services: HashMap<String, ServiceFactory>,
}

impl ServiceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Register a factory under `name`.
    ///
    /// Registering the same name again replaces the factory.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn RpcServer> + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(factory);
        if self.services.insert(name.to_string(), factory).is_some() {
            tracing::debug!("Replaced factory for service {}", name);
        }
    }

    /// Register an [`RpcService`] constructor, wrapping each instance in an
    /// [`RpcRequestHandler`].
    pub fn register_service<S, F>(&mut self, name: &str, make: F)
    where
        S: RpcService,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.register(name, move || {
            Box::new(RpcRequestHandler::new(make())) as Box<dyn RpcServer>
        });
    }

    /// Create a fresh handler for `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn RpcServer>> {
        let factory = self
            .services
            .get(name)
            .ok_or_else(|| PvRpcError::ServiceNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// Whether a service is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered service names, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ChannelContext, HandlerState};
    use crate::status::Status;
    use crate::structure::{FieldDesc, PvStructure};

    struct Nop;

    impl RpcService for Nop {
        fn argument_fields(&self) -> Vec<FieldDesc> {
            Vec::new()
        }

        fn reply_fields(&self) -> Vec<FieldDesc> {
            Vec::new()
        }

        fn compute(
            &mut self,
            _: &ChannelContext,
            _: &PvStructure,
            _: &mut PvStructure,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_service() {
        let mut registry = ServiceRegistry::new();

        registry.register_service("nop", || Nop);

        assert!(registry.contains("nop"));
        assert!(!registry.contains("other"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_service_names_sorted() {
        let mut registry = ServiceRegistry::new();

        registry.register_service("service3", || Nop);
        registry.register_service("service1", || Nop);
        registry.register_service("service2", || Nop);

        assert_eq!(registry.service_names(), vec!["service1", "service2", "service3"]);
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = ServiceRegistry::new();

        registry.register_service("a", || Nop);
        registry.register_service("b", || Nop);
        registry.register_service("a", || Nop);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.service_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_create_fresh_instances() {
        let mut registry = ServiceRegistry::new();
        registry.register_service("nop", || Nop);

        let mut first = registry.create("nop").unwrap();
        let second = registry.create("nop").unwrap();

        let sink = |_: Status, _: Option<PvStructure>| {};
        let status = first.initialize(ChannelContext::new(1, "nop"), Box::new(sink));
        assert!(status.is_ok());
        assert_eq!(first.state(), HandlerState::Ready);
        assert_eq!(second.state(), HandlerState::Uninitialized);
    }

    #[test]
    fn test_service_not_found() {
        let registry = ServiceRegistry::new();

        assert!(registry.is_empty());
        assert!(matches!(
            registry.create("nonexistent"),
            Err(PvRpcError::ServiceNotFound(name)) if name == "nonexistent"
        ));
    }
}
