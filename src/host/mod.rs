//! In-process host that drives handlers for open channels.
//!
//! The [`HostBuilder`] provides a fluent API for registering services and
//! configuring limits. The [`ServiceHost`] manages channel lifecycles:
//! 1. Create a handler from the service's factory
//! 2. `initialize` it with the channel context and a completion sink
//! 3. Spawn a task that feeds it one `request` at a time
//! 4. `destroy` it when the channel closes
//!
//! # Example
//!
//! ```
//! use pvrpc::host::ServiceHost;
//! use pvrpc::service::{HelloService, HelloServiceFactory};
//! use pvrpc::structure::PvStructure;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let host = ServiceHost::builder()
//!     .service(HelloService::NAME, HelloServiceFactory::create)
//!     .build();
//!
//! let channel = host.open_channel("hello", "greeter").await.unwrap();
//! let argument = PvStructure::new().with_field("name", "World").unwrap();
//! let reply = channel.call(argument).await.unwrap().into_reply().unwrap();
//! assert_eq!(reply.get_string("greeting").unwrap(), "Hello World");
//!
//! channel.close().await.unwrap();
//! # });
//! ```

mod channel;
mod config;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};

use crate::error::{PvRpcError, Result};
use crate::handler::{ChannelContext, ChannelSink, RpcServer, RpcService, ServiceRegistry};
use crate::structure::PvStructure;

pub use channel::{ChannelHandle, INCOMPLETE_REQUEST};
pub use config::{HostConfig, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_CHANNELS};

/// Builder for configuring and creating a [`ServiceHost`].
pub struct HostBuilder {
    registry: ServiceRegistry,
    config: HostConfig,
}

impl HostBuilder {
    /// Create a new host builder.
    pub fn new() -> Self {
        Self {
            registry: ServiceRegistry::new(),
            config: HostConfig::default(),
        }
    }

    /// Register a handler factory.
    pub fn service<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn RpcServer> + Send + Sync + 'static,
    {
        self.registry.register(name, factory);
        self
    }

    /// Register an [`RpcService`] constructor.
    pub fn rpc_service<S, F>(mut self, name: &str, make: F) -> Self
    where
        S: RpcService,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.registry.register_service(name, make);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum number of open channels.
    ///
    /// Default: 256
    pub fn max_channels(mut self, limit: usize) -> Self {
        self.config.max_channels = limit;
        self
    }

    /// Set the per-channel request queue capacity.
    ///
    /// Default: 1024
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Set the array chunk cap handed to services.
    ///
    /// Default: 4096
    pub fn array_chunk_limit(mut self, limit: usize) -> Self {
        self.config.array_chunk_limit = limit;
        self
    }

    /// Build the host.
    pub fn build(self) -> ServiceHost {
        let config = self.config.normalized();
        ServiceHost {
            registry: Arc::new(self.registry),
            channel_permits: Arc::new(Semaphore::new(config.max_channels)),
            next_channel_id: AtomicU64::new(1),
            config,
        }
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hosts registered services and the channels opened against them.
pub struct ServiceHost {
    /// Factories by service name.
    registry: Arc<ServiceRegistry>,
    /// One permit per open channel.
    channel_permits: Arc<Semaphore>,
    /// Next channel ID to assign.
    next_channel_id: AtomicU64,
    config: HostConfig,
}

impl ServiceHost {
    /// Create a new host builder.
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Number of channels currently open.
    pub fn open_channels(&self) -> usize {
        self.config.max_channels - self.channel_permits.available_permits()
    }

    /// Open a channel with no request options.
    pub async fn open_channel(&self, service: &str, channel_name: &str) -> Result<ChannelHandle> {
        self.open_channel_with(service, channel_name, PvStructure::new())
            .await
    }

    /// Open a channel to `service`, initializing a fresh handler for it.
    ///
    /// # Errors
    ///
    /// - [`PvRpcError::ChannelLimit`] if `max_channels` are already open.
    /// - [`PvRpcError::ServiceNotFound`] if no such service is registered.
    /// - [`PvRpcError::ChannelInit`] if the handler refuses to initialize.
    pub async fn open_channel_with(
        &self,
        service: &str,
        channel_name: &str,
        pv_request: PvStructure,
    ) -> Result<ChannelHandle> {
        let permit = match self.channel_permits.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!(
                    "Channel capacity reached, rejecting {} on service {}",
                    channel_name,
                    service
                );
                return Err(PvRpcError::ChannelLimit(self.config.max_channels));
            }
        };

        let mut server = self.registry.create(service)?;

        let channel_id = self.next_channel_id.fetch_add(1, Ordering::Relaxed);
        let context = ChannelContext::new(channel_id, channel_name)
            .with_pv_request(pv_request)
            .with_array_chunk_limit(self.config.array_chunk_limit);

        let (sink, completions) = ChannelSink::pair();
        let status = server.initialize(context.clone(), Box::new(sink));
        if let Some(reason) = status.reason() {
            tracing::warn!("Channel {} failed to initialize: {}", channel_name, reason);
            server.destroy();
            return Err(PvRpcError::ChannelInit {
                channel: channel_name.to_string(),
                reason: reason.to_string(),
            });
        }

        let (commands_tx, commands_rx) = mpsc::channel(self.config.channel_capacity);
        let task = tokio::spawn(channel::run_channel(
            server,
            context.clone(),
            commands_rx,
            completions,
            permit,
        ));

        tracing::debug!(
            "Opened channel {} ({}) on service {}",
            channel_name,
            channel_id,
            service
        );
        Ok(ChannelHandle::new(
            context,
            service.to_string(),
            commands_tx,
            task,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{HelloService, HelloServiceFactory};

    #[test]
    fn test_builder_configuration() {
        let host = ServiceHost::builder()
            .max_channels(4)
            .channel_capacity(8)
            .array_chunk_limit(2)
            .build();

        assert_eq!(host.config().max_channels, 4);
        assert_eq!(host.config().channel_capacity, 8);
        assert_eq!(host.config().array_chunk_limit, 2);
        assert_eq!(host.open_channels(), 0);
    }

    #[test]
    fn test_builder_normalizes_zero() {
        let host = ServiceHost::builder().max_channels(0).build();
        assert_eq!(host.config().max_channels, 1);
    }

    #[test]
    fn test_builder_registers_services() {
        let host = ServiceHost::builder()
            .service(HelloService::NAME, HelloServiceFactory::create)
            .rpc_service("hello2", || HelloService)
            .build();

        assert_eq!(host.registry().service_names(), vec!["hello", "hello2"]);
    }

    #[tokio::test]
    async fn test_open_unknown_service() {
        let host = ServiceHost::builder().build();

        let err = host.open_channel("missing", "ch").await.unwrap_err();

        assert!(matches!(err, PvRpcError::ServiceNotFound(_)));
        assert_eq!(host.open_channels(), 0);
    }

    #[tokio::test]
    async fn test_open_with_empty_name_fails_init() {
        let host = ServiceHost::builder()
            .service(HelloService::NAME, HelloServiceFactory::create)
            .build();

        let err = host.open_channel("hello", "").await.unwrap_err();

        assert!(matches!(err, PvRpcError::ChannelInit { .. }));
        assert_eq!(host.open_channels(), 0);
    }

    #[tokio::test]
    async fn test_channel_ids_increase() {
        let host = ServiceHost::builder()
            .service(HelloService::NAME, HelloServiceFactory::create)
            .build();

        let a = host.open_channel("hello", "a").await.unwrap();
        let b = host.open_channel("hello", "b").await.unwrap();

        assert_eq!(a.channel_id(), 1);
        assert_eq!(b.channel_id(), 2);
        assert_eq!(b.service(), "hello");
        assert_eq!(host.open_channels(), 2);
    }
}
