//! Handler module - RPC request lifecycle and dispatch.
//!
//! Provides:
//! - [`RpcRequestHandler`] - per-channel state machine around an [`RpcService`]
//! - [`RpcServer`] - the lifecycle contract hosts drive
//! - [`ChannelContext`] / [`CompletionSink`] - captured during `initialize`
//! - [`ServiceRegistry`] - maps service names to handler factories
//!
//! # Example
//!
//! ```
//! use pvrpc::handler::{ChannelContext, ChannelSink, RpcServer};
//! use pvrpc::service::HelloServiceFactory;
//! use pvrpc::structure::PvStructure;
//!
//! let mut server = HelloServiceFactory::create();
//! let (sink, mut outcomes) = ChannelSink::pair();
//!
//! assert!(server.initialize(ChannelContext::new(1, "hello"), Box::new(sink)).is_ok());
//!
//! let argument = PvStructure::new().with_field("name", "World").unwrap();
//! server.request(&argument).unwrap();
//!
//! let reply = outcomes.try_recv().unwrap().into_reply().unwrap();
//! assert_eq!(reply.get_string("greeting").unwrap(), "Hello World");
//!
//! server.destroy();
//! ```

mod context;
mod registry;
mod server;

pub use context::{
    ChannelContext, ChannelSink, CompletionSink, RpcOutcome, DEFAULT_ARRAY_CHUNK_LIMIT,
};
pub use registry::{ServiceFactory, ServiceRegistry};
pub use server::{HandlerState, RpcRequestHandler, RpcServer, RpcService};
