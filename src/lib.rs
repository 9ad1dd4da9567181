//! # pvrpc
//!
//! Building blocks for structured-value RPC services.
//!
//! This crate provides two independent pieces and a small host that
//! composes them:
//!
//! - **Handlers** ([`handler`]): a per-channel state machine
//!   (`initialize` → `request`* → `destroy`) that validates a structured
//!   argument, builds a reply and delivers the outcome through a completion
//!   sink.
//! - **Bulk array reads** ([`array`]): drain `f64`, `i64`, `i8` or `String`
//!   arrays out of sources that only hand out bounded, offset-addressed
//!   chunks.
//! - **Host** ([`host`]): opens channels against registered services and
//!   serializes calls per channel on tokio tasks.
//!
//! ## Example
//!
//! ```ignore
//! use pvrpc::host::ServiceHost;
//! use pvrpc::service::{HelloService, HelloServiceFactory};
//! use pvrpc::structure::PvStructure;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let host = ServiceHost::builder()
//!         .service(HelloService::NAME, HelloServiceFactory::create)
//!         .build();
//!
//!     let channel = host.open_channel("hello", "greeter").await?;
//!     let argument = PvStructure::new().with_field("name", "World")?;
//!     let outcome = channel.call(argument).await?;
//!     println!("{}", outcome.into_reply()?.get_string("greeting")?);
//!
//!     channel.close().await?;
//!     Ok(())
//! }
//! ```

pub mod array;
pub mod error;
pub mod handler;
pub mod host;
pub mod service;
pub mod structure;

mod status;

pub use array::BulkArrayReader;
pub use error::{PvRpcError, Result};
pub use handler::{RpcRequestHandler, RpcServer, RpcService};
pub use host::ServiceHost;
pub use status::Status;
