//! Hello service - simple request/response example.
//!
//! This example demonstrates:
//! - Registering a service factory with the host builder
//! - Opening a channel and issuing calls
//! - Observing success and failure outcomes
//!
//! Run with `RUST_LOG=pvrpc=debug` to see handler lifecycle logs.

use pvrpc::host::ServiceHost;
use pvrpc::service::{HelloService, HelloServiceFactory};
use pvrpc::structure::PvStructure;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let host = ServiceHost::builder()
        .service(HelloService::NAME, HelloServiceFactory::create)
        .build();

    let channel = host.open_channel(HelloService::NAME, "greeter").await?;

    for name in ["World", "EPICS"] {
        let argument = PvStructure::new().with_field(HelloService::NAME_FIELD, name)?;
        let reply = channel.call(argument).await?.into_reply()?;
        println!("{}", reply.get_string(HelloService::GREETING_FIELD)?);
    }

    // No `name` field: delivered as a failure status
    let outcome = channel.call(PvStructure::new()).await?;
    println!("{}", outcome.status);

    channel.close().await?;
    Ok(())
}
