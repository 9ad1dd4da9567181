//! Hello-greeting service.
//!
//! The smallest useful RPC service: it reads the `name` field of the
//! argument and replies with `greeting = "Hello " + name`.

use crate::error::Result;
use crate::handler::{ChannelContext, RpcRequestHandler, RpcServer, RpcService};
use crate::structure::{FieldDesc, PvStructure};

/// Greets whoever is named in the argument.
#[derive(Debug, Default)]
pub struct HelloService;

impl HelloService {
    /// Registered service name.
    pub const NAME: &'static str = "hello";
    /// Required argument field.
    pub const NAME_FIELD: &'static str = "name";
    /// Reply field.
    pub const GREETING_FIELD: &'static str = "greeting";

    /// Build the greeting for `name`.
    pub fn greet(name: &str) -> String {
        format!("Hello {}", name)
    }
}

impl RpcService for HelloService {
    fn argument_fields(&self) -> Vec<FieldDesc> {
        vec![FieldDesc::string(Self::NAME_FIELD)]
    }

    fn reply_fields(&self) -> Vec<FieldDesc> {
        vec![FieldDesc::string(Self::GREETING_FIELD)]
    }

    fn compute(
        &mut self,
        _ctx: &ChannelContext,
        argument: &PvStructure,
        reply: &mut PvStructure,
    ) -> Result<()> {
        let name = argument.get_string(Self::NAME_FIELD)?;
        reply.set_field(Self::GREETING_FIELD, Self::greet(name))
    }
}

/// Factory for hello handlers.
pub struct HelloServiceFactory;

impl HelloServiceFactory {
    /// Create a new, uninitialized hello handler.
    pub fn create() -> Box<dyn RpcServer> {
        Box::new(RpcRequestHandler::new(HelloService))
    }
}
