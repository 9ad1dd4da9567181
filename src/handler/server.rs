//! Per-channel RPC request handler.
//!
//! [`RpcRequestHandler`] drives one channel's lifecycle:
//!
//! ```text
//! Uninitialized ──initialize──► Ready ──request──► Handling ──► Ready ...
//!        │                        │
//!        └────────destroy─────────┴──────────► Destroyed
//! ```
//!
//! Application logic lives in an [`RpcService`]; the handler validates the
//! argument, builds the reply structure and routes the outcome to the
//! completion sink.

use std::fmt;

use super::context::{ChannelContext, CompletionSink};
use crate::error::{PvRpcError, Result};
use crate::status::Status;
use crate::structure::{FieldDesc, PvStructure};

/// Lifecycle state of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Uninitialized,
    Ready,
    /// Inside a `request` call.
    Handling,
    Destroyed,
}

impl fmt::Display for HandlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandlerState::Uninitialized => "uninitialized",
            HandlerState::Ready => "ready",
            HandlerState::Handling => "handling",
            HandlerState::Destroyed => "destroyed",
        };
        f.write_str(s)
    }
}

/// Application logic behind a handler.
pub trait RpcService: Send + 'static {
    /// Fields every argument must carry.
    fn argument_fields(&self) -> Vec<FieldDesc>;

    /// Fields of the reply. The reply passed to [`compute`](Self::compute)
    /// is created with exactly these fields.
    fn reply_fields(&self) -> Vec<FieldDesc>;

    /// Fill `reply` from `argument`.
    ///
    /// # Panics
    ///
    /// A panic is not turned into a failure status. The handler is left in
    /// [`HandlerState::Handling`] and rejects later calls with
    /// [`PvRpcError::InvalidState`]; under [`ServiceHost`](crate::host::ServiceHost)
    /// the channel task ends and callers see [`PvRpcError::ChannelClosed`].
    fn compute(
        &mut self,
        ctx: &ChannelContext,
        argument: &PvStructure,
        reply: &mut PvStructure,
    ) -> Result<()>;

    /// Called once when the handler is bound to a channel.
    fn on_initialize(&mut self, _ctx: &ChannelContext) -> Result<()> {
        Ok(())
    }

    /// Called once when the handler is destroyed.
    fn on_destroy(&mut self) {}
}

/// The lifecycle contract a host drives.
///
/// Hosts must call `initialize` first, then `request` any number of times,
/// then `destroy`. Calls on one instance must not overlap.
pub trait RpcServer: Send {
    /// Bind to a channel and capture the completion sink.
    fn initialize(&mut self, context: ChannelContext, sink: Box<dyn CompletionSink>) -> Status;

    /// Handle one call. The outcome goes to the sink captured by `initialize`
    /// exactly once, before this returns.
    ///
    /// # Errors
    ///
    /// [`PvRpcError::InvalidState`] if the handler is not ready. This is the
    /// only outcome not delivered through the sink, since none is held.
    fn request(&mut self, argument: &PvStructure) -> Result<()>;

    /// Tear down and release the channel context and sink.
    fn destroy(&mut self);

    /// Current lifecycle state.
    fn state(&self) -> HandlerState;
}

/// [`RpcServer`] implementation around an [`RpcService`].
pub struct RpcRequestHandler<S> {
    service: S,
    state: HandlerState,
    context: Option<ChannelContext>,
    sink: Option<Box<dyn CompletionSink>>,
    completed: u64,
}

impl<S: RpcService> RpcRequestHandler<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: HandlerState::Uninitialized,
            context: None,
            sink: None,
            completed: 0,
        }
    }

    /// Number of requests delivered to the sink so far.
    pub fn completed_requests(&self) -> u64 {
        self.completed
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Validate, build and compute one reply.
    fn handle(service: &mut S, ctx: &ChannelContext, argument: &PvStructure) -> Result<PvStructure> {
        for desc in service.argument_fields() {
            argument.require(&desc)?;
        }

        let declared = service.reply_fields();
        let mut reply = PvStructure::create(&declared)?;
        service.compute(ctx, argument, &mut reply)?;

        if reply.introspect() != declared {
            return Err(PvRpcError::Compute(
                "reply fields do not match the declared reply".to_string(),
            ));
        }
        Ok(reply)
    }
}

impl<S: RpcService> RpcServer for RpcRequestHandler<S> {
    fn initialize(&mut self, context: ChannelContext, sink: Box<dyn CompletionSink>) -> Status {
        if self.state != HandlerState::Uninitialized {
            let err = PvRpcError::InvalidState {
                operation: "initialize",
                state: self.state,
            };
            tracing::warn!("Rejected initialize: {}", err);
            return Status::from(&err);
        }
        if context.channel_name().is_empty() {
            return Status::failure("channel name is empty");
        }
        if !context.is_open() {
            return Status::failure(format!("channel {} is closed", context.channel_name()));
        }
        if let Err(e) = self.service.on_initialize(&context) {
            tracing::warn!("Service refused channel {}: {}", context.channel_name(), e);
            return Status::from(&e);
        }

        tracing::debug!(
            "Handler ready on channel {} ({})",
            context.channel_name(),
            context.channel_id()
        );
        self.context = Some(context);
        self.sink = Some(sink);
        self.state = HandlerState::Ready;
        Status::ok()
    }

    fn request(&mut self, argument: &PvStructure) -> Result<()> {
        let (context, sink) = match (&self.context, &self.sink) {
            (Some(context), Some(sink)) if self.state == HandlerState::Ready => (context, sink),
            _ => {
                tracing::warn!("Rejected request: handler is {}", self.state);
                return Err(PvRpcError::InvalidState {
                    operation: "request",
                    state: self.state,
                });
            }
        };

        self.state = HandlerState::Handling;
        match Self::handle(&mut self.service, context, argument) {
            Ok(reply) => sink.deliver(Status::ok(), Some(reply)),
            Err(e) => {
                tracing::debug!("Request on channel {} failed: {}", context.channel_name(), e);
                sink.deliver(Status::from(&e), None);
            }
        }
        self.completed += 1;
        self.state = HandlerState::Ready;
        Ok(())
    }

    fn destroy(&mut self) {
        if self.state == HandlerState::Destroyed {
            return;
        }
        self.service.on_destroy();
        if let Some(context) = self.context.take() {
            tracing::debug!(
                "Handler destroyed on channel {} after {} requests",
                context.channel_name(),
                self.completed
            );
        }
        self.sink = None;
        self.state = HandlerState::Destroyed;
    }

    fn state(&self) -> HandlerState {
        self.state
    }
}
