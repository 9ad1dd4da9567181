//! Channel context and completion sinks.
//!
//! A handler captures both during `initialize`:
//! - [`ChannelContext`] - identity and settings of the channel it serves
//! - [`CompletionSink`] - where each request's outcome is delivered
//!
//! # Example
//!
//! ```
//! use pvrpc::handler::{ChannelContext, CompletionSink};
//! use pvrpc::structure::PvStructure;
//! use pvrpc::Status;
//!
//! let ctx = ChannelContext::new(1, "hello");
//! assert!(ctx.is_open());
//!
//! let sink = |status: Status, _reply: Option<PvStructure>| assert!(status.is_ok());
//! sink.deliver(Status::ok(), None);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{PvRpcError, Result};
use crate::status::Status;
use crate::structure::PvStructure;

/// Default elements per chunk when services copy arrays out of arguments.
pub const DEFAULT_ARRAY_CHUNK_LIMIT: usize = 4096;

/// Context of the channel a handler is bound to.
///
/// `ChannelContext` is `Clone`; clones share the open/closed flag.
#[derive(Debug, Clone)]
pub struct ChannelContext {
    /// Host-assigned channel ID.
    channel_id: u64,
    /// Channel name as requested by the client.
    channel_name: String,
    /// Request options supplied when the channel was created.
    pv_request: PvStructure,
    /// Chunk cap for array copies.
    array_chunk_limit: usize,
    /// Cleared when the channel is torn down.
    open: Arc<AtomicBool>,
}

impl ChannelContext {
    /// Create an open channel context.
    pub fn new(channel_id: u64, channel_name: impl Into<String>) -> Self {
        Self {
            channel_id,
            channel_name: channel_name.into(),
            pv_request: PvStructure::new(),
            array_chunk_limit: DEFAULT_ARRAY_CHUNK_LIMIT,
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Attach channel request options.
    pub fn with_pv_request(mut self, pv_request: PvStructure) -> Self {
        self.pv_request = pv_request;
        self
    }

    /// Set the array chunk cap.
    pub fn with_array_chunk_limit(mut self, limit: usize) -> Self {
        self.array_chunk_limit = limit.max(1);
        self
    }

    #[inline]
    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    #[inline]
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    #[inline]
    pub fn pv_request(&self) -> &PvStructure {
        &self.pv_request
    }

    #[inline]
    pub fn array_chunk_limit(&self) -> usize {
        self.array_chunk_limit
    }

    /// Whether the channel is still open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Mark the channel closed for every clone of this context.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

/// Outcome of one `request` call as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcOutcome {
    pub status: Status,
    /// Present only when `status` is OK.
    pub reply: Option<PvStructure>,
}

impl RpcOutcome {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Convert into the reply, mapping a failure status to [`PvRpcError::Compute`].
    pub fn into_reply(self) -> Result<PvStructure> {
        match (self.status, self.reply) {
            (Status::Ok, Some(reply)) => Ok(reply),
            (Status::Ok, None) => Ok(PvStructure::new()),
            (Status::Failure { reason }, _) => Err(PvRpcError::Compute(reason)),
        }
    }
}

/// Receives the outcome of each request.
///
/// Called exactly once per accepted `request`, before `request` returns.
pub trait CompletionSink: Send {
    fn deliver(&self, status: Status, reply: Option<PvStructure>);
}

impl<F> CompletionSink for F
where
    F: Fn(Status, Option<PvStructure>) + Send,
{
    fn deliver(&self, status: Status, reply: Option<PvStructure>) {
        self(status, reply)
    }
}

/// Sink that forwards outcomes into a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<RpcOutcome>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<RpcOutcome>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<RpcOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl CompletionSink for ChannelSink {
    fn deliver(&self, status: Status, reply: Option<PvStructure>) {
        if self.tx.send(RpcOutcome { status, reply }).is_err() {
            tracing::debug!("Completion receiver dropped, outcome discarded");
        }
    }
}
