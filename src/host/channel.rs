//! Per-channel task and its handle.
//!
//! Each open channel owns one handler on a dedicated task:
//!
//! ```text
//! ChannelHandle::call ─► mpsc<ChannelCommand> ─► channel task ─► handler.request
//!        ▲                                             │
//!        └──────────── oneshot ◄── ChannelSink ◄───────┘
//! ```
//!
//! Requests are processed one at a time, so the handler never sees
//! overlapping calls. Each call is answered by exactly one outcome, taken
//! from the sink once `request` returns.

use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit};
use tokio::task::JoinHandle;

use crate::error::{PvRpcError, Result};
use crate::handler::{ChannelContext, RpcOutcome, RpcServer};
use crate::status::Status;
use crate::structure::PvStructure;

/// Failure reason reported when a handler returns without completing.
pub const INCOMPLETE_REQUEST: &str = "handler returned without completing";

/// Command sent to a channel task.
pub(crate) enum ChannelCommand {
    Call {
        argument: PvStructure,
        reply_tx: oneshot::Sender<Result<RpcOutcome>>,
    },
    Close,
}

/// Client side of an open channel.
///
/// Dropping the handle closes the channel once queued calls drain.
#[derive(Debug)]
pub struct ChannelHandle {
    context: ChannelContext,
    service: String,
    commands: mpsc::Sender<ChannelCommand>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    pub(crate) fn new(
        context: ChannelContext,
        service: String,
        commands: mpsc::Sender<ChannelCommand>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            context,
            service,
            commands,
            task,
        }
    }

    #[inline]
    pub fn channel_id(&self) -> u64 {
        self.context.channel_id()
    }

    #[inline]
    pub fn channel_name(&self) -> &str {
        self.context.channel_name()
    }

    #[inline]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Whether the channel task is still accepting calls.
    pub fn is_open(&self) -> bool {
        self.context.is_open() && !self.commands.is_closed()
    }

    /// Issue one RPC call and wait for its outcome.
    ///
    /// # Errors
    ///
    /// [`PvRpcError::ChannelClosed`] if the channel task has exited. Failures
    /// of the call itself arrive as a failure status in the outcome.
    pub async fn call(&self, argument: PvStructure) -> Result<RpcOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(ChannelCommand::Call { argument, reply_tx })
            .await
            .map_err(|_| PvRpcError::ChannelClosed)?;

        reply_rx.await.map_err(|_| PvRpcError::ChannelClosed)?
    }

    /// Destroy the handler and wait for the channel task to finish.
    pub async fn close(self) -> Result<()> {
        // Already-exited tasks simply drop the command.
        let _ = self.commands.send(ChannelCommand::Close).await;
        self.task.await.map_err(|e| {
            tracing::error!("Channel task for {} failed: {}", self.context.channel_name(), e);
            PvRpcError::ChannelClosed
        })
    }
}

/// Channel task body: serve commands until closed, then destroy the handler.
pub(crate) async fn run_channel(
    mut server: Box<dyn RpcServer>,
    context: ChannelContext,
    mut commands: mpsc::Receiver<ChannelCommand>,
    mut completions: mpsc::UnboundedReceiver<RpcOutcome>,
    permit: OwnedSemaphorePermit,
) {
    // Permit is held until this task completes
    let _permit = permit;

    while let Some(command) = commands.recv().await {
        match command {
            ChannelCommand::Call { argument, reply_tx } => {
                discard_stale(&mut completions, &context);
                let result = server
                    .request(&argument)
                    .map(|()| take_outcome(&mut completions, &context));

                if reply_tx.send(result).is_err() {
                    tracing::debug!(
                        "Caller on {} went away before the reply arrived",
                        context.channel_name()
                    );
                }
            }
            ChannelCommand::Close => break,
        }
    }

    context.close();
    server.destroy();
    tracing::debug!(
        "Channel {} ({}) closed",
        context.channel_name(),
        context.channel_id()
    );
}

/// Take the single outcome of the `request` that just returned.
///
/// The handler must deliver before `request` returns. A missing outcome
/// becomes a failure; extra outcomes are dropped so they cannot answer a
/// later call.
fn take_outcome(
    completions: &mut mpsc::UnboundedReceiver<RpcOutcome>,
    context: &ChannelContext,
) -> RpcOutcome {
    let outcome = match completions.try_recv() {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!(
                "Handler on {} returned without completing",
                context.channel_name()
            );
            return RpcOutcome {
                status: Status::failure(INCOMPLETE_REQUEST),
                reply: None,
            };
        }
    };

    discard_stale(completions, context);
    outcome
}

/// Drop outcomes that do not belong to the current call.
fn discard_stale(completions: &mut mpsc::UnboundedReceiver<RpcOutcome>, context: &ChannelContext) {
    while let Ok(extra) = completions.try_recv() {
        tracing::warn!(
            "Handler on {} completed more than once, dropping outcome: {}",
            context.channel_name(),
            extra.status
        );
    }
}
