//! Error types for pvrpc.

use thiserror::Error;

use crate::array::ElementKind;
use crate::handler::HandlerState;
use crate::structure::FieldType;

/// Main error type for all pvrpc operations.
#[derive(Debug, Error)]
pub enum PvRpcError {
    /// A source returned no elements although it reported more remaining.
    #[error("incomplete {kind} source: chunk at offset {offset} returned 0 of {length} elements")]
    IncompleteSource {
        kind: ElementKind,
        offset: usize,
        length: usize,
    },

    /// A source returned more elements than were requested.
    #[error("oversized {kind} chunk at offset {offset}: requested {requested}, got {returned}")]
    OversizedChunk {
        kind: ElementKind,
        offset: usize,
        requested: usize,
        returned: usize,
    },

    /// A required field is absent from a structure.
    #[error("missing field: {0}")]
    MissingField(String),

    /// A field was written that the structure does not declare.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A structure was declared with the same field name twice.
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// A field exists but holds a different type than expected.
    #[error("field {name}: expected {expected}, found {found}")]
    FieldType {
        name: String,
        expected: FieldType,
        found: FieldType,
    },

    /// Operation is not valid in the handler's current state.
    #[error("invalid state for {operation}: handler is {state}")]
    InvalidState {
        operation: &'static str,
        state: HandlerState,
    },

    /// Service computation failed.
    #[error("compute error: {0}")]
    Compute(String),

    /// No service registered under the given name.
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    /// The handler refused to initialize on a channel.
    #[error("channel {channel} failed to initialize: {reason}")]
    ChannelInit { channel: String, reason: String },

    /// All channel slots are in use.
    #[error("channel limit reached ({0} open)")]
    ChannelLimit(usize),

    /// The channel task has exited.
    #[error("channel closed")]
    ChannelClosed,

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias using PvRpcError.
pub type Result<T> = std::result::Result<T, PvRpcError>;
