use thiserror::Error;

use crate::link::ConnectError;
use crate::protocol::ProtocolError;
use crate::storage::StorageError;
use crate::validation::IdentityError;

/// Failure taxonomy for the synchronizer core.
///
/// None of these abort the update tick. Lookup failures and protocol desyncs are
/// logged at the point they are caught and the affected object or message is
/// skipped; the rest surface as status changes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A world object a capability targets does not exist yet. Retried on the
    /// next full resync.
    #[error("world target not found yet: {0}")]
    TransientLookupFailure(String),

    /// A malformed inbound message. Only that message is dropped.
    #[error("protocol desync: {0}")]
    ProtocolDesync(#[from] ProtocolError),

    /// The socket closed or errored. No automatic reconnect.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Remote item id missing from the catalog.
    #[error("unknown capability id {0}")]
    UnknownCapabilityId(i64),

    /// The requested session differs from the persisted one; persisted state is wiped.
    #[error("identity mismatch: persisted {persisted}, requested {requested}")]
    IdentityMismatch { persisted: String, requested: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("connect error: {0}")]
    Connect(#[from] ConnectError),

    #[error("invalid session identity: {0}")]
    InvalidIdentity(#[from] IdentityError),

    #[error("not connected")]
    NotConnected,
}
