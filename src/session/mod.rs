//! Session state machines for both transfer roles
// (c) 2025 objex contributors
//!
//! A session tracks the single operation allowed in flight per connection.
//! [`ServerSession`] answers inbound indications (reassembling uploads,
//! slicing downloads); [`ClientSession`] drives requests and consumes
//! confirmations. Both enforce the same discipline: one operation at a
//! time, and every exit path (success, any error, abort, close) leaves the
//! session with no operation and no buffer.

mod client;
mod server;
mod special;

#[cfg(test)]
pub(crate) mod test;

pub use client::{ClientSession, Sink};
pub use server::ServerSession;

use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};

use crate::transport::TransportError;

/// Which operation a session currently has in flight.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display,
)]
#[allow(missing_docs)]
pub enum OperationKind {
    Get,
    Put,
    SpecialGet,
    Delete,
}

/// What a delivered confirmation led to, reported to the client embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More round trips are pending; keep delivering confirmations.
    InFlight,
    /// The operation ended with this terminal response code.
    Complete(crate::protocol::ResponseCode),
}

/// Why an operation ended abnormally. Fatal to the operation only; the
/// session itself remains usable (and is always left cleared).
#[derive(thiserror::Error, Debug)]
pub enum TransferError {
    /// A new operation was requested while one is in flight.
    #[error("an operation is already in progress ({0})")]
    Busy(OperationKind),
    /// The peer (or the embedder's transport) violated the protocol.
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// The transport failed to send.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The client-side sink refused the downloaded bytes.
    #[error("sink write failed: {0}")]
    Sink(#[from] std::io::Error),
}

/// Accumulation buffer for server-side Put reassembly.
///
/// Growth is exact: a fragment that does not fit triggers a reallocation to
/// `bytes_used + fragment_len`, preserving prior bytes. Reservation failure
/// is recoverable; the caller answers `InternalError` and drops the whole
/// accumulator, so no partial buffer outlives the failure.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    bytes: Vec<u8>,
    #[cfg(test)]
    fail_next_grow: bool,
}

impl Accumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pre-sizes the buffer from a total-length hint.
    pub(crate) fn with_total_hint(hint: usize) -> Result<Self, TryReserveError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(hint)?;
        Ok(Self {
            bytes,
            ..Self::default()
        })
    }

    /// Appends a fragment, growing exactly as far as needed.
    pub(crate) fn append(&mut self, data: &[u8]) -> Result<(), TryReserveError> {
        #[cfg(test)]
        if self.fail_next_grow {
            self.fail_next_grow = false;
            // A reservation this large cannot succeed; produces a real error value.
            let mut probe: Vec<u8> = Vec::new();
            probe.try_reserve_exact(usize::MAX)?;
        }
        if self.bytes.capacity() - self.bytes.len() < data.len() {
            self.bytes.try_reserve_exact(data.len())?;
        }
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Arms a one-shot growth failure, for exercising the resource-error path.
    #[cfg(test)]
    pub(crate) fn fail_next_grow(&mut self) {
        self.fail_next_grow = true;
    }
}
