//! The transport collaborator boundary
// (c) 2025 objex contributors
//!
//! The engine never touches the wire. An external transport delivers inbound
//! packets as [`Indication`](crate::protocol::Indication)s and
//! [`Confirmation`](crate::protocol::Confirmation)s, and exposes the
//! outbound primitives below. Byte-carrying outbound calls return the number
//! of bytes actually accepted into the current packet, which may be less
//! than offered; continuation framing for the unsent remainder (wire-level
//! CONTINUE codes, the OBEX final bit) is the transport's responsibility.

use crate::protocol::ResponseCode;

/// A transport-level send failure. Fatal to the current operation, never to
/// the session.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// The underlying channel is gone.
    #[error("transport channel closed")]
    Closed,
    /// The send itself failed.
    #[error("transport send failed: {0}")]
    Send(String),
}

/// Outbound primitives available to a server session.
pub trait ServerTransport {
    /// Answers an object-get request. Returns the number of payload bytes
    /// accepted into the current response packet.
    fn object_get_response(
        &mut self,
        code: ResponseCode,
        data: &[u8],
    ) -> Result<usize, TransportError>;

    /// Answers an object-put fragment.
    fn object_put_response(&mut self, code: ResponseCode) -> Result<(), TransportError>;

    /// Answers a special-object-get request. Same accepted-count contract as
    /// [`object_get_response`](Self::object_get_response).
    fn special_object_get_response(
        &mut self,
        code: ResponseCode,
        data: &[u8],
    ) -> Result<usize, TransportError>;

    /// Answers an object-delete request.
    fn object_delete_response(&mut self, code: ResponseCode) -> Result<(), TransportError>;
}

/// Outbound primitives available to a client session.
pub trait ClientTransport {
    /// Payload capacity remaining in the next outbound packet. Used to size
    /// upload fragments.
    fn free_packet_space(&self) -> usize;

    /// Issues an object-get request. `name` is `None` for a continuation
    /// probe.
    fn object_get_request(&mut self, name: Option<&str>) -> Result<(), TransportError>;

    /// Sends one upload fragment. `name` and `total_length` accompany the
    /// first fragment only. Returns the number of bytes actually accepted,
    /// which is authoritative and may be less than `data.len()`.
    fn object_put_request(
        &mut self,
        name: Option<&str>,
        data: &[u8],
        total_length: Option<u64>,
        is_final: bool,
    ) -> Result<usize, TransportError>;

    /// Issues a special-object-get request. `name` is `None` for a
    /// continuation probe.
    fn special_object_get_request(&mut self, name: Option<&str>) -> Result<(), TransportError>;

    /// Issues an object-delete request.
    fn object_delete_request(
        &mut self,
        name: &str,
        hard_delete: bool,
    ) -> Result<(), TransportError>;

    /// Aborts whatever operation is outstanding.
    fn abort_request(&mut self) -> Result<(), TransportError>;
}
