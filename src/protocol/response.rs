//! Response codes shared by every operation in the sync protocol
// (c) 2025 objex contributors

use serde_repr::{Deserialize_repr, Serialize_repr};

/// Machine-readable outcome of a request, in the OBEX numeric space.
///
/// The engine treats these as opaque small integers, never as bit flags;
/// in particular the OBEX "final" bit is the transport's business and does
/// not appear here.
#[derive(
    Serialize_repr,
    Deserialize_repr,
    PartialEq,
    Eq,
    Debug,
    Clone,
    Copy,
    Hash,
    thiserror::Error,
    strum_macros::Display,
)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ResponseCode {
    /// More data remains; another round trip is required.
    Continue = 0x10,
    /// The operation completed successfully.
    Ok = 0x20,
    BadRequest = 0x40,
    Unauthorized = 0x41,
    Forbidden = 0x43,
    NotFound = 0x44,
    Conflict = 0x49,
    ObjectTooLarge = 0x4D,
    UnsupportedMediaType = 0x4F,
    InternalError = 0x50,
    NotImplemented = 0x51,
    ServiceUnavailable = 0x53,
    DatabaseFull = 0x60,
    DatabaseLocked = 0x61,
}

impl ResponseCode {
    /// True for the two codes that denote forward progress.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, ResponseCode::Ok | ResponseCode::Continue)
    }

    /// True for every code that ends an operation (everything except
    /// [`Continue`](ResponseCode::Continue)).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != ResponseCode::Continue
    }
}
