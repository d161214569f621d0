//! Sync protocol definitions: response codes, transport events, object names
// (c) 2025 objex contributors
//!
//! The wire protocol proper (packet framing, headers, the OBEX final bit)
//! belongs to the external transport. What lives here is the engine's view
//! of it: the [`ResponseCode`](response::ResponseCode) space, the
//! [`Indication`](events::Indication)/[`Confirmation`](events::Confirmation)
//! events the transport delivers, and the hierarchical object-name grammar.

pub mod events;
pub mod name;
pub mod response;

pub use events::{Confirmation, Fragment, Indication};
pub use name::{
    AccessLevel, Descriptor, NameError, ParsedName, SpecialObjectKind, SpecialRequest, StoreKind,
    parse_object_name,
};
pub use response::ResponseCode;
