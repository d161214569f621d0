// (c) 2025 objex contributors

//! `objex` is a transport-agnostic engine for moving arbitrarily large
//! objects over a packet transport with a bounded payload per packet, in
//! the style of OBEX/IrMC synchronisation sessions.
//!
//! ## Overview
//!
//! The engine plays either side of a session:
//!
//! * [`ServerSession`] answers inbound requests against an [`ObjectStore`]:
//!   it reassembles uploads fragment by fragment, slices downloads to
//!   whatever the transport will take per packet, formats and serves the
//!   special objects (change counters, change logs, info logs, device
//!   information, the real-time clock), and executes deletes.
//! * [`ClientSession`] drives requests: it fragments uploads to the
//!   transport's free packet space, streams downloads into a caller-supplied
//!   sink, and tracks the single operation allowed in flight.
//!
//! Neither side touches the wire. The embedder owns the transport: it
//! decodes inbound packets into [`protocol::Indication`]s and
//! [`protocol::Confirmation`]s, feeds them to the session, and implements
//! the outbound [`ServerTransport`] / [`ClientTransport`] primitives the
//! session responds through. Byte-carrying sends report how many bytes the
//! current packet actually accepted; the session keeps the remainder and
//! continues from exactly that count on the next round trip.
//!
//! Everything is single-threaded and callback-driven: calls into a session
//! complete their side effects before returning, and at most one operation
//! is in flight per session at any time.
//!
//! ## Collaborators
//!
//! * [`ObjectStore`] (server side): persistence for objects, plus the data
//!   behind the special objects.
//! * [`ServerTransport`] / [`ClientTransport`]: outbound packet primitives.
//!
//! Object names follow the IrMC `telecom/...` hierarchy; see
//! [`protocol::name`](protocol) for the grammar.

pub mod config;
pub mod protocol;
pub mod session;
pub mod store;
pub mod transport;

pub use config::ObjexConfig;
pub use protocol::ResponseCode;
pub use session::{
    ClientSession, OperationKind, Progress, ServerSession, Sink, TransferError,
};
pub use store::ObjectStore;
pub use transport::{ClientTransport, ServerTransport, TransportError};
