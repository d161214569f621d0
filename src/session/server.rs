//! Server-side session: answers indications
// (c) 2025 objex contributors

use tracing::{debug, trace, warn};

use crate::config::ObjexConfig;
use crate::protocol::{
    parse_object_name, Descriptor, Fragment, Indication, ParsedName, ResponseCode,
};
use crate::session::special::format_special;
use crate::session::{Accumulator, OperationKind};
use crate::store::ObjectStore;
use crate::transport::{ServerTransport, TransportError};

/// The one operation a server session may have open.
enum ServerOp {
    /// An upload being reassembled.
    Put {
        descriptor: Descriptor,
        buffer: Accumulator,
        total_hint: Option<u64>,
    },
    /// A download partway through being sliced out.
    Get { object: Vec<u8>, offset: usize },
    /// A special-object download whose first packet could not carry the
    /// full payload. Only the unsent tail is retained.
    SpecialGet { tail: Vec<u8>, offset: usize },
}

impl ServerOp {
    fn kind(&self) -> OperationKind {
        match self {
            ServerOp::Put { .. } => OperationKind::Put,
            ServerOp::Get { .. } => OperationKind::Get,
            ServerOp::SpecialGet { .. } => OperationKind::SpecialGet,
        }
    }
}

/// Answers inbound requests against an [`ObjectStore`].
///
/// Feed every transport-decoded [`Indication`] to
/// [`handle_indication`](Self::handle_indication); the session sends the
/// response through the supplied transport before returning. At most one
/// operation is open at a time; a request that conflicts with the open
/// operation is answered `BadRequest` and the open operation is untouched.
pub struct ServerSession<S: ObjectStore> {
    store: S,
    config: ObjexConfig,
    op: Option<ServerOp>,
}

impl<S: ObjectStore> std::fmt::Debug for ServerSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSession")
            .field("config", &self.config)
            .field("op", &self.op.as_ref().map(ServerOp::kind))
            .finish_non_exhaustive()
    }
}

impl<S: ObjectStore> ServerSession<S> {
    /// Creates a session over the given store.
    pub fn new(store: S, config: ObjexConfig) -> Self {
        Self {
            store,
            config,
            op: None,
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The backing store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The operation currently open, if any.
    #[must_use]
    pub fn current_operation(&self) -> Option<OperationKind> {
        self.op.as_ref().map(ServerOp::kind)
    }

    /// Processes one indication, sending the response (if the indication
    /// calls for one) before returning.
    ///
    /// A transport error is fatal to the open operation: the session is
    /// cleared before the error propagates, so the embedder may keep using
    /// it once the transport recovers.
    pub fn handle_indication<T: ServerTransport>(
        &mut self,
        transport: &mut T,
        indication: Indication,
    ) -> Result<(), TransportError> {
        let result = self.dispatch(transport, indication);
        if result.is_err() {
            self.op = None;
        }
        result
    }

    fn dispatch<T: ServerTransport>(
        &mut self,
        transport: &mut T,
        indication: Indication,
    ) -> Result<(), TransportError> {
        match indication {
            Indication::ObjectGet { name } => self.object_get(transport, name),
            Indication::ObjectPut {
                name,
                fragment,
                total_length,
                max_change_counter,
            } => self.object_put(transport, name, fragment, total_length, max_change_counter),
            Indication::SpecialObjectGet { name } => self.special_object_get(transport, name),
            Indication::ObjectDelete {
                name,
                hard_delete,
                max_change_counter,
            } => self.object_delete(transport, &name, hard_delete, max_change_counter),
            Indication::Abort | Indication::PortClose => {
                if let Some(op) = self.op.take() {
                    debug!("dropping open {} operation", op.kind());
                }
                Ok(())
            }
        }
    }

    /// Parses a request name, or reports why it was refused.
    fn parse_name(&self, name: &str) -> Result<ParsedName, ResponseCode> {
        if name.len() > self.config.max_name_length {
            return Err(ResponseCode::BadRequest);
        }
        parse_object_name(name).map_err(|e| {
            debug!("rejecting object name {name:?}: {e}");
            ResponseCode::BadRequest
        })
    }

    fn object_put<T: ServerTransport>(
        &mut self,
        transport: &mut T,
        name: Option<String>,
        fragment: Fragment,
        total_length: Option<u64>,
        max_change_counter: Option<u32>,
    ) -> Result<(), TransportError> {
        match (self.op.take(), name) {
            // First fragment of a new upload.
            (None, Some(name)) => {
                let descriptor = match self.parse_name(&name) {
                    Ok(ParsedName::Object(mut d)) => {
                        d.max_change_counter = max_change_counter;
                        d
                    }
                    Ok(ParsedName::Special(_)) => {
                        // Special objects are read-only.
                        return transport.object_put_response(ResponseCode::UnsupportedMediaType);
                    }
                    Err(code) => return transport.object_put_response(code),
                };
                if total_length.is_some_and(|t| t > self.config.max_object_size) {
                    debug!("upload of {name:?} announces {total_length:?} bytes, over limit");
                    return transport.object_put_response(ResponseCode::ObjectTooLarge);
                }
                let buffer = match total_length {
                    Some(hint) => {
                        let hint = usize::try_from(hint).unwrap_or(usize::MAX);
                        match Accumulator::with_total_hint(hint) {
                            Ok(buffer) => buffer,
                            Err(e) => {
                                warn!("cannot reserve {hint} bytes for upload: {e}");
                                return transport.object_put_response(ResponseCode::InternalError);
                            }
                        }
                    }
                    None => Accumulator::new(),
                };
                self.put_fragment(transport, descriptor, buffer, total_length, &fragment)
            }
            // Continuation fragment of the open upload.
            (Some(ServerOp::Put {
                descriptor,
                buffer,
                total_hint,
            }), None) => self.put_fragment(transport, descriptor, buffer, total_hint, &fragment),
            // Continuation with nothing open.
            (None, None) => transport.object_put_response(ResponseCode::BadRequest),
            // A fresh request while some operation is open.
            (Some(op), _) => {
                self.op = Some(op);
                transport.object_put_response(ResponseCode::BadRequest)
            }
        }
    }

    /// Folds one fragment into an upload. The operation arrives detached
    /// from `self.op` and is restored only on the continue path; every
    /// refusal leaves the session cleared.
    fn put_fragment<T: ServerTransport>(
        &mut self,
        transport: &mut T,
        descriptor: Descriptor,
        mut buffer: Accumulator,
        total_hint: Option<u64>,
        fragment: &Fragment,
    ) -> Result<(), TransportError> {
        let projected = buffer.len() as u64 + fragment.data.len() as u64;
        if projected > self.config.max_object_size {
            debug!("upload grew to {projected} bytes, over limit");
            return transport.object_put_response(ResponseCode::ObjectTooLarge);
        }
        if total_hint.is_some_and(|hint| projected > hint) {
            debug!("upload grew past its announced length of {total_hint:?}");
            return transport.object_put_response(ResponseCode::BadRequest);
        }
        if let Err(e) = buffer.append(&fragment.data) {
            warn!("cannot grow upload buffer to {projected} bytes: {e}");
            return transport.object_put_response(ResponseCode::InternalError);
        }
        if fragment.is_final {
            if total_hint.is_some_and(|hint| buffer.len() as u64 != hint) {
                debug!(
                    "upload ended at {} bytes, announced {total_hint:?}",
                    buffer.len()
                );
                return transport.object_put_response(ResponseCode::BadRequest);
            }
            let code = self.store.put_object(&descriptor, buffer.as_slice());
            debug!("committed {} byte upload: {code}", buffer.len());
            transport.object_put_response(code)
        } else {
            trace!("accumulated {} bytes so far", buffer.len());
            self.op = Some(ServerOp::Put {
                descriptor,
                buffer,
                total_hint,
            });
            transport.object_put_response(ResponseCode::Continue)
        }
    }

    fn object_get<T: ServerTransport>(
        &mut self,
        transport: &mut T,
        name: Option<String>,
    ) -> Result<(), TransportError> {
        match (self.op.take(), name) {
            (None, Some(name)) => {
                let descriptor = match self.parse_name(&name) {
                    Ok(ParsedName::Object(d)) => d,
                    Ok(ParsedName::Special(_)) => {
                        return transport
                            .object_get_response(ResponseCode::BadRequest, &[])
                            .map(drop);
                    }
                    Err(code) => return transport.object_get_response(code, &[]).map(drop),
                };
                match self.store.get_object(&descriptor) {
                    Ok(object) => {
                        debug!("serving {} byte object {name:?}", object.len());
                        self.get_step(transport, object, 0)
                    }
                    Err(code) => transport.object_get_response(code, &[]).map(drop),
                }
            }
            (Some(ServerOp::Get { object, offset }), None) => {
                self.get_step(transport, object, offset)
            }
            (None, None) => transport
                .object_get_response(ResponseCode::BadRequest, &[])
                .map(drop),
            (Some(op), _) => {
                self.op = Some(op);
                transport
                    .object_get_response(ResponseCode::BadRequest, &[])
                    .map(drop)
            }
        }
    }

    /// Offers everything not yet sent; whatever the packet could not take
    /// stays in the session for the next continuation poll.
    fn get_step<T: ServerTransport>(
        &mut self,
        transport: &mut T,
        object: Vec<u8>,
        offset: usize,
    ) -> Result<(), TransportError> {
        let remaining = &object[offset..];
        let accepted = transport.object_get_response(ResponseCode::Ok, remaining)?;
        if accepted < remaining.len() {
            trace!("{} of {} bytes accepted", offset + accepted, object.len());
            let offset = offset + accepted;
            self.op = Some(ServerOp::Get { object, offset });
        }
        Ok(())
    }

    fn special_object_get<T: ServerTransport>(
        &mut self,
        transport: &mut T,
        name: Option<String>,
    ) -> Result<(), TransportError> {
        match (self.op.take(), name) {
            (None, Some(name)) => {
                let request = match self.parse_name(&name) {
                    Ok(ParsedName::Special(r)) => r,
                    Ok(ParsedName::Object(_)) => {
                        return transport
                            .special_object_get_response(ResponseCode::BadRequest, &[])
                            .map(drop);
                    }
                    Err(code) => {
                        return transport.special_object_get_response(code, &[]).map(drop);
                    }
                };
                let payload = match format_special(&self.store, &request) {
                    Ok(payload) => payload,
                    Err(code) => {
                        return transport.special_object_get_response(code, &[]).map(drop);
                    }
                };
                let accepted =
                    transport.special_object_get_response(ResponseCode::Ok, &payload)?;
                if accepted < payload.len() {
                    // Keep only the unsent tail.
                    self.op = Some(ServerOp::SpecialGet {
                        tail: payload[accepted..].to_vec(),
                        offset: 0,
                    });
                }
                Ok(())
            }
            (Some(ServerOp::SpecialGet { tail, offset }), None) => {
                let remaining = &tail[offset..];
                let accepted =
                    transport.special_object_get_response(ResponseCode::Ok, remaining)?;
                if accepted < remaining.len() {
                    let offset = offset + accepted;
                    self.op = Some(ServerOp::SpecialGet { tail, offset });
                }
                Ok(())
            }
            (None, None) => transport
                .special_object_get_response(ResponseCode::BadRequest, &[])
                .map(drop),
            (Some(op), _) => {
                self.op = Some(op);
                transport
                    .special_object_get_response(ResponseCode::BadRequest, &[])
                    .map(drop)
            }
        }
    }

    /// Deletes complete in a single round trip, but still respect the
    /// one-operation rule.
    fn object_delete<T: ServerTransport>(
        &mut self,
        transport: &mut T,
        name: &str,
        hard_delete: bool,
        max_change_counter: Option<u32>,
    ) -> Result<(), TransportError> {
        if self.op.is_some() {
            return transport.object_delete_response(ResponseCode::BadRequest);
        }
        let descriptor = match self.parse_name(name) {
            Ok(ParsedName::Object(mut d)) => {
                d.hard_delete = hard_delete;
                d.max_change_counter = max_change_counter;
                d
            }
            Ok(ParsedName::Special(_)) => {
                return transport.object_delete_response(ResponseCode::UnsupportedMediaType);
            }
            Err(code) => return transport.object_delete_response(code),
        };
        let code = self.store.delete_object(&descriptor);
        debug!("delete of {name:?} (hard: {hard_delete}): {code}");
        transport.object_delete_response(code)
    }

    /// Arms a one-shot growth failure on the open upload's buffer.
    #[cfg(test)]
    pub(crate) fn arm_put_allocation_failure(&mut self) {
        if let Some(ServerOp::Put { buffer, .. }) = &mut self.op {
            buffer.fail_next_grow();
        }
    }
}
