//! Client-side session: drives requests, consumes confirmations
// (c) 2025 objex contributors

use std::io::Write;

use tracing::{debug, trace};

use crate::protocol::{Confirmation, Fragment, ResponseCode};
use crate::session::{OperationKind, Progress, TransferError};
use crate::transport::ClientTransport;

/// Where downloaded bytes go. The session writes fragments as they arrive
/// and flushes once the final fragment lands.
pub type Sink = Box<dyn Write + Send>;

/// The one operation a client session may have in flight.
enum ClientOp {
    /// An upload; `offset` counts bytes the transport has accepted so far.
    Put { source: Vec<u8>, offset: usize },
    /// A download being written through to the sink.
    Get { sink: Sink },
    /// A special-object download.
    SpecialGet { sink: Sink },
    /// A delete awaiting its single confirmation.
    Delete,
}

impl ClientOp {
    fn kind(&self) -> OperationKind {
        match self {
            ClientOp::Put { .. } => OperationKind::Put,
            ClientOp::Get { .. } => OperationKind::Get,
            ClientOp::SpecialGet { .. } => OperationKind::SpecialGet,
            ClientOp::Delete => OperationKind::Delete,
        }
    }
}

/// Sizes the next upload fragment. Zero remaining bytes is a legal
/// (empty, final) fragment; zero packet space with bytes left to send is a
/// transport misconfiguration.
fn fragment_chunk(free_space: usize, remaining: usize) -> Result<usize, TransferError> {
    if remaining == 0 {
        return Ok(0);
    }
    if free_space == 0 {
        return Err(TransferError::Protocol(
            "transport reports no free packet space".into(),
        ));
    }
    Ok(free_space.min(remaining))
}

/// Drives operations against a remote store.
///
/// Start an operation with one of the `start_*` methods, then feed every
/// transport-decoded [`Confirmation`] to
/// [`handle_confirmation`](Self::handle_confirmation) until it reports
/// [`Progress::Complete`]. One operation at a time; starting a second is
/// refused with [`TransferError::Busy`] and disturbs nothing.
#[derive(Default)]
pub struct ClientSession {
    op: Option<ClientOp>,
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("op", &self.op.as_ref().map(ClientOp::kind))
            .finish()
    }
}

impl ClientSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The operation currently in flight, if any.
    #[must_use]
    pub fn current_operation(&self) -> Option<OperationKind> {
        self.op.as_ref().map(ClientOp::kind)
    }

    fn ensure_idle(&self) -> Result<(), TransferError> {
        match &self.op {
            Some(op) => Err(TransferError::Busy(op.kind())),
            None => Ok(()),
        }
    }

    /// Starts uploading `source` under the given object name. The first
    /// fragment goes out before this returns; the announced total length
    /// accompanies it.
    pub fn start_put<T: ClientTransport>(
        &mut self,
        transport: &mut T,
        name: &str,
        source: Vec<u8>,
    ) -> Result<(), TransferError> {
        self.ensure_idle()?;
        let total = source.len() as u64;
        let chunk = fragment_chunk(transport.free_packet_space(), source.len())?;
        let is_final = chunk == source.len();
        let accepted =
            transport.object_put_request(Some(name), &source[..chunk], Some(total), is_final)?;
        if accepted > chunk {
            return Err(TransferError::Protocol(format!(
                "transport accepted {accepted} of {chunk} offered bytes"
            )));
        }
        debug!("uploading {total} bytes as {name:?}, {accepted} sent");
        self.op = Some(ClientOp::Put {
            source,
            offset: accepted,
        });
        Ok(())
    }

    /// Starts downloading the named object into `sink`.
    pub fn start_get<T: ClientTransport>(
        &mut self,
        transport: &mut T,
        name: &str,
        sink: Sink,
    ) -> Result<(), TransferError> {
        self.ensure_idle()?;
        transport.object_get_request(Some(name))?;
        debug!("requested object {name:?}");
        self.op = Some(ClientOp::Get { sink });
        Ok(())
    }

    /// Starts downloading the named special object into `sink`.
    pub fn start_special_get<T: ClientTransport>(
        &mut self,
        transport: &mut T,
        name: &str,
        sink: Sink,
    ) -> Result<(), TransferError> {
        self.ensure_idle()?;
        transport.special_object_get_request(Some(name))?;
        debug!("requested special object {name:?}");
        self.op = Some(ClientOp::SpecialGet { sink });
        Ok(())
    }

    /// Asks the server to delete the named object.
    pub fn start_delete<T: ClientTransport>(
        &mut self,
        transport: &mut T,
        name: &str,
        hard_delete: bool,
    ) -> Result<(), TransferError> {
        self.ensure_idle()?;
        transport.object_delete_request(name, hard_delete)?;
        debug!("requested delete of {name:?} (hard: {hard_delete})");
        self.op = Some(ClientOp::Delete);
        Ok(())
    }

    /// Abandons whatever is in flight. The session is cleared before the
    /// abort goes out, so a send failure cannot leave the operation open.
    pub fn abort<T: ClientTransport>(&mut self, transport: &mut T) -> Result<(), TransferError> {
        if let Some(op) = self.op.take() {
            debug!("aborting {} operation", op.kind());
        }
        transport.abort_request()?;
        Ok(())
    }

    /// The underlying port closed; drop any in-flight operation.
    pub fn handle_close(&mut self) {
        self.op = None;
    }

    /// Processes one confirmation, sending the next request round (upload
    /// fragment or continuation poll) when the operation is still going.
    ///
    /// Any error clears the session; the operation it ends is lost but the
    /// session remains usable.
    pub fn handle_confirmation<T: ClientTransport>(
        &mut self,
        transport: &mut T,
        confirmation: Confirmation,
    ) -> Result<Progress, TransferError> {
        match (self.op.take(), confirmation) {
            (Some(ClientOp::Put { source, offset }), Confirmation::ObjectPut { code }) => {
                self.upload_step(transport, source, offset, code)
            }
            (Some(ClientOp::Get { sink }), Confirmation::ObjectGet { code, fragment }) => {
                self.download_step(transport, sink, code, &fragment, false)
            }
            (
                Some(ClientOp::SpecialGet { sink }),
                Confirmation::SpecialObjectGet { code, fragment },
            ) => self.download_step(transport, sink, code, &fragment, true),
            (Some(ClientOp::Delete), Confirmation::ObjectDelete { code }) => {
                Ok(Progress::Complete(code))
            }
            (_, Confirmation::Abort) => Ok(Progress::Complete(ResponseCode::Ok)),
            (Some(op), confirmation) => Err(TransferError::Protocol(format!(
                "{confirmation:?} does not answer the in-flight {} operation",
                op.kind()
            ))),
            (None, confirmation) => Err(TransferError::Protocol(format!(
                "{confirmation:?} arrived with no operation in flight"
            ))),
        }
    }

    fn upload_step<T: ClientTransport>(
        &mut self,
        transport: &mut T,
        source: Vec<u8>,
        offset: usize,
        code: ResponseCode,
    ) -> Result<Progress, TransferError> {
        if code != ResponseCode::Continue {
            debug!("upload finished: {code}");
            return Ok(Progress::Complete(code));
        }
        if offset >= source.len() {
            return Err(TransferError::Protocol(
                "continuation received after the final fragment".into(),
            ));
        }
        let remaining = source.len() - offset;
        let chunk = fragment_chunk(transport.free_packet_space(), remaining)?;
        let is_final = chunk == remaining;
        let accepted =
            transport.object_put_request(None, &source[offset..offset + chunk], None, is_final)?;
        if accepted > chunk {
            return Err(TransferError::Protocol(format!(
                "transport accepted {accepted} of {chunk} offered bytes"
            )));
        }
        trace!("{} of {} bytes sent", offset + accepted, source.len());
        self.op = Some(ClientOp::Put {
            source,
            offset: offset + accepted,
        });
        Ok(Progress::InFlight)
    }

    fn download_step<T: ClientTransport>(
        &mut self,
        transport: &mut T,
        mut sink: Sink,
        code: ResponseCode,
        fragment: &Fragment,
        special: bool,
    ) -> Result<Progress, TransferError> {
        if !code.is_success() {
            debug!("download refused: {code}");
            return Ok(Progress::Complete(code));
        }
        sink.write_all(&fragment.data)?;
        if fragment.is_final {
            sink.flush()?;
            return Ok(Progress::Complete(ResponseCode::Ok));
        }
        // More to come; poll for it.
        if special {
            transport.special_object_get_request(None)?;
            self.op = Some(ClientOp::SpecialGet { sink });
        } else {
            transport.object_get_request(None)?;
            self.op = Some(ClientOp::Get { sink });
        }
        Ok(Progress::InFlight)
    }
}
