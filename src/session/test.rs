//! Shared test doubles for the session state machines
// (c) 2025 objex contributors

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::protocol::{Descriptor, ResponseCode, StoreKind};
use crate::session::Sink;
use crate::store::{ChangeLog, DeviceInfo, InfoLog, ObjectStore, TimeStamp};
use crate::transport::{ClientTransport, ServerTransport, TransportError};

/// Server-side transport double. Accepts up to `packet_cap` bytes per
/// byte-carrying response and records everything sent.
#[derive(Debug, Default)]
pub(crate) struct TestServerTransport {
    pub(crate) packet_cap: usize,
    pub(crate) fail_next: bool,
    pub(crate) get_responses: Vec<(ResponseCode, Vec<u8>)>,
    pub(crate) put_responses: Vec<ResponseCode>,
    pub(crate) special_responses: Vec<(ResponseCode, Vec<u8>)>,
    pub(crate) delete_responses: Vec<ResponseCode>,
}

impl TestServerTransport {
    pub(crate) fn new(packet_cap: usize) -> Self {
        Self {
            packet_cap,
            ..Self::default()
        }
    }

    fn check_injected_failure(&mut self) -> Result<(), TransportError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(TransportError::Send("injected failure".into()));
        }
        Ok(())
    }
}

impl ServerTransport for TestServerTransport {
    fn object_get_response(
        &mut self,
        code: ResponseCode,
        data: &[u8],
    ) -> Result<usize, TransportError> {
        self.check_injected_failure()?;
        let accepted = data.len().min(self.packet_cap);
        self.get_responses.push((code, data[..accepted].to_vec()));
        Ok(accepted)
    }

    fn object_put_response(&mut self, code: ResponseCode) -> Result<(), TransportError> {
        self.check_injected_failure()?;
        self.put_responses.push(code);
        Ok(())
    }

    fn special_object_get_response(
        &mut self,
        code: ResponseCode,
        data: &[u8],
    ) -> Result<usize, TransportError> {
        self.check_injected_failure()?;
        let accepted = data.len().min(self.packet_cap);
        self.special_responses.push((code, data[..accepted].to_vec()));
        Ok(accepted)
    }

    fn object_delete_response(&mut self, code: ResponseCode) -> Result<(), TransportError> {
        self.check_injected_failure()?;
        self.delete_responses.push(code);
        Ok(())
    }
}

/// One outbound call made through [`TestClientTransport`]. Put requests
/// record the ACCEPTED prefix of what was offered, mirroring what actually
/// left on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClientCall {
    GetRequest(Option<String>),
    PutRequest {
        name: Option<String>,
        data: Vec<u8>,
        total_length: Option<u64>,
        is_final: bool,
    },
    SpecialGetRequest(Option<String>),
    DeleteRequest { name: String, hard_delete: bool },
    Abort,
}

/// Client-side transport double. `accept_cap` clamps how much of each put
/// fragment is taken, independent of the advertised packet space.
#[derive(Debug, Default)]
pub(crate) struct TestClientTransport {
    pub(crate) packet_cap: usize,
    pub(crate) accept_cap: Option<usize>,
    pub(crate) fail_next: bool,
    pub(crate) calls: Vec<ClientCall>,
}

impl TestClientTransport {
    pub(crate) fn new(packet_cap: usize) -> Self {
        Self {
            packet_cap,
            ..Self::default()
        }
    }

    fn check_injected_failure(&mut self) -> Result<(), TransportError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(TransportError::Send("injected failure".into()));
        }
        Ok(())
    }
}

impl ClientTransport for TestClientTransport {
    fn free_packet_space(&self) -> usize {
        self.packet_cap
    }

    fn object_get_request(&mut self, name: Option<&str>) -> Result<(), TransportError> {
        self.check_injected_failure()?;
        self.calls.push(ClientCall::GetRequest(name.map(String::from)));
        Ok(())
    }

    fn object_put_request(
        &mut self,
        name: Option<&str>,
        data: &[u8],
        total_length: Option<u64>,
        is_final: bool,
    ) -> Result<usize, TransportError> {
        self.check_injected_failure()?;
        let accepted = self
            .accept_cap
            .map_or(data.len(), |cap| data.len().min(cap));
        self.calls.push(ClientCall::PutRequest {
            name: name.map(String::from),
            data: data[..accepted].to_vec(),
            total_length,
            is_final,
        });
        Ok(accepted)
    }

    fn special_object_get_request(&mut self, name: Option<&str>) -> Result<(), TransportError> {
        self.check_injected_failure()?;
        self.calls
            .push(ClientCall::SpecialGetRequest(name.map(String::from)));
        Ok(())
    }

    fn object_delete_request(
        &mut self,
        name: &str,
        hard_delete: bool,
    ) -> Result<(), TransportError> {
        self.check_injected_failure()?;
        self.calls.push(ClientCall::DeleteRequest {
            name: name.to_string(),
            hard_delete,
        });
        Ok(())
    }

    fn abort_request(&mut self) -> Result<(), TransportError> {
        self.check_injected_failure()?;
        self.calls.push(ClientCall::Abort);
        Ok(())
    }
}

/// In-memory [`ObjectStore`] double. Objects are keyed by record name, or
/// by store kind for whole-store (access level) requests whose descriptor
/// carries no name.
#[derive(Debug)]
pub(crate) struct MemoryStore {
    pub(crate) objects: HashMap<String, Vec<u8>>,
    pub(crate) puts: Vec<(Descriptor, Vec<u8>)>,
    pub(crate) deletes: Vec<Descriptor>,
    pub(crate) put_result: ResponseCode,
    pub(crate) delete_result: ResponseCode,
    pub(crate) counter: u32,
    pub(crate) log: ChangeLog,
    pub(crate) info: InfoLog,
    pub(crate) device: DeviceInfo,
    pub(crate) now: TimeStamp,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            objects: HashMap::new(),
            puts: Vec::new(),
            deletes: Vec::new(),
            put_result: ResponseCode::Ok,
            delete_result: ResponseCode::Ok,
            counter: 0,
            log: ChangeLog::default(),
            info: InfoLog::default(),
            device: DeviceInfo::default(),
            now: TimeStamp::default(),
        }
    }
}

fn key(descriptor: &Descriptor) -> String {
    if descriptor.name.is_empty() {
        descriptor.store.to_string()
    } else {
        descriptor.name.clone()
    }
}

impl ObjectStore for MemoryStore {
    fn get_object(&self, descriptor: &Descriptor) -> Result<Vec<u8>, ResponseCode> {
        self.objects
            .get(&key(descriptor))
            .cloned()
            .ok_or(ResponseCode::NotFound)
    }

    fn put_object(&mut self, descriptor: &Descriptor, data: &[u8]) -> ResponseCode {
        self.puts.push((descriptor.clone(), data.to_vec()));
        if self.put_result == ResponseCode::Ok {
            self.objects.insert(key(descriptor), data.to_vec());
        }
        self.put_result
    }

    fn delete_object(&mut self, descriptor: &Descriptor) -> ResponseCode {
        self.deletes.push(descriptor.clone());
        if self.delete_result == ResponseCode::Ok {
            self.objects.remove(&key(descriptor));
        }
        self.delete_result
    }

    fn change_counter(&self, _store: StoreKind) -> u32 {
        self.counter
    }

    fn change_log(&self, _store: StoreKind) -> ChangeLog {
        self.log.clone()
    }

    fn info_log(&self, _store: StoreKind) -> InfoLog {
        self.info.clone()
    }

    fn device_info(&self) -> DeviceInfo {
        self.device.clone()
    }

    fn clock(&self) -> TimeStamp {
        self.now
    }
}

/// A cloneable download sink whose contents remain inspectable after the
/// boxed writer has been handed to the session.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub(crate) fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn boxed(&self) -> Sink {
        Box::new(self.clone())
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
