//! The object-store collaborator boundary
// (c) 2025 objex contributors
//!
//! A [`ObjectStore`] implementation persists the objects the engine moves.
//! Calls are synchronous and side-effect-complete on return; the engine
//! passes a parsed [`Descriptor`] and raw bytes, never interpreting the
//! object content itself. The accessors beyond get/put/delete supply the
//! data behind the special objects (change counter, logs, device info,
//! clock), which the session layer formats for the wire.

use serde::{Deserialize, Serialize};

use crate::protocol::{Descriptor, ResponseCode, StoreKind};

/// External storage for sync objects.
///
/// `put_object` and `delete_object` report their outcome as a
/// [`ResponseCode`], which the engine passes through to the peer verbatim.
pub trait ObjectStore {
    /// Fetches the full content of an object. `Err` carries the response
    /// code to answer with (typically [`ResponseCode::NotFound`]).
    fn get_object(&self, descriptor: &Descriptor) -> Result<Vec<u8>, ResponseCode>;

    /// Commits a completely reassembled object.
    fn put_object(&mut self, descriptor: &Descriptor, data: &[u8]) -> ResponseCode;

    /// Deletes an object. The descriptor's `hard_delete` flag distinguishes
    /// hard from soft deletes.
    fn delete_object(&mut self, descriptor: &Descriptor) -> ResponseCode;

    /// Current change counter of a store.
    fn change_counter(&self, store: StoreKind) -> u32;

    /// Change history of a store.
    fn change_log(&self, store: StoreKind) -> ChangeLog;

    /// Information log describing a store's capabilities.
    fn info_log(&self, store: StoreKind) -> InfoLog;

    /// Device identification data.
    fn device_info(&self) -> DeviceInfo;

    /// Current time of day, for the clock special object.
    fn clock(&self) -> TimeStamp;
}

/// Device identification data behind the `telecom/devinfo.txt` object.
///
/// Required fields are emitted even when empty; optional fields are emitted
/// only when present.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub oem: Option<String>,
    pub firmware_version: Option<String>,
    pub firmware_date: Option<String>,
    pub software_version: Option<String>,
    pub software_date: Option<String>,
    pub hardware_version: Option<String>,
    pub hardware_date: Option<String>,
    pub sync_version: Option<String>,
    pub phonebook_type: Option<String>,
    pub calendar_type: Option<String>,
    pub message_type: Option<String>,
    pub note_type: Option<String>,
    pub inbox_capability: Option<String>,
    pub sentbox_capability: Option<String>,
}

/// Which sync-anchor style a store supports.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAnchorType {
    /// Change counters only.
    ChangeCounter,
    /// Timestamps only.
    Timestamp,
    /// Both change counters and timestamps.
    Both,
}

impl SyncAnchorType {
    pub(crate) fn label(self) -> &'static str {
        match self {
            SyncAnchorType::ChangeCounter => "CC",
            SyncAnchorType::Timestamp => "TS",
            SyncAnchorType::Both => "CT",
        }
    }
}

/// Capability data behind a store's `info.log` object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InfoLog {
    /// Number of records currently held.
    pub total_records: u32,
    /// Highest index in use, for index-level access.
    pub last_used_index: Option<u32>,
    /// Record capacity; `None` means unbounded (rendered as `*`).
    pub maximum_records: Option<u32>,
    /// Supported information-exchange levels, as the IrMC IEL bitfield.
    pub information_exchange_level: u8,
    /// Whether hard deletes are supported.
    pub hard_delete: bool,
    /// Supported sync-anchor type.
    pub sync_anchor: SyncAnchorType,
    /// Whether sync anchors increment by exactly one per change.
    pub sync_anchor_increment: bool,
    /// Whether sync anchors are unique across the database lifetime.
    pub sync_anchor_unique: bool,
    /// Database instance identifier (changes on counter rollover).
    pub database_id: u32,
}

impl Default for InfoLog {
    fn default() -> Self {
        Self {
            total_records: 0,
            last_used_index: None,
            maximum_records: None,
            information_exchange_level: 0x04, // levels 1, 2 and 3
            hard_delete: false,
            sync_anchor: SyncAnchorType::ChangeCounter,
            sync_anchor_increment: true,
            sync_anchor_unique: true,
            database_id: 0,
        }
    }
}

/// What happened to a record, for change-log purposes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ChangeKind {
    Modify,
    Delete,
    HardDelete,
}

impl ChangeKind {
    pub(crate) fn letter(self) -> char {
        match self {
            ChangeKind::Modify => 'M',
            ChangeKind::Delete => 'D',
            ChangeKind::HardDelete => 'H',
        }
    }
}

/// One line of a store's change log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, derive_more::Constructor)]
pub struct ChangeLogEntry {
    /// The kind of change.
    pub kind: ChangeKind,
    /// Change counter at which the change happened.
    pub change_counter: u32,
    /// LUID of the affected record, including extension.
    pub luid: String,
}

/// Change history behind a store's change-log object.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog {
    /// Serial number of the device holding the store.
    pub serial_number: String,
    /// Database instance identifier.
    pub database_id: u32,
    /// Number of records currently held.
    pub total_records: u32,
    /// Record capacity; `None` means unbounded (rendered as `*`).
    pub maximum_records: Option<u32>,
    /// Entries in change-counter order.
    pub entries: Vec<ChangeLogEntry>,
}

/// A point in time for the clock special object, rendered as an IrMC
/// timestamp (`YYYYMMDDTHHMMSS`, with a trailing `Z` when UTC).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct TimeStamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub utc: bool,
}

impl std::fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}{}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            if self.utc { "Z" } else { "" }
        )
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::TimeStamp;

    #[test]
    fn timestamp_render() {
        let ts = TimeStamp {
            year: 2025,
            month: 3,
            day: 9,
            hour: 14,
            minute: 5,
            second: 59,
            utc: true,
        };
        assert_eq!(ts.to_string(), "20250309T140559Z");
        let local = TimeStamp { utc: false, ..ts };
        assert_eq!(local.to_string(), "20250309T140559");
    }
}
