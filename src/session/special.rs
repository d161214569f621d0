//! Special-object payload formatting
// (c) 2025 objex contributors
//!
//! Special objects (change counter, change log, info log, device info,
//! clock) are formatted in full up front from store-supplied data, then
//! served through the same offset/accepted-count loop as an ordinary Get.
//! Output is 7-bit ASCII with CRLF line endings, per the IrMC text formats.

use std::fmt::Write as _;

use crate::protocol::{ResponseCode, SpecialObjectKind, SpecialRequest};
use crate::store::{ChangeLog, DeviceInfo, InfoLog, ObjectStore};

/// Produces the full payload for a special-object request. `Err` carries
/// the response code to answer with (`BadRequest` for a kind that needs a
/// store when the name supplied none).
pub(crate) fn format_special<S: ObjectStore>(
    store: &S,
    request: &SpecialRequest,
) -> Result<Vec<u8>, ResponseCode> {
    let payload = match request.kind {
        SpecialObjectKind::ChangeCounter => {
            let kind = request.store.ok_or(ResponseCode::BadRequest)?;
            format_change_counter(store.change_counter(kind))
        }
        SpecialObjectKind::ChangeLog => {
            let kind = request.store.ok_or(ResponseCode::BadRequest)?;
            format_change_log(&store.change_log(kind), request.change_counter)
        }
        SpecialObjectKind::InfoLog => {
            let kind = request.store.ok_or(ResponseCode::BadRequest)?;
            format_info_log(&store.info_log(kind))
        }
        SpecialObjectKind::DeviceInfo => format_device_info(&store.device_info()),
        SpecialObjectKind::Rtc => store.clock().to_string(),
    };
    Ok(payload.into_bytes())
}

fn format_change_counter(counter: u32) -> String {
    counter.to_string()
}

fn optional_line(out: &mut String, tag: &str, value: Option<&String>) {
    if let Some(value) = value {
        let _ = writeln!(out, "{tag}:{value}\r");
    }
}

fn format_device_info(info: &DeviceInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "MANU:{}\r", info.manufacturer);
    let _ = writeln!(out, "MOD:{}\r", info.model);
    optional_line(&mut out, "OEM", info.oem.as_ref());
    optional_line(&mut out, "FW-VERSION", info.firmware_version.as_ref());
    optional_line(&mut out, "FW-DATE", info.firmware_date.as_ref());
    optional_line(&mut out, "SW-VERSION", info.software_version.as_ref());
    optional_line(&mut out, "SW-DATE", info.software_date.as_ref());
    optional_line(&mut out, "HW-VERSION", info.hardware_version.as_ref());
    optional_line(&mut out, "HW-DATE", info.hardware_date.as_ref());
    optional_line(&mut out, "IRMC-VERSION", info.sync_version.as_ref());
    let _ = writeln!(out, "SN:{}\r", info.serial_number);
    optional_line(&mut out, "PB-TYPE-TX", info.phonebook_type.as_ref());
    optional_line(&mut out, "PB-TYPE-RX", info.phonebook_type.as_ref());
    optional_line(&mut out, "CAL-TYPE-TX", info.calendar_type.as_ref());
    optional_line(&mut out, "CAL-TYPE-RX", info.calendar_type.as_ref());
    optional_line(&mut out, "MSG-TYPE-TX", info.message_type.as_ref());
    optional_line(&mut out, "MSG-TYPE-RX", info.message_type.as_ref());
    optional_line(&mut out, "NOTE-TYPE-TX", info.note_type.as_ref());
    optional_line(&mut out, "NOTE-TYPE-RX", info.note_type.as_ref());
    optional_line(&mut out, "INBOX", info.inbox_capability.as_ref());
    optional_line(&mut out, "MSG-SENT-BOX", info.sentbox_capability.as_ref());
    out
}

fn maximum_records(maximum: Option<u32>) -> String {
    maximum.map_or_else(|| "*".to_string(), |n| n.to_string())
}

fn format_info_log(info: &InfoLog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total-Records:{}\r", info.total_records);
    if let Some(index) = info.last_used_index {
        let _ = writeln!(out, "Last-Used-Index:{index}\r");
    }
    let _ = writeln!(
        out,
        "Maximum-Records:{}\r",
        maximum_records(info.maximum_records)
    );
    let _ = writeln!(out, "IEL:{}\r", info.information_exchange_level);
    let _ = writeln!(out, "HD:{}\r", yes_no(info.hard_delete));
    let _ = writeln!(out, "SAT:{}\r", info.sync_anchor.label());
    let _ = writeln!(out, "SAI:{}\r", yes_no(info.sync_anchor_increment));
    let _ = writeln!(out, "SAU:{}\r", yes_no(info.sync_anchor_unique));
    let _ = writeln!(out, "DID:{}\r", info.database_id);
    out
}

/// Renders the change log, restricted to entries newer than the requested
/// sync anchor (all entries when no anchor was named).
fn format_change_log(log: &ChangeLog, since: Option<u32>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SN:{}\r", log.serial_number);
    let _ = writeln!(out, "DID:{}\r", log.database_id);
    let _ = writeln!(out, "Total-Records:{}\r", log.total_records);
    let _ = writeln!(
        out,
        "Maximum-Records:{}\r",
        maximum_records(log.maximum_records)
    );
    for entry in &log.entries {
        if since.is_some_and(|anchor| entry.change_counter <= anchor) {
            continue;
        }
        let _ = writeln!(
            out,
            "{}:{}::{}\r",
            entry.kind.letter(),
            entry.change_counter,
            entry.luid
        );
    }
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

#[cfg(test)]
mod tests {
    use assertables::assert_contains;
    use pretty_assertions::assert_eq;

    use crate::store::{ChangeKind, ChangeLog, ChangeLogEntry, DeviceInfo, InfoLog};

    use super::{format_change_counter, format_change_log, format_device_info, format_info_log};

    #[test]
    fn change_counter_is_bare_decimal() {
        assert_eq!(format_change_counter(42), "42");
        assert_eq!(format_change_counter(0), "0");
    }

    #[test]
    fn device_info_required_and_optional_lines() {
        let info = DeviceInfo {
            manufacturer: "Acme".into(),
            model: "Teapot 9".into(),
            serial_number: "SN123".into(),
            software_version: Some("2.1".into()),
            ..DeviceInfo::default()
        };
        let text = format_device_info(&info);
        assert_contains!(text, "MANU:Acme\r\n");
        assert_contains!(text, "MOD:Teapot 9\r\n");
        assert_contains!(text, "SN:SN123\r\n");
        assert_contains!(text, "SW-VERSION:2.1\r\n");
        // absent optionals produce no line at all
        assert!(!text.contains("OEM:"));
        assert!(!text.contains("HW-VERSION:"));
    }

    #[test]
    fn info_log_unbounded_capacity_is_star() {
        let log = InfoLog {
            total_records: 7,
            last_used_index: Some(12),
            maximum_records: None,
            ..InfoLog::default()
        };
        let text = format_info_log(&log);
        assert_contains!(text, "Total-Records:7\r\n");
        assert_contains!(text, "Last-Used-Index:12\r\n");
        assert_contains!(text, "Maximum-Records:*\r\n");
        assert_contains!(text, "SAT:CC\r\n");
    }

    #[test]
    fn change_log_filters_by_anchor() {
        let log = ChangeLog {
            serial_number: "SN9".into(),
            database_id: 77,
            total_records: 2,
            maximum_records: Some(100),
            entries: vec![
                ChangeLogEntry::new(ChangeKind::Modify, 5, "a.vcf".into()),
                ChangeLogEntry::new(ChangeKind::Delete, 9, "b.vcf".into()),
                ChangeLogEntry::new(ChangeKind::HardDelete, 12, "c.vcf".into()),
            ],
        };
        let text = format_change_log(&log, Some(9));
        assert_contains!(text, "SN:SN9\r\n");
        assert_contains!(text, "Maximum-Records:100\r\n");
        assert_contains!(text, "H:12::c.vcf\r\n");
        assert!(!text.contains("M:5::a.vcf"));
        assert!(!text.contains("D:9::b.vcf"));

        let all = format_change_log(&log, None);
        assert_contains!(all, "M:5::a.vcf\r\n");
    }
}
