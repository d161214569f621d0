//! Hierarchical object-name parsing
// (c) 2025 objex contributors
//!
//! A transport-supplied object name such as `telecom/pb/luid/12.vcf` is
//! parsed into a structured [`Descriptor`] (ordinary objects) or a
//! [`SpecialRequest`] (change counter, logs, device info, clock). The
//! grammar follows the IrMC `telecom/...` naming scheme:
//!
//! ```text
//! x.vcf                        inbox-level put (level 1)
//! telecom/pb.vcf               whole-store stream (level 2)
//! telecom/pb/3.vcf             record by index (level 3)
//! telecom/pb/luid/ab12.vcf     record by LUID (level 4)
//! telecom/pb/info.log          info log (special)
//! telecom/pb/luid/cc.log       change counter (special)
//! telecom/pb/luid/17.log       change log since counter 17 (special)
//! telecom/devinfo.txt          device information (special)
//! telecom/rtc.txt              clock (special)
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which object store a request addresses.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[allow(missing_docs)]
pub enum StoreKind {
    Phonebook,
    Calendar,
    MsgIn,
    MsgOut,
    MsgSent,
    Notes,
    Bookmark,
    /// Destination of level-1 (inbox) puts whose store cannot be determined.
    Inbox,
}

impl StoreKind {
    /// Object file extension conventionally used by this store.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            StoreKind::Phonebook => "vcf",
            StoreKind::Calendar => "vcs",
            StoreKind::Notes => "vnt",
            StoreKind::MsgIn | StoreKind::MsgOut | StoreKind::MsgSent => "vmg",
            StoreKind::Bookmark => "vbm",
            StoreKind::Inbox => "",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        Some(match ext {
            "vcf" => StoreKind::Phonebook,
            "vcs" => StoreKind::Calendar,
            "vnt" => StoreKind::Notes,
            "vmg" => StoreKind::MsgIn,
            "vbm" => StoreKind::Bookmark,
            _ => return None,
        })
    }
}

/// IrMC information-exchange level of a request.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display,
)]
pub enum AccessLevel {
    /// Level 1: anonymous put into the inbox.
    Inbox,
    /// Level 2: stream access to a whole store.
    Access,
    /// Level 3: record access by numeric index.
    Index,
    /// Level 4: record access by LUID.
    Sync,
}

/// The special (in-memory, formatted-on-demand) object kinds.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display,
)]
#[allow(missing_docs)]
pub enum SpecialObjectKind {
    ChangeCounter,
    ChangeLog,
    InfoLog,
    DeviceInfo,
    Rtc,
}

/// Structured form of an ordinary object name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Store the request addresses.
    pub store: StoreKind,
    /// Access level the name encodes.
    pub level: AccessLevel,
    /// Record name (LUID plus extension for level 4, bare filename for
    /// level 1, empty otherwise).
    pub name: String,
    /// Record index, present at level 3 only.
    pub index: Option<u32>,
    /// True when the request asked for a hard (unrecoverable) delete.
    pub hard_delete: bool,
    /// Max-change-counter constraint, if the request carried one.
    pub max_change_counter: Option<u32>,
}

/// Structured form of a special-object name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialRequest {
    /// Which special object is being asked for.
    pub kind: SpecialObjectKind,
    /// The store it applies to. Absent for the storeless kinds
    /// (device info, clock).
    pub store: Option<StoreKind>,
    /// Sync-anchor change counter parsed from a change-log name.
    pub change_counter: Option<u32>,
}

/// Outcome of parsing an object name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ParsedName {
    /// An ordinary stored object.
    Object(Descriptor),
    /// A special object served from formatted in-memory data.
    Special(SpecialRequest),
}

/// Why an object name failed to parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The first path component was not `telecom`.
    #[error("unknown name root `{0}` (expected `telecom`)")]
    UnknownRoot(String),
    /// The store component was not recognised.
    #[error("unknown object store `{0}`")]
    UnknownStore(String),
    /// The file extension did not identify a store.
    #[error("unknown object extension `{0}`")]
    UnknownExtension(String),
    /// A level-3 index or change-log anchor was not a number.
    #[error("invalid numeric component `{0}`")]
    BadNumber(String),
    /// The name did not match any known shape.
    #[error("malformed object name `{0}`")]
    Malformed(String),
}

impl Descriptor {
    fn new(store: StoreKind, level: AccessLevel) -> Self {
        Self {
            store,
            level,
            name: String::new(),
            index: None,
            hard_delete: false,
            max_change_counter: None,
        }
    }
}

impl FromStr for ParsedName {
    type Err = NameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_object_name(s)
    }
}

/// Splits `file.ext` into stem and extension. Returns `None` when there is
/// no dot or the extension is empty.
fn split_extension(component: &str) -> Option<(&str, &str)> {
    let (stem, ext) = component.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some((stem, ext))
}

/// Resolves the store components after `telecom`. Message stores span two
/// components (`msg/in` and friends); everything else spans one.
fn parse_store<'a>(parts: &'a [&'a str]) -> Option<(StoreKind, &'a [&'a str])> {
    let (&first, rest) = parts.split_first()?;
    match first {
        "pb" => Some((StoreKind::Phonebook, rest)),
        "cal" => Some((StoreKind::Calendar, rest)),
        "nt" => Some((StoreKind::Notes, rest)),
        "bkm" => Some((StoreKind::Bookmark, rest)),
        "msg" => {
            let (&second, rest) = rest.split_first()?;
            let kind = match second {
                "in" => StoreKind::MsgIn,
                "out" => StoreKind::MsgOut,
                "sent" => StoreKind::MsgSent,
                _ => return None,
            };
            Some((kind, rest))
        }
        _ => None,
    }
}

/// As [`parse_store`], but for the terminal whole-store stream component
/// (`pb.vcf`, `msg/in.vmg`), where the store stem carries an extension.
fn parse_store_stream(parts: &[&str]) -> Option<StoreKind> {
    match parts {
        [single] => {
            let (stem, _ext) = split_extension(single)?;
            match stem {
                "pb" => Some(StoreKind::Phonebook),
                "cal" => Some(StoreKind::Calendar),
                "nt" => Some(StoreKind::Notes),
                "bkm" => Some(StoreKind::Bookmark),
                _ => None,
            }
        }
        ["msg", second] => {
            let (stem, _ext) = split_extension(second)?;
            match stem {
                "in" => Some(StoreKind::MsgIn),
                "out" => Some(StoreKind::MsgOut),
                "sent" => Some(StoreKind::MsgSent),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_number(s: &str) -> Result<u32, NameError> {
    s.parse().map_err(|_| NameError::BadNumber(s.to_string()))
}

/// Parses a transport-supplied hierarchical object name.
///
/// An empty name is a valid level-1 inbox put with an undetermined store.
pub fn parse_object_name(name: &str) -> Result<ParsedName, NameError> {
    if name.is_empty() {
        return Ok(ParsedName::Object(Descriptor::new(
            StoreKind::Inbox,
            AccessLevel::Inbox,
        )));
    }

    let parts: Vec<&str> = name.split('/').collect();

    // A single component is an inbox-level object; the extension is the only
    // clue to the destination store.
    if let [single] = parts.as_slice() {
        let (_stem, ext) = split_extension(single)
            .ok_or_else(|| NameError::Malformed(name.to_string()))?;
        let store = StoreKind::from_extension(ext)
            .ok_or_else(|| NameError::UnknownExtension(ext.to_string()))?;
        let mut descriptor = Descriptor::new(store, AccessLevel::Inbox);
        descriptor.name = (*single).to_string();
        return Ok(ParsedName::Object(descriptor));
    }

    let (&root, rest) = parts
        .split_first()
        .ok_or_else(|| NameError::Malformed(name.to_string()))?;
    if root != "telecom" {
        return Err(NameError::UnknownRoot(root.to_string()));
    }

    // Storeless specials live directly under telecom/.
    match rest {
        ["devinfo.txt"] => {
            return Ok(ParsedName::Special(SpecialRequest {
                kind: SpecialObjectKind::DeviceInfo,
                store: None,
                change_counter: None,
            }));
        }
        ["rtc.txt"] => {
            return Ok(ParsedName::Special(SpecialRequest {
                kind: SpecialObjectKind::Rtc,
                store: None,
                change_counter: None,
            }));
        }
        _ => (),
    }

    // Whole-store stream: telecom/pb.vcf and friends.
    if let Some(store) = parse_store_stream(rest) {
        return Ok(ParsedName::Object(Descriptor::new(
            store,
            AccessLevel::Access,
        )));
    }

    let (store, tail) = parse_store(rest)
        .ok_or_else(|| NameError::UnknownStore(rest.join("/")))?;

    match tail {
        ["info.log"] => Ok(ParsedName::Special(SpecialRequest {
            kind: SpecialObjectKind::InfoLog,
            store: Some(store),
            change_counter: None,
        })),
        ["luid", last] => {
            let (stem, ext) = split_extension(last)
                .ok_or_else(|| NameError::Malformed(name.to_string()))?;
            if ext == "log" {
                if stem == "cc" {
                    return Ok(ParsedName::Special(SpecialRequest {
                        kind: SpecialObjectKind::ChangeCounter,
                        store: Some(store),
                        change_counter: None,
                    }));
                }
                return Ok(ParsedName::Special(SpecialRequest {
                    kind: SpecialObjectKind::ChangeLog,
                    store: Some(store),
                    change_counter: Some(parse_number(stem)?),
                }));
            }
            let mut descriptor = Descriptor::new(store, AccessLevel::Sync);
            descriptor.name = (*last).to_string();
            Ok(ParsedName::Object(descriptor))
        }
        [last] => {
            let (stem, _ext) = split_extension(last)
                .ok_or_else(|| NameError::Malformed(name.to_string()))?;
            let mut descriptor = Descriptor::new(store, AccessLevel::Index);
            descriptor.index = Some(parse_number(stem)?);
            descriptor.name = (*last).to_string();
            Ok(ParsedName::Object(descriptor))
        }
        _ => Err(NameError::Malformed(name.to_string())),
    }
}
