//! Transport-delivered events: indications (server side) and confirmations (client side)
// (c) 2025 objex contributors

use serde::{Deserialize, Serialize};

use super::response::ResponseCode;

/// One bounded chunk of a logical object, exchanged in a single packet.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, derive_more::Constructor)]
pub struct Fragment {
    /// The chunk payload. Never longer than the transport's negotiated
    /// maximum for the packet it arrived in.
    pub data: Vec<u8>,
    /// True iff this chunk completes the logical object.
    pub is_final: bool,
}

impl Fragment {
    /// A final fragment carrying the given bytes.
    #[must_use]
    pub fn last(data: Vec<u8>) -> Self {
        Self {
            data,
            is_final: true,
        }
    }

    /// A non-final fragment carrying the given bytes.
    #[must_use]
    pub fn partial(data: Vec<u8>) -> Self {
        Self {
            data,
            is_final: false,
        }
    }
}

/// An inbound request event, delivered by the transport to a server session.
///
/// Fields mirror the OBEX headers the transport decoded: an optional object
/// name (absent on continuation packets), an optional total-length hint, and
/// the final-fragment flag.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub enum Indication {
    /// Request to download an object. `name` is absent on continuation polls;
    /// the server resumes from session-held state.
    ObjectGet {
        /// Hierarchical object name, present on the first request only.
        name: Option<String>,
    },
    /// One fragment of an object upload.
    ObjectPut {
        /// Hierarchical object name, present on the first fragment only.
        name: Option<String>,
        /// The payload chunk.
        fragment: Fragment,
        /// Total object length announced up front, if the client sent a
        /// Length header.
        total_length: Option<u64>,
        /// Optional max-change-counter application parameter.
        max_change_counter: Option<u32>,
    },
    /// Request to download a special object (change counter, logs, device
    /// info, clock). The kind is parsed from the name.
    SpecialObjectGet {
        /// Hierarchical object name, present on the first request only.
        name: Option<String>,
    },
    /// Request to delete an object. Always a single round trip.
    ObjectDelete {
        /// Hierarchical object name.
        name: String,
        /// True for a hard (unrecoverable) delete.
        hard_delete: bool,
        /// Optional max-change-counter application parameter.
        max_change_counter: Option<u32>,
    },
    /// The client aborted whatever was in flight. The transport acknowledges
    /// the abort itself; the session only cleans up.
    Abort,
    /// The underlying port closed.
    PortClose,
}

/// An inbound response event, delivered by the transport to a client session.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub enum Confirmation {
    /// Response to an object download request.
    ObjectGet {
        /// Outcome reported by the server.
        code: ResponseCode,
        /// The payload chunk (may be empty on failure codes).
        fragment: Fragment,
    },
    /// Acknowledgment of an uploaded fragment.
    ObjectPut {
        /// Outcome reported by the server.
        code: ResponseCode,
    },
    /// Response to a special-object download request.
    SpecialObjectGet {
        /// Outcome reported by the server.
        code: ResponseCode,
        /// The payload chunk (may be empty on failure codes).
        fragment: Fragment,
    },
    /// Response to a delete request.
    ObjectDelete {
        /// Outcome reported by the server.
        code: ResponseCode,
    },
    /// The server acknowledged an abort.
    Abort,
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Fragment, Indication};

    #[test]
    fn fragment_constructors() {
        assert!(Fragment::last(vec![1]).is_final);
        assert!(!Fragment::partial(vec![1]).is_final);
        assert_eq!(Fragment::new(vec![1, 2], true), Fragment::last(vec![1, 2]));
    }

    #[test]
    fn indication_serde() {
        let ind = Indication::ObjectPut {
            name: Some("telecom/pb.vcf".into()),
            fragment: Fragment::partial(vec![0x42]),
            total_length: Some(10),
            max_change_counter: None,
        };
        let json = serde_json::to_string(&ind).unwrap();
        let back: Indication = serde_json::from_str(&json).unwrap();
        assert_eq!(ind, back);
    }
}
