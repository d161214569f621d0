//! Engine limits
// (c) 2025 objex contributors

use serde::{Deserialize, Serialize};

/// Resource limits for a session. The embedder fills this in (or takes the
/// defaults) when constructing a session; there is no file or environment
/// layer at this level.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ObjexConfig {
    /// Largest object a Put may accumulate, in bytes. A Put whose announced
    /// or accumulated size exceeds this is answered with `ObjectTooLarge`.
    pub max_object_size: u64,
    /// Longest object name accepted before answering `BadRequest`.
    pub max_name_length: usize,
}

impl Default for ObjexConfig {
    fn default() -> Self {
        Self {
            max_object_size: 16 * 1024 * 1024,
            max_name_length: 256,
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::ObjexConfig;

    #[test]
    fn defaults() {
        let c = ObjexConfig::default();
        assert_eq!(c.max_object_size, 16 * 1024 * 1024);
        assert_eq!(c.max_name_length, 256);
    }

    #[test]
    fn partial_deserialize_takes_defaults() {
        let c: ObjexConfig = serde_json::from_str(r#"{"max_object_size": 1024}"#).unwrap();
        assert_eq!(c.max_object_size, 1024);
        assert_eq!(c.max_name_length, ObjexConfig::default().max_name_length);
    }
}
