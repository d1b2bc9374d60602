//! json output and document identity
use serde::Serialize;

/// Layout of emitted json
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Indented by two spaces
    #[default]
    Pretty,
    Compact,
}

impl Format {
    pub fn to_vec<T: Serialize + ?Sized>(self, value: &T) -> serde_json::Result<Vec<u8>> {
        match self {
            Format::Pretty => serde_json::to_vec_pretty(value),
            Format::Compact => serde_json::to_vec(value),
        }
    }
}

/// An emitted document together with its identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub json: String,
    /// CRC32 (IEEE) of the json bytes, as a decimal number
    ///
    /// Identifies the content for change detection, it is not a security measure.
    pub id: String,
}

impl Rendered {
    pub fn new(bytes: Vec<u8>) -> Self {
        let id = checksum(&bytes);
        // serde_json only ever emits valid utf-8
        let json = String::from_utf8_lossy(&bytes).into_owned();
        Self { json, id }
    }
}

pub fn checksum(bytes: &[u8]) -> String {
    crc32fast::hash(bytes).to_string()
}
