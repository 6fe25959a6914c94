use serde::{Deserialize, Serialize};

/// Raw data of a satellite at one requested timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawData {
    /// Requested timestamp in ms; echoed back unchanged
    pub timestamp: i64,
    /// Hex payload, the attack sentinel, or null when nothing matched
    #[serde(default)]
    pub raw_data: Option<String>,
}

impl RawData {
    pub fn request(timestamp: i64) -> Self {
        Self {
            timestamp,
            raw_data: None,
        }
    }
}

/// A satellite with the ordered list of timestamps to resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Satellite {
    pub satellite_id: u32,
    pub info: Vec<RawData>,
}

/// Which payload column a lookup reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// Raw receiver frames
    Ublox,
    /// Decoded Galileo navigation data
    Galileo,
}

impl PayloadKind {
    pub fn column(&self) -> &'static str {
        match self {
            PayloadKind::Ublox => "raw_data",
            PayloadKind::Galileo => "galileo_data",
        }
    }
}
