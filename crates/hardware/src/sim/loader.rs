//! Access trace loading.
//!
//! A trace is a JSON array of entries such as
//! `{ "address": 4660, "op": "write", "value": 171 }`. `value` is ignored for reads and
//! defaults to 0.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::data::Operation;
use crate::common::error::TraceError;

/// Kind of a traced access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceOp {
    /// Byte read.
    #[serde(alias = "r", alias = "R")]
    Read,
    /// Byte write.
    #[serde(alias = "w", alias = "W")]
    Write,
}

/// One recorded access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Byte address.
    pub address: u32,
    /// Read or write.
    pub op: TraceOp,
    /// Byte stored by a write.
    #[serde(default)]
    pub value: u8,
}

impl TraceEntry {
    /// A read of `address`.
    pub const fn read(address: u32) -> Self {
        Self {
            address,
            op: TraceOp::Read,
            value: 0,
        }
    }

    /// A write of `value` to `address`.
    pub const fn write(address: u32, value: u8) -> Self {
        Self {
            address,
            op: TraceOp::Write,
            value,
        }
    }

    /// The cache operation this entry performs.
    pub const fn operation(&self) -> Operation {
        match self.op {
            TraceOp::Read => Operation::Read,
            TraceOp::Write => Operation::Write(self.value),
        }
    }
}

/// Parses a trace from a JSON string.
///
/// # Errors
///
/// Returns [`TraceError::Parse`] if `json` is not an array of trace entries.
pub fn parse_trace(json: &str) -> Result<Vec<TraceEntry>, TraceError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a trace file.
///
/// # Errors
///
/// Returns [`TraceError::Io`] if the file cannot be read and [`TraceError::Parse`] if it
/// is malformed.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceEntry>, TraceError> {
    let text = fs::read_to_string(path)?;
    parse_trace(&text)
}
