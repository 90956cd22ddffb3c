//! Memory access request definitions.
//!
//! Every access handed to the cache is exactly one read or one single-byte write.

use std::fmt;

/// A single cache access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read one byte.
    Read,
    /// Write the contained byte.
    Write(u8),
}

impl Operation {
    /// Returns `true` for [`Operation::Write`].
    #[inline(always)]
    pub const fn is_write(&self) -> bool {
        matches!(self, Self::Write(_))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "R"),
            Self::Write(value) => write!(f, "W({value:#04x})"),
        }
    }
}
