//! Qubit, classical bit and register types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Index of a classical bit within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A named register: a contiguous run of flat indices.
///
/// Registers only exist for bookkeeping. Instructions always address the
/// flattened index space, so a register `c` of size 2 declared after a
/// register `b` of size 3 covers classical bits 3 and 4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register {
    /// Register name.
    pub name: String,
    /// First flat index covered by the register.
    pub offset: u32,
    /// Number of bits in the register.
    pub size: u32,
}

impl Register {
    /// Create a register covering `offset..offset + size`.
    pub fn new(name: impl Into<String>, offset: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            offset,
            size,
        }
    }

    /// Flat index of element `index` of this register, if in range.
    pub fn flat_index(&self, index: u32) -> Option<u32> {
        (index < self.size).then(|| self.offset + index)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", QubitId(0)), "q0");
        assert_eq!(format!("{}", ClbitId(7)), "c7");
    }

    #[test]
    fn test_register_flat_index() {
        let reg = Register::new("cr", 3, 2);
        assert_eq!(reg.flat_index(0), Some(3));
        assert_eq!(reg.flat_index(1), Some(4));
        assert_eq!(reg.flat_index(2), None);
        assert_eq!(format!("{reg}"), "cr[2]");
    }
}
