use core::fmt;

use serde::{Deserialize, Serialize};

use crate::*;

/// One unit of currency, named by the cell it was minted in and a serial scoped to that cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    cell: Cell,
    serial: u32,
}

impl Coin {
    pub const fn new(cell: Cell, serial: u32) -> Self {
        Self { cell, serial }
    }

    pub const fn cell(&self) -> Cell {
        self.cell
    }

    pub const fn serial(&self) -> u32 {
        self.serial
    }

    /// Canonical string identity, `i:j#serial`.
    pub fn identity(&self) -> String {
        self.to_string()
    }

    pub fn has_identity(&self, identity: &str) -> bool {
        self.identity() == identity
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.cell.i, self.cell.j, self.serial)
    }
}
