use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Discrete grid coordinates of one tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub i: i32,
    pub j: i32,
}

impl Cell {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    pub const fn key(self) -> CellKey {
        CellKey::new(self.i, self.j)
    }

    /// Key fed to the luck oracle, optionally followed by a salt.
    pub fn luck_key(self, salt: Option<&str>) -> String {
        match salt {
            Some(salt) => format!("{},{},{}", self.i, self.j, salt),
            None => format!("{},{}", self.i, self.j),
        }
    }
}

/// Primitive composite key packing `(i, j)` into one `u64`, used for every cell-keyed map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey(u64);

impl CellKey {
    pub const fn new(i: i32, j: i32) -> Self {
        Self(((i as u32 as u64) << 32) | (j as u32 as u64))
    }

    pub const fn cell(self) -> Cell {
        Cell::new((self.0 >> 32) as u32 as i32, self.0 as u32 as i32)
    }
}

impl From<Cell> for CellKey {
    fn from(cell: Cell) -> Self {
        cell.key()
    }
}

/// Canonical cell handle handed out by a [`crate::Board`].
pub type CellRef = Rc<Cell>;

/// Continuous geographic coordinates in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub const fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: Point,
    pub north_east: Point,
}

impl Bounds {
    pub fn contains(&self, point: Point) -> bool {
        (self.south_west.lat..self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..self.north_east.lng).contains(&point.lng)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Displacement in tiles as `(lat, lng)`.
    pub const fn offset(self) -> (f64, f64) {
        use Direction::*;
        match self {
            North => (1.0, 0.0),
            South => (-1.0, 0.0),
            East => (0.0, 1.0),
            West => (0.0, -1.0),
        }
    }
}

/// Applies `offset` to `center`, returning a value only when it does not overflow.
fn apply_offset(center: Cell, (di, dj): (i32, i32)) -> Option<Cell> {
    Some(Cell::new(center.i.checked_add(di)?, center.j.checked_add(dj)?))
}

/// Iterates the square of side `2 * radius + 1` centered on a cell, row by row.
#[derive(Debug)]
pub struct SquareIter {
    center: Cell,
    radius: i32,
    di: i32,
    dj: i32,
}

impl SquareIter {
    pub(crate) const fn new(center: Cell, radius: i32) -> Self {
        Self {
            center,
            radius,
            di: -radius,
            dj: -radius,
        }
    }
}

impl Iterator for SquareIter {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.di > self.radius {
                return None;
            }

            let offset = (self.di, self.dj);
            if self.dj >= self.radius {
                self.dj = -self.radius;
                self.di += 1;
            } else {
                self.dj += 1;
            }

            if let Some(cell) = apply_offset(self.center, offset) {
                return Some(cell);
            }
        }
    }
}
