use std::collections::BTreeMap;

use crate::*;

/// Latest memento of every visited cache, keyed by the packed cell key.
///
/// Keying by [`CellKey`] makes lookups depend only on `(i, j)`, so a handle from a
/// [`Board`] and a freshly built [`Cell`] with the same coordinates find the same entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheDirectory {
    mementos: BTreeMap<CellKey, Memento>,
}

impl CacheDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: Cell) -> Option<&Memento> {
        self.mementos.get(&cell.key())
    }

    pub fn put(&mut self, cell: Cell, memento: Memento) {
        self.mementos.insert(cell.key(), memento);
    }

    pub fn remove(&mut self, cell: Cell) -> Option<Memento> {
        self.mementos.remove(&cell.key())
    }

    pub fn clear(&mut self) {
        self.mementos.clear();
    }

    pub fn len(&self) -> usize {
        self.mementos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mementos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, &Memento)> {
        self.mementos.iter().map(|(key, memento)| (key.cell(), memento))
    }
}
