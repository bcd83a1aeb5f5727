use serde::{Deserialize, Serialize};

use crate::*;

/// Salt appended to the cell's luck key when rolling a new cache's coin count.
pub const INITIAL_COINS_SALT: &str = "initialCoins";

/// Opaque serialized snapshot of a [`Geocache`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memento(String);

impl Memento {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Memento {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for Memento {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

/// Wire shape of a memento.
#[derive(Serialize, Deserialize)]
struct GeocacheState {
    cell: Cell,
    coins: Vec<Coin>,
}

/// Mutable coin container anchored to one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Geocache {
    cell: CellRef,
    coins: Vec<Coin>,
}

impl Geocache {
    /// Whether the luck oracle places a cache on `cell`.
    pub fn spawns_at(cell: Cell, luck: &impl Luck, probability: f64) -> bool {
        luck.luck(&cell.luck_key(None)) < probability
    }

    /// Seeds `floor(luck * max_coins)` coins minted in this cell, with serials counting from zero.
    pub fn generate(cell: CellRef, luck: &impl Luck, max_coins: u32) -> Self {
        let roll = luck.luck(&cell.luck_key(Some(INITIAL_COINS_SALT)));
        let count = ((roll * f64::from(max_coins)).floor() as u32).min(max_coins);
        let coins = (0..count).map(|serial| Coin::new(*cell, serial)).collect();
        log::trace!("generated {} coins at {}:{}", count, cell.i, cell.j);
        Self { cell, coins }
    }

    pub fn with_coins(cell: CellRef, coins: Vec<Coin>) -> Self {
        Self { cell, coins }
    }

    pub fn from_memento(memento: &Memento, board: &mut Board) -> Result<Self> {
        let (cell, coins) = Self::parse(memento)?;
        Ok(Self {
            cell: board.canonicalize(cell),
            coins,
        })
    }

    pub fn cell(&self) -> &CellRef {
        &self.cell
    }

    pub fn add_coin(&mut self, coin: Coin) {
        self.coins.push(coin);
    }

    /// Removes the first coin with the given identity. `None` means there is nothing to collect.
    pub fn remove_coin(&mut self, identity: &str) -> Option<Coin> {
        let index = self.coins.iter().position(|coin| coin.has_identity(identity))?;
        Some(self.coins.remove(index))
    }

    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Identities in insertion order.
    pub fn coin_identities(&self) -> Vec<String> {
        self.coins.iter().map(Coin::identity).collect()
    }

    pub fn snapshot(&self) -> Memento {
        let state = GeocacheState {
            cell: *self.cell,
            coins: self.coins.clone(),
        };
        Memento(serde_json::to_string(&state).expect("geocache state should always serialize"))
    }

    /// Replaces cell and coins with the memento's content. Serials are kept verbatim.
    ///
    /// On error the cache is left untouched.
    pub fn restore(&mut self, memento: &Memento, board: &mut Board) -> Result<()> {
        let (cell, coins) = Self::parse(memento)?;
        self.cell = board.canonicalize(cell);
        self.coins = coins;
        Ok(())
    }

    fn parse(memento: &Memento) -> Result<(Cell, Vec<Coin>)> {
        let state: GeocacheState = serde_json::from_str(memento.as_str())
            .map_err(|err| GameError::MalformedSnapshot(err.to_string()))?;
        Ok((state.cell, state.coins))
    }
}
