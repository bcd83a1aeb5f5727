use std::collections::BTreeMap;
use std::rc::Rc;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TransferOutcome {
    NothingToMove,
    Moved(Coin),
}

impl TransferOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NothingToMove => false,
            Self::Moved(_) => true,
        }
    }
}

/// Owns the board, the cache directory and the player, and drives every mutation of them.
#[derive(Debug)]
pub struct GameSession<L = Sha256Luck> {
    config: GameConfig,
    luck: L,
    board: Board,
    directory: CacheDirectory,
    visible: BTreeMap<CellKey, Geocache>,
    position: Point,
    inventory: Vec<Coin>,
    paths: Vec<Vec<Point>>,
}

impl GameSession<Sha256Luck> {
    pub fn with_config(config: GameConfig) -> Result<Self> {
        Self::new(config, Sha256Luck)
    }
}

impl<L: Luck> GameSession<L> {
    pub fn new(config: GameConfig, luck: L) -> Result<Self> {
        let mut session = Self::unrefreshed(config, luck)?;
        session.refresh_visible();
        Ok(session)
    }

    /// Builds a session standing at the start with no visible caches and an empty registry.
    pub(crate) fn unrefreshed(config: GameConfig, luck: L) -> Result<Self> {
        let config = config.validate()?;
        let board = Board::from_config(&config)?;
        Ok(Self {
            config,
            luck,
            board,
            directory: CacheDirectory::new(),
            visible: BTreeMap::new(),
            position: config.start,
            inventory: Vec::new(),
            paths: vec![vec![config.start]],
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn directory(&self) -> &CacheDirectory {
        &self.directory
    }

    pub fn player_position(&self) -> Point {
        self.position
    }

    pub fn player_cell(&mut self) -> CellRef {
        self.board.cell_for_point(self.position)
    }

    pub fn inventory(&self) -> &[Coin] {
        &self.inventory
    }

    pub fn inventory_identities(&self) -> Vec<String> {
        self.inventory.iter().map(Coin::identity).collect()
    }

    /// Movement history, one polyline per continuous stretch of steps.
    pub fn paths(&self) -> &[Vec<Point>] {
        &self.paths
    }

    pub fn visible_caches(&self) -> impl Iterator<Item = &Geocache> {
        self.visible.values()
    }

    pub fn cache_at(&self, cell: Cell) -> Option<&Geocache> {
        self.visible.get(&cell.key())
    }

    /// Moves the player one tile and refreshes the caches around them.
    pub fn step(&mut self, direction: Direction) {
        let (dlat, dlng) = direction.offset();
        let tile_width = self.board.tile_width();
        self.position = Point::new(
            self.position.lat + dlat * tile_width,
            self.position.lng + dlng * tile_width,
        );
        match self.paths.last_mut() {
            Some(path) => path.push(self.position),
            None => self.paths.push(vec![self.position]),
        }
        log::debug!("step {:?} to {:?}", direction, self.position);
        self.refresh_visible();
    }

    /// Applies the result of one position request. Returns whether the player moved.
    ///
    /// A failed request is logged and leaves the position unchanged.
    pub fn apply_position_update(
        &mut self,
        update: core::result::Result<Point, PositionUnavailable>,
    ) -> bool {
        match update {
            Ok(point) if point.is_finite() => {
                self.position = point;
                self.paths.push(vec![point]);
                log::debug!("position update to {:?}", point);
                self.refresh_visible();
                true
            }
            Ok(point) => {
                log::warn!("Ignoring non-finite position {:?}", point);
                false
            }
            Err(err) => {
                log::warn!("{}", err);
                false
            }
        }
    }

    /// Rebuilds the visible caches around the player, restoring visited ones from the directory.
    pub fn refresh_visible(&mut self) {
        self.visible.clear();
        for cell in self.board.neighbors_of(self.position) {
            if !Geocache::spawns_at(*cell, &self.luck, self.config.spawn_probability) {
                continue;
            }

            let cache = match self.directory.get(*cell) {
                Some(memento) => match Geocache::from_memento(memento, &mut self.board) {
                    Ok(cache) if *cache.cell() == cell => cache,
                    Ok(cache) => {
                        log::warn!(
                            "Memento for {}:{} describes {}:{}, regenerating",
                            cell.i,
                            cell.j,
                            cache.cell().i,
                            cache.cell().j
                        );
                        self.generate(Rc::clone(&cell))
                    }
                    Err(err) => {
                        log::warn!("Could not restore cache at {}:{}: {}", cell.i, cell.j, err);
                        self.generate(Rc::clone(&cell))
                    }
                },
                None => self.generate(Rc::clone(&cell)),
            };
            log::trace!("cache at {}:{} holds {} coins", cell.i, cell.j, cache.coin_count());
            self.visible.insert(cell.key(), cache);
        }
        log::debug!(
            "{} caches visible around {:?}",
            self.visible.len(),
            self.position
        );
    }

    /// Moves one coin from the cache at `cell` into the player's inventory.
    pub fn collect(&mut self, cell: Cell, identity: &str) -> Result<TransferOutcome> {
        let cache = self
            .visible
            .get_mut(&cell.key())
            .ok_or(GameError::CacheNotVisible(cell))?;
        let Some(coin) = cache.remove_coin(identity) else {
            log::debug!("nothing to collect for {} at {}:{}", identity, cell.i, cell.j);
            return Ok(TransferOutcome::NothingToMove);
        };
        self.directory.put(cell, cache.snapshot());
        self.inventory.push(coin);
        log::debug!("collected {} at {}:{}", coin, cell.i, cell.j);
        Ok(TransferOutcome::Moved(coin))
    }

    /// Moves one coin from the player's inventory into the cache at `cell`.
    pub fn deposit(&mut self, cell: Cell, identity: &str) -> Result<TransferOutcome> {
        let cache = self
            .visible
            .get_mut(&cell.key())
            .ok_or(GameError::CacheNotVisible(cell))?;
        let Some(index) = self
            .inventory
            .iter()
            .position(|coin| coin.has_identity(identity))
        else {
            log::debug!("nothing to deposit for {}", identity);
            return Ok(TransferOutcome::NothingToMove);
        };
        let coin = self.inventory.remove(index);
        cache.add_coin(coin);
        self.directory.put(cell, cache.snapshot());
        log::debug!("deposited {} at {}:{}", coin, cell.i, cell.j);
        Ok(TransferOutcome::Moved(coin))
    }

    /// Stores a memento read from durable storage, canonicalizing its cell first.
    pub fn record_memento(&mut self, cell: Cell, memento: Memento) {
        let cell = self.board.canonicalize(cell);
        self.directory.put(*cell, memento);
    }

    pub(crate) fn restore_player(
        &mut self,
        position: Point,
        inventory: Vec<Coin>,
        paths: Vec<Vec<Point>>,
    ) {
        self.position = position;
        self.inventory = inventory;
        self.paths = if paths.is_empty() {
            vec![vec![position]]
        } else {
            paths
        };
    }

    /// Forgets every visited cache, the inventory and the paths, and returns to the start.
    pub fn reset(&mut self) {
        self.directory.clear();
        self.board.clear();
        self.inventory.clear();
        self.position = self.config.start;
        self.paths = vec![vec![self.config.start]];
        log::info!("session reset");
        self.refresh_visible();
    }

    fn generate(&self, cell: CellRef) -> Geocache {
        Geocache::generate(cell, &self.luck, self.config.max_initial_coins)
    }
}
