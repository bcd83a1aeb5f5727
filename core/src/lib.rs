//! Grid and cache core of a location-based coin collecting game.
//!
//! Points are bucketed into canonical [`Cell`]s by a [`Board`]. Cells may hold a [`Geocache`]
//! whose coins are seeded from a deterministic [`Luck`] oracle, and whose state round-trips
//! through a [`Memento`] kept in a [`CacheDirectory`]. A [`GameSession`] ties these together
//! around one player.

pub use board::*;
pub use coin::*;
pub use config::*;
pub use directory::*;
pub use error::*;
pub use geocache::*;
pub use luck::*;
pub use session::*;
pub use storage::*;
pub use types::*;

mod board;
mod coin;
mod config;
mod directory;
mod error;
mod geocache;
mod luck;
mod session;
mod storage;
mod types;
