//! Appearance records for tiles and entities.
//!
//! These are the display-facing shapes serialised into client snapshots: a
//! symbol plus foreground/background palette indices.

use serde::{Deserialize, Serialize};

/// How one entity looks on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAppearance {
    /// Display symbol.
    pub symbol: char,
    /// Foreground palette index.
    pub fg: u8,
    /// Background palette index.
    pub bg: u8,
}

/// How one tile looks, terrain plus its visible occupants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileAppearance {
    /// Terrain symbol.
    pub symbol: char,
    /// Terrain foreground palette index.
    pub fg: u8,
    /// Terrain background palette index.
    pub bg: u8,
    /// Appearances of the tile's drawable occupants, in occupancy order.
    pub entities: Vec<EntityAppearance>,
}
