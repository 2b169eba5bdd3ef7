//! Message types exchanged between the server and its clients.
//!
//! All types derive `Serialize`/`Deserialize` for MessagePack transport.
//! Snapshot layout follows the reveal-mask protocol: simulation time, the
//! player's absolute position, then one record per room with any
//! currently-visible tiles, each carrying its absolute rectangle and the
//! visible tiles as room-relative positions with appearance records. A
//! client reconstructs its reveal mask incrementally from these.

use serde::{Deserialize, Serialize};

use warren_core::{EntityId, Tick, TileAppearance};
use warren_geom::{Direction, Position, Rect};

/// Messages from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// First message on a fresh connection.
    Hello {
        /// Player display name.
        name: String,
    },
    /// A movement intent. At most one is applied per tick; a newer intent
    /// replaces an unconsumed one.
    Intent {
        /// Requested movement direction.
        dir: Direction,
    },
}

/// Messages from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Acknowledges the hello and announces the player entity.
    Welcome {
        /// The entity the client controls.
        player: EntityId,
        /// Simulation time at connect.
        time: Tick,
    },
    /// One tick's view of the world.
    Snapshot(Snapshot),
}

/// A partially-observed view of the world for one client at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulation time of this snapshot.
    pub time: Tick,
    /// The player's absolute position, or its last known position while
    /// the player entity is out of play.
    pub player_pos: Position,
    /// One record per room with at least one currently-visible tile.
    pub rooms: Vec<RoomSnapshot>,
}

/// Visible tiles of one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// The room's absolute rectangle.
    pub rect: Rect,
    /// Currently-visible tiles. The length is the tile count.
    pub tiles: Vec<TileSnapshot>,
}

/// One visible tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    /// Position relative to the room's top-left corner.
    pub rel: Position,
    /// Terrain and occupant appearance.
    pub appearance: TileAppearance,
}
