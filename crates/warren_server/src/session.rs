//! Per-client sessions.
//!
//! Each connection gets one tokio task pair: a reader that stores movement
//! intents into the player's control component, and a writer that builds
//! and sends one snapshot per tick interval. Both sides take the world
//! lock only briefly; a stalled client simply stops producing intents and
//! never blocks the simulation. When the connection drops, the session is
//! torn down and the player entity persists without input.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};
use uuid::Uuid;

use warren_core::components::PlayerControl;
use warren_core::{EntityId, RoomId, RoomVisibility, World};
use warren_geom::Position;
use warren_net::messages::{ClientMessage, RoomSnapshot, ServerMessage, Snapshot, TileSnapshot};
use warren_net::{read_frame, write_frame};

/// Per-session parameters shared by all clients.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Player view radius in tiles.
    pub view_radius: i32,
    /// How often snapshots are sent; matched to the tick rate.
    pub snapshot_period: Duration,
    /// Where new players are placed.
    pub spawn: Position,
    /// The entity class new players are created from.
    pub player_class: String,
}

/// Accept connections forever, spawning one session task per client.
pub async fn serve(
    listener: TcpListener,
    world: Arc<Mutex<World>>,
    config: SessionConfig,
) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    loop {
        let (stream, peer) = listener.accept().await?;
        let world = world.clone();
        let config = config.clone();
        tokio::spawn(async move {
            let session = Uuid::new_v4();
            info!(%session, %peer, "client connected");
            match handle_client(stream, world, config, session).await {
                Ok(()) => info!(%session, "client disconnected"),
                Err(e) => info!(%session, error = %e, "client disconnected"),
            }
        });
    }
}

async fn handle_client(
    mut stream: TcpStream,
    world: Arc<Mutex<World>>,
    config: SessionConfig,
    session: Uuid,
) -> anyhow::Result<()> {
    let hello: ClientMessage = read_frame(&mut stream).await?;
    let ClientMessage::Hello { name } = hello else {
        anyhow::bail!("expected hello as the first message");
    };

    let (player, time, mut masks) = {
        let mut w = world.lock().expect("world lock poisoned");
        let player = w.create(&config.player_class)?;
        w.place(player, config.spawn);
        // One reveal mask per room, created at connect time and kept for
        // the whole session.
        let masks: HashMap<RoomId, RoomVisibility> = w
            .level()
            .rooms()
            .map(|r| (r.id(), RoomVisibility::new(r)))
            .collect();
        (player, w.time(), masks)
    };
    info!(%session, name, %player, "player placed");
    write_frame(&mut stream, &ServerMessage::Welcome { player, time }).await?;

    let (reader, mut writer) = stream.into_split();
    let reader_task = tokio::spawn(read_intents(reader, world.clone(), player, session));

    let mut interval = tokio::time::interval(config.snapshot_period);
    let mut last_pos = config.spawn;
    let result = loop {
        interval.tick().await;
        let snapshot = {
            let mut w = world.lock().expect("world lock poisoned");
            build_snapshot(&mut w, player, &mut masks, config.view_radius, &mut last_pos)
        };
        if let Err(e) = write_frame(&mut writer, &ServerMessage::Snapshot(snapshot)).await {
            break e;
        }
    };
    reader_task.abort();
    Err(result.into())
}

/// Drain intents from the client until the connection drops. The latest
/// intent overwrites an unconsumed one; the control component applies at
/// most one per tick.
async fn read_intents(
    mut reader: OwnedReadHalf,
    world: Arc<Mutex<World>>,
    player: EntityId,
    session: Uuid,
) {
    loop {
        match read_frame::<ClientMessage, _>(&mut reader).await {
            Ok(ClientMessage::Intent { dir }) => {
                let mut w = world.lock().expect("world lock poisoned");
                if let Some(control) = w.find_component_mut::<PlayerControl>(player) {
                    control.set_intent(dir);
                }
            }
            Ok(ClientMessage::Hello { .. }) => {
                debug!(%session, "duplicate hello ignored");
            }
            Err(_) => break,
        }
    }
}

/// Build one tick's snapshot for a client: refresh every room mask from
/// the player's position, then serialise the tiles visible at exactly this
/// tick.
fn build_snapshot(
    w: &mut World,
    player: EntityId,
    masks: &mut HashMap<RoomId, RoomVisibility>,
    view_radius: i32,
    last_pos: &mut Position,
) -> Snapshot {
    let time = w.time();
    if let Some(pos) = w.entity_tile(player) {
        *last_pos = pos;
    }
    let origin = *last_pos;
    // A dead or removed player reveals nothing; the client keeps its mask.
    let in_play = w.is_valid(player);

    let mut rooms = Vec::new();
    let room_ids: Vec<RoomId> = w.level().rooms().map(|r| r.id()).collect();
    for id in room_ids {
        let Some(mask) = masks.get_mut(&id) else {
            continue;
        };
        if !in_play || !mask.update(w, origin, view_radius, time) {
            continue;
        }
        let visible: Vec<Position> = mask.visible_at(time).collect();
        if visible.is_empty() {
            continue;
        }
        let rect = w.level().room(id).rect();
        let tiles = visible
            .into_iter()
            .map(|pos| TileSnapshot {
                rel: pos - rect.min,
                appearance: w.tile_appearance(pos),
            })
            .collect();
        rooms.push(RoomSnapshot { rect, tiles });
    }
    Snapshot {
        time,
        player_pos: origin,
        rooms,
    }
}
