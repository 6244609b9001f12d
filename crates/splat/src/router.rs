//! Message routing: one handler per [`ClientMessage`] variant.
//!
//! [`route`] never touches the socket. It mutates shared state and tells
//! the connection loop what to do next through an [`Outcome`], which keeps
//! every handler testable without a network.

use splat_arena::{Arena, ArenaError};
use splat_player::PlayerStore;
use splat_protocol::{ArenaId, ClientMessage, Frame, MessageType, PlayerId, SpellId};
use splat_spell::CastRequest;

use crate::{ServerState, SplatError};

/// What the connection loop should do after a message was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to send.
    Continue,
    /// Send this frame back to the sender.
    Reply(Frame),
    /// Close the connection and stop reading.
    Close,
}

/// Dispatches one decoded message from `player_id`.
///
/// # Errors
/// Validation failures ([`SplatError::Arena`], [`SplatError::Spell`]).
/// None of them are fatal; the caller logs and drops the message.
pub async fn route<S: PlayerStore>(
    state: &ServerState<S>,
    player_id: PlayerId,
    msg: ClientMessage,
) -> Result<Outcome, SplatError> {
    match msg {
        ClientMessage::Login { name } => login(state, player_id, name).await,
        ClientMessage::Move { x, y } => {
            state
                .players()
                .update(player_id, |p| {
                    p.x = x;
                    p.y = y;
                })
                .await;
            Ok(Outcome::Continue)
        }
        ClientMessage::Chat { text } => {
            let name = player_name(state, player_id).await;
            tracing::info!(%player_id, %name, %text, "chat");
            Ok(Outcome::Continue)
        }
        ClientMessage::Logout => logout(state, player_id).await,
        ClientMessage::Ping => Ok(Outcome::Reply(Frame::empty(MessageType::Ping))),
        ClientMessage::JoinArena { arena, team } => {
            existing_arena(state, arena)
                .await?
                .add_player(player_id, team)
                .await?;
            Ok(Outcome::Continue)
        }
        ClientMessage::LeaveArena { arena } => {
            existing_arena(state, arena)
                .await?
                .remove_player(player_id)
                .await;
            Ok(Outcome::Continue)
        }
        ClientMessage::ArenaList => Ok(Outcome::Reply(arena_list(state).await)),
        ClientMessage::ArenaUpdate { arena, x, y } => {
            let arena = existing_arena(state, arena).await?;
            arena.update_position(player_id, x, y).await;
            Ok(Outcome::Continue)
        }
        ClientMessage::CastSpell {
            spell,
            x,
            y,
            target,
        } => cast_spell(state, player_id, spell, x, y, target).await,
        ClientMessage::SpellList => Ok(Outcome::Reply(spell_list(state))),
        ClientMessage::Unknown { tag, payload } => {
            let name = player_name(state, player_id).await;
            let captured = state
                .debug()
                .capture(tag, &payload, player_id, &name)
                .await;
            tracing::debug!(%player_id, tag, captured, "unknown message type");
            Ok(Outcome::Continue)
        }
    }
}

/// The greeting sent when a connection is accepted, tagged Login.
pub fn greeting(player_id: PlayerId) -> Frame {
    let id = player_id.0;
    Frame::new(
        MessageType::Login,
        format!("Welcome Player{id}! Your ID is {id}\n"),
    )
}

/// Renames the player, then adopts a stored record if there is one, or
/// stores the new player if there isn't.
async fn login<S: PlayerStore>(
    state: &ServerState<S>,
    player_id: PlayerId,
    name: String,
) -> Result<Outcome, SplatError> {
    let Some(record) = state
        .players()
        .update(player_id, |p| {
            p.name.clone_from(&name);
            p.record()
        })
        .await
    else {
        return Ok(Outcome::Continue);
    };

    match state.store().load_player(player_id).await {
        Ok(Some(stored)) => {
            state
                .players()
                .update(player_id, |p| p.apply_record(&stored))
                .await;
            tracing::info!(%player_id, name = %stored.name, "player logged in, record loaded");
        }
        Ok(None) => {
            if let Err(e) = state.store().save_player(&record).await {
                tracing::warn!(%player_id, error = %e, "failed to save new player");
            }
            tracing::info!(%player_id, %name, "player logged in");
        }
        Err(e) => {
            tracing::warn!(%player_id, error = %e, "failed to load player");
        }
    }
    Ok(Outcome::Continue)
}

/// Saves the player, removes them everywhere, and asks for the connection
/// to be closed.
async fn logout<S: PlayerStore>(
    state: &ServerState<S>,
    player_id: PlayerId,
) -> Result<Outcome, SplatError> {
    if let Some(player) = state.players().get(player_id).await {
        if let Err(e) = state.store().save_player(&player.record()).await {
            tracing::warn!(%player_id, error = %e, "failed to save player on logout");
        }
    }
    state.players().remove(player_id).await;
    state.arenas().remove_player_everywhere(player_id).await;
    tracing::info!(%player_id, "player logged out");
    Ok(Outcome::Close)
}

/// Casts from the caster's current registry position.
async fn cast_spell<S: PlayerStore>(
    state: &ServerState<S>,
    player_id: PlayerId,
    spell: SpellId,
    x: f64,
    y: f64,
    target: PlayerId,
) -> Result<Outcome, SplatError> {
    let (origin_x, origin_y) = state
        .players()
        .get(player_id)
        .await
        .map_or((0.0, 0.0), |p| (p.x, p.y));

    let request = CastRequest::new(player_id, spell, x, y, target).from_origin(origin_x, origin_y);
    state.spells().cast_spell(request).await?;
    Ok(Outcome::Continue)
}

async fn existing_arena<S: PlayerStore>(
    state: &ServerState<S>,
    arena_id: ArenaId,
) -> Result<std::sync::Arc<Arena>, ArenaError> {
    state
        .arenas()
        .get_arena(arena_id)
        .await
        .ok_or(ArenaError::NotFound(arena_id))
}

async fn player_name<S: PlayerStore>(state: &ServerState<S>, player_id: PlayerId) -> String {
    state
        .players()
        .get(player_id)
        .await
        .map(|p| p.name)
        .unwrap_or_default()
}

async fn arena_list<S: PlayerStore>(state: &ServerState<S>) -> Frame {
    let mut text = String::from("Available arenas:\n");
    for info in state.arenas().list().await {
        text.push_str(&format!(
            "- {} (ID: {}, Players: {}/{})\n",
            info.name, info.id.0, info.player_count, info.capacity
        ));
    }
    Frame::new(MessageType::ArenaList, text)
}

fn spell_list<S: PlayerStore>(state: &ServerState<S>) -> Frame {
    let mut text = String::from("Available spells:\n");
    for spell in state.spells().spells() {
        text.push_str(&format!(
            "- {} (ID: {}): {}\n",
            spell.name, spell.id.0, spell.description
        ));
    }
    Frame::new(MessageType::SpellList, text)
}
