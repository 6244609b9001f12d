//! Per-connection handler: greeting, then the read-decode-route loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register a fresh player for the connection
//!   2. Send the greeting frame
//!   3. Loop: receive frame → check the player is still registered →
//!      decode → route → reply, in arrival order

use std::sync::Arc;

use splat_player::{Player, PlayerStore};
use splat_protocol::{ClientMessage, PlayerId};
use splat_transport::{Connection, TcpConnection};

use crate::router::{Outcome, greeting, route};
use crate::{ServerState, SplatError};

/// Drop guard that removes the player when the handler exits.
///
/// Runs on clean close, on error, and on panic. `Drop` is synchronous, so
/// the async cleanup is spawned as a fire-and-forget task.
struct PlayerGuard<S: PlayerStore> {
    player_id: PlayerId,
    state: Arc<ServerState<S>>,
}

impl<S: PlayerStore> Drop for PlayerGuard<S> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if state.players().remove(player_id).await.is_some() {
                tracing::info!(%player_id, "player disconnected");
            }
            state.arenas().remove_player_everywhere(player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
///
/// Malformed payloads and refused requests are logged and dropped. A
/// framing or transport error ends the connection.
pub(crate) async fn handle_connection<S: PlayerStore>(
    conn: TcpConnection,
    state: Arc<ServerState<S>>,
) -> Result<(), SplatError> {
    let conn_id = conn.id();
    let player_id = state.allocate_player_id();

    state
        .players()
        .add(Player::new(player_id).with_connection(conn_id))
        .await;
    let _guard = PlayerGuard {
        player_id,
        state: Arc::clone(&state),
    };

    tracing::info!(%conn_id, %player_id, peer = ?conn.peer_addr(), "player connected");

    conn.send(&greeting(player_id)).await?;

    loop {
        let frame = match conn.recv().await? {
            Some(frame) => frame,
            None => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
        };

        // A pruned player's session is over. Nothing it sends afterwards
        // reaches the world.
        if !state.players().touch(player_id).await {
            tracing::info!(%player_id, tag = frame.tag, "player no longer registered, closing");
            if let Err(e) = conn.close().await {
                tracing::debug!(%player_id, error = %e, "close failed");
            }
            break;
        }

        let tag = frame.tag;
        let outcome = match ClientMessage::decode(&frame) {
            Ok(msg) => route(&state, player_id, msg).await,
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Reply(reply)) => conn.send(&reply).await?,
            Ok(Outcome::Close) => {
                if let Err(e) = conn.close().await {
                    tracing::debug!(%player_id, error = %e, "close failed");
                }
                break;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::debug!(%player_id, tag, error = %e, "message dropped");
            }
        }
    }

    // _guard drops here → player removal fires.
    Ok(())
}
