//! The duplex channel: per-tick input in, snapshot out.
//!
//! No handshake — a client connects and starts sending input frames.
//! Every inbound frame yields exactly one reply on the same connection:
//! the post-input session snapshot, or the literal `"0"` sentinel when
//! the addressed game does not resolve. The connection itself is never
//! closed for a bad game id or an undecodable frame; clients recover by
//! sending the next input.

use gridfire_game::GameError;
use gridfire_protocol::{ClientInput, Codec, JsonCodec, Vec2};
use gridfire_transport::{Connection, Transport, TransportError, WebSocketTransport};

use crate::{AppState, GridfireError};

/// Reply sent when the input's game id resolves to no live session.
const NO_GAME_REPLY: &str = "0";

/// Accepts duplex connections forever, spawning one handler task each.
pub async fn run_accept_loop(mut transport: WebSocketTransport, state: AppState) {
    loop {
        match transport.accept().await {
            Ok(conn) => {
                let state = state.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(error = %e, "connection ended with error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}

/// Serves one connection until the peer closes it.
pub async fn handle_connection<C>(conn: C, state: AppState) -> Result<(), GridfireError>
where
    C: Connection<Error = TransportError>,
{
    let codec = JsonCodec;
    while let Some(text) = conn.recv().await? {
        let input: ClientInput = match codec.decode(&text) {
            Ok(input) => input,
            Err(err) => {
                // Bad frames are skipped, not fatal.
                tracing::debug!(conn = %conn.id(), %err, "undecodable input frame");
                continue;
            }
        };
        let reply = process_input(&state, &codec, input).await?;
        conn.send(&reply).await?;
    }
    tracing::debug!(conn = %conn.id(), "connection closed");
    Ok(())
}

/// Applies one input frame and renders the reply text.
async fn process_input(
    state: &AppState,
    codec: &JsonCodec,
    input: ClientInput,
) -> Result<String, GridfireError> {
    let Some(game_id) = input.target_game() else {
        return Ok(NO_GAME_REPLY.to_string());
    };
    let Some(handle) = state.sessions.lock().await.get(game_id) else {
        return Ok(NO_GAME_REPLY.to_string());
    };

    let result = handle
        .apply_input(
            input.player_id,
            Vec2::new(input.delta_x, input.delta_y),
            Vec2::new(input.mouse_x, input.mouse_y),
            input.is_shooting == 1,
        )
        .await;

    match result {
        Ok(snapshot) => Ok(codec.encode(&snapshot)?),
        Err(GameError::Unavailable(_)) => {
            // The game ended under us; drop the dead handle and degrade.
            state.sessions.lock().await.reap();
            Ok(NO_GAME_REPLY.to_string())
        }
        Err(err) => {
            tracing::warn!(%game_id, %err, "input rejected");
            Ok(NO_GAME_REPLY.to_string())
        }
    }
}
