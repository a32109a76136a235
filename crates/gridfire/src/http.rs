//! The HTTP API: lobby lifecycle and game launch.
//!
//! Thin layer over [`LobbyRegistry`] and [`SessionManager`] — every
//! handler takes a lock, performs one registry operation, and maps the
//! outcome to a status code plus a stable reason string. Locks are never
//! held across network I/O; session-handle awaits happen after the
//! manager lock is released.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gridfire_game::{GameConfig, SessionManager};
use gridfire_lobby::{LobbyError, LobbyRegistry, MIN_PLAYERS_TO_START};
use gridfire_protocol::{ArenaSnapshot, GameId, LobbyId, PlayerId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

/// Shared state behind every handler and the duplex loop.
///
/// Two coarse locks: one for the lobby registry, one for the session
/// manager. Session *state* is never behind these — it lives in the
/// actors — so the locks only guard the maps.
#[derive(Clone)]
pub struct AppState {
    pub lobbies: Arc<Mutex<LobbyRegistry>>,
    pub sessions: Arc<Mutex<SessionManager>>,
}

impl AppState {
    pub fn new(game_config: GameConfig) -> Self {
        Self {
            lobbies: Arc::new(Mutex::new(LobbyRegistry::new())),
            sessions: Arc::new(Mutex::new(SessionManager::new(game_config))),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// Builds the API router with permissive CORS (browser clients connect
/// from arbitrary origins).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/create_lobby", post(create_lobby))
        .route("/join_lobby", post(join_lobby))
        .route("/delete_lobby", post(delete_lobby))
        .route("/leave_lobby", post(leave_lobby))
        .route("/get_active_lobbies", get(get_active_lobbies))
        .route("/set_ready", post(set_ready))
        .route("/get_lobby_details", get(get_lobby_details))
        .route("/start_game", post(start_game))
        .route("/game_arena", get(game_arena))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// An API failure: a status code plus a stable reason string.
///
/// Reason strings are part of the client contract — they change behavior
/// on the other end, so keep them stable.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    reason: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, reason: &'static str) -> Self {
        Self { status, reason }
    }

    fn invalid_body() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid body")
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.reason })).into_response()
    }
}

/// Unwraps a JSON body, turning any extractor rejection into the
/// documented 400 rather than axum's default 422.
fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected request body");
            Err(ApiError::invalid_body())
        }
    }
}

/// Unwraps a query string, turning any extractor rejection into the
/// documented 400 rather than axum's default plain-text response.
fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected query string");
            Err(ApiError::invalid_body())
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateLobbyRequest {
    #[serde(rename = "hostId")]
    pub host_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLobbyResponse {
    #[serde(rename = "lobbyId")]
    pub lobby_id: LobbyId,
}

#[derive(Debug, Deserialize)]
pub struct JoinLobbyRequest {
    #[serde(rename = "lobbyId")]
    pub lobby_id: i64,
    #[serde(rename = "playerId")]
    pub player_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteLobbyRequest {
    #[serde(rename = "lobbyId")]
    pub lobby_id: i64,
    #[serde(rename = "hostId")]
    pub host_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeaveLobbyRequest {
    #[serde(rename = "lobbyId")]
    pub lobby_id: i64,
    #[serde(rename = "playerId")]
    pub player_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveLobbiesResponse {
    pub lobbies: Vec<LobbyId>,
}

#[derive(Debug, Deserialize)]
pub struct SetReadyRequest {
    #[serde(rename = "lobbyId")]
    pub lobby_id: i64,
    #[serde(rename = "playerId")]
    pub player_id: i64,
    #[serde(rename = "isReady")]
    pub is_ready: bool,
}

#[derive(Debug, Deserialize)]
pub struct LobbyQuery {
    #[serde(rename = "lobbyId")]
    pub lobby_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LobbyPlayerEntry {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(rename = "isReady")]
    pub is_ready: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LobbyDetailsResponse {
    #[serde(rename = "lobbyId")]
    pub lobby_id: LobbyId,
    #[serde(rename = "hostId")]
    pub host_id: PlayerId,
    pub players: Vec<LobbyPlayerEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StartGameRequest {
    #[serde(rename = "lobbyId")]
    pub lobby_id: i64,
    #[serde(rename = "playerId")]
    pub player_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameResponse {
    #[serde(rename = "gameId")]
    pub game_id: GameId,
}

#[derive(Debug, Deserialize)]
pub struct GameQuery {
    #[serde(rename = "gameId")]
    pub game_id: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_lobby(
    State(state): State<AppState>,
    body: Result<Json<CreateLobbyRequest>, JsonRejection>,
) -> Result<Json<CreateLobbyResponse>, ApiError> {
    let req = parse_body(body)?;
    let lobby_id = state.lobbies.lock().await.create_lobby(PlayerId(req.host_id));
    Ok(Json(CreateLobbyResponse { lobby_id }))
}

async fn join_lobby(
    State(state): State<AppState>,
    body: Result<Json<JoinLobbyRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let req = parse_body(body)?;
    state
        .lobbies
        .lock()
        .await
        .add_player(LobbyId(req.lobby_id), PlayerId(req.player_id))
        .map_err(|err| match err {
            LobbyError::NotFound(_) => ApiError::new(StatusCode::BAD_REQUEST, "lobby not found"),
            LobbyError::Full(_) => ApiError::new(StatusCode::BAD_REQUEST, "lobby full"),
            LobbyError::AlreadyInLobby(..) => {
                ApiError::new(StatusCode::BAD_REQUEST, "player already in a lobby")
            }
            LobbyError::NotAMember(..) => ApiError::invalid_body(),
        })?;
    Ok(StatusCode::OK)
}

async fn delete_lobby(
    State(state): State<AppState>,
    body: Result<Json<DeleteLobbyRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let req = parse_body(body)?;
    let lobby_id = LobbyId(req.lobby_id);

    let mut lobbies = state.lobbies.lock().await;
    let lobby = lobbies
        .get(lobby_id)
        .ok_or(ApiError::new(StatusCode::BAD_REQUEST, "lobby not found"))?;
    if !lobby.is_host(PlayerId(req.host_id)) {
        return Err(ApiError::new(StatusCode::FORBIDDEN, "not the host"));
    }
    lobbies
        .delete_lobby(lobby_id)
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "lobby not found"))?;
    Ok(StatusCode::OK)
}

async fn leave_lobby(
    State(state): State<AppState>,
    body: Result<Json<LeaveLobbyRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let req = parse_body(body)?;
    state
        .lobbies
        .lock()
        .await
        .remove_player(LobbyId(req.lobby_id), PlayerId(req.player_id))
        .map_err(|err| match err {
            LobbyError::NotFound(_) => ApiError::new(StatusCode::BAD_REQUEST, "lobby not found"),
            _ => ApiError::new(StatusCode::BAD_REQUEST, "player not in lobby"),
        })?;
    Ok(StatusCode::OK)
}

async fn get_active_lobbies(State(state): State<AppState>) -> Json<ActiveLobbiesResponse> {
    let mut lobbies = state.lobbies.lock().await.active_ids();
    lobbies.sort();
    Json(ActiveLobbiesResponse { lobbies })
}

async fn set_ready(
    State(state): State<AppState>,
    body: Result<Json<SetReadyRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let req = parse_body(body)?;
    state
        .lobbies
        .lock()
        .await
        .set_ready(LobbyId(req.lobby_id), PlayerId(req.player_id), req.is_ready)
        .map_err(|_| ApiError::new(StatusCode::NOT_FOUND, "lobby not found"))?;
    Ok(StatusCode::OK)
}

async fn get_lobby_details(
    State(state): State<AppState>,
    query: Result<Query<LobbyQuery>, QueryRejection>,
) -> Result<Json<LobbyDetailsResponse>, ApiError> {
    let query = parse_query(query)?;
    let lobbies = state.lobbies.lock().await;
    let lobby = lobbies
        .get(LobbyId(query.lobby_id))
        .ok_or(ApiError::new(StatusCode::NOT_FOUND, "lobby not found"))?;

    let mut players: Vec<LobbyPlayerEntry> = lobby
        .players()
        .into_iter()
        .map(|player_id| LobbyPlayerEntry {
            player_id,
            // Members always have a flag; default for robustness.
            is_ready: lobby.is_ready(player_id).unwrap_or(false),
        })
        .collect();
    players.sort_by_key(|entry| entry.player_id);

    Ok(Json(LobbyDetailsResponse {
        lobby_id: lobby.id(),
        host_id: lobby.host(),
        players,
    }))
}

/// Launches a game from a lobby.
///
/// Check order is part of the contract: existence (404), then host
/// authorization (403), then the player-count precondition (400). Only
/// after the session exists is the lobby deleted and the loop started.
async fn start_game(
    State(state): State<AppState>,
    body: Result<Json<StartGameRequest>, JsonRejection>,
) -> Result<Json<StartGameResponse>, ApiError> {
    let req = parse_body(body)?;
    let lobby_id = LobbyId(req.lobby_id);
    let caller = PlayerId(req.player_id);

    let players = {
        let lobbies = state.lobbies.lock().await;
        let lobby = lobbies
            .get(lobby_id)
            .ok_or(ApiError::new(StatusCode::NOT_FOUND, "lobby not found"))?;
        if !lobby.is_host(caller) {
            return Err(ApiError::new(StatusCode::FORBIDDEN, "not the host"));
        }
        if lobby.player_count() < MIN_PLAYERS_TO_START {
            return Err(ApiError::new(StatusCode::BAD_REQUEST, "not enough players"));
        }
        lobby.players()
    };

    let game_id = state
        .sessions
        .lock()
        .await
        .create_game(&players)
        .map_err(|err| {
            tracing::error!(%lobby_id, %err, "session creation failed");
            ApiError::internal()
        })?;

    // The lobby's job is done; losing this race to a concurrent delete
    // is fine, the membership was captured above.
    let _ = state.lobbies.lock().await.delete_lobby(lobby_id);

    let handle = state
        .sessions
        .lock()
        .await
        .get(game_id)
        .ok_or_else(ApiError::internal)?;
    handle.start().await.map_err(|err| {
        tracing::error!(%game_id, %err, "game loop failed to start");
        ApiError::internal()
    })?;

    Ok(Json(StartGameResponse { game_id }))
}

async fn game_arena(
    State(state): State<AppState>,
    query: Result<Query<GameQuery>, QueryRejection>,
) -> Result<Json<ArenaSnapshot>, ApiError> {
    let query = parse_query(query)?;
    let game_id = GameId(query.game_id);
    let handle = state
        .sessions
        .lock()
        .await
        .get(game_id)
        .ok_or(ApiError::new(StatusCode::NOT_FOUND, "game not found"))?;

    match handle.arena().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(err) => {
            // The actor exited between lookup and request.
            tracing::debug!(%game_id, %err, "arena request hit a dead session");
            state.sessions.lock().await.reap();
            Err(ApiError::new(StatusCode::NOT_FOUND, "game not found"))
        }
    }
}
