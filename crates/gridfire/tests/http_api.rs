//! HTTP API contract tests: status codes and reason strings per endpoint.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use gridfire::http::router;
use gridfire::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(
    state: &AppState,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = router(state.clone())
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_lobby(state: &AppState, host: i64) -> i64 {
    let (status, body) = call(
        state,
        Method::POST,
        "/create_lobby",
        Some(json!({ "hostId": host })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["lobbyId"].as_i64().unwrap()
}

async fn join_lobby(state: &AppState, lobby: i64, player: i64) -> (StatusCode, Value) {
    call(
        state,
        Method::POST,
        "/join_lobby",
        Some(json!({ "lobbyId": lobby, "playerId": player })),
    )
    .await
}

#[tokio::test]
async fn test_create_lobby_returns_id_and_rejects_bad_body() {
    let state = AppState::default();
    let id = create_lobby(&state, 1).await;
    assert!(id > 0);

    let (status, body) = call(
        &state,
        Method::POST,
        "/create_lobby",
        Some(json!({ "wrong": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid body");
}

#[tokio::test]
async fn test_join_lobby_maps_failures_to_400() {
    let state = AppState::default();
    let lobby = create_lobby(&state, 1).await;

    let (status, _) = join_lobby(&state, lobby, 2).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = join_lobby(&state, 9999, 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "lobby not found");

    // Fill to capacity, then overflow.
    for player in 3..=8 {
        let (status, _) = join_lobby(&state, lobby, player).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = join_lobby(&state, lobby, 99).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "lobby full");

    // A member of one lobby cannot join another.
    let other = create_lobby(&state, 50).await;
    let (status, body) = join_lobby(&state, other, 2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "player already in a lobby");
}

#[tokio::test]
async fn test_delete_lobby_requires_the_host() {
    let state = AppState::default();
    let lobby = create_lobby(&state, 1).await;

    let (status, body) = call(
        &state,
        Method::POST,
        "/delete_lobby",
        Some(json!({ "lobbyId": lobby, "hostId": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not the host");

    let (status, _) = call(
        &state,
        Method::POST,
        "/delete_lobby",
        Some(json!({ "lobbyId": lobby, "hostId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &state,
        Method::POST,
        "/delete_lobby",
        Some(json!({ "lobbyId": lobby, "hostId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "lobby not found");
}

#[tokio::test]
async fn test_leave_lobby_unknown_targets_are_400() {
    let state = AppState::default();
    let (status, _) = call(
        &state,
        Method::POST,
        "/leave_lobby",
        Some(json!({ "lobbyId": 4, "playerId": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_active_lobbies_reflect_creation_and_deletion() {
    let state = AppState::default();
    let a = create_lobby(&state, 1).await;
    let b = create_lobby(&state, 2).await;

    let (status, body) = call(&state, Method::GET, "/get_active_lobbies", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["lobbies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert!(ids.contains(&a) && ids.contains(&b));
}

#[tokio::test]
async fn test_set_ready_shows_up_in_lobby_details() {
    let state = AppState::default();
    let lobby = create_lobby(&state, 1).await;
    join_lobby(&state, lobby, 2).await;

    let (status, _) = call(
        &state,
        Method::POST,
        "/set_ready",
        Some(json!({ "lobbyId": lobby, "playerId": 2, "isReady": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &state,
        Method::GET,
        &format!("/get_lobby_details?lobbyId={lobby}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lobbyId"].as_i64().unwrap(), lobby);
    assert_eq!(body["hostId"], 1);
    let players = body["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["playerId"], 1);
    assert_eq!(players[0]["isReady"], false);
    assert_eq!(players[1]["playerId"], 2);
    assert_eq!(players[1]["isReady"], true);
}

#[tokio::test]
async fn test_set_ready_for_a_non_member_is_accepted_and_changes_nothing() {
    let state = AppState::default();
    let lobby = create_lobby(&state, 1).await;

    let (status, _) = call(
        &state,
        Method::POST,
        "/set_ready",
        Some(json!({ "lobbyId": lobby, "playerId": 99, "isReady": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(
        &state,
        Method::GET,
        &format!("/get_lobby_details?lobbyId={lobby}"),
        None,
    )
    .await;
    let players = body["players"].as_array().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["isReady"], false);
}

#[tokio::test]
async fn test_set_ready_on_missing_lobby_is_404() {
    let state = AppState::default();
    let (status, _) = call(
        &state,
        Method::POST,
        "/set_ready",
        Some(json!({ "lobbyId": 123, "playerId": 1, "isReady": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lobby_details_bad_query_and_missing_lobby() {
    let state = AppState::default();
    let (status, _) = call(&state, Method::GET, "/get_lobby_details", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &state,
        Method::GET,
        "/get_lobby_details?lobbyId=777",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "lobby not found");
}

#[tokio::test]
async fn test_start_game_enforces_check_order() {
    let state = AppState::default();

    // Unknown lobby: 404.
    let (status, _) = call(
        &state,
        Method::POST,
        "/start_game",
        Some(json!({ "lobbyId": 999, "playerId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Non-host caller: 403, even though the lobby is too small anyway.
    let lobby = create_lobby(&state, 1).await;
    let (status, body) = call(
        &state,
        Method::POST,
        "/start_game",
        Some(json!({ "lobbyId": lobby, "playerId": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not the host");

    // Host but alone: 400.
    let (status, body) = call(
        &state,
        Method::POST,
        "/start_game",
        Some(json!({ "lobbyId": lobby, "playerId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not enough players");
}

#[tokio::test]
async fn test_start_game_launches_and_consumes_the_lobby() {
    let state = AppState::default();
    let lobby = create_lobby(&state, 1).await;
    join_lobby(&state, lobby, 2).await;

    let (status, body) = call(
        &state,
        Method::POST,
        "/start_game",
        Some(json!({ "lobbyId": lobby, "playerId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let game_id = body["gameId"].as_i64().unwrap();
    assert!(game_id > 0);

    // The lobby is gone.
    let (status, _) = call(
        &state,
        Method::GET,
        &format!("/get_lobby_details?lobbyId={lobby}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The arena is served for the new game.
    let (status, body) = call(
        &state,
        Method::GET,
        &format!("/game_arena?gameId={game_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gameId"].as_i64().unwrap(), game_id);
    assert_eq!(body["dim"], 20);
    let tiles = body["tiles"].as_array().unwrap();
    assert_eq!(tiles.len(), 20);
    // Outer ring is indestructible wall (code 1).
    for cell in tiles[0].as_array().unwrap() {
        assert_eq!(cell.as_u64().unwrap(), 1);
    }
}

#[tokio::test]
async fn test_game_arena_unknown_game_is_404() {
    let state = AppState::default();
    let (status, body) =
        call(&state, Method::GET, "/game_arena?gameId=424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "game not found");

    let (status, _) = call(&state, Method::GET, "/game_arena", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
