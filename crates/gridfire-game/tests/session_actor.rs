//! End-to-end flow through the session manager and actor: create, start,
//! feed inputs, observe ticks, shut down, reap.

use std::time::Duration;

use gridfire_game::{GameError, GamePhase, SessionManager};
use gridfire_protocol::{PlayerId, Vec2};

#[tokio::test]
async fn test_created_session_is_paused_until_started() {
    let mut manager = SessionManager::default();
    let game_id = manager.create_game(&[PlayerId(1), PlayerId(2)]).unwrap();
    let handle = manager.get(game_id).unwrap();

    let info = handle.info().await.unwrap();
    assert_eq!(info.phase, GamePhase::Created);
    assert_eq!(info.player_count, 2);

    // Inputs before start are acknowledged but change nothing.
    let before = handle.snapshot().await.unwrap();
    let after = handle
        .apply_input(PlayerId(1), Vec2::new(1.0, 0.0), Vec2::ZERO, false)
        .await
        .unwrap();
    assert_eq!(before.players, after.players);

    // No ticks while paused.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(handle.info().await.unwrap().tick, 0);
}

#[tokio::test]
async fn test_started_session_ticks_and_applies_inputs() {
    let mut manager = SessionManager::default();
    let game_id = manager.create_game(&[PlayerId(1), PlayerId(2)]).unwrap();
    manager.start_game(game_id).await.unwrap();
    let handle = manager.get(game_id).unwrap();

    assert_eq!(handle.info().await.unwrap().phase, GamePhase::Running);

    let before = handle.snapshot().await.unwrap();
    let me = before.players.iter().find(|p| p.player_id == PlayerId(1)).unwrap();

    // Aim at our own position offset along +x; the reply is the post-input
    // snapshot.
    let reply = handle
        .apply_input(
            PlayerId(1),
            Vec2::ZERO,
            Vec2::new(me.x + 5.0, me.y),
            false,
        )
        .await
        .unwrap();
    let me_after = reply.players.iter().find(|p| p.player_id == PlayerId(1)).unwrap();
    assert!((me_after.angle - 90.0).abs() < 1e-3);

    // The 16 Hz loop is live.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(handle.info().await.unwrap().tick > 0);
}

#[tokio::test]
async fn test_arena_grid_is_stable_across_requests() {
    let mut manager = SessionManager::default();
    let game_id = manager.create_game(&[PlayerId(1), PlayerId(2)]).unwrap();
    let handle = manager.get(game_id).unwrap();

    let a = handle.arena().await.unwrap();
    let b = handle.arena().await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.dim, 20);
    assert_eq!(a.game_id, game_id);
}

#[tokio::test]
async fn test_shutdown_closes_the_handle_and_reap_removes_it() {
    let mut manager = SessionManager::default();
    let game_id = manager.create_game(&[PlayerId(1), PlayerId(2)]).unwrap();
    let handle = manager.get(game_id).unwrap();

    handle.shutdown().await.unwrap();
    // Give the actor a moment to drain and exit.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(handle.is_closed());
    assert!(matches!(
        handle.snapshot().await,
        Err(GameError::Unavailable(_))
    ));

    assert_eq!(manager.reap(), 1);
    assert!(manager.get(game_id).is_none());
}
