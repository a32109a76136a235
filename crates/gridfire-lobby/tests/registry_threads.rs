//! The registry behind a lock stays consistent under contending callers.

use std::sync::{Arc, Mutex};
use std::thread;

use gridfire_lobby::{LobbyRegistry, MAX_LOBBY_PLAYERS};
use gridfire_protocol::PlayerId;

#[test]
fn test_concurrent_joins_never_overfill_a_lobby() {
    let registry = Arc::new(Mutex::new(LobbyRegistry::new()));
    let lobby_id = registry.lock().unwrap().create_lobby(PlayerId(0));

    let mut handles = Vec::new();
    for n in 1..=32i64 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            registry.lock().unwrap().add_player(lobby_id, PlayerId(n)).is_ok()
        }));
    }
    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|joined| *joined)
        .count();

    // Host plus exactly the admitted joiners, capped.
    assert_eq!(admitted, MAX_LOBBY_PLAYERS - 1);
    let registry = registry.lock().unwrap();
    assert_eq!(
        registry.get(lobby_id).unwrap().player_count(),
        MAX_LOBBY_PLAYERS
    );
}

#[test]
fn test_concurrent_join_and_leave_keep_index_consistent() {
    let registry = Arc::new(Mutex::new(LobbyRegistry::new()));
    let lobby_id = registry.lock().unwrap().create_lobby(PlayerId(0));

    let mut handles = Vec::new();
    for n in 1..=6i64 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                let player = PlayerId(n);
                let joined = registry.lock().unwrap().add_player(lobby_id, player).is_ok();
                if joined {
                    let _ = registry.lock().unwrap().remove_player(lobby_id, player);
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // Everyone left again; only the host remains and the index agrees.
    let registry = registry.lock().unwrap();
    assert_eq!(registry.get(lobby_id).unwrap().player_count(), 1);
    for n in 1..=6i64 {
        assert_eq!(registry.lobby_of(PlayerId(n)), None);
    }
}

#[test]
fn test_lobby_ids_stay_unique_across_threads() {
    let registry = Arc::new(Mutex::new(LobbyRegistry::new()));

    let mut handles = Vec::new();
    for n in 0..16i64 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            registry.lock().unwrap().create_lobby(PlayerId(100 + n))
        }));
    }
    let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
}
