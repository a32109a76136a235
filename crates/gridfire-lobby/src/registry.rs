//! Lobby registry: creates, tracks, and routes players to lobbies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use gridfire_protocol::{LobbyId, PlayerId};

use crate::LobbyError;

/// Counter for generating unique lobby IDs.
static NEXT_LOBBY_ID: AtomicI64 = AtomicI64::new(1);

/// Members a lobby needs before its host may launch the game.
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Hard cap on lobby membership.
pub const MAX_LOBBY_PLAYERS: usize = 8;

/// One staging lobby: a host plus members with ready flags.
#[derive(Debug, Clone)]
pub struct Lobby {
    id: LobbyId,
    host: PlayerId,
    /// Member → ready flag. The host is always a member.
    players: HashMap<PlayerId, bool>,
}

impl Lobby {
    fn new(id: LobbyId, host: PlayerId) -> Self {
        let mut players = HashMap::new();
        players.insert(host, false);
        Self { id, host, players }
    }

    pub fn id(&self) -> LobbyId {
        self.id
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn is_host(&self, player: PlayerId) -> bool {
        self.host == player
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_LOBBY_PLAYERS
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.contains_key(&player)
    }

    /// The ready flag for a member, `None` for non-members.
    pub fn is_ready(&self, player: PlayerId) -> Option<bool> {
        self.players.get(&player).copied()
    }

    /// Member IDs in no particular order.
    pub fn players(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }
}

/// Owns all active lobbies and tracks which player is in which lobby.
///
/// This is the entry point for lobby operations from the gateway. The
/// registry itself is not synchronized; the gateway wraps it in a single
/// `tokio::sync::Mutex` and never holds the lock across I/O.
pub struct LobbyRegistry {
    /// Active lobbies, keyed by lobby ID.
    lobbies: HashMap<LobbyId, Lobby>,

    /// Maps each player to the lobby they're currently in.
    /// A player can be in at most ONE lobby at a time (key invariant).
    player_lobbies: HashMap<PlayerId, LobbyId>,
}

impl LobbyRegistry {
    /// Creates a new, empty lobby registry.
    pub fn new() -> Self {
        Self {
            lobbies: HashMap::new(),
            player_lobbies: HashMap::new(),
        }
    }

    /// Creates a new lobby hosted by `host` and returns its ID.
    ///
    /// Always succeeds. If the host is currently in another lobby they are
    /// removed from it first, keeping the one-lobby invariant.
    pub fn create_lobby(&mut self, host: PlayerId) -> LobbyId {
        if let Some(previous) = self.player_lobbies.get(&host).copied() {
            // Ignore the error: a stale index entry just means there is
            // nothing to leave.
            let _ = self.remove_player(previous, host);
            tracing::debug!(%host, %previous, "host left previous lobby");
        }

        let lobby_id = LobbyId(NEXT_LOBBY_ID.fetch_add(1, Ordering::Relaxed));
        self.lobbies.insert(lobby_id, Lobby::new(lobby_id, host));
        self.player_lobbies.insert(host, lobby_id);
        tracing::info!(%lobby_id, %host, "lobby created");
        lobby_id
    }

    /// Adds a player to a lobby.
    ///
    /// Idempotent when the player is already a member of that same lobby.
    /// Enforces the "one lobby at a time" invariant and the capacity cap.
    pub fn add_player(
        &mut self,
        lobby_id: LobbyId,
        player: PlayerId,
    ) -> Result<(), LobbyError> {
        if let Some(current) = self.player_lobbies.get(&player).copied() {
            if current == lobby_id {
                return Ok(());
            }
            return Err(LobbyError::AlreadyInLobby(player, current));
        }

        let lobby = self
            .lobbies
            .get_mut(&lobby_id)
            .ok_or(LobbyError::NotFound(lobby_id))?;
        if lobby.is_full() {
            return Err(LobbyError::Full(lobby_id));
        }

        lobby.players.insert(player, false);
        self.player_lobbies.insert(player, lobby_id);
        tracing::info!(%lobby_id, %player, count = lobby.players.len(), "player joined lobby");
        Ok(())
    }

    /// Removes a player from a lobby.
    ///
    /// An empty lobby is deleted. If the host leaves, the lobby is deleted
    /// outright; the remaining members are released from the index.
    pub fn remove_player(
        &mut self,
        lobby_id: LobbyId,
        player: PlayerId,
    ) -> Result<(), LobbyError> {
        let lobby = self
            .lobbies
            .get_mut(&lobby_id)
            .ok_or(LobbyError::NotFound(lobby_id))?;
        if lobby.players.remove(&player).is_none() {
            return Err(LobbyError::NotAMember(player, lobby_id));
        }
        self.player_lobbies.remove(&player);
        tracing::info!(%lobby_id, %player, "player left lobby");

        if lobby.players.is_empty() || lobby.host == player {
            let _ = self.delete_lobby(lobby_id);
        }
        Ok(())
    }

    /// Sets a member's ready flag.
    ///
    /// For a player who is not a member of the lobby this is a silent
    /// no-op, not an error — ready flags exist only for members.
    pub fn set_ready(
        &mut self,
        lobby_id: LobbyId,
        player: PlayerId,
        ready: bool,
    ) -> Result<(), LobbyError> {
        let lobby = self
            .lobbies
            .get_mut(&lobby_id)
            .ok_or(LobbyError::NotFound(lobby_id))?;
        match lobby.players.get_mut(&player) {
            Some(flag) => {
                *flag = ready;
                tracing::debug!(%lobby_id, %player, ready, "ready flag updated");
            }
            None => {
                tracing::debug!(%lobby_id, %player, "ready flag for non-member ignored");
            }
        }
        Ok(())
    }

    /// Deletes a lobby and releases all its members from the index.
    pub fn delete_lobby(&mut self, lobby_id: LobbyId) -> Result<Lobby, LobbyError> {
        let lobby = self
            .lobbies
            .remove(&lobby_id)
            .ok_or(LobbyError::NotFound(lobby_id))?;
        self.player_lobbies.retain(|_, lid| *lid != lobby_id);
        tracing::info!(%lobby_id, members = lobby.players.len(), "lobby deleted");
        Ok(lobby)
    }

    /// Returns the lobby, if it exists.
    pub fn get(&self, lobby_id: LobbyId) -> Option<&Lobby> {
        self.lobbies.get(&lobby_id)
    }

    /// Returns the lobby a player is currently in, if any.
    pub fn lobby_of(&self, player: PlayerId) -> Option<LobbyId> {
        self.player_lobbies.get(&player).copied()
    }

    /// Lists all active lobby IDs.
    pub fn active_ids(&self) -> Vec<LobbyId> {
        self.lobbies.keys().copied().collect()
    }

    /// Member IDs of a lobby.
    pub fn players(&self, lobby_id: LobbyId) -> Result<Vec<PlayerId>, LobbyError> {
        self.lobbies
            .get(&lobby_id)
            .map(Lobby::players)
            .ok_or(LobbyError::NotFound(lobby_id))
    }

    /// Whether the lobby has enough members to launch a game.
    pub fn has_minimum_players(&self, lobby_id: LobbyId) -> Result<bool, LobbyError> {
        self.lobbies
            .get(&lobby_id)
            .map(|l| l.player_count() >= MIN_PLAYERS_TO_START)
            .ok_or(LobbyError::NotFound(lobby_id))
    }

    /// Returns the number of active lobbies.
    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }
}

impl Default for LobbyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
