//! Session actor: an isolated Tokio task that owns one game session.
//!
//! Each session runs in its own task, communicating with the outside world
//! through an mpsc channel. Duplex inputs and the tick both arrive here,
//! so every mutation of the session is serialized and every snapshot is
//! internally consistent.

use gridfire_protocol::{ArenaSnapshot, GameId, GameSnapshot, PlayerId, Vec2};
use gridfire_tick::{TickConfig, TickScheduler};
use tokio::sync::{mpsc, oneshot};

use crate::{GameError, GamePhase, GameSession};

/// Commands sent to a session actor through its channel.
///
/// The `oneshot::Sender` in each variant is a reply channel — the caller
/// sends a command and waits for the response on that channel.
pub(crate) enum SessionCommand {
    /// Arm the tick loop: `Created → Running`.
    Start { reply: oneshot::Sender<()> },

    /// Apply one client input frame and return the resulting snapshot.
    Input {
        player: PlayerId,
        delta: Vec2,
        aim: Vec2,
        shooting: bool,
        reply: oneshot::Sender<GameSnapshot>,
    },

    /// Request the current full snapshot without applying input.
    Snapshot { reply: oneshot::Sender<GameSnapshot> },

    /// Request the static arena grid.
    Arena {
        reply: oneshot::Sender<ArenaSnapshot>,
    },

    /// Request session metadata.
    Info { reply: oneshot::Sender<SessionInfo> },

    /// Shut down the session.
    Shutdown,
}

/// A snapshot of session metadata (not the game state itself).
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub game_id: GameId,
    pub phase: GamePhase,
    pub player_count: usize,
    pub projectile_count: usize,
    /// Ticks executed so far.
    pub tick: u64,
}

/// Handle to a running session actor. Used to send commands to it.
///
/// Cheap to clone — it's just an `mpsc::Sender` wrapper. The
/// `SessionManager` holds one of these per live game.
#[derive(Clone)]
pub struct SessionHandle {
    game_id: GameId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Returns the game's unique ID.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Whether the actor has exited (its command queue is closed).
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Starts the game loop.
    pub async fn start(&self) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Start { reply: reply_tx })
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))
    }

    /// Applies one input frame (shoot resolves before move) and returns
    /// the snapshot the client should render next.
    pub async fn apply_input(
        &self,
        player: PlayerId,
        delta: Vec2,
        aim: Vec2,
        shooting: bool,
    ) -> Result<GameSnapshot, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Input {
                player,
                delta,
                aim,
                shooting,
                reply: reply_tx,
            })
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))
    }

    /// Requests the current snapshot.
    pub async fn snapshot(&self) -> Result<GameSnapshot, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))
    }

    /// Requests the static arena grid.
    pub async fn arena(&self) -> Result<ArenaSnapshot, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Arena { reply: reply_tx })
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))
    }

    /// Requests session metadata.
    pub async fn info(&self) -> Result<SessionInfo, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))
    }

    /// Tells the session to shut down.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.sender
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| GameError::Unavailable(self.game_id))
    }
}

/// The internal session actor. Runs inside a Tokio task.
struct SessionActor {
    session: GameSession,
    scheduler: TickScheduler,
    /// Delta-time handed to inputs that arrive between ticks: the last
    /// measured tick dt, seeded with the nominal period before the first
    /// tick fires.
    last_dt: f32,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    async fn run(mut self) {
        let game_id = self.session.id();
        tracing::info!(%game_id, "session actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if !self.handle_command(cmd) {
                                break;
                            }
                        }
                        // All handles dropped; nobody can reach us anymore.
                        None => break,
                    }
                }
                tick = self.scheduler.wait_for_tick() => {
                    self.last_dt = tick.dt.as_secs_f32();
                    self.session.advance(self.last_dt);
                    self.scheduler.record_tick_end();
                    if self.session.phase().is_ended() {
                        break;
                    }
                }
            }
        }

        // Answer anything already queued before exiting, so callers racing
        // the game's end still get a coherent final state.
        self.receiver.close();
        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }
        tracing::info!(%game_id, phase = %self.session.phase(), "session actor stopped");
    }

    /// Handles one command. Returns `false` on shutdown.
    fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Start { reply } => {
                self.session.start();
                self.scheduler.resume();
                let _ = reply.send(());
            }
            SessionCommand::Input {
                player,
                delta,
                aim,
                shooting,
                reply,
            } => {
                // Shoot resolves first so the projectile originates at the
                // pre-move position the client aimed from.
                if shooting {
                    self.session.process_shoot(player, aim);
                }
                self.session.process_move(player, delta, aim, self.last_dt);
                let _ = reply.send(self.session.snapshot());
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            SessionCommand::Arena { reply } => {
                let _ = reply.send(self.session.arena_snapshot());
            }
            SessionCommand::Info { reply } => {
                let _ = reply.send(SessionInfo {
                    game_id: self.session.id(),
                    phase: self.session.phase(),
                    player_count: self.session.player_count(),
                    projectile_count: self.session.projectile_count(),
                    tick: self.scheduler.tick_count(),
                });
            }
            SessionCommand::Shutdown => {
                tracing::info!(game_id = %self.session.id(), "session shutting down");
                return false;
            }
        }
        true
    }
}

/// Spawns a session actor task and returns a handle to communicate with it.
///
/// The scheduler starts paused; [`SessionHandle::start`] arms it.
/// `channel_size` controls backpressure — if the queue fills up, senders
/// wait (bounded channel).
pub fn spawn_session(
    session: GameSession,
    tick_config: TickConfig,
    channel_size: usize,
) -> SessionHandle {
    let game_id = session.id();
    let (tx, rx) = mpsc::channel(channel_size);

    let mut scheduler = TickScheduler::new(tick_config);
    scheduler.pause();
    let last_dt = scheduler.tick_duration().as_secs_f32();

    let actor = SessionActor {
        session,
        scheduler,
        last_dt,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        game_id,
        sender: tx,
    }
}
