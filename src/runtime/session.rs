//! Live Session Runtime
//!
//! Drives the deterministic simulation in real time. One tokio task owns
//! the `SimulationState` and is its only writer: ticks, input, power-up
//! use and restarts are all serialized through it.
//!
//! ```text
//!   set_input ──watch──┐
//!                      ▼
//!   commands ──mpsc──▶ session task ──broadcast──▶ Snapshot subscribers
//!                      ▲
//!              interval(period)
//! ```

use std::time::Duration;
use serde::{Serialize, Deserialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::hash::{hash_hex, StateHash};
use crate::game::config::{SessionConfig, SimConfig};
use crate::game::input::{InputFrame, InputRecording};
use crate::game::snapshot::Snapshot;
use crate::game::state::SimulationState;
use crate::game::tick::tick;

/// Snapshot broadcast buffer. Slow subscribers skip ahead.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// Command queue depth.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Control messages for a running session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Use the player's held power-up on the next tick.
    UsePowerUp,
    /// Throw away the current state and start over.
    Restart(SessionConfig),
    /// End the session task.
    Stop,
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The session task is no longer running.
    #[error("Session has stopped")]
    Stopped,

    /// The session task panicked or was cancelled.
    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

/// Final report of a stopped session (current epoch only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Restart counter at stop time
    pub epoch: u64,
    /// Ticks run in this epoch
    pub ticks: u64,
    /// Tick counter
    pub score: u64,
    /// Global points
    pub points: u32,
    /// Final state hash
    pub hash: StateHash,
    /// Settings of this epoch
    pub session: SessionConfig,
    /// Tuning in force
    pub sim: SimConfig,
    /// Every input applied in this epoch
    pub recording: InputRecording,
}

/// Handle to a running session.
pub struct SessionHandle {
    input_tx: watch::Sender<InputFrame>,
    command_tx: mpsc::Sender<SessionCommand>,
    snapshot_tx: broadcast::Sender<Snapshot>,
    task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    /// Replace the current input state. The latest value wins.
    pub fn set_input(&self, frame: InputFrame) -> Result<(), SessionError> {
        self.input_tx.send(frame).map_err(|_| SessionError::Stopped)
    }

    /// Subscribe to per-tick snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Send a control command.
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SessionError::Stopped)
    }

    /// Use the held power-up on the next tick. No-op if nothing is held.
    pub async fn use_power_up(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::UsePowerUp).await
    }

    /// Restart with new settings.
    pub async fn restart(&self, config: SessionConfig) -> Result<(), SessionError> {
        self.send(SessionCommand::Restart(config)).await
    }

    /// Ask the session task to stop.
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Stop).await
    }

    /// Wait for the session task to finish.
    pub async fn join(self) -> Result<SessionSummary, SessionError> {
        self.task
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))
    }
}

/// Start a session task on the current tokio runtime.
pub fn spawn_session(session: SessionConfig, sim: SimConfig) -> SessionHandle {
    let (snapshot_tx, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
    let actor = SessionActor::new(session, sim, snapshot_tx.clone());
    start_actor(actor, snapshot_tx)
}

fn start_actor(actor: SessionActor, snapshot_tx: broadcast::Sender<Snapshot>) -> SessionHandle {
    let (input_tx, input_rx) = watch::channel(InputFrame::new());
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let task = tokio::spawn(actor.run(input_rx, command_rx));

    SessionHandle {
        input_tx,
        command_tx,
        snapshot_tx,
        task,
    }
}

/// Build a tick timer whose first tick is one period from now.
fn tick_interval(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Owner of the simulation state.
struct SessionActor {
    state: SimulationState,
    sim: SimConfig,
    epoch: u64,
    recording: InputRecording,
    use_requested: bool,
    snapshot_tx: broadcast::Sender<Snapshot>,
}

impl SessionActor {
    fn new(session: SessionConfig, sim: SimConfig, snapshot_tx: broadcast::Sender<Snapshot>) -> Self {
        Self {
            state: SimulationState::new(session, sim),
            sim,
            epoch: 0,
            recording: InputRecording::new(),
            use_requested: false,
            snapshot_tx,
        }
    }

    async fn run(
        mut self,
        input_rx: watch::Receiver<InputFrame>,
        mut command_rx: mpsc::Receiver<SessionCommand>,
    ) -> SessionSummary {
        info!(
            difficulty = ?self.state.session.bot_difficulty,
            bots = self.state.bots.len(),
            seed = self.state.rng_seed,
            "session started"
        );

        let mut timer = tick_interval(self.state.scheduler.period());

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let frame = *input_rx.borrow();
                    if let Some(period_ms) = self.run_tick(frame) {
                        timer = tick_interval(Duration::from_millis(period_ms));
                    }
                }
                command = command_rx.recv() => {
                    match command {
                        Some(SessionCommand::UsePowerUp) => {
                            debug!(tick = self.state.tick, "use power-up requested");
                            self.use_requested = true;
                        }
                        Some(SessionCommand::Restart(config)) => {
                            self.restart(config);
                            timer = tick_interval(self.state.scheduler.period());
                        }
                        Some(SessionCommand::Stop) | None => break,
                    }
                }
            }
        }

        let summary = self.summary();
        info!(
            epoch = summary.epoch,
            ticks = summary.ticks,
            points = summary.points,
            hash = %hash_hex(&summary.hash),
            "session stopped"
        );
        summary
    }

    /// Run one tick and publish its snapshot. Returns the new period if the
    /// timer must be restarted.
    fn run_tick(&mut self, mut frame: InputFrame) -> Option<u64> {
        if std::mem::take(&mut self.use_requested) {
            frame.set_use_power_up(true);
        }

        let result = tick(&mut self.state, &frame);
        self.recording.record(self.state.tick, frame);

        // No subscribers is fine
        let _ = self.snapshot_tx.send(Snapshot::capture(&self.state, self.epoch));

        result.period_changed
    }

    /// Replace the whole state. Pending effect records live on the old
    /// entities and are dropped with them.
    fn restart(&mut self, config: SessionConfig) {
        self.epoch += 1;
        self.state = SimulationState::new(config, self.sim);
        self.recording = InputRecording::new();
        self.use_requested = false;

        info!(
            epoch = self.epoch,
            difficulty = ?self.state.session.bot_difficulty,
            "session restarted"
        );
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            epoch: self.epoch,
            ticks: self.state.tick,
            score: self.state.score,
            points: self.state.points,
            hash: self.state.compute_hash(),
            session: self.state.session.clone(),
            sim: self.sim,
            recording: self.recording.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;
    use crate::core::fixed::PLAYER_BASE_SPEED;
    use crate::core::vec2::FixedVec2;
    use crate::game::config::BotDifficulty;
    use crate::game::power_up::apply_effect;
    use crate::game::snapshot::INVINCIBLE_OPACITY;
    use crate::game::state::{PowerUp, PowerUpKind};
    use crate::game::tick::replay_session;

    async fn next_snapshot(rx: &mut broadcast::Receiver<Snapshot>) -> Snapshot {
        loop {
            match rx.recv().await {
                Ok(snapshot) => return snapshot,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("session closed"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_produce_snapshots() {
        let handle = spawn_session(SessionConfig::default(), SimConfig::default());
        let mut rx = handle.subscribe();

        for expected in 1..=3 {
            let snapshot = next_snapshot(&mut rx).await;
            assert_eq!(snapshot.tick, expected);
            assert_eq!(snapshot.clock_ms, expected * 100);
            assert_eq!(snapshot.epoch, 0);
        }

        handle.stop().await.unwrap();
        let summary = handle.join().await.unwrap();
        assert!(summary.ticks >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_moves_player() {
        let handle = spawn_session(SessionConfig::default(), SimConfig::default());
        let mut rx = handle.subscribe();

        handle.set_input(InputFrame::right()).unwrap();
        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.player.x, 55.0);

        handle.stop().await.unwrap();
        handle.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_state_and_bumps_epoch() {
        let handle = spawn_session(SessionConfig::default(), SimConfig::default());
        let mut rx = handle.subscribe();

        handle.set_input(InputFrame::right()).unwrap();
        for _ in 0..5 {
            next_snapshot(&mut rx).await;
        }

        let config = SessionConfig {
            bot_difficulty: BotDifficulty::Hard,
            player_color: "red".to_string(),
            ..SessionConfig::default()
        };
        handle.set_input(InputFrame::new()).unwrap();
        handle.restart(config).await.unwrap();

        let snapshot = loop {
            let snapshot = next_snapshot(&mut rx).await;
            if snapshot.epoch == 1 {
                break snapshot;
            }
        };
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.points, 0);
        assert_eq!(snapshot.player.x, 50.0);
        assert_eq!(snapshot.player_color, "red");

        handle.stop().await.unwrap();
        let summary = handle.join().await.unwrap();
        assert_eq!(summary.epoch, 1);
        assert_eq!(summary.session.bot_difficulty, BotDifficulty::Hard);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_discards_pending_effects() {
        let (snapshot_tx, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let mut actor = SessionActor::new(SessionConfig::default(), SimConfig::default(), snapshot_tx.clone());

        // Boost already running, invincibility waiting in the slot
        let boost = PowerUp::new(98, PowerUpKind::SpeedBoost, FixedVec2::ZERO);
        apply_effect(&mut actor.state.player, &boost, 0, &actor.sim.power_ups);
        actor.state.player.held = Some(PowerUp::new(99, PowerUpKind::Invincibility, FixedVec2::ZERO));

        let handle = start_actor(actor, snapshot_tx);
        let mut rx = handle.subscribe();

        handle.set_input(InputFrame::right()).unwrap();
        handle.use_power_up().await.unwrap();

        let first = next_snapshot(&mut rx).await;
        assert_eq!(first.epoch, 0);
        assert_eq!(first.player.x, 57.5);
        assert_eq!(first.player.opacity, INVINCIBLE_OPACITY);
        assert_eq!(first.player.held, None);

        handle.restart(SessionConfig::default()).await.unwrap();

        // Run well past both 5000 ms deadlines
        let mut fresh_ticks = 0;
        while fresh_ticks < 60 {
            let snapshot = next_snapshot(&mut rx).await;
            if snapshot.epoch == 0 {
                continue;
            }
            fresh_ticks += 1;
            assert_eq!(snapshot.epoch, 1);
            assert_eq!(snapshot.tick, fresh_ticks);
            assert_eq!(snapshot.player.x, 50.0 + 5.0 * fresh_ticks as f32);
            assert_eq!(snapshot.player.opacity, 1.0);
        }
        assert!(fresh_ticks * 100 > 5000);

        handle.stop().await.unwrap();
        let summary = handle.join().await.unwrap();
        assert_eq!(summary.epoch, 1);

        // The live state matches a replay from scratch, record for record
        let (replayed, _) = replay_session(summary.session.clone(), summary.sim, &summary.recording);
        assert_eq!(replayed.compute_hash(), summary.hash);
        assert!(replayed.player.effects.is_empty());
        assert_eq!(replayed.player.speed, PLAYER_BASE_SPEED);
        assert!(!replayed.player.is_invincible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_replays_to_same_hash() {
        let handle = spawn_session(SessionConfig::default(), SimConfig::default());
        let mut rx = handle.subscribe();

        handle.set_input(InputFrame::right().jumping()).unwrap();
        for _ in 0..20 {
            next_snapshot(&mut rx).await;
        }
        handle.set_input(InputFrame::left()).unwrap();
        handle.use_power_up().await.unwrap();
        for _ in 0..20 {
            next_snapshot(&mut rx).await;
        }

        handle.stop().await.unwrap();
        let summary = handle.join().await.unwrap();

        let (replayed, _) = replay_session(summary.session.clone(), summary.sim, &summary.recording);
        assert_eq!(replayed.tick, summary.ticks);
        assert_eq!(replayed.compute_hash(), summary.hash);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_after_stop_fail() {
        let handle = spawn_session(SessionConfig::default(), SimConfig::default());

        handle.stop().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(handle.use_power_up().await, Err(SessionError::Stopped));
        assert_eq!(handle.set_input(InputFrame::right()), Err(SessionError::Stopped));
        assert!(handle.join().await.is_ok());
    }
}
