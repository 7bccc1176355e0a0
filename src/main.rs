//! Ledge Runner
//!
//! Headless demo: runs one live session with scripted input, logs the
//! scoreboard as it goes, then replays the recorded input and checks the
//! state hash.
//!
//! Usage: `ledge-runner [config.json] [ticks]`

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ledge_runner::{
    VERSION,
    core::hash::hash_hex,
    game::{
        config::{SessionConfig, SimConfig},
        input::InputFrame,
        tick::replay_session,
    },
    runtime::session::spawn_session,
};

/// Ticks to run when no count is given.
const DEFAULT_DEMO_TICKS: u64 = 100;

/// Log the scoreboard every this many ticks.
const REPORT_EVERY: u64 = 25;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Ledge Runner v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let session = match args.next() {
        Some(path) => SessionConfig::from_json_file(&path)
            .with_context(|| format!("loading session config from {}", path))?,
        None => SessionConfig::default(),
    };
    let ticks = match args.next() {
        Some(count) => count.parse::<u64>().context("tick count must be a number")?,
        None => DEFAULT_DEMO_TICKS,
    };

    run_demo(session, ticks).await
}

/// Scripted input: run right, hop every so often, use whatever is held.
fn scripted_input(tick: u64) -> InputFrame {
    match tick % 60 {
        0..=19 => InputFrame::right(),
        20 => InputFrame::right().jumping(),
        21..=39 => InputFrame::left(),
        40 => InputFrame::new().jumping().using_power_up(),
        _ => InputFrame::new(),
    }
}

async fn run_demo(session: SessionConfig, ticks: u64) -> anyhow::Result<()> {
    info!("=== Starting Demo Session ===");
    info!("Difficulty: {:?}, seed: {}, bots: {}", session.bot_difficulty, session.rng_seed, session.bot_count);

    let sim = SimConfig::default();
    let handle = spawn_session(session, sim);
    let mut snapshots = handle.subscribe();

    handle.set_input(scripted_input(1))?;

    loop {
        let snapshot = match snapshots.recv().await {
            Ok(snapshot) => snapshot,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Skipped {} snapshots", skipped);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if snapshot.tick % REPORT_EVERY == 0 {
            let rows: Vec<String> = snapshot
                .scoreboard
                .iter()
                .map(|(label, score)| format!("{}: {}", label, score))
                .collect();
            info!("Tick {} ({} ms period): {}", snapshot.tick, snapshot.period_ms, rows.join(", "));
        }

        if snapshot.tick >= ticks {
            break;
        }
        handle.set_input(scripted_input(snapshot.tick + 1))?;
    }

    handle.stop().await?;
    let summary = handle.join().await?;

    info!("=== Session Results ===");
    info!("Ticks: {}, points: {}", summary.ticks, summary.points);
    info!("Final State Hash: {}", hash_hex(&summary.hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, events) = replay_session(summary.session.clone(), summary.sim, &summary.recording);
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {} ({} events)", hash_hex(&replay_hash), events.len());

    if replay_hash == summary.hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
        Ok(())
    } else {
        anyhow::bail!("determinism failure: replay hash differs")
    }
}
