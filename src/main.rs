//! Brain Bench
//!
//! Runs a simulated session with a scripted player on the logical clock,
//! reports the results against the population averages and checks that a
//! replay of the recorded inputs reaches the same state hash.
//!
//! Usage: `brain-bench [variant ...]` (all ten when none are given).

use anyhow::{ensure, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use brain_bench::{
    VERSION,
    content::ContentBank,
    game::{TracingCues, Variant},
    session::{
        autoplay::{play_to_end, ScriptedPlayer, DEFAULT_STEP_LIMIT},
        replay_session, Session, SessionConfig,
    },
};

const CONTENT_VAR: &str = "BRAIN_BENCH_CONTENT";

fn main() -> Result<()> {
    init_tracing();

    info!("Brain Bench v{}", VERSION);

    let config = SessionConfig::from_env().context("reading session config")?;
    let content = load_content()?;
    let plan = parse_plan(std::env::args().skip(1))?;

    let mut session = Session::new(&plan, content.clone(), config.clone(), Box::new(TracingCues))?;
    info!("Session {} seed {}", session.id(), session.seed());
    info!("Plan: {:?}", session.plan());

    let mut player = ScriptedPlayer::new(session.seed().rotate_left(17), content.clone());
    let steps = play_to_end(&mut session, &mut player, DEFAULT_STEP_LIMIT)?;
    info!("Session ended at {} ms after {} steps", session.now(), steps);

    for (variant, record) in session.results().iter() {
        info!(
            "{:<12} percentage={:?} time={:?} span={:?}",
            variant.info().name,
            record.percentage_correct,
            record.average_response_time,
            record.max_span,
        );
    }
    for comparison in session.results().compare_to_averages() {
        let label = |standing: Option<brain_bench::session::Standing>| standing.map_or("-", |s| s.label());
        info!(
            "{:<12} percentage: {} / time: {} / span: {}",
            comparison.variant,
            label(comparison.percentage),
            label(comparison.time),
            label(comparison.span),
        );
    }

    let hash = session.compute_hash();
    info!("Final state hash: {}", hex::encode(hash));

    // Replay from the recorded inputs
    let replay_config = SessionConfig {
        seed: Some(session.seed()),
        ..config
    };
    let mut replayed = replay_session(&plan, content, replay_config, session.inputs())?;
    replayed.advance_to(session.now());
    let replay_hash = replayed.compute_hash();
    info!("Replay state hash: {}", hex::encode(replay_hash));
    ensure!(replay_hash == hash, "replay diverged from the recorded session");
    info!("Determinism verified");

    println!("{}", serde_json::to_string_pretty(session.results())?);
    Ok(())
}

fn init_tracing() {
    let default_level = if cfg!(feature = "debug-tracing") { "trace" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_content() -> Result<ContentBank> {
    match std::env::var(CONTENT_VAR) {
        Ok(path) => {
            info!("Loading content from {}", path);
            ContentBank::from_json_file(&path).with_context(|| format!("loading content bank {path}"))
        }
        Err(_) => Ok(ContentBank::builtin()),
    }
}

fn parse_plan(args: impl Iterator<Item = String>) -> Result<Vec<Variant>> {
    let plan = args
        .map(|arg| arg.parse::<Variant>())
        .collect::<Result<Vec<_>, _>>()?;
    if plan.is_empty() {
        Ok(Variant::ALL.to_vec())
    } else {
        Ok(plan)
    }
}
