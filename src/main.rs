//! event-atoms demo entry point.
//!
//! Wires a score event, a gated listener and a start-cleared leaderboard
//! list, then walks through a start / raise / reload / stop cycle.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use event_atoms::config::AtomsConfig;
use event_atoms::domain::{Action, AtomEvent, Condition, ConditionOperator, EventListener, ValueList};
use event_atoms::service::AtomHost;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = AtomsConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(reload_mode = %config.reload_mode, "starting event-atoms demo");

    let mut host = AtomHost::from_config(&config);

    // Events
    let scores = Arc::new(AtomEvent::<u32>::from_config(&config));
    let board_cleared = Arc::new(AtomEvent::<()>::new());
    board_cleared.observe(|_| {
        tracing::info!("leaderboard cleared");
        Ok(())
    });

    // Shared list state
    let leaderboard = Arc::new(
        ValueList::<u32>::new()
            .with_cleared_event(board_cleared)
            .with_reset_registry(Arc::clone(host.registry()))
            .start_cleared(true),
    );

    // Listener: record scores that are a new personal best or above 1000
    let sink = Arc::clone(&leaderboard);
    let best = Arc::clone(&leaderboard);
    let listener = Arc::new(
        EventListener::builder()
            .event(Arc::clone(&scores))
            .operator(ConditionOperator::Or)
            .condition(Condition::aware(|s: &u32| Ok(*s > 1000)))
            .condition(Condition::aware(move |s: &u32| {
                Ok(best.to_vec().iter().all(|b| s > b))
            }))
            .response(move |s| sink.add(*s))
            .action(Action::debug_log())
            .replay_on_register(true)
            .build(),
    );

    host.add_unit(Arc::clone(&leaderboard));
    host.add_unit(listener);

    host.start()?;
    for score in [120, 80, 450, 1200, 300] {
        scores.raise(score)?;
    }
    tracing::info!(entries = ?leaderboard.to_vec(), "leaderboard after first round");

    host.reload()?;
    tracing::info!(entries = leaderboard.len(), "leaderboard after reload");

    host.stop()?;
    Ok(())
}
