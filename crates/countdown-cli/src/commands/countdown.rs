//! Show, watch and status commands.

use std::sync::{Arc, Mutex};

use countdown_core::{
    Config, CountdownEngine, CountdownState, DurationGenerator, Event, LaunchInfo, LaunchTracker,
    PersistedState, RemainingDuration, SqliteStore, SystemClock, Ticker,
};

use crate::render::Renderer;

type Engine = CountdownEngine<SqliteStore, SystemClock>;

/// Open the store, count this launch, then build the engine.
fn open_engine(config: &Config) -> Result<(Engine, LaunchInfo), Box<dyn std::error::Error>> {
    let mut state = PersistedState::new(SqliteStore::open()?);
    let launch = LaunchTracker::new(config.launch.notice_every).record_launch(&mut state)?;
    let mut generator = DurationGenerator::from_entropy();
    let engine = CountdownEngine::open(state.into_inner(), SystemClock, &mut generator)?;
    Ok((engine, launch))
}

fn announce(info: LaunchInfo) {
    if info.needs_terms {
        eprintln!("You have not accepted the user agreement.");
        eprintln!("Read it with `countdown terms show`, accept it with `countdown terms accept`.");
    }
    if info.show_notice {
        eprintln!("Countdown: User Agreement broken");
    }
}

pub fn show(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let (engine, launch) = open_engine(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    } else {
        announce(launch);
        Renderer::new(config.display).print(engine.current_remaining())?;
    }
    Ok(())
}

/// Print the snapshot without counting a launch. An empty store stays empty.
pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let state = PersistedState::new(SqliteStore::open()?);
    if state.countdown_state()? == CountdownState::Uninitialized {
        let snapshot = serde_json::json!({
            "type": "StateSnapshot",
            "state": CountdownState::Uninitialized,
            "remaining": RemainingDuration::ZERO,
        });
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    // Running: resuming never draws, so the generator stays untouched.
    let mut generator = DurationGenerator::from_entropy();
    let engine = CountdownEngine::open(state.into_inner(), SystemClock, &mut generator)?;
    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}

pub fn watch() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let (engine, launch) = open_engine(&config)?;
    announce(launch);

    let renderer = Renderer::new(config.display.clone());
    renderer.redraw(engine.current_remaining())?;

    let engine = Arc::new(Mutex::new(engine));
    let ticker = Ticker::new(engine, config.ticker);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (tx, rx) = tokio::sync::watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(true);
            }
        });

        ticker
            .run(rx, |event| {
                let remaining = match event {
                    Event::Ticked { remaining, .. } | Event::Resynced { remaining, .. } => {
                        *remaining
                    }
                    Event::Expired { .. } => RemainingDuration::ZERO,
                    _ => return,
                };
                if let Err(e) = renderer.redraw(remaining) {
                    tracing::warn!(error = %e, "redraw failed");
                }
            })
            .await;
    });

    Ok(())
}
