use anyhow::{Context, Result};
use chrono::Utc;
use drillcall::cli::{Args, ControlCommand, ExecutionMode, RestoreConfig, RunConfig};
use drillcall::env::storage::SESSION_SNAPSHOT_KEY;
use drillcall::{
    AppConfig, AudioPlayer, CommandAudioPlayer, ConfigDiscovery, ConsoleNotifier, FileCatalog,
    FileStore, PersistentStore, RestoreOutcome, SessionConfig, SessionEngine, SessionSnapshot,
    SessionState, SilentAudioPlayer, TechniqueCatalog, TimerDrive,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drillcall=info")),
        )
        .init();

    let args = Args::parse();
    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match mode {
        ExecutionMode::Run(config) => run_session(config).await,
        ExecutionMode::Restore(config) => restore_session(config).await,
        ExecutionMode::Status { config_override } => {
            show_status(config_override.as_deref()).await
        }
        ExecutionMode::Clear { config_override } => {
            clear_snapshot(config_override.as_deref()).await
        }
        ExecutionMode::ShowConfig { config_override } => {
            ConfigDiscovery::show_discovery_info(config_override.as_deref())
        }
    }
}

async fn run_session(run: RunConfig) -> Result<()> {
    let config = ConfigDiscovery::load(run.config_override.as_deref())?;
    let catalog = FileCatalog::load(&run.catalog).context("Failed to load technique catalog")?;
    let (duration, delay, volume, strategy) = run.resolve(&config.session);

    let (engine, finished) = build_engine(&config, run.silent)?;
    engine.set_strategy(strategy).await;

    let mut session = SessionConfig::from_catalog(&catalog, duration, delay).with_volume(volume);
    if let Some(list_id) = run.list_id {
        session = session.with_list_id(list_id);
    }

    let state = engine
        .start(session)
        .await
        .context("Failed to start session")?;
    println!(
        "🏁 Session started: {} minutes, a technique every {}s ({} strategy)",
        state.total_duration_seconds / 60,
        delay,
        strategy
    );

    control_loop(&engine, finished).await
}

async fn restore_session(restore: RestoreConfig) -> Result<()> {
    let config = ConfigDiscovery::load(restore.config_override.as_deref())?;
    let (engine, finished) = build_engine(&config, restore.silent)?;

    match engine.restore().await? {
        RestoreOutcome::Restored {
            state,
            countdown_resumed,
        } => {
            let catalog =
                FileCatalog::load(&restore.catalog).context("Failed to load technique catalog")?;
            engine.attach_techniques(catalog.selected_techniques()).await?;
            println!("♻️  Restored session with {}s remaining", state.remaining_time_seconds);
            if !countdown_resumed {
                println!("The session is paused; type 'resume' to continue");
            }
            control_loop(&engine, finished).await
        }
        RestoreOutcome::Discarded(reason) => {
            println!("Nothing restored: {}", reason);
            Ok(())
        }
        RestoreOutcome::Absent => {
            println!("No saved session found");
            Ok(())
        }
    }
}

async fn show_status(config_override: Option<&Path>) -> Result<()> {
    let config = ConfigDiscovery::load(config_override)?;
    let store = open_store(&config)?;

    let Some(raw) = store.load(SESSION_SNAPSHOT_KEY).await? else {
        println!("No saved session");
        return Ok(());
    };
    let snapshot: SessionSnapshot =
        serde_json::from_str(&raw).context("Saved session snapshot is unreadable")?;
    let now = Utc::now();

    println!("Saved session {:?}", snapshot.session_id);
    println!(
        "  remaining: {}s of {}s{}",
        snapshot.remaining_time_seconds,
        snapshot.total_duration_seconds,
        if snapshot.is_paused { " (paused)" } else { "" }
    );
    println!(
        "  techniques announced: {}",
        snapshot.session_stats.total_techniques
    );
    println!("  strategy: {}", snapshot.strategy);
    println!("  saved {}s ago", snapshot.age(now).num_seconds());
    match snapshot.check_restorable(now, config.engine.restore_window()) {
        Ok(()) => println!("  restorable: yes"),
        Err(reason) => println!("  restorable: no ({})", reason),
    }
    Ok(())
}

async fn clear_snapshot(config_override: Option<&Path>) -> Result<()> {
    let config = ConfigDiscovery::load(config_override)?;
    let store = open_store(&config)?;
    store.clear(SESSION_SNAPSHOT_KEY).await?;
    println!("Saved session cleared");
    Ok(())
}

fn open_store(config: &AppConfig) -> Result<FileStore> {
    let state_dir = config.storage.resolve_state_dir();
    FileStore::new(state_dir.clone())
        .with_context(|| format!("Failed to open state directory {}", state_dir.display()))
}

fn build_audio(config: &AppConfig, silent: bool) -> Arc<dyn AudioPlayer> {
    let player = match (&config.audio.player, silent) {
        (Some(player), false) => player,
        _ => return Arc::new(SilentAudioPlayer::new()),
    };

    match CommandAudioPlayer::new(
        player,
        config.audio.args.clone(),
        config.audio.audio_dir.clone(),
        Duration::from_secs(config.audio.timeout_seconds),
    ) {
        Ok(player) => Arc::new(player.with_volume_args(config.audio.volume_args.clone())),
        Err(e) => {
            warn!("{}; continuing without sound", e);
            Arc::new(SilentAudioPlayer::new())
        }
    }
}

/// Engine wired to the configured collaborators, plus a signal raised on completion
fn build_engine(config: &AppConfig, silent: bool) -> Result<(SessionEngine, Arc<Notify>)> {
    let mut settings = config.engine.clone();
    if settings.drive == TimerDrive::Host {
        info!("Host-driven timers are for embedding; the CLI drives its own");
        settings.drive = TimerDrive::Spawned;
    }

    let finished = Arc::new(Notify::new());
    let signal = finished.clone();
    let engine = SessionEngine::builder()
        .settings(settings)
        .strategy(config.session.strategy)
        .audio(build_audio(config, silent))
        .store(Arc::new(open_store(config)?))
        .notifier(Arc::new(ConsoleNotifier))
        .on_complete(move |_| signal.notify_one())
        .build();

    Ok((engine, finished))
}

/// Read control commands from stdin until the session ends
async fn control_loop(engine: &SessionEngine, finished: Arc<Notify>) -> Result<()> {
    println!("{}", ControlCommand::help_text());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut watchdog = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = finished.notified() => break,
            _ = watchdog.tick() => {
                // audio failures end the session without a completion signal
                if engine.state().await.is_idle() {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    engine.stop().await;
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match ControlCommand::parse_line(&line) {
                    Ok(ControlCommand::Pause) => {
                        if !engine.pause().await {
                            println!("Nothing to pause");
                        }
                    }
                    Ok(ControlCommand::Resume) => {
                        if !engine.resume().await {
                            println!("Nothing to resume");
                        }
                    }
                    Ok(ControlCommand::Stop) => {
                        if let Some(summary) = engine.stop().await {
                            println!(
                                "⏹️  Stopped after {}s, {} techniques",
                                summary.stats.session_duration_seconds,
                                summary.stats.total_techniques
                            );
                        }
                        break;
                    }
                    Ok(ControlCommand::Status) => print_status(&engine.state().await),
                    Ok(ControlCommand::Strategy(kind)) => {
                        let previous = engine.set_strategy(kind).await;
                        println!("Strategy: {} -> {}", previous, kind);
                    }
                    Ok(ControlCommand::Help) => println!("{}", ControlCommand::help_text()),
                    Err(e) => println!("{}", e),
                }
            }
        }
    }
    Ok(())
}

fn print_status(state: &SessionState) {
    if state.is_idle() {
        println!("No active session");
        return;
    }
    println!(
        "{:?}: {}s remaining ({:.0}% done), {} techniques",
        state.phase(),
        state.remaining_time_seconds,
        state.progress_pct(),
        state.session_stats.total_techniques
    );
    for (category, count) in &state.session_stats.by_category {
        println!("  {}: {}", category, count);
    }
    if let Some(technique) = &state.current_technique {
        println!("  last: {}", technique.name);
    }
}
