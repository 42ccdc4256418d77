//! Headless entry point: runs unattended games with random-AI players.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use game_core::DifficultySetting;
use runtime::{
    AiReport, EventBus, Game, GameHost, LocalSession, LogPresenter, RandomAi, RuntimeConfig,
    SystemClock,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Settings for this binary only; host settings come from [`RuntimeConfig`].
#[derive(Debug)]
struct CliSettings {
    players: usize,
    games: u32,
    difficulty: DifficultySetting,
    log_dir: Option<PathBuf>,
}

impl CliSettings {
    fn from_env() -> Result<Self> {
        let players = env_or("SPELLCAST_AI_PLAYERS", 2)?;
        let games = env_or("SPELLCAST_GAMES", 1)?;
        let difficulty = match std::env::var("SPELLCAST_DIFFICULTY") {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| anyhow!("invalid SPELLCAST_DIFFICULTY {value:?}"))?,
            Err(_) => DifficultySetting::default(),
        };
        let log_dir = std::env::var_os("SPELLCAST_LOG_DIR").map(PathBuf::from);
        Ok(Self {
            players,
            games,
            difficulty,
            log_dir,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let settings = CliSettings::from_env()?;
    let _guard = setup_logging(settings.log_dir.as_deref())?;

    let config = RuntimeConfig::from_env().context("invalid runtime configuration")?;
    let game_config = config.load_game_config()?;
    tracing::info!(?config, ?settings, "starting");

    let bus = EventBus::with_capacity(config.event_capacity);
    let session = LocalSession::new(bus.clone());
    let ai = RandomAi::new(session.handle(), &bus, settings.players, config.seed)
        .with_difficulty(settings.difficulty);
    let game = Game::new(game_config, session, LogPresenter::new(), bus, config.seed);
    let host = GameHost::new(config.frame_interval, SystemClock::new()).spawn(game);

    let played: Option<AiReport> = tokio::select! {
        report = ai.run(settings.games) => report.ok(),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            tracing::info!("interrupted");
            None
        }
    };

    let (frames, game) = host.shutdown().await.context("game host failed")?;
    tracing::info!(frames, game = ?game, "host finished");

    match played {
        Some(report) => {
            tracing::info!(
                games = report.games,
                player_victories = report.player_victories,
                enemy_victories = report.enemy_victories,
                rounds = report.rounds,
                spells = report.spells_cast,
                "all games played"
            );
            Ok(())
        }
        None if frames > 0 => Ok(()),
        None => Err(anyhow!("no game was played")),
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow!("invalid {key} {value:?}")),
        Err(_) => Ok(default),
    }
}

/// Logs to stderr, and to a file as well when `log_dir` is set.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, "spellcast.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/spellcast.log", dir.display());
    }
    Ok(guard)
}
