mod protocol;

use std::env;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::time::Duration;

use candy_engine::{Engine, EngineConfig, GridSize, SearchBudget, Strategy};
use color_eyre::eyre::{WrapErr, eyre};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::protocol::{TurnResponse, decode_state};

/// Reads an optional environment variable and parses it.
fn env_var<T>(key: &str) -> color_eyre::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .wrap_err_with(|| format!("invalid value for {key}: `{value}`")),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).wrap_err_with(|| format!("cannot read {key}")),
    }
}

fn required<T>(key: &str) -> color_eyre::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_var(key)?.ok_or_else(|| eyre!("Please set the {} environment variable", key))
}

fn load_config() -> color_eyre::Result<(EngineConfig, Option<u64>)> {
    let grid = GridSize::new(required("SNAKE_GRID_WIDTH")?, required("SNAKE_GRID_HEIGHT")?)?;
    let defaults = SearchBudget::default();
    let budget = SearchBudget {
        max_depth: env_var("SNAKE_MAX_DEPTH")?.or(defaults.max_depth),
        max_nodes: env_var("SNAKE_MAX_NODES")?.unwrap_or(defaults.max_nodes),
        time_limit: env_var("SNAKE_TIME_LIMIT_MS")?.map(Duration::from_millis),
    };
    let config = EngineConfig::new(grid, env_var("SNAKE_STRATEGY")?.unwrap_or(Strategy::Search))
        .with_budget(budget)
        .with_suicide_shortcut(env_var("SNAKE_SUICIDE")?.unwrap_or(true));
    Ok((config, env_var("SNAKE_SEED")?))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    init_tracing();

    let (config, seed) = load_config()?;
    info!(?config, "Hello Snakes!");
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut engine = Engine::new(config).with_rng(rng);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.wrap_err("cannot read turn from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match decode_state(&line)
            .and_then(|turn| Ok(engine.decide(&turn.you, &turn.opponents, &turn.candies)?))
        {
            Ok(direction) => TurnResponse::Move { r#move: direction },
            Err(err) => {
                warn!(%err, "rejecting turn");
                TurnResponse::Error {
                    error: format!("{err:#}"),
                }
            }
        };
        serde_json::to_writer(&mut stdout, &response)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }
    Ok(())
}
