use candy_engine::SearchBudget;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use candy_gym::runner::{AgentKind, GameConfig, run_duel};
use candy_gym::stats::{GameResult, HeadToHeadStats, TournamentStats};

#[derive(Parser)]
#[command(name = "snake-gym")]
#[command(about = "Benchmarking gym for pitting candy-engine strategies against each other")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a head-to-head duel between two agents
    Duel {
        /// First agent
        #[arg(short = '1', long, default_value = "search")]
        agent1: AgentKind,

        /// Second agent
        #[arg(short = '2', long, default_value = "random")]
        agent2: AgentKind,

        #[command(flatten)]
        options: MatchOptions,
    },

    /// Run a round-robin of duels between several agents
    Tournament {
        /// Agents to include in the tournament
        #[arg(short, long, value_delimiter = ',', default_value = "random,safe,greedy,astar,search")]
        agents: Vec<AgentKind>,

        #[command(flatten)]
        options: MatchOptions,
    },
}

#[derive(Args, Clone)]
struct MatchOptions {
    /// Number of games to run (per pairing in a tournament)
    #[arg(short, long, default_value = "100")]
    games: usize,

    /// Grid width
    #[arg(long, default_value = "11")]
    width: i32,

    /// Grid height
    #[arg(long, default_value = "11")]
    height: i32,

    /// Candies on the board at any time
    #[arg(long, default_value = "3")]
    candies: usize,

    /// Maximum turns per game
    #[arg(long, default_value = "500")]
    max_turns: u32,

    /// Search nodes per first move
    #[arg(long, default_value = "250000")]
    max_nodes: u64,

    /// Base seed, game `i` uses `seed + i`
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Run games in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

impl MatchOptions {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            num_candies: self.candies,
            max_turns: self.max_turns,
            budget: SearchBudget {
                max_nodes: self.max_nodes,
                ..SearchBudget::default()
            },
            ..GameConfig::default()
        }
    }

    fn progress(&self, len: usize) -> Option<ProgressBar> {
        if self.json {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Duel {
            agent1,
            agent2,
            options,
        } => run_duel_cmd(agent1, agent2, &options),
        Commands::Tournament { agents, options } => run_tournament_cmd(&agents, &options),
    }
}

/// Plays `pairings × games` duels, optionally on the rayon pool.
fn play_all(
    pairings: &[[AgentKind; 2]],
    options: &MatchOptions,
) -> color_eyre::Result<Vec<(usize, GameResult)>> {
    let config = options.game_config();
    config.grid().wrap_err("invalid grid size")?;
    let jobs: Vec<(usize, u64)> = (0..pairings.len())
        .flat_map(|pairing| (0..options.games).map(move |game| (pairing, game as u64)))
        .collect();
    let pb = options.progress(jobs.len());

    let play = |&(pairing, game): &(usize, u64)| {
        let result = run_duel(pairings[pairing], &config, options.seed.wrapping_add(game));
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
        result.map(|result| (pairing, result))
    };
    let results: Result<Vec<_>, _> = if options.parallel {
        jobs.par_iter().map(play).collect()
    } else {
        jobs.iter().map(play).collect()
    };

    if let Some(pb) = pb {
        pb.finish_with_message("Done!");
    }
    Ok(results?)
}

fn run_duel_cmd(agent1: AgentKind, agent2: AgentKind, options: &MatchOptions) -> color_eyre::Result<()> {
    if !options.json {
        println!("\n{}", "=== Snake Gym Duel ===".green().bold());
        println!("{} vs {}", agent1, agent2);
        println!(
            "Games: {} | Grid: {}x{} | Max turns: {}",
            options.games, options.width, options.height, options.max_turns
        );
        println!();
    }

    let results: Vec<GameResult> = play_all(&[[agent1, agent2]], options)?
        .into_iter()
        .map(|(_, result)| result)
        .collect();
    let h2h = HeadToHeadStats::from_results(&results, &agent1.to_string(), &agent2.to_string());

    if options.json {
        println!("{}", serde_json::to_string_pretty(&h2h)?);
    } else {
        h2h.print_summary();
    }
    Ok(())
}

fn run_tournament_cmd(agents: &[AgentKind], options: &MatchOptions) -> color_eyre::Result<()> {
    if agents.len() < 2 {
        return Err(eyre!("a tournament needs at least two agents"));
    }
    if !options.json {
        println!("\n{}", "=== Snake Gym Tournament ===".green().bold());
        println!(
            "Agents: {} | Games per pairing: {} | Max turns: {}",
            agents.len(),
            options.games,
            options.max_turns
        );
        println!("Parallel: {}", options.parallel);
        println!();
    }

    let mut seats = Vec::new();
    for first in 0..agents.len() {
        for second in (first + 1)..agents.len() {
            seats.push([first, second]);
        }
    }
    let pairings: Vec<[AgentKind; 2]> = seats
        .iter()
        .map(|&[first, second]| [agents[first], agents[second]])
        .collect();

    let results: Vec<([usize; 2], GameResult)> = play_all(&pairings, options)?
        .into_iter()
        .map(|(pairing, result)| (seats[pairing], result))
        .collect();
    let names: Vec<String> = agents.iter().map(ToString::to_string).collect();
    let stats = TournamentStats::from_results(&results, &names);

    if options.json {
        println!("{}", stats.to_json());
    } else {
        stats.print_summary();
    }
    Ok(())
}
