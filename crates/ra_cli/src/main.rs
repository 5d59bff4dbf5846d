//! Season batch CLI.
//!
//! Drives the analytics engine against a directory of per-game JSON
//! bundles and a persisted season snapshot. `RA_LOG` controls log
//! filtering, `RA_PROFILE` selects the engine constant preset.

mod fs_source;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use fs_source::{FileMetadata, FsGameSource, FsTrackingFeed};
use ra_core::cluster::{cluster_routes, GoalRoute};
use ra_core::engine::GameProcessor;
use ra_core::models::GameId;
use ra_core::season::snapshot;
use ra_core::sources::{CatchHandCache, GameDataSource, TrackingClient};
use ra_core::{BatchRunner, EngineConfig};

#[derive(Parser)]
#[command(name = "ra")]
#[command(about = "Hockey event-stream analytics over local game bundles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a schedule of games into the season snapshot
    Run {
        /// Directory of <game_id>.json bundles
        #[arg(long)]
        data_dir: PathBuf,

        /// Season snapshot path (created when missing)
        #[arg(long)]
        snapshot: PathBuf,

        /// Comma-separated game ids
        #[arg(long, value_delimiter = ',')]
        games: Vec<GameId>,

        /// File with one game id per line (alternative to --games)
        #[arg(long)]
        schedule: Option<PathBuf>,

        /// Also fetch tracking clips for goal routes / entry types
        #[arg(long, default_value = "false")]
        tracking: bool,
    },

    /// Print one team's season line
    Team {
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long)]
        team_id: u32,
    },

    /// Print one goalie's season splits and recent form
    Goalie {
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(long)]
        goalie_id: u32,

        /// Recent-form window in games
        #[arg(long, default_value = "5")]
        recent: usize,
    },

    /// Cluster goal routes from tracking clips across a set of games
    Routes {
        #[arg(long)]
        data_dir: PathBuf,

        #[arg(long, value_delimiter = ',')]
        games: Vec<GameId>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RA_LOG", "info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { data_dir, snapshot, games, schedule, tracking } => {
            run_batch(&data_dir, &snapshot, games, schedule, tracking)
        }
        Commands::Team { snapshot, team_id } => print_team(&snapshot, team_id),
        Commands::Goalie { snapshot, goalie_id, recent } => {
            print_goalie(&snapshot, goalie_id, recent)
        }
        Commands::Routes { data_dir, games } => print_routes(&data_dir, games),
    }
}

fn read_schedule(games: Vec<GameId>, schedule: Option<PathBuf>) -> Result<Vec<GameId>> {
    let mut ids = games;
    if let Some(path) = schedule {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading schedule {:?}", path))?;
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            ids.push(line.parse().with_context(|| format!("bad game id: {}", line))?);
        }
    }
    if ids.is_empty() {
        bail!("no games given; use --games or --schedule");
    }
    Ok(ids)
}

fn run_batch(
    data_dir: &PathBuf,
    snapshot_path: &PathBuf,
    games: Vec<GameId>,
    schedule: Option<PathBuf>,
    tracking: bool,
) -> Result<()> {
    let ids = read_schedule(games, schedule)?;
    let config = EngineConfig::from_env_or_default();

    let metadata = CatchHandCache::new(
        Box::new(FileMetadata::load(data_dir)?),
        config.fetch.clone(),
    );
    let tracking_client = tracking
        .then(|| TrackingClient::new(Box::new(FsTrackingFeed::new(data_dir)), config.fetch.clone()));

    let mut runner = BatchRunner::new(
        Box::new(FsGameSource::new(data_dir)),
        metadata,
        tracking_client,
        config,
        snapshot_path.clone(),
    )?;

    println!("Processing {} games into {:?}", ids.len(), snapshot_path);
    let outcome = runner.run(&ids)?;
    let report = &outcome.report;
    println!(
        "Done: {} updated, {} already processed, {} failed",
        report.updated, report.skipped_already_processed, report.failed
    );
    if !report.failed_ids.is_empty() {
        println!("Failed game ids (retry later): {:?}", report.failed_ids);
    }
    if !outcome.routes.is_empty() {
        println!("Collected {} goal routes for clustering", outcome.routes.len());
    }
    Ok(())
}

fn print_team(snapshot_path: &PathBuf, team_id: u32) -> Result<()> {
    let season = snapshot::load(snapshot_path)?;
    let Some(team) = season.teams.get(&team_id) else {
        bail!("team {} not in snapshot", team_id);
    };
    println!(
        "{} | GP {} | {}-{}-{} | GF {} GA {}",
        team.abbrev,
        team.games,
        team.wins,
        team.losses,
        team.ot_losses,
        team.totals.goals_for,
        team.totals.goals_against
    );
    println!(
        "  xGF/G {:.2} | CF% {:.1} | HD for/against {}/{}",
        team.xg_for_per_game(),
        team.corsi_pct() * 100.0,
        team.totals.high_danger_for,
        team.totals.high_danger_against
    );
    println!(
        "  rush {} | cycle {} | rebound {} | forecheck takeaways {}",
        team.totals.rush_shots,
        team.totals.cycle_shots,
        team.totals.rebound_shots,
        team.totals.forecheck_takeaways
    );
    println!(
        "  giveaways D/N/O {}/{}/{} | takeaways D/N/O {}/{}/{}",
        team.totals.giveaways_defensive,
        team.totals.giveaways_neutral,
        team.totals.giveaways_offensive,
        team.totals.takeaways_defensive,
        team.totals.takeaways_neutral,
        team.totals.takeaways_offensive
    );
    Ok(())
}

fn print_goalie(snapshot_path: &PathBuf, goalie_id: u32, recent: usize) -> Result<()> {
    let season = snapshot::load(snapshot_path)?;
    let Some(goalie) = season.goalies.get(&goalie_id) else {
        bail!("goalie {} not in snapshot", goalie_id);
    };
    println!(
        "Goalie {} | GP {} | {}-{}-{} | SV% {:.3} | GAA {:.2} | GSAx {:+.2}",
        goalie.goalie,
        goalie.games,
        goalie.wins,
        goalie.losses,
        goalie.ot_losses,
        goalie.save_pct(),
        goalie.gaa(),
        goalie.gsax()
    );
    for (label, table) in [
        ("situation", &goalie.splits.by_situation),
        ("danger", &goalie.splits.by_danger),
        ("angle", &goalie.splits.by_angle),
        ("side", &goalie.splits.by_side),
    ] {
        let cells: Vec<String> = table
            .iter()
            .map(|(key, c)| format!("{} {}/{} ({:.3})", key, c.shots - c.goals, c.shots, c.save_pct()))
            .collect();
        println!("  by {}: {}", label, cells.join(" | "));
    }
    let form = goalie.recent_form(recent);
    println!(
        "  last {}: SV% {:.3} over {} shots, GSAx {:+.2}",
        form.games, form.save_pct, form.shots, form.gsax
    );
    Ok(())
}

fn print_routes(data_dir: &PathBuf, games: Vec<GameId>) -> Result<()> {
    if games.is_empty() {
        bail!("no games given; use --games");
    }
    let config = EngineConfig::from_env_or_default();
    let source = FsGameSource::new(data_dir);
    let metadata =
        CatchHandCache::new(Box::new(FileMetadata::load(data_dir)?), config.fetch.clone());
    let tracking =
        TrackingClient::new(Box::new(FsTrackingFeed::new(data_dir)), config.fetch.clone());

    let mut routes: Vec<GoalRoute> = Vec::new();
    for id in games {
        let log = source
            .fetch_game(id)
            .map_err(|e| anyhow::anyhow!("game {}: {}", id, e))?
            .into_log()?;
        let processor = GameProcessor::new(&config, &metadata, Some(&tracking));
        routes.extend(processor.derive(&log).routes);
    }

    let clusters = cluster_routes(&routes, &config.cluster);
    println!("{} routes, {} clusters", routes.len(), clusters.len());
    for cluster in &clusters {
        println!("  route group {}: {} goals", cluster.id, cluster.population());
    }
    Ok(())
}
