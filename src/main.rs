use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replay_insights::calculate::{
    compute_custom_matchup, compute_lead_pair_stats, compute_matchup_stats, compute_team_report,
    compute_usage_stats, observed_roster,
};
use replay_insights::config::AppConfig;
use replay_insights::models::{Replay, TeamId};
use replay_insights::normalize::{FormTable, NameNormalizer, ShowdownNormalizer};
use replay_insights::paste::{parse_paste, roster_keys};
use replay_insights::parse_slots;
use replay_insights::storage::{
    import_team_replays, list_teams, load_team_replays, JsonlReader, StorageConfig,
};

#[derive(Parser)]
#[command(name = "replay-insights")]
#[command(about = "Usage, lead and matchup statistics from a team's replays")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List teams with stored replays
    Teams,

    /// Import replays for a team from a JSON array or JSONL file
    Import {
        #[arg(long)]
        team: String,

        #[arg(long)]
        file: PathBuf,
    },

    /// Per-Pokémon usage, lead and tera win rates
    Usage {
        #[arg(long)]
        team: String,

        /// Pokepaste file with the team's sets (defaults to the roster seen in replays)
        #[arg(long)]
        paste: Option<PathBuf>,
    },

    /// Most common and best performing leads
    Leads {
        #[arg(long)]
        team: String,
    },

    /// Best/worst matchups and opponent attendance
    Matchups {
        #[arg(long)]
        team: String,
    },

    /// Project a win rate against a hypothetical team
    Custom {
        #[arg(long)]
        team: String,

        /// Opposing Pokémon, one per slot ("-" or blank for an empty slot); commas allowed
        #[arg(long = "pick", num_args = 1..)]
        picks: Vec<String>,
    },

    /// Every view at once
    Report {
        #[arg(long)]
        team: String,

        #[arg(long)]
        paste: Option<PathBuf>,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let (json_layer, text_layer) = if json {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_normalizer(config: &AppConfig) -> Result<ShowdownNormalizer> {
    let table = match &config.forms_file {
        Some(path) => FormTable::from_file(path)
            .with_context(|| format!("loading form table {:?}", path))?,
        None => FormTable::builtin().context("loading built-in form table")?,
    };
    let normalizer = ShowdownNormalizer::new(table);
    tracing::debug!("Using form table v{}", normalizer.table_version());
    Ok(normalizer)
}

/// Read replays from a JSON array, falling back to one replay per line.
fn read_replay_file(path: &Path) -> Result<Vec<Replay>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;

    if contents.trim_start().starts_with('[') {
        return serde_json::from_str(&contents)
            .with_context(|| format!("parsing replay array in {:?}", path));
    }

    Ok(JsonlReader::<Replay>::new(path.to_path_buf()).read_all()?)
}

fn team_roster(
    replays: &[Replay],
    paste: Option<&Path>,
    normalizer: &dyn NameNormalizer,
) -> Result<Vec<String>> {
    match paste {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            let roster = roster_keys(&parse_paste(&text), normalizer);
            if roster.is_empty() {
                tracing::warn!("No sets found in paste {:?}", path);
            }
            Ok(roster)
        }
        None => Ok(observed_roster(replays, normalizer)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {:?}", cli.config))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let log_level = cli.log_level.unwrap_or_else(|| config.log_level.clone());

    init_tracing(&log_level, cli.json_logs);
    tracing::info!("Starting replay-insights v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    let settings = &config.analytics;

    match cli.command {
        Commands::Teams => {
            let teams = list_teams(&storage)?;
            tracing::info!("Found {} teams", teams.len());
            print_json(&teams)?;
        }
        Commands::Import { team, file } => {
            let team = TeamId::from(team);
            let replays = read_replay_file(&file)?;
            let written = import_team_replays(&storage, &team, replays)?;
            tracing::info!("Imported {} new replays into {}", written, team);
        }
        Commands::Usage { team, paste } => {
            let normalizer = load_normalizer(&config)?;
            let replays = load_team_replays(&storage, &TeamId::from(team))?;
            let roster = team_roster(&replays, paste.as_deref(), &normalizer)?;
            print_json(&compute_usage_stats(&replays, &roster, &normalizer, settings))?;
        }
        Commands::Leads { team } => {
            let normalizer = load_normalizer(&config)?;
            let replays = load_team_replays(&storage, &TeamId::from(team))?;
            print_json(&compute_lead_pair_stats(&replays, &normalizer, settings))?;
        }
        Commands::Matchups { team } => {
            let normalizer = load_normalizer(&config)?;
            let replays = load_team_replays(&storage, &TeamId::from(team))?;
            print_json(&compute_matchup_stats(&replays, &normalizer, settings))?;
        }
        Commands::Custom { team, picks } => {
            let normalizer = load_normalizer(&config)?;
            let replays = load_team_replays(&storage, &TeamId::from(team))?;
            let matchups = compute_matchup_stats(&replays, &normalizer, settings);

            let selected: Vec<Option<String>> = parse_slots(&picks)
                .into_iter()
                .map(|slot| slot.map(|raw| normalizer.normalize(&raw)))
                .collect();
            print_json(&compute_custom_matchup(
                &matchups.by_key,
                &selected,
                settings,
            ))?;
        }
        Commands::Report { team, paste } => {
            let normalizer = load_normalizer(&config)?;
            let team = TeamId::from(team);
            let replays = load_team_replays(&storage, &team)?;
            let roster = team_roster(&replays, paste.as_deref(), &normalizer)?;
            print_json(&compute_team_report(
                team,
                &replays,
                &roster,
                &normalizer,
                settings,
            ))?;
        }
    }

    Ok(())
}
