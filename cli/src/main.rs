use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use league_api::APIClient;
use league_catalog::preset_index;
use league_config::LeagueConfig;
use league_logging::Log;
use league_replay::{write_ndjson, CsvFileCatalog, FileReplaySource, ReplayError, ReplaySource, Scorer};

#[derive(Parser, Debug)]
#[command(name = "replaytool", version, about = "Score league replays against the map catalog")]
struct Cli {
    /// TOML file with endpoint overrides
    #[arg(long, global = true, env = "LEAGUE_CONFIG")]
    config: Option<PathBuf>,

    /// Use a local catalog CSV export instead of downloading it
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a replay and print its match record
    Parse {
        /// Replay UUID, game link (`...?replay=<key>`), or path to a replay file
        replay: String,
    },
    /// Print map, player count and start time without scoring
    Summary {
        /// Replay UUID, game link, or path to a replay file
        replay: String,
    },
    /// Print how long each player and team held the flag
    Hold {
        /// Replay UUID, game link, or path to a replay file
        replay: String,
    },
    /// Print the fastest finished run on a map out of several replays
    Best {
        /// Catalog map ID; runs under its pseudo IDs count too
        map_id: String,

        #[arg(required = true)]
        replays: Vec<String>,
    },
    /// Write a map name to preset index from the catalog
    Presets {
        #[arg(long, default_value = "presets.json")]
        out: PathBuf,
    },
    /// Merge two replays into one stream
    Combine {
        first: String,
        second: String,

        /// Added to every player id of the second replay
        #[arg(long, default_value_t = 4)]
        offset: i64,

        #[arg(long, default_value = "combined_replay.ndjson")]
        out: PathBuf,
    },
}

/// Reads replay files when the reference is a path that exists, and goes to
/// the network otherwise.
#[derive(Debug)]
struct LocalOrRemote {
    remote: APIClient,
}

impl ReplaySource for LocalOrRemote {
    fn fetch_replay(&self, reference: &str) -> Result<String, ReplayError> {
        if Path::new(reference).is_file() {
            tracing::debug!(target: Log::Cli, reference, "Reading replay from disk");
            return FileReplaySource.fetch_replay(reference);
        }

        self.remote.fetch_replay(reference)
    }
}

fn build_scorer(client: &APIClient, catalog: Option<&Path>) -> Scorer {
    let builder = Scorer::builder().with_replays(LocalOrRemote { remote: client.clone() });

    let builder = match catalog {
        Some(path) => builder.with_catalog(CsvFileCatalog::new(path)),
        None => builder.with_catalog(client.clone()),
    };

    builder.build()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;

    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("unable to open {} for write", path.display()))?;

    Ok(BufWriter::new(file))
}

fn run(cli: Cli) -> Result<()> {
    let config = LeagueConfig::load(cli.config.as_deref()).context("unable to load config")?;
    let client = APIClient::new(config);
    let scorer = build_scorer(&client, cli.catalog.as_deref());

    match cli.command {
        Commands::Parse { replay } => {
            let record = scorer.score(&replay).with_context(|| format!("unable to score replay {replay}"))?;
            print_json(&record)?;
        },

        Commands::Summary { replay } => {
            let summary = scorer.summarize(&replay).with_context(|| format!("unable to summarize replay {replay}"))?;
            print_json(&summary)?;
        },

        Commands::Hold { replay } => {
            let holds = scorer.hold_times(&replay).with_context(|| format!("unable to read holds from {replay}"))?;
            print_json(&holds)?;
        },

        Commands::Best { map_id, replays } => {
            let best = scorer
                .best_record(&map_id, &replays)
                .with_context(|| format!("unable to find best record for map {map_id}"))?;

            if best.is_none() {
                tracing::info!(target: Log::Cli, map_id, "No finished runs on map");
            }

            print_json(&best)?;
        },

        Commands::Presets { out } => {
            let catalog = scorer.catalog().context("unable to load map catalog")?;
            let index = preset_index(&catalog);

            let mut writer = create(&out)?;
            serde_json::to_writer_pretty(&mut writer, &index)?;
            writer.flush()?;

            tracing::info!(target: Log::Cli, count = index.len(), out = %out.display(), "Saved map presets");
        },

        Commands::Combine {
            first,
            second,
            offset,
            out,
        } => {
            let combined = scorer
                .combine(&first, &second, offset)
                .with_context(|| format!("unable to combine {first} and {second}"))?;

            write_ndjson(&combined, create(&out)?)?;
            tracing::info!(target: Log::Cli, events = combined.len(), out = %out.display(), "Saved combined replay");
        },
    }

    Ok(())
}

fn main() -> Result<()> {
    league_logging::init("info");

    run(Cli::parse())
}
