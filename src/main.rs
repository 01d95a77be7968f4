// Lodging Graph - CLI
//
//   lodging-graph import <kind> <file.csv> [--db path]
//   lodging-graph search [--regions a,b] [--localities c] [--tags d,e] [--db path]
//   lodging-graph stats [--db path]
//
// Without --db the store comes from LODGING_STORAGE / LODGING_DB_PATH.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lodging_graph::import::import_file;
use lodging_graph::{AppConfig, EntityKind, Lodging, ObjectStore, SearchCriteria, SqliteStore};

/// Lodging Graph - regions, localities, listings, tags and reviews.
#[derive(Parser, Debug)]
#[command(name = "lodging-graph")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import entities of one kind from a CSV file with a header row
    Import {
        /// Entity kind (region, locality, listing, reviewer, tag, review)
        kind: EntityKind,
        /// CSV file; child kinds need their parent column (e.g. region_id)
        file: PathBuf,
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Search listings by location and tags
    Search {
        #[arg(long, value_delimiter = ',')]
        regions: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        localities: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Entity count per collection
    Stats {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    config.init_logging();

    match cli.command {
        Commands::Import { kind, file, db } => {
            let lodging = open(&config, db.as_deref())?;
            run_import(&lodging, kind, &file)
        }
        Commands::Search {
            regions,
            localities,
            tags,
            db,
        } => {
            let lodging = open(&config, db.as_deref())?;
            run_search(&lodging, regions, localities, tags)
        }
        Commands::Stats { db } => {
            let lodging = open(&config, db.as_deref())?;
            for (collection, count) in lodging.stats()? {
                println!("{:<12} {}", collection, count);
            }
            Ok(())
        }
    }
}

fn open(config: &AppConfig, db: Option<&Path>) -> Result<Lodging> {
    let store: Arc<dyn ObjectStore> = match db {
        Some(path) => Arc::new(
            SqliteStore::open(path)
                .with_context(|| format!("Failed to open database {}", path.display()))?,
        ),
        None => config.open_store()?,
    };
    Ok(Lodging::new(store))
}

fn run_import(lodging: &Lodging, kind: EntityKind, file: &Path) -> Result<()> {
    println!("📂 Importing {} from {}", kind.plural(), file.display());

    let report = import_file(lodging, kind, file)?;

    println!("✓ Imported {} {}", report.imported, kind.plural());
    if report.rejected > 0 {
        println!("✗ Rejected {} rows", report.rejected);
    }
    Ok(())
}

fn run_search(
    lodging: &Lodging,
    regions: Vec<String>,
    localities: Vec<String>,
    tags: Vec<String>,
) -> Result<()> {
    let criteria = SearchCriteria::new()
        .with_regions(regions)
        .with_localities(localities)
        .with_tags(tags);

    let listings = lodging.search.search(Some(&criteria))?;
    println!("{}", serde_json::to_string_pretty(&listings)?);
    eprintln!("✓ {} listings", listings.len());
    Ok(())
}
