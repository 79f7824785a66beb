mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use budgetly::{config, Database};

fn main() -> Result<()> {
    let cli::Cli {
        db,
        owner,
        log,
        command,
    } = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log))
        .with_writer(std::io::stderr)
        .init();

    let db_path = match db {
        Some(path) => path,
        None => config::default_db_path()?,
    };
    let owner = match owner {
        Some(owner) => owner,
        None => config::default_owner()?,
    };
    tracing::debug!(db = %db_path.display(), owner = %owner, "starting");

    let mut db = Database::open(&db_path)?;
    cli::run(command, &mut db, &owner)
}
