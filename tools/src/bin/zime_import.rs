//! Import schema definitions into a zime database.
//!
//! Usage:
//!   zime_import --db ~/.zime/zime.db --input data/demo_schema.toml
//!   zime_import --db /tmp/zime.db --input schemas.toml --dry-run

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use zime_core::RedbStore;
use zime_tools::logging;
use zime_tools::schema_file::SchemaFile;

#[derive(Parser, Debug)]
#[command(name = "zime_import")]
#[command(about = "Import schema definitions (TOML) into a zime database")]
struct Args {
    /// Path to the database (created if missing)
    #[arg(short, long)]
    db: PathBuf,

    /// Schema definition file
    #[arg(short, long)]
    input: PathBuf,

    /// Show what would be imported without writing
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose, None);

    let file = SchemaFile::load(&args.input)?;
    println!("Parsed {} schemas from {}", file.schemas.len(), args.input.display());

    if args.dry_run {
        for def in &file.schemas {
            println!(
                "  {} ({}): {} config values, {} phrases",
                def.name,
                def.display_name,
                def.config.len(),
                def.phrases.len()
            );
        }
        return Ok(());
    }

    let store = RedbStore::create(&args.db)
        .with_context(|| format!("failed to open {}", args.db.display()))?;
    let stats = file.import_into(&store)?;
    println!(
        "Imported {} schemas, {} config values, {} phrases into {}",
        stats.schemas,
        stats.config_values,
        stats.phrases,
        args.db.display()
    );
    Ok(())
}
