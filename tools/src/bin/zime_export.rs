//! Export the schemas of a zime database.
//!
//! Usage:
//!   zime_export --db ~/.zime/zime.db
//!   zime_export --db ~/.zime/zime.db --format toml --output schemas.toml

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use zime_core::RedbStore;
use zime_tools::logging;
use zime_tools::schema_file::SchemaFile;

#[derive(Parser, Debug)]
#[command(name = "zime_export")]
#[command(about = "Export schemas, config and phrases as JSON or TOML")]
struct Args {
    /// Path to the database
    #[arg(short, long)]
    db: PathBuf,

    /// Output format: json or toml
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose, None);

    let store = RedbStore::open_read_only(&args.db)
        .with_context(|| format!("failed to open {}", args.db.display()))?;
    let file = SchemaFile::export_from(&store)?;

    let output = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(&file)? + "\n",
        "toml" => file.to_toml_string()?,
        other => bail!("Unsupported format: {other}. Use 'json' or 'toml'"),
    };

    match args.output {
        Some(path) => std::fs::write(&path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{output}"),
    }
    Ok(())
}
