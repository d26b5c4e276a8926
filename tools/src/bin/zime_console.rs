//! Interactive console frontend.
//!
//! Reads key tokens from stdin, one line at a time, and prints the preedit,
//! status line, candidates and committed text after each line.
//!
//! Usage:
//!   zime_console --db /tmp/zime.db --schema luomazi
//!   echo "ni'hao 1 space" | zime_console --db /tmp/zime.db

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use zime_core::{Config, RecordingFrontend, RedbStore, Runtime, SchemaChooser};
use zime_tools::{console, logging};

#[derive(Parser, Debug)]
#[command(name = "zime_console")]
#[command(about = "Drive the zime engine from the terminal")]
struct Args {
    /// Database to open (overrides the config file and default location)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Config file (defaults to ./zime.toml, then ~/.zime/zime.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Schema to start with instead of the most recently used one
    #[arg(short, long)]
    schema: Option<String>,

    /// Debug logging for the zime crates
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::load_default()?,
    };
    logging::init(args.verbose, config.log_filter.as_deref());

    let runtime = match &args.db {
        Some(path) => Runtime::new(Arc::new(
            RedbStore::create(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Runtime::from_config(&config)?,
    };
    let schema = args.schema.as_deref().or(config.default_schema.as_deref());

    let mut fe = RecordingFrontend::with_page_size(config.page_size);
    let mut chooser = SchemaChooser::new(Arc::new(runtime), &mut fe, schema)?;
    match chooser.current_schema() {
        Some(name) => println!("schema: {name}"),
        None => println!("no schema installed; import one with zime_import"),
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let keys = match console::parse_line(&line) {
            Ok(keys) => keys,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        for (keycode, mask) in keys {
            let handled = chooser.process_key_event(&mut fe, keycode, mask);
            if !handled {
                println!("(passed through: {keycode:#x})");
            }
        }
        let committed = fe.take_commit();
        if !committed.is_empty() {
            println!("commit: {committed}");
        }
        print!("{}", console::render(&fe));
        stdout.flush()?;
    }
    Ok(())
}
