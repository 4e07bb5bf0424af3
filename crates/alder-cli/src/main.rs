//! AlderDB interactive B+Tree shell.

mod printer;
mod shell;

use alder_common::{Result, StoreConfig};
use alder_index::{BTreeIndex, Record};
use clap::Parser;
use shell::Shell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "alder")]
#[command(about = "Interactive shell for the AlderDB B+Tree index")]
#[command(version)]
struct Args {
    /// Tree order (fan-out), between 3 and 100
    order: Option<usize>,

    /// Bulk-load file with one decimal integer per line
    input: Option<PathBuf>,

    /// Store file used by the save and restore commands
    #[arg(long, default_value = "./alder.db")]
    store: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("alder={0},alder_index={0}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("alder: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    // An invalid order on the command line is fatal.
    let mut tree = match args.order {
        Some(order) => BTreeIndex::with_order(order)?,
        None => BTreeIndex::new(),
    };

    if let Some(path) = &args.input {
        bulk_load(&mut tree, path)?;
        printer::print_tree(&tree, false);
    }

    println!("alder {}", env!("CARGO_PKG_VERSION"));
    println!();

    let store = StoreConfig {
        path: args.store,
        ..Default::default()
    };
    let mut shell = Shell::new(tree, store);
    shell.print_status();
    shell.print_help();
    shell.run()
}

/// Inserts one key per line of `path`, the key doubling as the record
/// value. Unparsable lines are skipped.
fn bulk_load(tree: &mut BTreeIndex, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<i32>() {
            Ok(key) => {
                tree.insert(key, Record::Int(key))?;
            }
            Err(_) => tracing::warn!(%line, "skipping unparsable input line"),
        }
    }
    Ok(())
}
