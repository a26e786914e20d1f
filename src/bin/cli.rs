//! Arbor CLI
//!
//! Builds an index file from a tab-separated key/value listing and queries
//! it afterwards. The index format carries no header, so every command
//! takes the block size the file was built with.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use arbor::tree::codec;
use arbor::{shared, ArborError, FileStorage, Key, Result, Tree};

/// Arbor index CLI
#[derive(Parser, Debug)]
#[command(name = "arbor-cli")]
#[command(about = "Persistent B+ tree index over fixed-size blocks")]
#[command(version)]
struct Args {
    /// Index file path
    #[arg(short, long, default_value = "./arbor.idx")]
    index: PathBuf,

    /// Block size in bytes (must match the size the index was built with)
    #[arg(short, long, default_value = "4096")]
    block_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an index from a text file of "key<TAB>value" lines
    Build {
        /// Input file; keys are unsigned integers, values are padded with
        /// zero bytes to the leaf payload size
        input: PathBuf,
    },

    /// Look up every payload stored under a key
    Get {
        /// The key to look up
        key: Key,
    },

    /// Scan a closed key range
    Range {
        /// Lower bound (inclusive)
        lo: Key,

        /// Upper bound (inclusive)
        hi: Key,
    },

    /// Dump every record in ascending key order
    Scan,

    /// Verify the tree structure and leaf chain
    Check,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,arbor=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if args.block_size < arbor::MIN_BLOCK_SIZE {
        return Err(ArborError::Config(format!(
            "block size too small ({} < {})",
            args.block_size,
            arbor::MIN_BLOCK_SIZE
        )));
    }

    match &args.command {
        Commands::Build { input } => build(args, input),
        Commands::Get { key } => {
            let tree = open_tree(args)?;
            let payloads = tree.search(*key)?;
            if payloads.is_empty() {
                println!("(nil)");
            }
            for payload in payloads {
                println!("{}", render(&payload));
            }
            Ok(())
        }
        Commands::Range { lo, hi } => {
            let tree = open_tree(args)?;
            for payload in tree.search_range(*lo, *hi)? {
                println!("{}", render(&payload));
            }
            Ok(())
        }
        Commands::Scan => {
            let tree = open_tree(args)?;
            for record in tree.iter() {
                let (key, payload) = record?;
                println!("{}\t{}", key, render(&payload));
            }
            Ok(())
        }
        Commands::Check => {
            let tree = open_tree(args)?;
            tree.check_consistency()?;
            println!("OK");
            Ok(())
        }
    }
}

fn build(args: &Args, input: &PathBuf) -> Result<()> {
    let payload_size = codec::leaf_payload_size(args.block_size);
    let listing = fs::read_to_string(input)?;

    let mut data = Vec::new();
    for (number, line) in listing.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('\t').ok_or_else(|| {
            ArborError::Config(format!("line {}: expected \"key<TAB>value\"", number + 1))
        })?;
        let key: Key = key.parse().map_err(|e| {
            ArborError::Config(format!("line {}: bad key: {}", number + 1, e))
        })?;

        if value.len() > payload_size {
            return Err(ArborError::Config(format!(
                "line {}: value ({} bytes) exceeds the leaf payload size ({})",
                number + 1,
                value.len(),
                payload_size
            )));
        }
        let mut payload = value.as_bytes().to_vec();
        payload.resize(payload_size, 0);

        data.push((key, payload));
    }

    let record_count = data.len();
    let storage = shared(FileStorage::new(args.block_size, &args.index, true)?);
    Tree::build(storage, data)?;

    tracing::info!(
        records = record_count,
        index = %args.index.display(),
        "index built"
    );
    Ok(())
}

fn open_tree(args: &Args) -> Result<Tree> {
    let storage = shared(FileStorage::new(args.block_size, &args.index, false)?);
    Tree::open(storage)
}

/// Payloads are zero-padded on build; strip the padding back off
fn render(payload: &[u8]) -> String {
    let end = payload
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);
    String::from_utf8_lossy(&payload[..end]).into_owned()
}
