//! Header chain verifier.
//!
//! Reads a checkpoint and a run of headers from a JSON file and validates each
//! header against the consensus rules of the chosen network.

use std::{fs, path::PathBuf};

use clap::Parser;
use serde::Deserialize;
use spv_consensus::{
    util::blockhash_from_display, validator_set, Block, BlockChainAccessor, BlockHash,
    BlockHeader, BlockValidator, Checkpoint, MemoryChain, Network, Params,
};
use tracing::{debug, error, info};
use tracing_subscriber::{
    fmt::time::ChronoUtc, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

#[derive(Parser, Debug)]
#[command(name = "header-verify")]
#[command(about = "Validates a chain of block headers against a network's consensus rules.", long_about = None)]
struct Args {
    /// Network whose rules apply (bitcoin-mainnet, bitcoin-testnet, bitcoin-cash-mainnet,
    /// bitcoin-cash-testnet, dash-mainnet, dash-testnet).
    #[arg(short, long, default_value = "bitcoin-mainnet")]
    network: Network,

    /// JSON file holding the checkpoint and the headers that follow it.
    #[arg(long)]
    headers: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Disable colored output.
    #[arg(long, default_value = "false")]
    no_color: bool,
}

/// Input document layout.
#[derive(Deserialize, Debug)]
struct HeaderFile {
    checkpoint: CheckpointEntry,
    #[serde(default)]
    headers: Vec<HeaderEntry>,
}

#[derive(Deserialize, Debug)]
struct CheckpointEntry {
    height: u32,
    #[serde(flatten)]
    entry: HeaderEntry,
}

#[derive(Deserialize, Debug)]
struct HeaderEntry {
    /// 80-byte serialized header, hex encoded.
    header: String,
    /// Display-order hash for chains that do not identify blocks by double
    /// SHA-256.
    #[serde(default)]
    hash: Option<String>,
}

impl HeaderEntry {
    fn decode(&self) -> Result<(BlockHeader, BlockHash), Box<dyn std::error::Error>> {
        let header = BlockHeader::from_hex(&self.header)?;
        let hash = match &self.hash {
            Some(hash) => blockhash_from_display(hash)?,
            None => header.block_hash(),
        };
        Ok((header, hash))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing(&args)?;

    let params = Params::for_network(args.network);
    let file: HeaderFile = serde_json::from_str(&fs::read_to_string(&args.headers)?)?;
    info!(
        network = %params.network,
        path = %args.headers.display(),
        headers = file.headers.len(),
        "verifying headers"
    );

    let (header, hash) = file.checkpoint.entry.decode()?;
    let checkpoint = Checkpoint {
        height: file.checkpoint.height,
        hash,
    };
    let mut chain = MemoryChain::new();
    chain.insert(Block::with_hash(header, hash, checkpoint.height));

    let max_target = params.max_target();
    for entry in &file.headers {
        let (header, hash) = entry.decode()?;
        let previous = chain
            .block(&header.prev_blockhash())
            .ok_or_else(|| format!("header {hash} does not connect to a known block"))?;
        let block = Block::with_hash(header, hash, previous.height().saturating_add(1));

        let result = validator_set(&params, &checkpoint.hash, &chain)
            .and_then(|validators| validators.validate(&block, &previous));
        if let Err(err) = result {
            error!(height = block.height(), hash = %block.hash(), "header rejected: {err}");
            return Err(err.into());
        }

        let difficulty = block.target()?.difficulty_float(max_target).unwrap_or_default();
        debug!(height = block.height(), hash = %block.hash(), bits = %block.bits(), difficulty, "header accepted");
        chain.insert(block);
    }

    if let Some(tip) = chain.tip() {
        info!(height = tip.height(), hash = %tip.hash(), "all headers valid");
    }

    Ok(())
}

fn init_tracing(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let level = match args.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!(
                "Invalid log level: {}. Using 'info' as default.",
                args.log_level
            );
            tracing::Level::INFO
        }
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr()) && !args.no_color;

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_level(true)
            .with_target(args.verbose)
            .with_thread_ids(args.verbose)
            .with_thread_names(args.verbose)
            .with_ansi(use_ansi)
            .with_file(args.verbose)
            .with_line_number(args.verbose)
            .with_timer(ChronoUtc::rfc_3339()),
    );

    subscriber.try_init()?;

    Ok(())
}
