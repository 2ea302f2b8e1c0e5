#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! Reference producer: segments and signs a file into a reverse hash
//! chain, then publishes the result to the local segment store for
//! `difs-consumer` to fetch (spec.md §6 CLI surface).

use clap::Parser;
use difs_cli::store;
use difs_crypto::InMemoryKeyStore;
use difs_producer::{sign_object, SignerOptions};
use difs_types::Name;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[clap(name = "difs-producer", about = "Publish a file as a hash-chained segment stream")]
struct Args {
    /// Verbose logging.
    #[clap(short = 'v', long = "verbose")]
    verbose: bool,

    /// Build a reverse hash chain across segments instead of signing each
    /// one independently.
    #[clap(short = 't', long = "hash-chain")]
    use_hash_chain: bool,

    /// Signing identity to generate a key for.
    #[clap(short = 's', long = "signer", default_value = "default")]
    signer_id: String,

    /// Name under which the object is published.
    ndn_name: String,

    /// File to read and segment.
    file_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if args.verbose && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug");
    }
    if let Err(e) = difs_telemetry::init_tracing() {
        eprintln!("failed to initialize logging: {e}");
    }

    if !args.file_path.is_file() {
        error!(file = %args.file_path.display(), "input file not found");
        return ExitCode::from(2);
    }

    match run(args) {
        Ok(count) => {
            info!(segments = count, "published object");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "publish failed");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> anyhow::Result<usize> {
    let name = Name::from_str_components(&args.ndn_name);
    let file = std::fs::File::open(&args.file_path)?;

    let key_store = InMemoryKeyStore::new();
    let verifying_key = key_store.generate(&args.signer_id);

    let options = SignerOptions {
        signer_identity: args.signer_id.clone(),
        use_hash_chain: args.use_hash_chain,
        ..SignerOptions::default()
    };
    let segments = sign_object(&name, file, &key_store, &options)?;

    let dir = store::store_dir_for(&name);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(store::pubkey_path(&dir), verifying_key.to_sec1_bytes().to_vec())?;
    for data in &segments {
        let segment_no = data.name.last_segment()?;
        std::fs::write(store::segment_path(&dir, segment_no), data.encode())?;
    }

    Ok(segments.len())
}
