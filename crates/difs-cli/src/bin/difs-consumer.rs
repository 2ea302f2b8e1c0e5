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

//! Reference consumer: fetches a named object published by `difs-producer`
//! and writes its reassembled content to stdout (spec.md §6 CLI surface).

use clap::Parser;
use difs_cli::{store, DirectoryFace};
use difs_fetcher::{
    start, AcceptAllValidator, ChainAwareValidator, Face, FetchError, FetchParameters,
    FetcherCallbacks, JacobsonRttEstimator, RttOptions, Validator,
};
use difs_types::Name;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[clap(name = "difs-consumer", about = "Fetch a hash-chained segment stream")]
struct Args {
    /// Verbose logging.
    #[clap(short = 'v', long = "verbose")]
    verbose: bool,

    /// Validate each segment's signature and hash-chain linkage against
    /// the producer's published public key. Without this, segments are
    /// reassembled without cryptographic validation (the hash-chain
    /// linkage is still checked regardless, per §4.3).
    #[clap(short = 'h', long = "verify-chain")]
    verify_chain: bool,

    /// Name of the object to fetch.
    ndn_name: String,
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

    match run(args).await {
        Ok(bytes) => {
            if std::io::stdout().write_all(&bytes).is_err() {
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "fetch failed");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<Vec<u8>> {
    let name = Name::from_str_components(&args.ndn_name);
    let dir = store::store_dir_for(&name);
    if !dir.is_dir() {
        anyhow::bail!(
            "no published object found for {} under {}",
            args.ndn_name,
            dir.display()
        );
    }
    info!(ndn_name = %args.ndn_name, dir = %dir.display(), "starting fetch");

    let face: Arc<dyn Face> = Arc::new(DirectoryFace::new(dir.clone()));
    let validator: Arc<dyn Validator> = if args.verify_chain {
        let pubkey = tokio::fs::read(store::pubkey_path(&dir)).await?;
        Arc::new(ChainAwareValidator::new(pubkey))
    } else {
        Arc::new(AcceptAllValidator)
    };
    let rtt = Box::new(JacobsonRttEstimator::new(RttOptions::default()));

    let (tx, mut rx) = mpsc::unbounded_channel::<Result<Vec<u8>, FetchError>>();
    let tx_ok = tx.clone();
    let callbacks = FetcherCallbacks::new()
        .on_complete(move |bytes| {
            let _ = tx_ok.send(Ok(bytes));
        })
        .on_error(move |e| {
            let _ = tx.send(Err(e));
        });

    let handle = start(name, face, validator, rtt, FetchParameters::default(), callbacks);
    let outcome = rx.recv().await;
    handle.stop().await;

    match outcome {
        Some(Ok(bytes)) => Ok(bytes),
        Some(Err(e)) => Err(anyhow::anyhow!("fetch failed: {e}")),
        None => Err(anyhow::anyhow!("fetch ended without a result")),
    }
}
