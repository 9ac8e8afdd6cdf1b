//! Fetch, verify and package storage proofs for a contract.
//!
//! You can run this script using the following command:
//! ```shell
//! RUST_LOG=info cargo run --release -- --address 0x... --holder 0x... --mapping-slot 1
//! ```

use clap::Parser;
use storage_proofs_lib::{balance_slot, BlockTag, ProverConfig, StorageProver};
use storage_proofs_script::{parse_address, parse_hash, RpcProofSource};
use tracing_subscriber::EnvFilter;
use url::Url;

use alloy::providers::ProviderBuilder;
use alloy::transports::http::{Client, Http};

/// The arguments for the command.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-RPC endpoint of the source chain
    #[arg(long, env = "RPC_URL")]
    rpc_url: Url,

    /// Contract whose storage is proven
    #[arg(long)]
    address: String,

    /// Raw storage slot, repeatable
    #[arg(long = "slot")]
    slots: Vec<String>,

    /// Holder whose entry in a balance mapping is proven
    #[arg(long, requires = "mapping_slot")]
    holder: Option<String>,

    /// Declaration slot of the balance mapping
    #[arg(long, requires = "holder")]
    mapping_slot: Option<u64>,

    /// Block number or `latest`
    #[arg(long, default_value = "latest")]
    block: BlockTag,

    /// Skip local verification of the fetched proofs
    #[arg(long)]
    no_verify: bool,

    /// Print the ABI-encoded bundle instead of JSON
    #[arg(long)]
    abi: bool,
}

fn setup_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    setup_logger();

    let args = Args::parse();

    let address = parse_address(&args.address)?;
    let mut slots = args
        .slots
        .iter()
        .map(|slot| parse_hash(slot))
        .collect::<Result<Vec<_>, _>>()?;
    if let (Some(holder), Some(mapping_slot)) = (&args.holder, args.mapping_slot) {
        slots.push(balance_slot(&parse_address(holder)?, mapping_slot));
    }

    let provider = ProviderBuilder::new().on_http(args.rpc_url);
    let source: RpcProofSource<_, Http<Client>> = RpcProofSource::new(provider);
    let config = ProverConfig {
        verify: !args.no_verify,
        ..Default::default()
    };

    let bundle = StorageProver::new(source, config)
        .get_proof(address, &slots, args.block)
        .await?;

    if args.abi {
        println!("0x{}", hex::encode(bundle.abi_encode()));
    } else {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    }
    Ok(())
}
