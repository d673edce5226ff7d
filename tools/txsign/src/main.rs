//! Offline legacy-transaction signer.
//!
//! Reads a JSON transaction request, derives the signing key from a BIP-39
//! mnemonic and prints the raw transaction for `eth_sendRawTransaction`.
//! Nothing is sent to the network.

mod request;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eth_tx::codec::{self, DecodedTransaction};
use eth_tx::{signer, Address};
use hd_keys::{DerivationPath, ExtendedKey, RootSeed};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use zeroize::Zeroizing;

use crate::request::{ChainRef, DecodedReport, SignedReport, TxRequest};

#[derive(Parser)]
#[command(name = "txsign")]
#[command(about = "Sign EIP-155 legacy transactions from an HD wallet mnemonic")]
#[command(version)]
struct Args {
    /// BIP-39 mnemonic phrase
    #[arg(long, env = "TXSIGN_MNEMONIC", hide_env_values = true, global = true)]
    mnemonic: Option<String>,

    /// Optional BIP-39 passphrase
    #[arg(long, env = "TXSIGN_PASSPHRASE", hide_env_values = true, default_value = "", global = true)]
    passphrase: String,

    /// BIP-32 derivation path of the signing key
    #[arg(long, default_value = "m/44'/60'/0'/0/0", global = true)]
    path: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign the transaction described by a JSON request file
    Sign {
        /// Request file, or `-` for stdin
        request: PathBuf,

        /// Chain id or name overriding the request's `chain`
        #[arg(long)]
        chain: Option<String>,
    },
    /// Print the address at the derivation path
    Address,
    /// Decode a raw transaction and recover its sender
    Decode {
        /// `0x`-prefixed raw transaction hex
        raw: String,

        /// Reject signatures bound to any other chain
        #[arg(long)]
        expect_chain: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match &args.command {
        Command::Sign { request, chain } => sign(&args, request, chain.as_deref()),
        Command::Address => {
            let key = derive_key(&args)?;
            let address = signer::address_of(&key.private_key())?;
            print_json(&serde_json::json!({ "path": args.path, "address": address }))
        }
        Command::Decode { raw, expect_chain } => decode(raw, expect_chain.as_deref()),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn derive_key(args: &Args) -> Result<ExtendedKey> {
    let mnemonic = Zeroizing::new(
        args.mnemonic
            .clone()
            .context("no mnemonic given; pass --mnemonic or set TXSIGN_MNEMONIC")?,
    );
    let path: DerivationPath = args
        .path
        .parse()
        .with_context(|| format!("invalid derivation path {:?}", args.path))?;

    let root = RootSeed::from_mnemonic(&mnemonic, &args.passphrase)?;
    let key = hd_keys::derive(&root, &path).context("key derivation failed")?;
    Ok(key)
}

fn read_request(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read request from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))
}

fn sign(args: &Args, request_path: &Path, chain: Option<&str>) -> Result<()> {
    let request = TxRequest::from_json(&read_request(request_path)?)?;
    let chain_ref = match chain {
        Some(arg) => ChainRef::from_arg(arg),
        None => request.chain.clone(),
    };
    let (chain_id, known) = chain_ref.resolve()?;
    if known.is_none() {
        tracing::warn!(chain_id, "signing for a chain id outside the built-in table");
    }

    let tx = request.build(chain_id)?;
    let key = derive_key(args)?;
    let signed = signer::sign(&tx, &key.private_key()).context("signing failed")?;
    let from = signer::recover_sender(&signed).context("signature does not verify")?;
    tracing::info!(chain_id, nonce = tx.nonce, %from, "transaction signed");

    print_json(&SignedReport {
        chain_id,
        chain: known.map(|c| c.name),
        from,
        nonce: tx.nonce,
        raw_transaction: codec::to_raw_hex(&signed),
        hash: format!("0x{}", hex::encode(codec::transaction_hash(&signed))),
    })
}

fn decode(raw: &str, expect_chain: Option<&str>) -> Result<()> {
    let decoded = codec::decode_hex(raw).context("not a legacy transaction")?;
    let report = match decoded {
        DecodedTransaction::Unsigned(tx) => DecodedReport::new(&tx),
        DecodedTransaction::Signed(signed) => {
            let from: Address = match expect_chain {
                Some(arg) => {
                    let (expected, _) = ChainRef::from_arg(arg).resolve()?;
                    signer::verify_for_chain(&signed, expected)?
                }
                None => signer::recover_sender(&signed)?,
            };
            DecodedReport {
                signed: true,
                from: Some(from),
                hash: Some(format!("0x{}", hex::encode(codec::transaction_hash(&signed)))),
                ..DecodedReport::new(signed.transaction())
            }
        }
    };
    print_json(&report)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}
