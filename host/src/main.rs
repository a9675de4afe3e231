use std::{fs, path::PathBuf, process};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use host::{
    check_log_size, prove_log, verify_log_receipt, ProveOptions, ReceiptKind,
    SEGMENT_LIMIT_PO2_DEFAULT,
};
use pong_zk_core::{validate_log, CompactLog};
use risc0_zkvm::Receipt;

#[derive(Parser, Debug)]
#[command(name = "pong-zk", about = "Validate and prove match logs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-simulate a log locally and print the outcome, without proving.
    Verify {
        log_path: PathBuf,
    },
    /// Prove that a log validates honestly, producing a RISC Zero receipt.
    Prove {
        log_path: PathBuf,
        #[arg(long, value_enum, default_value_t = ReceiptKind::Composite)]
        format: ReceiptKind,
        #[arg(long)]
        journal_out: Option<PathBuf>,
        #[arg(long, default_value_t = SEGMENT_LIMIT_PO2_DEFAULT)]
        segment_limit_po2: u32,
    },
    /// Verify a previously produced receipt file against VALIDATE_LOG_ID.
    VerifyProof {
        receipt_path: PathBuf,
    },
}

fn read_log(path: &PathBuf) -> Result<CompactLog> {
    let meta = fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    if check_log_size(meta.len()).is_err() {
        process::exit(2);
    }
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Verify { log_path } => {
            let log = match read_log(&log_path) {
                Ok(log) => log,
                Err(err) => {
                    eprintln!("{err:#}");
                    process::exit(2);
                }
            };
            let result = validate_log(&log);
            if result.fair {
                println!(
                    "fair match: left={} right={}",
                    result.left_score, result.right_score
                );
                Ok(())
            } else {
                let reason = result
                    .reason
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "rejected".into());
                eprintln!("{reason}");
                process::exit(1);
            }
        }
        Command::Prove { log_path, format, journal_out, segment_limit_po2 } => {
            let log = read_log(&log_path)?;
            let proof = prove_log(
                &log,
                ProveOptions {
                    segment_limit_po2,
                    receipt_kind: format,
                    ..ProveOptions::default()
                },
            )?;

            println!(
                "receipt kind: {}",
                proof
                    .produced_receipt_kind
                    .map(|k| k.as_str())
                    .unwrap_or("dev-fake")
            );
            println!(
                "fair={} left={} right={}",
                proof.journal.fair, proof.journal.left_score, proof.journal.right_score
            );
            println!("segments={} total_cycles={}", proof.stats.segments, proof.stats.total_cycles);

            let json = serde_json::to_vec_pretty(&proof).context("failed to serialize proof")?;
            match journal_out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed writing {}", path.display()))?;
                }
                None => println!("{}", String::from_utf8_lossy(&json)),
            }
            Ok(())
        }
        Command::VerifyProof { receipt_path } => {
            let bytes = fs::read(&receipt_path)
                .with_context(|| format!("failed to read {}", receipt_path.display()))?;
            let receipt: Receipt =
                serde_json::from_slice(&bytes).context("failed to parse receipt json")?;
            match verify_log_receipt(&receipt) {
                Ok(()) => {
                    println!("receipt verified");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("{err:#}");
                    process::exit(1);
                }
            }
        }
    }
}
