//! Command-line interface for doris-cdc-sync
//!
//! # Usage Examples
//!
//! ## Sync
//! ```bash
//! # Serialize a Debezium JSONL dump, applying schema changes to Doris
//! doris-cdc-sync sync \
//!   --input changes.jsonl --output records.jsonl \
//!   --table-mapping-file mapping.yaml \
//!   --doris-fenodes 10.0.0.1:8030,10.0.0.2:8030 \
//!   --doris-username root --doris-password secret
//!
//! # Same, reading stdin and writing stdout, without contacting Doris
//! cat changes.jsonl | doris-cdc-sync sync --table-identifier ods.orders --dry-run
//! ```
//!
//! ## DDL
//! ```bash
//! # Print the Doris statement for one schema history envelope
//! doris-cdc-sync ddl --input history.json --table-mapping inventory.orders=ods.orders
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use doris_cdc_debezium_source::ChangeEnvelope;
use doris_cdc_sync::{run_sync, DorisOptions, JsonDebeziumSerializer, SerializerOptions};
use tokio::io::{AsyncReadExt, AsyncWrite, BufReader};

#[derive(Parser)]
#[command(name = "doris-cdc-sync")]
#[command(about = "Serialize Debezium change events into Doris stream-load records")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize JSONL envelopes into Doris records and apply schema changes
    Sync {
        /// Input file with one envelope per line (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output file for records as JSON lines (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        serializer: SerializerOptions,

        #[command(flatten)]
        doris: DorisOptions,

        /// Translate schema changes without sending them to Doris
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the Doris DDL for one schema history envelope
    Ddl {
        /// File containing the envelope (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        serializer: SerializerOptions,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for records
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            input,
            output,
            serializer,
            doris,
            dry_run,
        } => {
            let doris = (!dry_run).then_some(&doris);
            let serializer = JsonDebeziumSerializer::from_options(&serializer, doris)?;
            if serializer.is_dry_run() {
                tracing::info!("Dry run: schema changes will not be applied");
            }

            let mut writer: Box<dyn AsyncWrite + Unpin> = match &output {
                Some(path) => Box::new(
                    tokio::fs::File::create(path)
                        .await
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                ),
                None => Box::new(tokio::io::stdout()),
            };

            match &input {
                Some(path) => {
                    let file = tokio::fs::File::open(path)
                        .await
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    run_sync(&serializer, BufReader::new(file), &mut writer).await?;
                }
                None => {
                    run_sync(&serializer, BufReader::new(tokio::io::stdin()), &mut writer).await?;
                }
            }
        }
        Commands::Ddl { input, serializer } => {
            let serializer = JsonDebeziumSerializer::from_options(&serializer, None)?;

            let mut raw = Vec::new();
            match &input {
                Some(path) => {
                    raw = tokio::fs::read(path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                }
                None => {
                    tokio::io::stdin()
                        .read_to_end(&mut raw)
                        .await
                        .context("Failed to read envelope from stdin")?;
                }
            }

            let envelope = ChangeEnvelope::decode(&raw).context("Failed to decode envelope")?;
            match serializer
                .translate_ddl(&envelope)
                .context("Failed to translate schema change")?
            {
                Some(change) => println!("{}", change.statement),
                None => tracing::info!("Envelope does not describe a supported schema change"),
            }
        }
    }

    Ok(())
}
