use anyhow::Context;
use clap::Parser;
use parts_transfer::core::normalizer::normalize;
use parts_transfer::domain::model::{LineItem, PendingTransfer, TransferPayload};
use parts_transfer::domain::ports::{ConfigProvider, SubmissionSink};
use parts_transfer::utils::{logger, validation::Validate};
use parts_transfer::{HttpSink, TomlConfig};

#[derive(Parser)]
#[command(name = "sink_check")]
#[command(about = "Send a sample transfer to the configured webhook")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "transfer-config.toml")]
    config: String,

    /// Print the sample payload without sending it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;
    config.validate().context("Configuration validation failed")?;

    let payload = sample_payload()?;
    println!("📋 Sample payload:");
    println!("{}", serde_json::to_string_pretty(&payload)?);

    if args.dry_run {
        println!("🔍 DRY RUN - nothing sent");
        return Ok(());
    }

    let endpoint = config.require_endpoint()?;
    println!("📡 Posting to: {}", endpoint);

    let sink = HttpSink::new(endpoint, config.sink_timeout())?
        .with_headers(config.sink.headers.clone())
        .require_success_status(config.sink.require_success_status);
    sink.submit(&payload)
        .await
        .context("Webhook did not accept the sample transfer")?;

    println!("✅ Webhook accepted the sample transfer");
    Ok(())
}

fn sample_payload() -> anyhow::Result<TransferPayload> {
    let now = chrono::Utc::now();
    let items = ["SINK-CHECK-1", "SINK-CHECK-2"]
        .iter()
        .map(|raw| {
            Ok(LineItem {
                code: normalize(raw)?,
                quantity: 1,
                first_seen_at: now,
            })
        })
        .collect::<parts_transfer::Result<Vec<_>>>()?;

    let pending = PendingTransfer {
        from_location: "SINK CHECK".to_string(),
        to_location: "SINK CHECK".to_string(),
        items,
    };
    Ok(TransferPayload::from_pending(&pending, now))
}
