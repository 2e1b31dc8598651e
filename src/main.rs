use clap::Parser;
use parts_transfer::adapters::clock::SystemClock;
use parts_transfer::config::toml_config::LogFormat;
use parts_transfer::domain::ports::{ConfigProvider, SubmissionSink};
use parts_transfer::utils::error::{ErrorSeverity, TransferError};
use parts_transfer::utils::{logger, validation::Validate};
use parts_transfer::{
    CliArgs, Console, DryRunSink, HttpSink, LocalStorage, TomlConfig, TransferSession,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 載入配置
    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    match config.monitoring.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("Starting parts-transfer");
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.document_path().to_string());

    let result = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - transfers will be logged, not sent");
        run_console(&config, DryRunSink, storage).await
    } else {
        let sink = match build_http_sink(&config) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::error!("❌ {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 Set [sink] endpoint, pass --endpoint, or use --dry-run");
                std::process::exit(1);
            }
        };
        run_console(&config, sink, storage).await
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Session failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn build_http_sink(config: &TomlConfig) -> Result<HttpSink, TransferError> {
    let endpoint = config.require_endpoint()?;
    tracing::info!("📡 Submitting transfers to: {}", endpoint);

    Ok(HttpSink::new(endpoint, config.sink_timeout())?
        .with_headers(config.sink.headers.clone())
        .require_success_status(config.sink.require_success_status))
}

async fn run_console<S: SubmissionSink>(
    config: &TomlConfig,
    sink: S,
    storage: LocalStorage,
) -> Result<(), TransferError> {
    let session = TransferSession::from_config(config, sink, SystemClock);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());

    let mut console = Console::new(session, storage, std::io::stdout())
        .with_auto_export(config.output.auto_export);
    console.run(stdin).await
}
