use crate::config::toml_config::TomlConfig;
use crate::domain::model::ConfirmationMode;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "parts-transfer")]
#[command(about = "Record parts moved between locations and submit the transfer")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the submission webhook URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the scanner cooldown window in seconds
    #[arg(long)]
    pub cooldown: Option<f64>,

    /// Submit directly from the draft without a review step
    #[arg(long)]
    pub one_step: bool,

    /// Directory for exported transfer documents
    #[arg(long)]
    pub output_path: Option<String>,

    /// Log the payload instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// 載入配置檔（若有指定）並套用命令列覆蓋設定
    pub fn load_config(&self) -> crate::utils::error::Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.sink.endpoint = Some(endpoint.clone());
            tracing::info!("🔧 Sink endpoint overridden");
        }
        if let Some(cooldown) = self.cooldown {
            config.scanner.cooldown_seconds = cooldown;
            tracing::info!("🔧 Scanner cooldown overridden to: {}s", cooldown);
        }
        if self.one_step {
            config.workflow.confirmation = ConfirmationMode::OneStep;
        }
        if let Some(output_path) = &self.output_path {
            config.output.document_path = output_path.clone();
        }
    }
}
