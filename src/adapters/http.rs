use crate::domain::model::TransferPayload;
use crate::domain::ports::SubmissionSink;
use crate::utils::error::{Result, TransferError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// 預設送出逾時
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(10);

/// 以 HTTP POST 將轉移資料送到試算表 webhook
#[derive(Debug, Clone)]
pub struct HttpSink {
    endpoint: String,
    client: Client,
    headers: HashMap<String, String>,
    require_success_status: bool,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransferError::ConfigValidationError {
                field: "sink".to_string(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
            headers: HashMap::new(),
            require_success_status: true,
        })
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// 關閉後只要收到回應就算成功（不檢查狀態碼）
    pub fn require_success_status(mut self, required: bool) -> Self {
        self.require_success_status = required;
        self
    }
}

#[async_trait]
impl SubmissionSink for HttpSink {
    async fn submit(&self, payload: &TransferPayload) -> Result<()> {
        tracing::debug!("Posting transfer to: {}", self.endpoint);

        // json() 會自動設定 Content-Type: application/json
        let mut request = self.client.post(&self.endpoint).json(payload);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Sink response status: {}", status);

        if self.require_success_status && !status.is_success() {
            return Err(TransferError::SubmissionFailed {
                message: format!("webhook responded with status {}", status),
            });
        }

        tracing::info!(
            "📤 Transfer sent ({} items, {} parts)",
            payload.total_parts,
            payload.part_types
        );
        Ok(())
    }
}

/// 不做網路呼叫，只把 payload 記錄到日誌
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

#[async_trait]
impl SubmissionSink for DryRunSink {
    async fn submit(&self, payload: &TransferPayload) -> Result<()> {
        let body = serde_json::to_string_pretty(payload)?;
        tracing::info!("🔍 DRY RUN - payload not sent:\n{}", body);
        Ok(())
    }
}
