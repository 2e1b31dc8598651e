use crate::domain::model::{ConfirmationMode, TransferPayload};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn sink_endpoint(&self) -> Option<&str>;
    fn sink_timeout(&self) -> Duration;
    fn cooldown_window(&self) -> Duration;
    fn confirmation_mode(&self) -> ConfirmationMode;
    fn document_path(&self) -> &str;
}

/// 接收完成的轉移資料；只回報成功或失敗，不會修改本地狀態
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, payload: &TransferPayload) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
