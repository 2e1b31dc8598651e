use crate::core::cooldown::CooldownFilter;
use crate::core::document::{document_file_name, render_transfer_document};
use crate::core::ledger::Ledger;
use crate::core::lifecycle::TransferLifecycle;
use crate::core::normalizer::normalize;
use crate::domain::model::{
    Code, ConfirmationMode, EntrySource, LifecycleState, LineItem, PendingTransfer, Transfer,
};
use crate::domain::ports::{Clock, ConfigProvider, Storage, SubmissionSink};
use crate::utils::error::{Result, TransferError};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// `created` 為 true 表示新的一行，否則是既有代碼數量加一
    Added { item: LineItem, created: bool },
    /// 掃描器在冷卻時間內重複觸發，直接忽略
    Suppressed,
}

/// 一個使用者 session 的完整狀態：清單、轉移狀態機與掃描冷卻。
///
/// 每次呼叫處理一個事件，回傳前狀態已完全更新。
pub struct TransferSession<S: SubmissionSink, C: Clock> {
    lifecycle: TransferLifecycle,
    cooldown: CooldownFilter,
    sink: S,
    clock: C,
    mode: ConfirmationMode,
}

impl<S: SubmissionSink, C: Clock> TransferSession<S, C> {
    pub fn new(sink: S, clock: C, cooldown_window: Duration, mode: ConfirmationMode) -> Self {
        Self {
            lifecycle: TransferLifecycle::new(),
            cooldown: CooldownFilter::new(cooldown_window),
            sink,
            clock,
            mode,
        }
    }

    pub fn from_config<P: ConfigProvider>(config: &P, sink: S, clock: C) -> Self {
        Self::new(
            sink,
            clock,
            config.cooldown_window(),
            config.confirmation_mode(),
        )
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn mode(&self) -> ConfirmationMode {
        self.mode
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn cooldown_window(&self) -> Duration {
        self.cooldown.window()
    }

    pub fn ledger(&self) -> &Ledger {
        self.lifecycle.ledger()
    }

    pub fn from_location(&self) -> &str {
        self.lifecycle.from_location()
    }

    pub fn to_location(&self) -> &str {
        self.lifecycle.to_location()
    }

    pub fn pending(&self) -> Option<&PendingTransfer> {
        self.lifecycle.pending()
    }

    pub fn receipt(&self) -> Option<&Transfer> {
        self.lifecycle.receipt()
    }

    pub fn missing_requirements(&self) -> Vec<String> {
        self.lifecycle.missing_requirements()
    }

    /// 掃描或手動輸入一個代碼。掃描器來源會先經過冷卻過濾
    pub fn ingest(&mut self, raw: &str, source: EntrySource) -> Result<IngestOutcome> {
        let code = normalize(raw).inspect_err(|e| tracing::debug!("Rejected entry: {}", e))?;

        // 先確認可編輯，避免非 Drafting 狀態的掃描影響冷卻紀錄
        self.lifecycle.ledger_mut()?;

        let now = self.clock.now();
        if source.is_automated() && !self.cooldown.should_accept(&code, now) {
            return Ok(IngestOutcome::Suppressed);
        }

        let ledger = self.lifecycle.ledger_mut()?;
        let created = ledger.get(&code).is_none();
        let item = ledger.upsert(code, now).clone();
        tracing::info!(
            "{} {} (qty: {}, source: {:?})",
            if created { "Added" } else { "Updated" },
            item.code,
            item.quantity,
            source
        );

        Ok(IngestOutcome::Added { item, created })
    }

    pub fn set_from_location(&mut self, location: &str) -> Result<()> {
        self.lifecycle.set_from_location(location)
    }

    pub fn set_to_location(&mut self, location: &str) -> Result<()> {
        self.lifecycle.set_to_location(location)
    }

    pub fn set_quantity(&mut self, code: &Code, quantity: i64) -> Result<LineItem> {
        self.lifecycle
            .ledger_mut()?
            .set_quantity(code, quantity)
            .cloned()
    }

    pub fn increment(&mut self, code: &Code) -> Result<LineItem> {
        self.lifecycle.ledger_mut()?.increment(code).cloned()
    }

    pub fn decrement(&mut self, code: &Code) -> Result<LineItem> {
        self.lifecycle.ledger_mut()?.decrement(code).cloned()
    }

    pub fn remove(&mut self, code: &Code) -> Result<LineItem> {
        let removed = self.lifecycle.ledger_mut()?.remove(code)?;
        tracing::info!("Removed {}", removed.code);
        Ok(removed)
    }

    pub fn review(&mut self) -> Result<&PendingTransfer> {
        self.lifecycle.to_reviewing()
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.lifecycle.cancel()
    }

    pub async fn confirm(&mut self) -> Result<&Transfer> {
        let now = self.clock.now();
        self.lifecycle.confirm(&self.sink, now).await
    }

    /// 依設定的確認模式送出：兩步模式需先 `review`，單步模式直接從 Drafting 送出
    pub async fn submit(&mut self) -> Result<&Transfer> {
        let now = self.clock.now();
        match self.mode {
            ConfirmationMode::TwoStep => self.lifecycle.confirm(&self.sink, now).await,
            ConfirmationMode::OneStep => self.lifecycle.submit_one_step(&self.sink, now).await,
        }
    }

    pub fn start_new(&mut self) -> Result<()> {
        self.lifecycle.start_new()?;
        self.cooldown.reset();
        tracing::info!("Started a new transfer");
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.lifecycle.clear_all()?;
        self.cooldown.reset();
        tracing::info!("Cleared all parts");
        Ok(())
    }

    /// 關閉掃描器時清除冷卻紀錄
    pub fn reset_scanner(&mut self) {
        self.cooldown.reset();
    }

    /// 將收據寫入 storage，回傳檔名
    pub async fn export_document<St: Storage>(&self, storage: &St) -> Result<String> {
        let transfer = self
            .lifecycle
            .receipt()
            .ok_or_else(|| TransferError::InvalidTransition {
                state: self.state().to_string(),
                action: "export the transfer document".to_string(),
            })?;

        let file_name = document_file_name(transfer);
        let content = render_transfer_document(transfer);
        storage.write_file(&file_name, content.as_bytes()).await?;
        tracing::info!("Transfer document saved: {}", file_name);
        Ok(file_name)
    }
}
