use crate::core::ledger::Ledger;
use crate::core::transfer_id::TransferIdGenerator;
use crate::domain::model::{LifecycleState, PendingTransfer, Transfer, TransferPayload};
use crate::domain::ports::SubmissionSink;
use crate::utils::error::{Result, TransferError};
use chrono::{DateTime, Local, Utc};

/// 單一轉移的狀態機：Drafting -> Reviewing -> Submitted -> (start_new) Drafting
#[derive(Debug, Default)]
pub struct TransferLifecycle {
    state: LifecycleState,
    from_location: String,
    to_location: String,
    ledger: Ledger,
    pending: Option<PendingTransfer>,
    completed: Option<Transfer>,
    ids: TransferIdGenerator,
}

impl TransferLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn from_location(&self) -> &str {
        &self.from_location
    }

    pub fn to_location(&self) -> &str {
        &self.to_location
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// 只有 Drafting 狀態可以修改清單
    pub fn ledger_mut(&mut self) -> Result<&mut Ledger> {
        self.ensure(LifecycleState::Drafting, "edit the parts list")?;
        Ok(&mut self.ledger)
    }

    pub fn pending(&self) -> Option<&PendingTransfer> {
        self.pending.as_ref()
    }

    pub fn receipt(&self) -> Option<&Transfer> {
        self.completed.as_ref()
    }

    pub fn set_from_location(&mut self, location: &str) -> Result<()> {
        self.ensure(LifecycleState::Drafting, "change the from location")?;
        self.from_location = location.trim().to_string();
        Ok(())
    }

    pub fn set_to_location(&mut self, location: &str) -> Result<()> {
        self.ensure(LifecycleState::Drafting, "change the to location")?;
        self.to_location = location.trim().to_string();
        Ok(())
    }

    /// 進入檢視前尚缺的欄位
    pub fn missing_requirements(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.from_location.is_empty() {
            missing.push("From Location".to_string());
        }
        if self.to_location.is_empty() {
            missing.push("To Location".to_string());
        }
        if self.ledger.is_empty() {
            missing.push("Add at least one part".to_string());
        }
        missing
    }

    /// 複製目前清單成為待確認的轉移；清單本身保留，取消後可繼續編輯
    pub fn to_reviewing(&mut self) -> Result<&PendingTransfer> {
        self.ensure(LifecycleState::Drafting, "review the transfer")?;

        let missing = self.missing_requirements();
        if !missing.is_empty() {
            return Err(TransferError::NotReady { missing });
        }

        let pending = PendingTransfer {
            from_location: self.from_location.clone(),
            to_location: self.to_location.clone(),
            items: self.ledger.snapshot(),
        };
        tracing::info!(
            "Reviewing transfer {} -> {} ({} items, {} parts)",
            pending.from_location,
            pending.to_location,
            pending.total_items(),
            pending.type_count()
        );

        self.state = LifecycleState::Reviewing;
        Ok(&*self.pending.insert(pending))
    }

    /// 放棄待確認的快照並回到 Drafting，清單與地點不變
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure(LifecycleState::Reviewing, "cancel the review")?;
        self.pending = None;
        self.state = LifecycleState::Drafting;
        tracing::debug!("Review cancelled, back to drafting");
        Ok(())
    }

    /// 送出快照。失敗時維持 Reviewing 且不改動任何本地狀態
    pub async fn confirm<S>(&mut self, sink: &S, now: DateTime<Utc>) -> Result<&Transfer>
    where
        S: SubmissionSink + ?Sized,
    {
        self.ensure(LifecycleState::Reviewing, "confirm the transfer")?;
        let payload = match self.pending.as_ref() {
            Some(pending) => TransferPayload::from_pending(pending, now),
            None => return Err(self.invalid("confirm the transfer")),
        };

        tracing::debug!(
            "Submitting transfer with {} part types",
            payload.part_types
        );
        if let Err(e) = sink.submit(&payload).await {
            tracing::warn!("Transfer submission failed: {}", e);
            return Err(match e {
                TransferError::SubmissionFailed { .. } => e,
                other => TransferError::SubmissionFailed {
                    message: other.to_string(),
                },
            });
        }

        let Some(pending) = self.pending.take() else {
            return Err(self.invalid("confirm the transfer"));
        };
        let transfer = Transfer {
            id: self.ids.next_id(now, &Local),
            from_location: pending.from_location,
            to_location: pending.to_location,
            items: pending.items,
            created_at: now,
            state: LifecycleState::Submitted,
        };
        tracing::info!(
            "Transfer {} submitted ({} items, {} parts)",
            transfer.id,
            transfer.total_items(),
            transfer.type_count()
        );

        // 送出成功後清空草稿
        self.ledger.clear();
        self.from_location.clear();
        self.to_location.clear();
        self.state = LifecycleState::Submitted;
        Ok(&*self.completed.insert(transfer))
    }

    /// 單步模式：自動檢視後直接送出；失敗時回到 Drafting
    pub async fn submit_one_step<S>(&mut self, sink: &S, now: DateTime<Utc>) -> Result<&Transfer>
    where
        S: SubmissionSink + ?Sized,
    {
        self.to_reviewing()?;
        if let Err(e) = self.confirm(sink, now).await.map(|_| ()) {
            self.cancel()?;
            return Err(e);
        }
        self.completed
            .as_ref()
            .ok_or_else(|| self.invalid("read the receipt"))
    }

    /// 收據畫面結束，回到全新的 Drafting
    pub fn start_new(&mut self) -> Result<()> {
        self.ensure(LifecycleState::Submitted, "start a new transfer")?;
        self.reset_draft();
        self.completed = None;
        self.state = LifecycleState::Drafting;
        Ok(())
    }

    /// 緊急重置：清空目前草稿
    pub fn clear_all(&mut self) -> Result<()> {
        self.ensure(LifecycleState::Drafting, "clear the transfer")?;
        self.reset_draft();
        Ok(())
    }

    fn reset_draft(&mut self) {
        self.ledger.clear();
        self.from_location.clear();
        self.to_location.clear();
        self.pending = None;
    }

    fn ensure(&self, expected: LifecycleState, action: &str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &str) -> TransferError {
        TransferError::InvalidTransition {
            state: self.state.to_string(),
            action: action.to_string(),
        }
    }
}
