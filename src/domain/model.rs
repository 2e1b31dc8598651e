use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 正規化後的零件代碼，只能透過 `core::normalizer::normalize` 建立
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub code: Code,
    pub quantity: u32,
    pub first_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// 連續掃描器（相機或實體掃描槍的自動觸發）
    Scanner,
    /// 手動輸入後送出
    Manual,
}

impl EntrySource {
    pub fn is_automated(&self) -> bool {
        matches!(self, EntrySource::Scanner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationMode {
    /// Drafting -> Reviewing -> Submitted
    #[default]
    TwoStep,
    /// 單一按鈕直接送出（自動確認檢視）
    OneStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Drafting,
    Reviewing,
    Submitted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Drafting => "drafting",
            LifecycleState::Reviewing => "reviewing",
            LifecycleState::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

/// 進入 Reviewing 時建立的待確認轉移
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    pub from_location: String,
    pub to_location: String,
    pub items: Vec<LineItem>,
}

impl PendingTransfer {
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn type_count(&self) -> usize {
        self.items.len()
    }
}

/// 已成功送出的轉移，作為收據顯示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub from_location: String,
    pub to_location: String,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub state: LifecycleState,
}

impl Transfer {
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn type_count(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartEntry {
    pub barcode: String,
    pub quantity: u32,
}

/// 送往 Submission Sink 的 JSON 內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub timestamp: String,
    pub from_location: String,
    pub to_location: String,
    pub parts: Vec<PartEntry>,
    pub total_parts: u64,
    pub part_types: usize,
}

impl TransferPayload {
    pub fn from_pending(pending: &PendingTransfer, now: DateTime<Utc>) -> Self {
        let parts = pending
            .items
            .iter()
            .map(|item| PartEntry {
                barcode: item.code.to_string(),
                quantity: item.quantity,
            })
            .collect();

        Self {
            timestamp: now.to_rfc3339(),
            from_location: pending.from_location.clone(),
            to_location: pending.to_location.clone(),
            parts,
            total_parts: pending.total_items(),
            part_types: pending.type_count(),
        }
    }
}
