use crate::domain::model::Code;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// 同一代碼兩次掃描之間的預設間隔
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1500);

/// 抑制連續掃描器在短時間內重複觸發同一代碼。
///
/// 接受後 `last_code` 會保留到時間窗結束，在時間窗內再次出現的
/// 同一代碼一律忽略；不同代碼不受影響。
#[derive(Debug, Clone)]
pub struct CooldownFilter {
    window: Duration,
    last_code: Option<Code>,
    last_time: Option<DateTime<Utc>>,
}

impl CooldownFilter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_code: None,
            last_time: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_code(&self) -> Option<&Code> {
        self.last_code.as_ref()
    }

    pub fn should_accept(&mut self, code: &Code, now: DateTime<Utc>) -> bool {
        if let (Some(last_code), Some(last_time)) = (&self.last_code, self.last_time) {
            if last_code == code && self.within_window(last_time, now) {
                tracing::debug!("Suppressed repeat scan of {}", code);
                return false;
            }
        }

        self.last_code = Some(code.clone());
        self.last_time = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_code = None;
        self.last_time = None;
    }

    fn within_window(&self, last_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // 時鐘倒退時視為仍在時間窗內
        match (now - last_time).to_std() {
            Ok(elapsed) => elapsed < self.window,
            Err(_) => true,
        }
    }
}

impl Default for CooldownFilter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
