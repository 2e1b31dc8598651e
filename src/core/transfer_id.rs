use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

pub const TRANSFER_ID_PREFIX: &str = "TXN";

/// 產生 `TXN-YYYYMMDDHHMMSS` 格式的轉移編號。
///
/// 同一秒內的第二筆以後會加上 `-2`、`-3` 等後綴。時鐘倒退時沿用
/// 最後發出的那一秒繼續編號，確保同一個 session 內不重複。
#[derive(Debug, Clone, Default)]
pub struct TransferIdGenerator {
    last_second: Option<i64>,
    same_second_count: u32,
}

impl TransferIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 `tz` 的當地時間格式化編號
    pub fn next_id<Tz>(&mut self, now: DateTime<Utc>, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let second = match self.last_second {
            Some(last) if now.timestamp() <= last => last,
            _ => now.timestamp(),
        };

        let issued = if self.last_second == Some(second) {
            self.same_second_count += 1;
            self.same_second_count
        } else {
            self.last_second = Some(second);
            self.same_second_count = 1;
            1
        };

        let stamp = DateTime::<Utc>::from_timestamp(second, 0)
            .unwrap_or(now)
            .with_timezone(tz)
            .format("%Y%m%d%H%M%S");

        if issued == 1 {
            format!("{}-{}", TRANSFER_ID_PREFIX, stamp)
        } else {
            format!("{}-{}-{}", TRANSFER_ID_PREFIX, stamp, issued)
        }
    }
}
