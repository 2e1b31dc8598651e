use crate::domain::model::Code;
use crate::utils::error::{Result, TransferError};

/// 零件代碼最短長度
pub const MIN_CODE_LENGTH: usize = 2;

/// 去除前後空白並轉為大寫；空字串或過短的輸入會被拒絕
pub fn normalize(raw: &str) -> Result<Code> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(TransferError::InvalidInput {
            raw: raw.to_string(),
            reason: "code is empty".to_string(),
        });
    }

    if trimmed.chars().count() < MIN_CODE_LENGTH {
        return Err(TransferError::InvalidInput {
            raw: raw.to_string(),
            reason: format!("code must be at least {} characters", MIN_CODE_LENGTH),
        });
    }

    Ok(Code::new_unchecked(trimmed.to_uppercase()))
}
