use crate::domain::model::{Code, LineItem};
use crate::utils::error::{Result, TransferError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// 依首次出現順序排列的零件清單，每個代碼只有一筆
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    items: Vec<LineItem>,
    positions: HashMap<Code, usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存在則數量加一，否則附加在最後
    pub fn upsert(&mut self, code: Code, seen_at: DateTime<Utc>) -> &LineItem {
        if let Some(&idx) = self.positions.get(&code) {
            let item = &mut self.items[idx];
            item.quantity = item.quantity.saturating_add(1);
            tracing::debug!("Updated {} (qty: {})", item.code, item.quantity);
            return &self.items[idx];
        }

        let idx = self.items.len();
        self.positions.insert(code.clone(), idx);
        self.items.push(LineItem {
            code,
            quantity: 1,
            first_seen_at: seen_at,
        });
        tracing::debug!("Added {}", self.items[idx].code);
        &self.items[idx]
    }

    pub fn set_quantity(&mut self, code: &Code, quantity: i64) -> Result<&LineItem> {
        let idx = self.position(code)?;
        let quantity = match u32::try_from(quantity) {
            Ok(q) if q >= 1 => q,
            _ => {
                return Err(TransferError::InvalidQuantity {
                    code: code.to_string(),
                    quantity,
                })
            }
        };

        self.items[idx].quantity = quantity;
        Ok(&self.items[idx])
    }

    pub fn increment(&mut self, code: &Code) -> Result<&LineItem> {
        let current = self.current_quantity(code)?;
        self.set_quantity(code, current + 1)
    }

    /// 數量為 1 時不能再減，需改用 `remove`
    pub fn decrement(&mut self, code: &Code) -> Result<&LineItem> {
        let current = self.current_quantity(code)?;
        self.set_quantity(code, current - 1)
    }

    pub fn remove(&mut self, code: &Code) -> Result<LineItem> {
        let idx = self.position(code)?;
        let removed = self.items.remove(idx);
        self.positions.remove(code);

        for (pos, item) in self.items.iter().enumerate().skip(idx) {
            self.positions.insert(item.code.clone(), pos);
        }

        Ok(removed)
    }

    pub fn get(&self, code: &Code) -> Option<&LineItem> {
        self.positions.get(code).map(|&idx| &self.items[idx])
    }

    /// 以 1 起算的行號取得代碼
    pub fn code_at(&self, line: usize) -> Option<&Code> {
        line.checked_sub(1)
            .and_then(|idx| self.items.get(idx))
            .map(|item| &item.code)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn type_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.positions.clear();
    }

    fn position(&self, code: &Code) -> Result<usize> {
        self.positions
            .get(code)
            .copied()
            .ok_or_else(|| TransferError::NotFound {
                code: code.to_string(),
            })
    }

    fn current_quantity(&self, code: &Code) -> Result<i64> {
        let idx = self.position(code)?;
        Ok(i64::from(self.items[idx].quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn code(raw: &str) -> Code {
        normalize(raw).unwrap()
    }

    #[test]
    fn test_repeated_code_folds_into_one_line() {
        let mut ledger = Ledger::new();
        ledger.upsert(code("abc123"), t0());
        let item = ledger.upsert(code("ABC123 "), t0());

        assert_eq!(item.code.as_str(), "ABC123");
        assert_eq!(item.quantity, 2);
        assert_eq!(ledger.type_count(), 1);
        assert_eq!(ledger.total_items(), 2);
    }

    #[test]
    fn test_insertion_order_is_stable() {
        let mut ledger = Ledger::new();
        for raw in ["C3", "A1", "B2", "A1", "C3"] {
            ledger.upsert(code(raw), t0());
        }

        let order: Vec<&str> = ledger.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(order, vec!["C3", "A1", "B2"]);
    }

    #[test]
    fn test_set_quantity_rejects_non_positive() {
        let mut ledger = Ledger::new();
        ledger.upsert(code("X1"), t0());

        assert!(matches!(
            ledger.set_quantity(&code("X1"), 0),
            Err(TransferError::InvalidQuantity { .. })
        ));
        assert!(ledger.set_quantity(&code("X1"), -4).is_err());
        assert_eq!(ledger.get(&code("X1")).unwrap().quantity, 1);

        assert_eq!(ledger.set_quantity(&code("X1"), 7).unwrap().quantity, 7);
    }

    #[test]
    fn test_set_quantity_on_missing_code() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.set_quantity(&code("NOPE"), 3),
            Err(TransferError::NotFound { .. })
        ));
    }

    #[test]
    fn test_decrement_stops_at_one() {
        let mut ledger = Ledger::new();
        ledger.upsert(code("X1"), t0());
        ledger.increment(&code("X1")).unwrap();
        assert_eq!(ledger.decrement(&code("X1")).unwrap().quantity, 1);
        assert!(ledger.decrement(&code("X1")).is_err());
        assert_eq!(ledger.get(&code("X1")).unwrap().quantity, 1);
    }

    #[test]
    fn test_remove_keeps_lookup_consistent() {
        let mut ledger = Ledger::new();
        for raw in ["A1", "B2", "C3"] {
            ledger.upsert(code(raw), t0());
        }

        let removed = ledger.remove(&code("A1")).unwrap();
        assert_eq!(removed.code.as_str(), "A1");
        assert!(ledger.remove(&code("A1")).is_err());

        // 刪除後的行號與查詢仍然一致
        assert_eq!(ledger.code_at(1).unwrap().as_str(), "B2");
        ledger.increment(&code("C3")).unwrap();
        assert_eq!(ledger.get(&code("C3")).unwrap().quantity, 2);
        assert_eq!(ledger.total_items(), 3);
    }

    #[test]
    fn test_code_at_bounds() {
        let mut ledger = Ledger::new();
        ledger.upsert(code("A1"), t0());
        assert!(ledger.code_at(0).is_none());
        assert!(ledger.code_at(2).is_none());
        assert_eq!(ledger.code_at(1).unwrap().as_str(), "A1");
    }
}
