use log::debug;
use thiserror::Error;

use crate::core::ocr::parse_multiplier;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("Invalid number format.")]
    InvalidNumber(String),
}

/// 倍数序列：只追加，插入顺序即时间顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiplierHistory {
    values: Vec<f64>,
}

impl MultiplierHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn extend_from_slice(&mut self, values: &[f64]) {
        self.values.extend_from_slice(values);
    }

    /// 解析手动输入，失败时序列保持不变
    pub fn push_manual(&mut self, input: &str) -> Result<f64, HistoryError> {
        let trimmed = input.trim();
        let value =
            parse_multiplier(trimmed).ok_or_else(|| HistoryError::InvalidNumber(input.to_string()))?;

        self.values.push(value);
        debug!("✍️ Manual multiplier appended: {}", value);
        Ok(value)
    }

    /// 最近 n 个值，按时间顺序
    pub fn recent(&self, n: usize) -> &[f64] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
