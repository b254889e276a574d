use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::stats::{format_percent, threshold_label, Outcome};

/// 当前历史的汇总，供展示层使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerReport {
    pub extracted_count: usize,
    pub manual_count: usize,
    pub total_count: usize,
    /// 最近 N 个值，按时间顺序
    pub recent: Vec<f64>,
    pub threshold: f64,
    pub above: f64,
    pub under: f64,
    pub above_percent: String,
    pub under_percent: String,
}

impl TrackerReport {
    pub fn threshold_label(&self) -> String {
        threshold_label(self.threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub outcome: Outcome,
    pub confidence: f64,
    pub threshold: f64,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.outcome {
            Outcome::Above => "Above",
            Outcome::Under => "Under",
        };
        write!(
            f,
            "Prediction: {} {} ({} confidence)",
            side,
            threshold_label(self.threshold),
            format_percent(self.confidence)
        )
    }
}
