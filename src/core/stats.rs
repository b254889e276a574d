//! 置信度估计 - 历史倍数中高于/不高于阈值的经验比例

use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Above,
    Under,
}

/// 两个结果上的概率分布，和为 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePair {
    pub above: f64,
    pub under: f64,
}

impl ConfidencePair {
    /// 无数据时的中性先验
    pub fn neutral() -> Self {
        Self {
            above: 0.5,
            under: 0.5,
        }
    }

    pub fn for_outcome(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Above => self.above,
            Outcome::Under => self.under,
        }
    }

    /// 平局归 Under
    pub fn favoured(&self) -> Outcome {
        if self.above > self.under {
            Outcome::Above
        } else {
            Outcome::Under
        }
    }
}

/// 严格大于阈值计为 above，等于阈值计为 under
pub fn compute_confidence(values: &[f64], threshold: f64) -> ConfidencePair {
    if values.is_empty() {
        return ConfidencePair::neutral();
    }

    let above = values.iter().filter(|&&v| v > threshold).count();
    let under = values.len() - above;
    let total = values.len() as f64;

    ConfidencePair {
        above: above as f64 / total,
        under: under as f64 / total,
    }
}

/// 0.615 -> "61.5%"
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// 阈值按百分比展示，2.0 -> "200%"
pub fn threshold_label(threshold: f64) -> String {
    let percent = threshold * 100.0;
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{}%", percent.round() as i64)
    } else {
        format!("{:.1}%", percent)
    }
}
