//! 倍数追踪器 - 视频提取 + 手动录入 + 置信度

use std::path::Path;

use log::{info, warn};

use crate::api::models::{Prediction, TrackerReport};
use crate::core::cache::ExtractionCache;
use crate::core::config::AppConfig;
use crate::core::history::{HistoryError, MultiplierHistory};
use crate::core::ocr::TextRecognizer;
use crate::core::stats::{compute_confidence, format_percent, ConfidencePair, Outcome};
use crate::core::video::{scan_video_file, SamplingConfig};

/// 展示层使用的入口
///
/// ```ignore
/// let mut cache = ExtractionCache::new();
/// let mut tracker = MultiplierTracker::new(AppConfig::default());
/// tracker.load_video(&mut cache, &TesseractRecognizer::new());
/// tracker.add_manual("1.87")?;
/// println!("{}", tracker.predict(Outcome::Above));
/// ```
pub struct MultiplierTracker {
    config: AppConfig,
    history: MultiplierHistory,
    extracted_count: usize,
    manual_count: usize,
    video_loaded: bool,
}

impl MultiplierTracker {
    pub fn new(config: AppConfig) -> Self {
        info!(
            "🎰 MultiplierTracker: created (video={}, threshold={})",
            config.video_path.display(),
            config.threshold
        );
        Self {
            config,
            history: MultiplierHistory::new(),
            extracted_count: 0,
            manual_count: 0,
            video_loaded: false,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 从视频加载历史（经缓存），返回提取到的数量
    pub fn load_video(&mut self, cache: &mut ExtractionCache, recognizer: &dyn TextRecognizer) -> usize {
        self.load_video_with(cache, |path, sampling| {
            scan_video_file(path, sampling, recognizer)
        })
    }

    pub fn load_video_with<F>(&mut self, cache: &mut ExtractionCache, scan: F) -> usize
    where
        F: FnOnce(&Path, &SamplingConfig) -> Vec<f64>,
    {
        if !self.config.use_video {
            info!("📼 Video source disabled");
            return 0;
        }
        if self.video_loaded {
            return self.extracted_count;
        }

        let sampling = self.config.sampling();
        let values = cache.get_or_scan(&self.config.video_path, |path| scan(path, &sampling));

        if values.is_empty() {
            warn!(
                "⚠️ No multipliers extracted from {}",
                self.config.video_path.display()
            );
        }

        self.history.extend_from_slice(values);
        self.extracted_count = values.len();
        self.video_loaded = true;
        info!("✅ Extracted {} multipliers", self.extracted_count);
        self.extracted_count
    }

    pub fn add_manual(&mut self, input: &str) -> Result<f64, HistoryError> {
        match self.history.push_manual(input) {
            Ok(value) => {
                self.manual_count += 1;
                info!("➕ Added {} to history", value);
                Ok(value)
            }
            Err(e) => {
                warn!("⚠️ Rejected manual input {:?}", input);
                Err(e)
            }
        }
    }

    pub fn history(&self) -> &MultiplierHistory {
        &self.history
    }

    pub fn recent(&self) -> &[f64] {
        self.history.recent(self.config.recent_window)
    }

    pub fn confidence(&self) -> ConfidencePair {
        compute_confidence(self.history.as_slice(), self.config.threshold)
    }

    pub fn predict(&self, outcome: Outcome) -> Prediction {
        Prediction {
            outcome,
            confidence: self.confidence().for_outcome(outcome),
            threshold: self.config.threshold,
        }
    }

    pub fn report(&self) -> TrackerReport {
        let confidence = self.confidence();
        TrackerReport {
            extracted_count: self.extracted_count,
            manual_count: self.manual_count,
            total_count: self.history.len(),
            recent: self.recent().to_vec(),
            threshold: self.config.threshold,
            above: confidence.above,
            under: confidence.under,
            above_percent: format_percent(confidence.above),
            under_percent: format_percent(confidence.under),
        }
    }
}

impl Drop for MultiplierTracker {
    fn drop(&mut self) {
        info!(
            "🗑️ MultiplierTracker: released ({} values)",
            self.history.len()
        );
    }
}
