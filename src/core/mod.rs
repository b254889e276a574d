pub mod cache;
pub mod config;
pub mod history;
pub mod ocr;
pub mod stats;
pub mod video;

pub use cache::{CacheStats, ExtractionCache};
pub use config::{AppConfig, ConfigError, CropRegion, OcrConfig};
pub use history::{HistoryError, MultiplierHistory};
pub use stats::{compute_confidence, ConfidencePair, Outcome, DEFAULT_THRESHOLD};
