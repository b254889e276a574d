//! 文字识别 - 识别引擎可插拔，倍数提取基于正则

pub mod error;
pub mod recognizer;
pub mod tokens;

pub use error::OcrError;
pub use recognizer::{MockRecognizer, TesseractRecognizer, TextRecognizer};
pub use tokens::{extract_multipliers, parse_multiplier};
