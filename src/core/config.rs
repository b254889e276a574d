//! 运行配置 - 视频路径、采样步长、感兴趣区域、阈值

use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::stats::DEFAULT_THRESHOLD;
use crate::core::video::SamplingConfig;

pub const DEFAULT_VIDEO_PATH: &str = "history_game.mp4";
/// 30fps 下约 5 秒取一帧
pub const DEFAULT_FRAME_STRIDE: u32 = 150;
pub const DEFAULT_RECENT_WINDOW: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] json5::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 裁剪矩形，像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FromStr for CropRegion {
    type Err = String;

    /// 解析 "x,y,w,h"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid crop region {:?}: {}", s, e))?;

        match parts.as_slice() {
            [x, y, width, height] => Ok(Self {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            }),
            _ => Err(format!(
                "invalid crop region {:?}: expected x,y,width,height",
                s
            )),
        }
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OcrConfig {
    pub tesseract_path: PathBuf,
    /// 页面分割模式，6 = 单一文本块
    pub psm: u8,
    /// 追加的 tesseract 配置名，默认 digits 偏向数字字符
    pub configs: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            psm: 6,
            configs: vec!["digits".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub video_path: PathBuf,
    pub frame_stride: NonZeroU32,
    pub crop_region: Option<CropRegion>,
    pub threshold: f64,
    pub recent_window: usize,
    pub use_video: bool,
    pub ocr: OcrConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            video_path: PathBuf::from(DEFAULT_VIDEO_PATH),
            frame_stride: NonZeroU32::new(DEFAULT_FRAME_STRIDE).unwrap_or(NonZeroU32::MIN),
            crop_region: None,
            threshold: DEFAULT_THRESHOLD,
            recent_window: DEFAULT_RECENT_WINDOW,
            use_video: true,
            ocr: OcrConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从 JSON5 文件加载，缺省字段使用默认值
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json5(&content)?;
        info!("⚙️ Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json5(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if let Some(region) = &self.crop_region {
            if region.width == 0 || region.height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "crop region must have a non-zero size, got {}",
                    region
                )));
            }
        }
        Ok(())
    }

    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            frame_stride: self.frame_stride,
            crop_region: self.crop_region,
            max_samples: None,
        }
    }
}
