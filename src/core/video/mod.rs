//! 视频倍数提取
//!
//! 1. 帧来源 - ffmpeg 解码为 RGB 帧，句柄只释放一次
//! 2. 固定步长采样 - 每 N 帧识别一次
//! 3. 灰度 + 裁剪 - 只把感兴趣区域交给识别引擎

pub mod error;
pub mod frame;
pub mod sampler;
pub mod source;

pub use error::VideoError;
pub use frame::{GrayFrame, RgbFrame};
pub use sampler::{scan_video, scan_video_file, FrameSampler, SamplingConfig, SamplingStats};
pub use source::{FfmpegSource, FrameSource, MemoryFrameSource, VideoInfo};
