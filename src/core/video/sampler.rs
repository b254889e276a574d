use std::num::NonZeroU32;
use std::path::Path;

use log::{debug, info, warn};

use super::error::VideoError;
use super::frame::RgbFrame;
use super::source::{FfmpegSource, FrameSource};
use crate::core::config::{CropRegion, DEFAULT_FRAME_STRIDE};
use crate::core::ocr::{extract_multipliers, TextRecognizer};

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// 每隔多少帧识别一次
    pub frame_stride: NonZeroU32,
    pub crop_region: Option<CropRegion>,
    /// 达到采样数后提前结束
    pub max_samples: Option<usize>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            frame_stride: NonZeroU32::new(DEFAULT_FRAME_STRIDE).unwrap_or(NonZeroU32::MIN),
            crop_region: None,
            max_samples: None,
        }
    }
}

impl SamplingConfig {
    pub fn with_stride(frame_stride: NonZeroU32) -> Self {
        Self {
            frame_stride,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplingStats {
    pub frames_read: u64,
    pub frames_sampled: u64,
    pub recognition_failures: u64,
    pub values_found: u64,
}

/// 固定步长采样 + 文字识别
pub struct FrameSampler {
    config: SamplingConfig,
    stats: SamplingStats,
}

impl FrameSampler {
    pub fn new() -> Self {
        Self::with_config(SamplingConfig::default())
    }

    pub fn with_config(config: SamplingConfig) -> Self {
        Self {
            config,
            stats: SamplingStats::default(),
        }
    }

    pub fn is_sampled(&self, frame_number: u64) -> bool {
        frame_number % self.config.frame_stride.get() as u64 == 0
    }

    /// 顺序读取全部帧，返回按发现顺序排列的倍数
    pub fn sample(
        &mut self,
        source: &mut dyn FrameSource,
        recognizer: &dyn TextRecognizer,
    ) -> Vec<f64> {
        let info = source.info();
        debug!(
            "▶️ Sampling {}x{} @ {:.2} fps every {} frames",
            info.width,
            info.height,
            info.fps,
            self.config.frame_stride
        );

        let mut multipliers = Vec::new();
        let mut frame_number = 0u64;

        loop {
            if let Some(limit) = self.config.max_samples {
                if self.stats.frames_sampled as usize >= limit {
                    debug!("⏹️ Sample limit {} reached at frame {}", limit, frame_number);
                    break;
                }
            }

            let frame = match source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    warn!("⚠️ Decode error at frame {}: {}", frame_number, e);
                    break;
                }
            };
            self.stats.frames_read += 1;

            if self.is_sampled(frame_number) {
                let values = self.process_frame(&frame, recognizer);
                multipliers.extend(values);
            }
            frame_number += 1;
        }

        info!(
            "📊 Sampling done: {} frames read, {} sampled, {} multipliers",
            self.stats.frames_read, self.stats.frames_sampled, self.stats.values_found
        );
        multipliers
    }

    /// 灰度 -> 裁剪 -> 识别 -> 提取
    pub fn process_frame(&mut self, frame: &RgbFrame, recognizer: &dyn TextRecognizer) -> Vec<f64> {
        self.stats.frames_sampled += 1;

        let mut gray = frame.to_gray();
        if !gray.is_well_formed() {
            warn!(
                "⚠️ Frame {} has {} bytes for {}x{}, skipped",
                frame.frame_number,
                frame.data.len(),
                frame.width,
                frame.height
            );
            return Vec::new();
        }
        if let Some(region) = &self.config.crop_region {
            gray = gray.crop(region);
        }

        if gray.is_empty() {
            debug!("Frame {} is empty after crop, skipped", frame.frame_number);
            return Vec::new();
        }

        let Some(image) = gray.to_image() else {
            return Vec::new();
        };

        let text = match recognizer.recognize(&image) {
            Ok(text) => text,
            Err(e) => {
                self.stats.recognition_failures += 1;
                warn!(
                    "⚠️ {} failed on frame {} ({} ms): {}",
                    recognizer.name(),
                    frame.frame_number,
                    frame.timestamp_ms,
                    e
                );
                return Vec::new();
            }
        };

        let values = extract_multipliers(&text);
        debug!(
            "🔎 Frame {} ({} ms): {:?}",
            frame.frame_number, frame.timestamp_ms, values
        );
        self.stats.values_found += values.len() as u64;
        values
    }

    pub fn stats(&self) -> SamplingStats {
        self.stats
    }

    pub fn reset(&mut self) {
        self.stats = SamplingStats::default();
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// 打开视频并采样；打不开时返回空序列。
///
/// 帧源在本函数内创建并在返回前释放，无论是读完、提前结束还是出错。
pub fn scan_video<S, F>(
    path: &Path,
    open: F,
    config: &SamplingConfig,
    recognizer: &dyn TextRecognizer,
) -> Vec<f64>
where
    S: FrameSource,
    F: FnOnce(&Path) -> Result<S, VideoError>,
{
    let mut source = match open(path) {
        Ok(source) => source,
        Err(e) => {
            warn!("⚠️ Cannot open video {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut sampler = FrameSampler::with_config(config.clone());
    sampler.sample(&mut source, recognizer)
}

pub fn scan_video_file(
    path: &Path,
    config: &SamplingConfig,
    recognizer: &dyn TextRecognizer,
) -> Vec<f64> {
    scan_video(path, FfmpegSource::open, config, recognizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ocr::MockRecognizer;
    use crate::core::video::source::{MemoryFrameSource, VideoInfo};
    use std::cell::Cell;
    use std::rc::Rc;

    fn create_test_frame(width: u32, height: u32, fill: u8, frame_number: u64) -> RgbFrame {
        let data = vec![fill; (width * height * 3) as usize];
        RgbFrame::new(width, height, data, frame_number, frame_number * 33)
    }

    fn create_frames(count: u64) -> Vec<RgbFrame> {
        (0..count)
            .map(|i| create_test_frame(32, 16, (i * 10) as u8, i))
            .collect()
    }

    fn stride(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    /// 记录释放次数的帧源
    struct CountingSource {
        inner: MemoryFrameSource,
        releases: Rc<Cell<u32>>,
        fail_at: Option<u64>,
        read: u64,
    }

    impl FrameSource for CountingSource {
        fn info(&self) -> VideoInfo {
            self.inner.info()
        }

        fn read_frame(&mut self) -> Result<Option<RgbFrame>, VideoError> {
            if Some(self.read) == self.fail_at {
                return Err(VideoError::Decode("corrupt packet".into()));
            }
            self.read += 1;
            self.inner.read_frame()
        }
    }

    impl Drop for CountingSource {
        fn drop(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    fn counting_opener(
        frames: u64,
        fail_at: Option<u64>,
        releases: Rc<Cell<u32>>,
    ) -> impl FnOnce(&Path) -> Result<CountingSource, VideoError> {
        move |_| {
            Ok(CountingSource {
                inner: MemoryFrameSource::new(create_frames(frames)),
                releases,
                fail_at,
                read: 0,
            })
        }
    }

    #[test]
    fn test_stride_selects_every_nth_frame() {
        let mut sampler = FrameSampler::with_config(SamplingConfig::with_stride(stride(5)));
        let recognizer = MockRecognizer::with_texts(vec!["1.10", "2.20", "3.30"]);
        let mut source = MemoryFrameSource::new(create_frames(12));

        let values = sampler.sample(&mut source, &recognizer);

        // 采样帧 0, 5, 10
        assert_eq!(values, vec![1.10, 2.20, 3.30]);
        assert_eq!(recognizer.calls(), 3);
        let stats = sampler.stats();
        assert_eq!(stats.frames_read, 12);
        assert_eq!(stats.frames_sampled, 3);
        assert_eq!(stats.values_found, 3);
    }

    #[test]
    fn test_stride_one_samples_every_frame() {
        let mut sampler = FrameSampler::with_config(SamplingConfig::with_stride(stride(1)));
        let recognizer = MockRecognizer::new();
        let mut source = MemoryFrameSource::new(create_frames(4));

        sampler.sample(&mut source, &recognizer);
        assert_eq!(recognizer.calls(), 4);
    }

    #[test]
    fn test_values_kept_in_discovery_order() {
        let mut sampler = FrameSampler::with_config(SamplingConfig::with_stride(stride(2)));
        let recognizer = MockRecognizer::with_texts(vec!["1.87x 2.10 3.00", "noise 200", "5.55x 1.01x"]);
        let mut source = MemoryFrameSource::new(create_frames(5));

        let values = sampler.sample(&mut source, &recognizer);
        assert_eq!(values, vec![1.87, 2.10, 3.00, 5.55, 1.01]);
    }

    #[test]
    fn test_recognition_failure_is_skipped() {
        let mut sampler = FrameSampler::with_config(SamplingConfig::with_stride(stride(1)));
        let recognizer = MockRecognizer::with_texts(vec!["1.50", "", "2.50"]).failing_at(1);
        let mut source = MemoryFrameSource::new(create_frames(3));

        let values = sampler.sample(&mut source, &recognizer);
        assert_eq!(values, vec![1.50, 2.50]);
        assert_eq!(sampler.stats().recognition_failures, 1);
    }

    #[test]
    fn test_crop_outside_frame_skips_recognition() {
        let config = SamplingConfig {
            frame_stride: stride(1),
            crop_region: Some(CropRegion {
                x: 500,
                y: 500,
                width: 10,
                height: 10,
            }),
            max_samples: None,
        };
        let mut sampler = FrameSampler::with_config(config);
        let recognizer = MockRecognizer::with_texts(vec!["9.99"]);
        let mut source = MemoryFrameSource::new(create_frames(2));

        assert!(sampler.sample(&mut source, &recognizer).is_empty());
        assert_eq!(recognizer.calls(), 0);
        assert_eq!(sampler.stats().frames_sampled, 2);
    }

    #[test]
    fn test_short_frame_buffer_is_skipped() {
        let config = SamplingConfig {
            frame_stride: stride(1),
            crop_region: Some(CropRegion {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            }),
            max_samples: None,
        };
        let mut sampler = FrameSampler::with_config(config);
        let recognizer = MockRecognizer::with_texts(vec!["1.11", "2.22"]);
        let frames = vec![
            RgbFrame::new(4, 4, vec![0u8; 4 * 2 * 3], 0, 0),
            create_test_frame(4, 4, 50, 1),
        ];
        let mut source = MemoryFrameSource::new(frames);

        let values = sampler.sample(&mut source, &recognizer);

        // 残缺帧不送识别，后续正常帧照常处理
        assert_eq!(values, vec![1.11]);
        assert_eq!(recognizer.calls(), 1);
        assert_eq!(sampler.stats().frames_sampled, 2);
    }

    #[test]
    fn test_max_samples_stops_early() {
        let config = SamplingConfig {
            frame_stride: stride(2),
            crop_region: None,
            max_samples: Some(2),
        };
        let mut sampler = FrameSampler::with_config(config);
        let recognizer = MockRecognizer::with_texts(vec!["1.10", "1.20", "1.30"]);
        let mut source = MemoryFrameSource::new(create_frames(10));

        let values = sampler.sample(&mut source, &recognizer);
        assert_eq!(values, vec![1.10, 1.20]);
        assert_eq!(sampler.stats().frames_read, 3);
    }

    #[test]
    fn test_reset_clears_stats() {
        let mut sampler = FrameSampler::with_config(SamplingConfig::with_stride(stride(1)));
        let recognizer = MockRecognizer::new();
        let mut source = MemoryFrameSource::new(create_frames(3));

        sampler.sample(&mut source, &recognizer);
        assert_eq!(sampler.stats().frames_read, 3);

        sampler.reset();
        assert_eq!(sampler.stats(), SamplingStats::default());
    }

    #[test]
    fn test_scan_video_open_failure_returns_empty() {
        let recognizer = MockRecognizer::with_texts(vec!["1.50"]);
        let values = scan_video(
            Path::new("missing.mp4"),
            |p: &Path| -> Result<MemoryFrameSource, VideoError> {
                Err(VideoError::NotFound(p.display().to_string()))
            },
            &SamplingConfig::default(),
            &recognizer,
        );

        assert!(values.is_empty());
        assert_eq!(recognizer.calls(), 0);
    }

    #[test]
    fn test_scan_video_file_missing_path() {
        let recognizer = MockRecognizer::new();
        let values = scan_video_file(
            Path::new("/no/such/history_game.mp4"),
            &SamplingConfig::default(),
            &recognizer,
        );
        assert!(values.is_empty());
    }

    #[test]
    fn test_source_released_once_after_exhaustion() {
        let releases = Rc::new(Cell::new(0));
        let recognizer = MockRecognizer::with_texts(vec!["1.25"]);

        let values = scan_video(
            Path::new("ok.mp4"),
            counting_opener(4, None, releases.clone()),
            &SamplingConfig::with_stride(stride(4)),
            &recognizer,
        );

        assert_eq!(values, vec![1.25]);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_source_released_once_on_early_stop() {
        let releases = Rc::new(Cell::new(0));
        let recognizer = MockRecognizer::new();
        let config = SamplingConfig {
            frame_stride: stride(1),
            crop_region: None,
            max_samples: Some(1),
        };

        scan_video(
            Path::new("ok.mp4"),
            counting_opener(100, None, releases.clone()),
            &config,
            &recognizer,
        );

        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_decode_error_keeps_partial_result() {
        let releases = Rc::new(Cell::new(0));
        let recognizer = MockRecognizer::with_texts(vec!["1.10", "1.20", "1.30"]);

        let values = scan_video(
            Path::new("corrupt.mp4"),
            counting_opener(10, Some(2), releases.clone()),
            &SamplingConfig::with_stride(stride(1)),
            &recognizer,
        );

        assert_eq!(values, vec![1.10, 1.20]);
        assert_eq!(releases.get(), 1);
    }
}
