//! 帧来源 - 把视频文件解码成顺序的 RGB 帧
//!
//! 解码交给外部 ffmpeg 进程，子进程即视频句柄：
//! 读到流末尾或 Drop 时释放，且只释放一次。

use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use log::{debug, info, warn};
use serde::Deserialize;

use super::error::VideoError;
use super::frame::RgbFrame;

const FFPROBE_BIN: &str = "ffprobe";
const FFMPEG_BIN: &str = "ffmpeg";
const FALLBACK_FPS: f64 = 30.0;

/// 视频流元数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl VideoInfo {
    pub fn frame_size(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 3
    }

    pub fn timestamp_ms(&self, frame_number: u64) -> u64 {
        if self.fps > 0.0 {
            (frame_number as f64 * 1000.0 / self.fps) as u64
        } else {
            0
        }
    }
}

pub trait FrameSource {
    fn info(&self) -> VideoInfo;

    /// 读取下一帧，`Ok(None)` 表示流已结束
    fn read_frame(&mut self) -> Result<Option<RgbFrame>, VideoError>;
}

/// ffmpeg 解码源
pub struct FfmpegSource {
    path: String,
    info: VideoInfo,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    next_frame: u64,
}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self, VideoError> {
        let display = path.display().to_string();
        if !path.is_file() {
            return Err(VideoError::NotFound(display));
        }

        let info = probe(path)?;
        info!(
            "🎬 FfmpegSource: {} ({}x{} @ {:.2} fps)",
            display, info.width, info.height, info.fps
        );

        let child = decoder_command(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        Self::from_child(display, info, child)
    }

    /// 接管已启动的解码进程，stdout 须为管道
    fn from_child(path: String, info: VideoInfo, mut child: Child) -> Result<Self, VideoError> {
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(VideoError::Decode("decoder stdout unavailable".into()));
            }
        };

        Ok(Self {
            path,
            info,
            child: Some(child),
            stdout: Some(stdout),
            next_frame: 0,
        })
    }

    /// 释放解码进程，返回本次是否真正释放
    fn release(&mut self, stream_finished: bool) -> bool {
        // 先关闭管道，避免解码进程阻塞在写入上
        self.stdout = None;

        let Some(mut child) = self.child.take() else {
            return false;
        };

        if !stream_finished {
            let _ = child.kill();
        }
        match child.wait() {
            Ok(status) if stream_finished && !status.success() => {
                warn!("⚠️ ffmpeg exited with {} for {}", status, self.path);
            }
            Ok(_) => {}
            Err(e) => warn!("⚠️ Failed to reap ffmpeg for {}: {}", self.path, e),
        }

        info!(
            "🗑️ FfmpegSource: released {} after {} frames",
            self.path, self.next_frame
        );
        true
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&mut self) -> Result<Option<RgbFrame>, VideoError> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let frame_size = self.info.frame_size();
        let mut buf = vec![0u8; frame_size];

        match read_full(stdout, &mut buf) {
            Ok(n) if n == frame_size => {
                let frame_number = self.next_frame;
                self.next_frame += 1;
                Ok(Some(RgbFrame::new(
                    self.info.width,
                    self.info.height,
                    buf,
                    frame_number,
                    self.info.timestamp_ms(frame_number),
                )))
            }
            Ok(0) => {
                debug!("📭 End of stream: {}", self.path);
                self.release(true);
                Ok(None)
            }
            Ok(n) => {
                warn!(
                    "⚠️ Truncated frame {} in {} ({} of {} bytes)",
                    self.next_frame, self.path, n, frame_size
                );
                self.release(true);
                Ok(None)
            }
            Err(e) => {
                self.release(false);
                Err(VideoError::Io(e))
            }
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.release(false);
    }
}

/// 只解码第一路视频流，关闭自动旋转，保证输出尺寸与 ffprobe 一致
fn decoder_command(path: &Path) -> Command {
    let mut command = Command::new(FFMPEG_BIN);
    command
        .args(["-nostdin", "-v", "error", "-noautorotate", "-i"])
        .arg(path)
        .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"]);
    command
}

/// 读满 buf 或读到 EOF，返回实际读取的字节数
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

fn probe(path: &Path) -> Result<VideoInfo, VideoError> {
    let output = Command::new(FFPROBE_BIN)
        .args(["-v", "error", "-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height,r_frame_rate"])
        .args(["-of", "json"])
        .arg(path)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(VideoError::Probe(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout), &path.display().to_string())
}

fn parse_probe_output(json: &str, path: &str) -> Result<VideoInfo, VideoError> {
    let parsed: ProbeOutput = serde_json::from_str(json)?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| VideoError::NoVideoStream(path.to_string()))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            let fps = stream
                .r_frame_rate
                .as_deref()
                .and_then(parse_frame_rate)
                .unwrap_or(FALLBACK_FPS);
            Ok(VideoInfo { width, height, fps })
        }
        _ => Err(VideoError::NoVideoStream(path.to_string())),
    }
}

/// 解析 "30000/1001" 形式的帧率
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((num, den)) => (num.trim().parse::<f64>().ok()?, den.trim().parse::<f64>().ok()?),
        None => (rate.trim().parse::<f64>().ok()?, 1.0),
    };

    if num > 0.0 && den > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

/// 内存帧源，用于测试和嵌入场景
pub struct MemoryFrameSource {
    info: VideoInfo,
    frames: std::vec::IntoIter<RgbFrame>,
}

impl MemoryFrameSource {
    pub fn new(frames: Vec<RgbFrame>) -> Self {
        let info = frames
            .first()
            .map(|f| VideoInfo {
                width: f.width,
                height: f.height,
                fps: FALLBACK_FPS,
            })
            .unwrap_or(VideoInfo {
                width: 0,
                height: 0,
                fps: FALLBACK_FPS,
            });

        Self {
            info,
            frames: frames.into_iter(),
        }
    }
}

impl FrameSource for MemoryFrameSource {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&mut self) -> Result<Option<RgbFrame>, VideoError> {
        Ok(self.frames.next())
    }
}
