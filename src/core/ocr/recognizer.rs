use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{GrayImage, ImageOutputFormat};
use log::debug;

use super::error::OcrError;
use crate::core::config::OcrConfig;

/// 文字识别能力：输入灰度图区域，输出非结构化文本
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// 调用 tesseract 可执行文件，图像以 PNG 经 stdin 传入
pub struct TesseractRecognizer {
    binary: PathBuf,
    psm: u8,
    configs: Vec<String>,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self::from_config(&OcrConfig::default())
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            psm: config.psm,
            configs: config.configs.clone(),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
        ];
        args.extend(self.configs.iter().cloned());
        args
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageOutputFormat::Png)?;

        let mut child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // 引擎提前退出时写入会失败，此时仍须回收子进程
            if let Err(e) = stdin.write_all(png.get_ref()) {
                drop(stdin);
                let _ = child.kill();
                let status = child.wait();
                return Err(OcrError::EngineFailed(format!(
                    "failed to send image to {}: {} ({:?})",
                    self.binary.display(),
                    e,
                    status
                )));
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OcrError::EngineFailed(format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8(output.stdout)?;
        debug!(
            "🔤 tesseract read {:?} from {}x{}",
            text.trim(),
            image.width(),
            image.height()
        );
        Ok(text)
    }
}

pub struct MockRecognizer {
    // 按调用顺序返回的文本，超出后返回空串
    texts: Vec<Result<String, String>>,
    calls: AtomicUsize,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            texts: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_texts<S: Into<String>>(texts: Vec<S>) -> Self {
        Self {
            texts: texts.into_iter().map(|t| Ok(t.into())).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// 在指定调用序号上返回识别失败
    pub fn failing_at(mut self, call_index: usize) -> Self {
        if self.texts.len() <= call_index {
            self.texts.resize(call_index + 1, Ok(String::new()));
        }
        self.texts[call_index] = Err(format!("mock failure at call {}", call_index));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<String, OcrError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.texts.get(index) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(OcrError::EngineFailed(message.clone())),
            None => Ok(String::new()),
        }
    }
}
