use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to start OCR engine: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Image encode error: {0}")]
    Encode(#[from] image::ImageError),
    #[error("OCR engine failed: {0}")]
    EngineFailed(String),
    #[error("OCR output is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}
