use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Video not found: {0}")]
    NotFound(String),
    #[error("Probe failed: {0}")]
    Probe(String),
    #[error("Probe output error: {0}")]
    ProbeOutput(#[from] serde_json::Error),
    #[error("No video stream in {0}")]
    NoVideoStream(String),
    #[error("Decoder error: {0}")]
    Decode(String),
}
