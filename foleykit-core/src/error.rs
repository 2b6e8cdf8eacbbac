//! Error types for foleykit

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoleyError {
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Clip not found: {0}")]
    ClipNotFound(String),
}

pub type Result<T> = std::result::Result<T, FoleyError>;
