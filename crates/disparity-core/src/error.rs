use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid directory pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image '{}' has no pixels", path.display())]
    EmptyImage { path: PathBuf },
}
