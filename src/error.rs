use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No render surface available to attach the timeline to")]
    NoRenderSurface,
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unresolvable thumbnail url: {0}")]
    Unresolved(String),
}
