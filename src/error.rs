use std::path::PathBuf;

/// Errors surfaced by file and canvas operations.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Could not open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid canvas size {width}×{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },
}

pub type DeskResult<T> = Result<T, DeskError>;
