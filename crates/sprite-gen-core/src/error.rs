use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("The path '{}' does not exist or is not a directory", .0.display())]
    PathNotFound(PathBuf),
    #[error("No images found")]
    NoFragments,
    #[error("Canvas size overflows u32 while laying out the {class} group")]
    CanvasOverflow { class: &'static str },
    #[error("Canvas {width}x{height} exceeds the limit of {limit} pixels")]
    CanvasTooLarge { width: u32, height: u32, limit: u64 },
}

pub type Result<T> = std::result::Result<T, SpriteError>;

/// Per-file failure while probing a fragment's dimensions and format.
///
/// These never abort a run: the collector logs them and drops the fragment.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot read image header of {}: {source}", path.display())]
    Header {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{} is not a PNG, GIF or JPEG image", path.display())]
    Unsupported { path: PathBuf },
    #[error("{} has a zero dimension ({width}x{height})", path.display())]
    Empty {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}
