use thiserror::Error;

pub use bc7dec::DecodeBlockError;

/// Errors produced while decoding a compressed image.
#[derive(Debug, Error)]
pub enum DecodeImageError {
    #[error("image dimensions {width} x {height} contain no pixels")]
    ZeroSizedImage { width: u32, height: u32 },

    #[error("image dimensions {width} x {height} are not divisible by the block dimensions 4 x 4")]
    NonIntegralDimensionsInBlocks { width: u32, height: u32 },

    #[error("image pixel count {width} x {height} would overflow")]
    PixelCountWouldOverflow { width: u32, height: u32 },

    #[error("expected compressed data to have at least {expected} bytes but found {actual}")]
    NotEnoughData { expected: usize, actual: usize },

    #[error("expected an output buffer of {expected} bytes but found {actual}")]
    UnexpectedBufferSize { expected: usize, actual: usize },

    #[error("error decoding block: {0}")]
    Block(#[from] DecodeBlockError),
}
