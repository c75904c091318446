//! A safe, pure Rust decoder for BC7 (BPTC) compressed texture blocks.
//!
//! BC7 packs each 4x4 tile of pixels into 16 bytes using one of eight modes
//! with different endpoint precisions, subset counts, and index widths.
//! This crate implements the per-block decoder: it reads a block's mode,
//! shape, rotation, and index selection, reconstructs the endpoint colors,
//! and interpolates the palette indices back to RGBA8 pixels.
//!
//! Decoding a block is bounded work over borrowed data. The mode, partition,
//! anchor, and weight tables are immutable constants, so blocks can be
//! decoded concurrently without shared state.
//!
//! Used information sources:
//! <https://docs.microsoft.com/en-us/windows/win32/direct3d11/bc7-format>
//! <https://docs.microsoft.com/en-us/windows/win32/direct3d11/bc7-format-mode-reference>
//! <https://www.khronos.org/registry/OpenGL/extensions/ARB/ARB_texture_compression_bptc.txt>

mod bits;
mod block;
mod modes;
mod tables;

pub use block::decode_block;

use thiserror::Error;

/// Errors produced while decoding a single block.
///
/// A block produced by a conforming BC7 encoder never fails to decode;
/// these surface corrupt or truncated inputs to the caller.
#[derive(Debug, Error)]
pub enum DecodeBlockError {
    #[error("no mode bit is set in the first byte of the block")]
    InvalidMode,

    #[error("reading {width} bits at bit offset {offset} runs past the end of the block")]
    BitCursorOverflow { offset: usize, width: u8 },

    #[error("rotation index {rotation} is not in the range 0..=3")]
    InvalidRotation { rotation: u8 },
}
