//! # Introduction
//! BC7 is a fixed-rate lossy compression format for GPU textures: each 4x4
//! tile of pixels is stored in 16 bytes. Hardware samples the compressed
//! data directly, but image editors, asset pipelines, and rendering contexts
//! without BC7 support need the pixels back in an uncompressed layout.
//!
//! bc7_tex decodes BC7 compressed data to RGBA8 images. The per-block
//! decoding lives in the [bc7dec] crate; this crate validates image
//! dimensions, tiles the block decoder across the image, and reports
//! failures through [error::DecodeImageError].
//!
//! Blocks are independent, so decoding needs no state beyond the output
//! buffer. Callers that manage their own memory can use
//! [rgba8_from_bc7_into] to decode into an existing allocation.
//!
//! # Examples
//!
//! ```rust
//! // Decode a 4x4 image from a single compressed block.
//! let block = [
//!     0xC0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0, 0, 0, 0, 0, 0, 0,
//! ];
//! let rgba = bc7_tex::rgba8_from_bc7(4, 4, &block).unwrap();
//! assert_eq!(vec![255u8; 4 * 4 * 4], rgba);
//! ```

mod decode;

pub mod error;

pub use decode::{rgba8_from_bc7, rgba8_from_bc7_into};
