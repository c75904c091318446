use bc7dec::decode_block;

use crate::error::DecodeImageError;

// BC7 lays out 4x4 pixel blocks of 16 bytes each in row-major order.
const BLOCK_WIDTH: usize = 4;
const BLOCK_HEIGHT: usize = 4;
const BLOCK_SIZE_IN_BYTES: usize = 16;
const CHANNELS: usize = 4;

/// Decode the BC7 blocks in `data` to a row-major RGBA8 image.
///
/// `width` and `height` are in pixels and must be multiples of the block
/// dimensions. The output has `width * height * 4` bytes with the top-left
/// pixel first. Data beyond the last block is ignored.
pub fn rgba8_from_bc7(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>, DecodeImageError> {
    let pixel_count = validate_dimensions(width, height)?;

    let mut rgba = vec![0u8; pixel_count * CHANNELS];
    decode_blocks(width as usize, height as usize, data, &mut rgba)?;

    Ok(rgba)
}

/// Decode the BC7 blocks in `data` into a caller supplied buffer of exactly
/// `width * height * 4` bytes.
///
/// On failure the contents of `output` are unspecified and should be
/// discarded.
pub fn rgba8_from_bc7_into(
    width: u32,
    height: u32,
    data: &[u8],
    output: &mut [u8],
) -> Result<(), DecodeImageError> {
    let pixel_count = validate_dimensions(width, height)?;

    let expected = pixel_count * CHANNELS;
    if output.len() != expected {
        return Err(DecodeImageError::UnexpectedBufferSize {
            expected,
            actual: output.len(),
        });
    }

    decode_blocks(width as usize, height as usize, data, output)
}

fn validate_dimensions(width: u32, height: u32) -> Result<usize, DecodeImageError> {
    if width == 0 || height == 0 {
        return Err(DecodeImageError::ZeroSizedImage { width, height });
    }

    if width % BLOCK_WIDTH as u32 != 0 || height % BLOCK_HEIGHT as u32 != 0 {
        return Err(DecodeImageError::NonIntegralDimensionsInBlocks { width, height });
    }

    (width as usize)
        .checked_mul(height as usize)
        .filter(|pixels| pixels.checked_mul(CHANNELS).is_some())
        .ok_or(DecodeImageError::PixelCountWouldOverflow { width, height })
}

fn decode_blocks(
    width: usize,
    height: usize,
    data: &[u8],
    rgba: &mut [u8],
) -> Result<(), DecodeImageError> {
    let expected = (width / BLOCK_WIDTH) * (height / BLOCK_HEIGHT) * BLOCK_SIZE_IN_BYTES;
    if data.len() < expected {
        return Err(DecodeImageError::NotEnoughData {
            expected,
            actual: data.len(),
        });
    }

    let mut block_start = 0;
    for y in (0..height).step_by(BLOCK_HEIGHT) {
        for x in (0..width).step_by(BLOCK_WIDTH) {
            // The length is validated above.
            let block = data[block_start..block_start + BLOCK_SIZE_IN_BYTES]
                .try_into()
                .unwrap();
            let pixels = decode_block(block)?;

            put_rgba_block(rgba, pixels, x, y, width);

            block_start += BLOCK_SIZE_IN_BYTES;
        }
    }

    Ok(())
}

// Place a decoded block into the RGBA image, updating 4 rows.
fn put_rgba_block(
    rgba: &mut [u8],
    pixels: [[[u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT],
    x: usize,
    y: usize,
    width: usize,
) {
    let bytes_per_row = CHANNELS * BLOCK_WIDTH;

    for (row, row_pixels) in pixels.iter().enumerate() {
        // Convert pixel coordinates to byte coordinates.
        let index = ((y + row) * width + x) * CHANNELS;
        rgba[index..index + bytes_per_row].copy_from_slice(bytemuck::cast_slice(row_pixels));
    }
}
