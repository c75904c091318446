use crate::bits::BitReader;
use crate::modes::{Mode, ParityKind, MODES};
use crate::tables::{ANCHORS, PARTITIONS, WEIGHTS};
use crate::DecodeBlockError;

const NUM_PIXELS: usize = 16;

const MAX_WEIGHT: u16 = 64;
const WEIGHT_ROUND: u16 = 32;
const WEIGHT_SHIFT: u16 = 6;

/// Decode a single 16 byte BC7 block to a 4x4 tile of RGBA8 pixels.
///
/// The decoded rows are in row-major ordering with channels in R,G,B,A
/// order. Three channel modes decode as fully opaque.
///
/// # Examples
///
/// ```rust
/// // A mode 6 block with all-ones endpoints and zero indices.
/// let block = [
///     0xC0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0, 0, 0, 0, 0, 0, 0,
/// ];
/// let pixels = bc7dec::decode_block(&block).unwrap();
/// assert!(pixels.iter().flatten().all(|&pixel| pixel == [255; 4]));
/// ```
pub fn decode_block(block: &[u8; 16]) -> Result<[[[u8; 4]; 4]; 4], DecodeBlockError> {
    let mut bits = BitReader::new(block);

    let mode = read_mode(&mut bits)?;

    let shape = bits.read(mode.shape_bits)? as usize;
    let rotation = bits.read(mode.rotation_bits)?;
    let swap_index_sets = bits.read(mode.isb_bits)? == 1;

    let endpoints = read_endpoints(&mut bits, mode)?;

    let primary_indices = read_primary_indices(&mut bits, mode, shape)?;
    let secondary_indices = read_secondary_indices(&mut bits, mode)?;

    let primary = PaletteView {
        indices: &primary_indices,
        weights: &WEIGHTS[mode.palette_offset_1..mode.palette_offset_1 + mode.palette_size_1],
    };
    let secondary = match &secondary_indices {
        Some(indices) => PaletteView {
            indices,
            weights: &WEIGHTS[mode.palette_offset_2..mode.palette_offset_2 + mode.palette_size_2],
        },
        // Without a second index stream the alpha channel interpolates with
        // the same weights as the color channels.
        None => PaletteView {
            indices: &primary_indices,
            weights: primary.weights,
        },
    };
    let (color, alpha) = if swap_index_sets {
        (secondary, primary)
    } else {
        (primary, secondary)
    };

    let mut pixels = [[[0u8; 4]; 4]; 4];
    for pixel in 0..NUM_PIXELS {
        let subset = PARTITIONS[mode.subsets - 1][shape][pixel] as usize;
        let [e0, e1] = endpoints[subset];

        let color_weight = color.weight(pixel);
        let alpha_weight = alpha.weight(pixel);

        let mut decoded = [
            interpolate_channel(e0[0], e1[0], color_weight),
            interpolate_channel(e0[1], e1[1], color_weight),
            interpolate_channel(e0[2], e1[2], color_weight),
            interpolate_channel(e0[3], e1[3], alpha_weight),
        ];
        match rotation {
            0 => (),
            1 => decoded.swap(0, 3),
            2 => decoded.swap(1, 3),
            3 => decoded.swap(2, 3),
            _ => return Err(DecodeBlockError::InvalidRotation { rotation }),
        }

        pixels[pixel / 4][pixel % 4] = decoded;
    }

    Ok(pixels)
}

/// The mode number is a unary prefix: the count of zero bits before the
/// first set bit. A block starting with eight zero bits has no mode.
fn read_mode(bits: &mut BitReader) -> Result<&'static Mode, DecodeBlockError> {
    for mode in &MODES {
        if bits.read_bit()? == 1 {
            return Ok(mode);
        }
    }
    Err(DecodeBlockError::InvalidMode)
}

/// Read and reconstruct the endpoint colors of every subset.
///
/// The stream stores endpoints channel-major, then subset, then endpoint.
/// Parity bits follow the last channel and fold in as the low bit of every
/// channel of the endpoints they cover.
fn read_endpoints(
    bits: &mut BitReader,
    mode: &Mode,
) -> Result<[[[u8; 4]; 2]; 3], DecodeBlockError> {
    let mut endpoints = [[[0u8; 4]; 2]; 3];

    let channels = if mode.endpoint_precision[3] == 0 { 3 } else { 4 };

    for channel in 0..channels {
        let width = match mode.parity {
            ParityKind::None => mode.endpoint_precision[channel],
            _ => mode.endpoint_precision[channel] - 1,
        };
        for subset in endpoints.iter_mut().take(mode.subsets) {
            for endpoint in subset.iter_mut() {
                endpoint[channel] = bits.read(width)?;
            }
        }
    }

    match mode.parity {
        ParityKind::None => (),
        ParityKind::Shared => {
            for subset in endpoints.iter_mut().take(mode.subsets) {
                let parity = bits.read_bit()?;
                for endpoint in subset.iter_mut() {
                    fold_parity(endpoint, channels, parity);
                }
            }
        }
        ParityKind::PerEndpoint => {
            for subset in endpoints.iter_mut().take(mode.subsets) {
                for endpoint in subset.iter_mut() {
                    let parity = bits.read_bit()?;
                    fold_parity(endpoint, channels, parity);
                }
            }
        }
    }

    for subset in endpoints.iter_mut().take(mode.subsets) {
        for endpoint in subset.iter_mut() {
            for channel in 0..channels {
                endpoint[channel] =
                    expand_to_8_bits(endpoint[channel], mode.endpoint_precision[channel]);
            }
            if channels == 3 {
                endpoint[3] = 255;
            }
        }
    }

    Ok(endpoints)
}

fn fold_parity(endpoint: &mut [u8; 4], channels: usize, parity: u8) {
    for channel in endpoint.iter_mut().take(channels) {
        *channel = (*channel << 1) | parity;
    }
}

/// Expand a quantized channel to 8 bits by shifting its MSB up to bit 7 and
/// replicating the high bits into the vacated low bits.
///
/// Exact for the precisions BC7 stores (5 to 8 bits including parity), where
/// a single replication fills all vacated bits.
fn expand_to_8_bits(value: u8, precision: u8) -> u8 {
    debug_assert!((5..=8).contains(&precision));
    let shifted = (value as u32) << (8 - precision);
    (shifted | (shifted >> precision)) as u8
}

/// Read the primary palette index of every pixel in raster order.
///
/// Anchor pixels store one fewer bit; their high bit is implicitly zero.
/// Subset 0 is anchored at pixel 0 and the remaining subsets take their
/// anchors from the anchor table.
fn read_primary_indices(
    bits: &mut BitReader,
    mode: &Mode,
    shape: usize,
) -> Result<[u8; NUM_PIXELS], DecodeBlockError> {
    let anchors = &ANCHORS[mode.subsets - 1][shape][..mode.subsets];

    let mut indices = [0u8; NUM_PIXELS];
    for (pixel, index) in indices.iter_mut().enumerate() {
        let anchored = anchors.iter().any(|&anchor| anchor as usize == pixel);
        let width = if anchored {
            mode.index_bits_1 - 1
        } else {
            mode.index_bits_1
        };
        *index = bits.read(width)?;
    }

    Ok(indices)
}

/// Read the secondary palette indices, if the mode stores a second stream.
/// Pixel 0 is the only anchor.
fn read_secondary_indices(
    bits: &mut BitReader,
    mode: &Mode,
) -> Result<Option<[u8; NUM_PIXELS]>, DecodeBlockError> {
    if mode.index_bits_2 == 0 {
        return Ok(None);
    }

    let mut indices = [0u8; NUM_PIXELS];
    for (pixel, index) in indices.iter_mut().enumerate() {
        let width = if pixel == 0 {
            mode.index_bits_2 - 1
        } else {
            mode.index_bits_2
        };
        *index = bits.read(width)?;
    }

    Ok(Some(indices))
}

/// One index stream paired with the weights of its palette.
struct PaletteView<'a> {
    indices: &'a [u8; NUM_PIXELS],
    weights: &'a [u8],
}

impl PaletteView<'_> {
    fn weight(&self, pixel: usize) -> u8 {
        let index = self.indices[pixel] as usize;
        // A conforming stream cannot produce an index outside its palette
        // since the index width never exceeds the palette's bit width.
        debug_assert!(index < self.weights.len());
        self.weights[index]
    }
}

fn interpolate_channel(endpoint_0: u8, endpoint_1: u8, weight: u8) -> u8 {
    let weight_1 = weight as u16;
    let weight_0 = MAX_WEIGHT - weight_1;

    let channel =
        (endpoint_0 as u16 * weight_0 + endpoint_1 as u16 * weight_1 + WEIGHT_ROUND) >> WEIGHT_SHIFT;
    channel as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Packs bit fields into a block low to high, mirroring the reader.
    struct BlockWriter {
        bytes: [u8; 16],
        cursor: usize,
    }

    impl BlockWriter {
        fn new() -> Self {
            Self {
                bytes: [0u8; 16],
                cursor: 0,
            }
        }

        fn push(&mut self, value: u8, width: u8) {
            assert!(width <= 8);
            for bit in 0..width {
                if value >> bit & 1 == 1 {
                    self.bytes[self.cursor / 8] |= 1 << (self.cursor % 8);
                }
                self.cursor += 1;
            }
            assert!(self.cursor <= 128);
        }

        fn mode(&mut self, mode: u8) {
            for _ in 0..mode {
                self.push(0, 1);
            }
            self.push(1, 1);
        }

        fn finish(self) -> [u8; 16] {
            assert_eq!(128, self.cursor);
            self.bytes
        }
    }

    #[test]
    fn mode_6_solid_white() {
        let mut writer = BlockWriter::new();
        writer.mode(6);
        for _channel in 0..4 {
            for _endpoint in 0..2 {
                writer.push(127, 7);
            }
        }
        // Parity bits complete both endpoints to 255.
        writer.push(1, 1);
        writer.push(1, 1);
        writer.push(0, 3);
        for _pixel in 1..16 {
            writer.push(0, 4);
        }
        let block = writer.finish();

        assert_eq!(
            [0xC0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0, 0, 0, 0, 0, 0, 0],
            block
        );

        let pixels = decode_block(&block).unwrap();
        assert!(pixels.iter().flatten().all(|&pixel| pixel == [255; 4]));
    }

    #[test]
    fn mode_6_zero_payload_is_transparent_black() {
        // Zero endpoints include the alpha channel.
        let mut block = [0u8; 16];
        block[0] = 0x40;

        let pixels = decode_block(&block).unwrap();
        assert!(pixels.iter().flatten().all(|&pixel| pixel == [0; 4]));
    }

    #[test]
    fn zeroed_first_byte_has_no_mode() {
        let block = [0u8; 16];
        assert!(matches!(
            decode_block(&block),
            Err(DecodeBlockError::InvalidMode)
        ));

        // The mode prefix only spans the first 8 bits.
        let mut block = [0xFFu8; 16];
        block[0] = 0;
        assert!(matches!(
            decode_block(&block),
            Err(DecodeBlockError::InvalidMode)
        ));
    }

    #[test]
    fn mode_0_shape_0_follows_the_partition_table() {
        // Three subsets with distinct first endpoints and zero indices, so
        // every pixel decodes to its subset's first endpoint.
        let subset_reds = [0u8, 15, 0];
        let subset_greens = [0u8, 0, 15];

        let mut writer = BlockWriter::new();
        writer.mode(0);
        writer.push(0, 4);
        for values in [subset_reds, subset_greens, [0u8; 3]] {
            for value in values {
                writer.push(value, 4);
                writer.push(0, 4);
            }
        }
        for _ in 0..6 {
            writer.push(0, 1);
        }
        // Anchors for three subsets at shape 0 are pixels 0, 3, and 15.
        for pixel in 0..16u8 {
            let width = if pixel == 0 || pixel == 3 || pixel == 15 {
                2
            } else {
                3
            };
            writer.push(0, width);
        }
        let block = writer.finish();

        let pixels = decode_block(&block).unwrap();

        // A 4 bit value of 15 with a zero parity bit expands to 247.
        let expected = [
            [0u8, 0, 0, 255],
            [247, 0, 0, 255],
            [0, 247, 0, 255],
        ];
        for (pixel, &subset) in PARTITIONS[2][0].iter().enumerate() {
            assert_eq!(
                expected[subset as usize],
                pixels[pixel / 4][pixel % 4],
                "pixel {pixel}"
            );
        }
    }

    #[test]
    fn mode_1_anchor_indices_read_one_fewer_bit() {
        // All-ones index bits decode to index 7 for full width pixels but
        // only index 3 for the two anchors of shape 0 (pixels 0 and 15).
        let mut writer = BlockWriter::new();
        writer.mode(1);
        writer.push(0, 6);
        for _channel in 0..3 {
            for _subset in 0..2 {
                writer.push(0, 6);
                writer.push(63, 6);
            }
        }
        // Shared parity bits for both subsets.
        writer.push(1, 1);
        writer.push(1, 1);
        for pixel in 0..16u8 {
            let width = if pixel == 0 || pixel == 15 { 2 } else { 3 };
            writer.push(0xFF, width);
        }
        let block = writer.finish();

        let pixels = decode_block(&block).unwrap();

        // Endpoints expand to 2 and 255. Weight 64 lands on the second
        // endpoint while the anchors' weight 27 interpolates to 109.
        for pixel in 0..16 {
            let expected = if pixel == 0 || pixel == 15 {
                [109, 109, 109, 255]
            } else {
                [255, 255, 255, 255]
            };
            assert_eq!(expected, pixels[pixel / 4][pixel % 4], "pixel {pixel}");
        }
    }

    fn mode_5_gradient_block(rotation: u8) -> [u8; 16] {
        let mut writer = BlockWriter::new();
        writer.mode(5);
        writer.push(rotation, 2);
        for (endpoint_0, endpoint_1) in [(10, 50), (20, 60), (30, 70)] {
            writer.push(endpoint_0, 7);
            writer.push(endpoint_1, 7);
        }
        writer.push(100, 8);
        writer.push(200, 8);
        for stream in 0..2u8 {
            for pixel in 0..16u8 {
                let width = if pixel == 0 { 1 } else { 2 };
                writer.push(1 + stream, width);
            }
        }
        writer.finish()
    }

    #[test]
    fn rotation_1_swaps_red_and_alpha() {
        let expected = decode_block(&mode_5_gradient_block(0)).unwrap();
        let rotated = decode_block(&mode_5_gradient_block(1)).unwrap();

        for (expected_row, rotated_row) in expected.iter().zip(&rotated) {
            for (&[r, g, b, a], &rotated_pixel) in expected_row.iter().zip(rotated_row) {
                assert_eq!([a, g, b, r], rotated_pixel);
            }
        }
    }

    #[test]
    fn rotation_0_matches_the_unrotated_layout() {
        let expected = decode_block(&mode_5_gradient_block(0)).unwrap();
        // Alpha differs from every color channel, so a swap would show.
        assert_ne!(expected[0][0][0], expected[0][0][3]);
        assert_eq!(expected, decode_block(&mode_5_gradient_block(0)).unwrap());
    }

    fn mode_4_block(index_selection: u8) -> [u8; 16] {
        let mut writer = BlockWriter::new();
        writer.mode(4);
        writer.push(0, 2);
        writer.push(index_selection, 1);
        for _channel in 0..3 {
            writer.push(0, 5);
            writer.push(31, 5);
        }
        writer.push(0, 6);
        writer.push(63, 6);
        // Primary indices all 0, secondary indices all maxed.
        for pixel in 0..16u8 {
            let width = if pixel == 0 { 1 } else { 2 };
            writer.push(0, width);
        }
        for pixel in 0..16u8 {
            let width = if pixel == 0 { 2 } else { 3 };
            writer.push(0xFF, width);
        }
        writer.finish()
    }

    #[test]
    fn index_selection_swaps_the_index_streams() {
        // Color runs from black to white and alpha from transparent to
        // opaque. With the primary indices at 0 and the secondary maxed,
        // swapping the streams flips which channels land on which end. The
        // secondary anchor only holds index 3, which interpolates to 108.
        let pixels = decode_block(&mode_4_block(0)).unwrap();
        for pixel in 0..16 {
            let alpha = if pixel == 0 { 108 } else { 255 };
            assert_eq!([0, 0, 0, alpha], pixels[pixel / 4][pixel % 4]);
        }

        let swapped = decode_block(&mode_4_block(1)).unwrap();
        for pixel in 0..16 {
            let color = if pixel == 0 { 108 } else { 255 };
            assert_eq!([color, color, color, 0], swapped[pixel / 4][pixel % 4]);
        }
    }

    #[test]
    fn expansion_replicates_high_bits() {
        for precision in 5..=8u8 {
            let max = ((1u16 << precision) - 1) as u8;
            assert_eq!(0, expand_to_8_bits(0, precision));
            assert_eq!(255, expand_to_8_bits(max, precision));

            for value in 0..=max {
                let expanded = expand_to_8_bits(value, precision);
                // The top bits survive the round trip exactly.
                assert_eq!(value, expanded >> (8 - precision));
            }
        }
    }

    #[test]
    fn expansion_is_monotone() {
        for precision in 5..=8u8 {
            let max = ((1u16 << precision) - 1) as u8;
            for value in 1..=max {
                assert!(expand_to_8_bits(value - 1, precision) < expand_to_8_bits(value, precision));
            }
        }
    }

    #[test]
    fn interpolation_is_monotone_in_the_weight() {
        for (endpoint_0, endpoint_1) in [(0u8, 255u8), (10, 200), (100, 101), (42, 42)] {
            let palette = &WEIGHTS[12..28];
            for weights in palette.windows(2) {
                assert!(
                    interpolate_channel(endpoint_0, endpoint_1, weights[0])
                        <= interpolate_channel(endpoint_0, endpoint_1, weights[1])
                );
            }
        }
    }

    #[test]
    fn interpolation_endpoints_are_exact() {
        for (endpoint_0, endpoint_1) in [(0u8, 255u8), (255, 0), (17, 93)] {
            assert_eq!(endpoint_0, interpolate_channel(endpoint_0, endpoint_1, 0));
            assert_eq!(endpoint_1, interpolate_channel(endpoint_0, endpoint_1, 64));
        }
    }
}
