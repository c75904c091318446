/// How a mode folds parity bits into its endpoints.
///
/// A parity bit becomes the least significant bit of every channel of the
/// endpoints it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParityKind {
    None,
    /// One bit per subset, shared by both of its endpoints.
    Shared,
    /// One bit per endpoint.
    PerEndpoint,
}

/// Bit layout of one of the eight BC7 modes.
pub(crate) struct Mode {
    /// Full precision of each endpoint channel in R,G,B,A order, counting
    /// the parity bit where the mode has one. An alpha precision of 0 means
    /// the mode stores no alpha and decodes as fully opaque.
    pub endpoint_precision: [u8; 4],
    pub subsets: usize,
    pub shape_bits: u8,
    pub rotation_bits: u8,
    pub isb_bits: u8,
    pub parity: ParityKind,
    pub index_bits_1: u8,
    pub palette_size_1: usize,
    pub palette_offset_1: usize,
    pub index_bits_2: u8,
    pub palette_size_2: usize,
    pub palette_offset_2: usize,
}

// Mode CB AB NS PB RB ISB Parity        IB1 IB2
// ---- -- -- -- -- -- --- ------------  --- ---
// 0    4  0  3  4  0  0   per-endpoint  3   0
// 1    6  0  2  6  0  0   shared        3   0
// 2    5  0  3  6  0  0   none          2   0
// 3    7  0  2  6  0  0   per-endpoint  2   0
// 4    5  6  1  0  2  1   none          2   3
// 5    7  8  1  0  2  0   none          2   2
// 6    7  7  1  0  0  0   per-endpoint  4   0
// 7    5  5  2  6  0  0   per-endpoint  2   0
pub(crate) static MODES: [Mode; 8] = [
    // Mode 0
    Mode {
        endpoint_precision: [5, 5, 5, 0],
        subsets: 3,
        shape_bits: 4,
        rotation_bits: 0,
        isb_bits: 0,
        parity: ParityKind::PerEndpoint,
        index_bits_1: 3,
        palette_size_1: 8,
        palette_offset_1: 4,
        index_bits_2: 0,
        palette_size_2: 0,
        palette_offset_2: 0,
    },
    // Mode 1
    Mode {
        endpoint_precision: [7, 7, 7, 0],
        subsets: 2,
        shape_bits: 6,
        rotation_bits: 0,
        isb_bits: 0,
        parity: ParityKind::Shared,
        index_bits_1: 3,
        palette_size_1: 8,
        palette_offset_1: 4,
        index_bits_2: 0,
        palette_size_2: 0,
        palette_offset_2: 0,
    },
    // Mode 2
    Mode {
        endpoint_precision: [5, 5, 5, 0],
        subsets: 3,
        shape_bits: 6,
        rotation_bits: 0,
        isb_bits: 0,
        parity: ParityKind::None,
        index_bits_1: 2,
        palette_size_1: 4,
        palette_offset_1: 0,
        index_bits_2: 0,
        palette_size_2: 0,
        palette_offset_2: 0,
    },
    // Mode 3
    Mode {
        endpoint_precision: [8, 8, 8, 0],
        subsets: 2,
        shape_bits: 6,
        rotation_bits: 0,
        isb_bits: 0,
        parity: ParityKind::PerEndpoint,
        index_bits_1: 2,
        palette_size_1: 4,
        palette_offset_1: 0,
        index_bits_2: 0,
        palette_size_2: 0,
        palette_offset_2: 0,
    },
    // Mode 4
    Mode {
        endpoint_precision: [5, 5, 5, 6],
        subsets: 1,
        shape_bits: 0,
        rotation_bits: 2,
        isb_bits: 1,
        parity: ParityKind::None,
        index_bits_1: 2,
        palette_size_1: 4,
        palette_offset_1: 0,
        index_bits_2: 3,
        palette_size_2: 8,
        palette_offset_2: 4,
    },
    // Mode 5
    Mode {
        endpoint_precision: [7, 7, 7, 8],
        subsets: 1,
        shape_bits: 0,
        rotation_bits: 2,
        isb_bits: 0,
        parity: ParityKind::None,
        index_bits_1: 2,
        palette_size_1: 4,
        palette_offset_1: 0,
        index_bits_2: 2,
        palette_size_2: 4,
        palette_offset_2: 0,
    },
    // Mode 6
    Mode {
        endpoint_precision: [8, 8, 8, 8],
        subsets: 1,
        shape_bits: 0,
        rotation_bits: 0,
        isb_bits: 0,
        parity: ParityKind::PerEndpoint,
        index_bits_1: 4,
        palette_size_1: 16,
        palette_offset_1: 12,
        index_bits_2: 0,
        palette_size_2: 0,
        palette_offset_2: 0,
    },
    // Mode 7
    Mode {
        endpoint_precision: [6, 6, 6, 6],
        subsets: 2,
        shape_bits: 6,
        rotation_bits: 0,
        isb_bits: 0,
        parity: ParityKind::PerEndpoint,
        index_bits_1: 2,
        palette_size_1: 4,
        palette_offset_1: 0,
        index_bits_2: 0,
        palette_size_2: 0,
        palette_offset_2: 0,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_fields_fill_the_block_exactly() {
        // Every well formed block consumes all 128 bits.
        for (index, mode) in MODES.iter().enumerate() {
            let channels = if mode.endpoint_precision[3] == 0 { 3 } else { 4 };
            let parity_adjust = match mode.parity {
                ParityKind::None => 0,
                _ => 1,
            };
            let parity_bits = match mode.parity {
                ParityKind::None => 0,
                ParityKind::Shared => mode.subsets,
                ParityKind::PerEndpoint => 2 * mode.subsets,
            };

            let endpoint_bits: usize = (0..channels)
                .map(|c| 2 * mode.subsets * (mode.endpoint_precision[c] as usize - parity_adjust))
                .sum();
            // One anchor pixel per subset loses one bit from the primary
            // stream; the secondary stream has a single anchor.
            let index_bits_1 = 16 * mode.index_bits_1 as usize - mode.subsets;
            let index_bits_2 = if mode.index_bits_2 > 0 {
                16 * mode.index_bits_2 as usize - 1
            } else {
                0
            };

            let total = (index + 1)
                + mode.shape_bits as usize
                + mode.rotation_bits as usize
                + mode.isb_bits as usize
                + endpoint_bits
                + parity_bits
                + index_bits_1
                + index_bits_2;
            assert_eq!(128, total, "mode {index}");
        }
    }

    #[test]
    fn palette_sizes_match_index_widths() {
        for mode in &MODES {
            assert_eq!(1 << mode.index_bits_1, mode.palette_size_1);
            if mode.index_bits_2 > 0 {
                assert_eq!(1 << mode.index_bits_2, mode.palette_size_2);
            }
        }
    }
}
