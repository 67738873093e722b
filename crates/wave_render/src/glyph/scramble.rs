//! Deterministic block permutation of rendered glyph bitmaps.
//!
//! A glyph is cut into a square grid of equal blocks and the blocks are moved
//! according to a permutation derived only from the grid size and the
//! character's codepoint. The same `(width, height, codepoint)` always yields
//! the same arrangement.

use image::RgbaImage;

const BYTES_PER_PIXEL: usize = 4;

/// Smallest glyph side that is scrambled at all.
const MIN_GLYPH_SIDE: u32 = 8;

/// Grid sizes, also reused as step sizes by the swap and walk stages.
const GRID_TERMS: [usize; 3] = [5, 8, 13];

/// Multipliers and increments for the base permutation.
const LCG_TERMS: [usize; 6] = [13, 21, 34, 55, 89, 144];

const MIN_GRID: usize = 8;
const FALLBACK_GRID: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    /// Blocks per side.
    pub size: usize,
    pub block_width: usize,
    pub block_height: usize,
}

impl BlockGrid {
    /// Picks the grid for a glyph, or `None` when the glyph is too small to scramble.
    pub fn for_glyph(width: u32, height: u32, codepoint: u32) -> Option<Self> {
        if width < MIN_GLYPH_SIDE || height < MIN_GLYPH_SIDE {
            return None;
        }

        let (width, height) = (width as usize, height as usize);
        let preferred = GRID_TERMS[codepoint as usize % GRID_TERMS.len()].max(MIN_GRID);

        [preferred, FALLBACK_GRID]
            .into_iter()
            .map(|size| BlockGrid { size, block_width: width / size, block_height: height / size })
            .find(|grid| grid.block_width > 0 && grid.block_height > 0)
    }

    pub fn blocks(&self) -> usize {
        self.size * self.size
    }

    /// Top-left pixel of a block.
    fn origin(&self, index: usize) -> (usize, usize) {
        ((index % self.size) * self.block_width, (index / self.size) * self.block_height)
    }
}

/// Destination block index -> source block index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockPermutation {
    grid: BlockGrid,
    sources: Vec<usize>,
}

impl BlockPermutation {
    pub fn new(grid: BlockGrid, codepoint: u32) -> Self {
        let seed = codepoint as usize;
        let mut sources = base_sources(grid.blocks(), seed);

        let stages = 3 + seed % 5;
        for stage in 0..stages {
            match (seed + stage * LCG_TERMS[stage % LCG_TERMS.len()]) % 5 {
                0 => reverse_sections(&mut sources, grid.size / 2),
                1 => rotate_rings(&mut sources, grid.size),
                2 => step_swap(&mut sources, GRID_TERMS[stage % GRID_TERMS.len()]),
                3 => checkerboard_transpose(&mut sources, grid.size),
                _ => bounded_walk(
                    &mut sources,
                    (seed + stage) % grid.blocks(),
                    GRID_TERMS[(stage + 1) % GRID_TERMS.len()],
                ),
            }
        }

        Self { grid, sources }
    }

    pub fn for_glyph(width: u32, height: u32, codepoint: u32) -> Option<Self> {
        BlockGrid::for_glyph(width, height, codepoint).map(|grid| Self::new(grid, codepoint))
    }

    pub fn grid(&self) -> BlockGrid {
        self.grid
    }

    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    /// Rearranges a tightly packed RGBA buffer in place.
    ///
    /// Rows or columns that would fall outside the bitmap are clipped; pixels
    /// past the last full block are left untouched.
    pub fn apply(&self, pixels: &mut [u8], width: usize, height: usize) {
        let stride = width * BYTES_PER_PIXEL;
        let original = pixels.to_vec();

        for (dst, &src) in self.sources.iter().enumerate() {
            let (src_x, src_y) = self.grid.origin(src);
            let (dst_x, dst_y) = self.grid.origin(dst);

            let columns = self
                .grid
                .block_width
                .min(width.saturating_sub(src_x))
                .min(width.saturating_sub(dst_x));
            if columns == 0 {
                continue;
            }
            let row_len = columns * BYTES_PER_PIXEL;

            for y in 0..self.grid.block_height {
                if src_y + y >= height || dst_y + y >= height {
                    break;
                }

                let src_start = (src_y + y) * stride + src_x * BYTES_PER_PIXEL;
                let dst_start = (dst_y + y) * stride + dst_x * BYTES_PER_PIXEL;

                let (Some(from), Some(to)) = (
                    original.get(src_start..src_start + row_len),
                    pixels.get_mut(dst_start..dst_start + row_len),
                ) else {
                    continue;
                };
                to.copy_from_slice(from);
            }
        }
    }
}

/// Scrambles a glyph image in place. Returns `false` when the glyph was left as is.
pub fn scramble_glyph(image: &mut RgbaImage, codepoint: u32) -> bool {
    let (width, height) = image.dimensions();
    scramble_pixels(image, width, height, codepoint)
}

/// Scrambles a raw `width * height * 4` RGBA buffer in place.
pub fn scramble_pixels(pixels: &mut [u8], width: u32, height: u32, codepoint: u32) -> bool {
    let expected = width as usize * height as usize * BYTES_PER_PIXEL;
    if pixels.len() < expected {
        return false;
    }

    let Some(permutation) = BlockPermutation::for_glyph(width, height, codepoint) else {
        return false;
    };

    permutation.apply(&mut pixels[..expected], width as usize, height as usize);
    true
}

fn base_sources(blocks: usize, seed: usize) -> Vec<usize> {
    let multiplier = LCG_TERMS[seed % LCG_TERMS.len()];
    let increment = LCG_TERMS[(seed + 1) % LCG_TERMS.len()];
    let offset = (increment % blocks) * (seed % blocks) % blocks;

    (0..blocks).map(|i| (multiplier * i + offset) % blocks).collect()
}

fn reverse_sections(sources: &mut [usize], section: usize) {
    if section == 0 {
        return;
    }
    for chunk in sources.chunks_mut(section) {
        chunk.reverse();
    }
}

/// Rotates every concentric ring of the grid by one position, clockwise.
fn rotate_rings(sources: &mut [usize], size: usize) {
    for layer in 0..size / 2 {
        let positions = ring_positions(size, layer);
        let mut values: Vec<usize> = positions.iter().map(|&pos| sources[pos]).collect();
        values.rotate_right(1);
        for (&pos, value) in positions.iter().zip(values) {
            sources[pos] = value;
        }
    }
}

/// Ring cells in clockwise order starting at the top-left corner.
fn ring_positions(size: usize, layer: usize) -> Vec<usize> {
    let last = size - layer - 1;
    let mut positions = Vec::with_capacity(4 * (last - layer));

    positions.extend((layer..=last).map(|col| layer * size + col));
    positions.extend((layer + 1..=last).map(|row| row * size + last));
    if last > layer {
        positions.extend((layer..last).rev().map(|col| last * size + col));
        positions.extend((layer + 1..last).rev().map(|row| row * size + layer));
    }

    positions
}

fn step_swap(sources: &mut [usize], step: usize) {
    let mut i = 0;
    while i + step < sources.len() {
        sources.swap(i, i + step);
        i += step;
    }
}

fn checkerboard_transpose(sources: &mut [usize], size: usize) {
    for row in 0..size {
        for col in 0..size {
            if (row + col) % 2 != 0 {
                continue;
            }
            let transposed = col * size + row;
            if transposed < sources.len() {
                sources.swap(row * size + col, transposed);
            }
        }
    }
}

fn bounded_walk(sources: &mut [usize], start: usize, steps: usize) {
    let blocks = sources.len();
    let mut pos = start;
    for step in 0..steps {
        if pos + 1 >= blocks {
            break;
        }
        let next = (pos + GRID_TERMS[step % GRID_TERMS.len()]) % blocks;
        sources.swap(pos, next);
        pos = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise_glyph(width: u32, height: u32, seed: u64) -> RgbaImage {
        let mut rng = StdRng::seed_from_u64(seed);
        RgbaImage::from_fn(width, height, |_, _| Rgba(rng.gen()))
    }

    fn sorted_pixels(image: &RgbaImage) -> Vec<[u8; 4]> {
        let mut pixels: Vec<[u8; 4]> = image.pixels().map(|p| p.0).collect();
        pixels.sort_unstable();
        pixels
    }

    #[test]
    fn identical_inputs_scramble_identically() {
        for codepoint in 32..=126u32 {
            let mut first = noise_glyph(24, 31, 7);
            let mut second = first.clone();
            assert!(scramble_glyph(&mut first, codepoint));
            assert!(scramble_glyph(&mut second, codepoint));
            assert_eq!(first, second, "codepoint {codepoint}");
        }
    }

    #[test]
    fn distinct_codepoints_mostly_differ() {
        let permutations: Vec<Vec<usize>> = (0..256u32)
            .map(|cp| BlockPermutation::for_glyph(64, 64, cp).unwrap().sources().to_vec())
            .collect();

        let mut pairs = 0usize;
        let mut differing = 0usize;
        for a in 0..permutations.len() {
            for b in a + 1..permutations.len() {
                pairs += 1;
                if permutations[a] != permutations[b] {
                    differing += 1;
                }
            }
        }

        assert!(differing as f64 / pairs as f64 >= 0.95, "{differing} of {pairs} pairs differ");
    }

    #[test]
    fn pixels_are_rearranged_not_resampled() {
        let mut rng = StdRng::seed_from_u64(42);
        for codepoint in (32..=126u32).chain([0x263A, 0x4E2D]) {
            let width = rng.gen_range(13..48);
            let height = rng.gen_range(13..48);
            let original = noise_glyph(width, height, codepoint as u64);
            let mut scrambled = original.clone();

            assert!(scramble_glyph(&mut scrambled, codepoint));
            assert_eq!(sorted_pixels(&original), sorted_pixels(&scrambled), "{width}x{height}");
        }
    }

    #[test]
    fn primary_grid_permutation_is_a_bijection() {
        for codepoint in 0..600u32 {
            let permutation = BlockPermutation::for_glyph(40, 40, codepoint).unwrap();
            let mut seen = permutation.sources().to_vec();
            seen.sort_unstable();
            assert!(seen.iter().copied().eq(0..permutation.grid().blocks()), "codepoint {codepoint}");
        }
    }

    #[test]
    fn small_glyphs_are_left_alone() {
        for (width, height) in [(7, 8), (8, 7), (4, 4), (1, 1)] {
            let original = noise_glyph(width, height, 3);
            let mut glyph = original.clone();
            assert!(!scramble_glyph(&mut glyph, 'A' as u32));
            assert_eq!(glyph, original);
        }
    }

    #[test]
    fn narrow_glyphs_fall_back_to_four_by_four() {
        // 'A' prefers a 13x13 grid, which does not fit in ten pixels.
        let grid = BlockGrid::for_glyph(10, 10, 'A' as u32).unwrap();
        assert_eq!(grid, BlockGrid { size: 4, block_width: 2, block_height: 2 });

        let mut glyph = noise_glyph(10, 10, 9);
        assert!(scramble_glyph(&mut glyph, 'A' as u32));
    }

    #[test]
    fn grid_size_is_promoted_to_eight() {
        // 'B' = 66 selects 5, which is raised to 8.
        let grid = BlockGrid::for_glyph(16, 24, 'B' as u32).unwrap();
        assert_eq!(grid, BlockGrid { size: 8, block_width: 2, block_height: 3 });
        assert_eq!(BlockGrid::for_glyph(26, 26, 'A' as u32).unwrap().size, 13);
    }

    #[test]
    fn uncovered_edges_keep_their_pixels() {
        let original = noise_glyph(23, 17, 11);
        let mut glyph = original.clone();
        let grid = BlockGrid::for_glyph(23, 17, 'A' as u32).unwrap();
        assert!(scramble_glyph(&mut glyph, 'A' as u32));

        let covered_w = (grid.size * grid.block_width) as u32;
        let covered_h = (grid.size * grid.block_height) as u32;
        for (x, y, pixel) in glyph.enumerate_pixels() {
            if x >= covered_w || y >= covered_h {
                assert_eq!(pixel, original.get_pixel(x, y), "({x}, {y})");
            }
        }
    }

    #[test]
    fn short_buffers_are_rejected() {
        let mut pixels = vec![0u8; 8 * 8 * 4 - 1];
        assert!(!scramble_pixels(&mut pixels, 8, 8, 'A' as u32));
    }

    #[test]
    fn base_permutation_follows_the_congruence() {
        // seed 3: multiplier 55, increment 89.
        let sources = base_sources(64, 3);
        for (i, &src) in sources.iter().enumerate() {
            assert_eq!(src, (55 * i + 89 * 3) % 64);
        }
    }

    #[test]
    fn rings_rotate_clockwise_by_one() {
        let mut sources: Vec<usize> = (0..16).collect();
        rotate_rings(&mut sources, 4);
        assert_eq!(sources, vec![4, 0, 1, 2, 8, 9, 5, 3, 12, 10, 6, 7, 13, 14, 15, 11]);
    }

    #[test]
    fn sections_reverse_in_place() {
        let mut sources: Vec<usize> = (0..10).collect();
        reverse_sections(&mut sources, 4);
        assert_eq!(sources, vec![3, 2, 1, 0, 7, 6, 5, 4, 9, 8]);
    }

    #[test]
    fn step_swap_carries_the_head_forward() {
        let mut sources: Vec<usize> = (0..12).collect();
        step_swap(&mut sources, 5);
        assert_eq!(sources, vec![5, 1, 2, 3, 4, 10, 6, 7, 8, 9, 0, 11]);
    }

    #[test]
    fn checkerboard_visits_each_pair_twice() {
        let mut sources: Vec<usize> = (0..64).collect();
        checkerboard_transpose(&mut sources, 8);
        assert!(sources.iter().copied().eq(0..64));
    }

    #[test]
    fn walk_stops_on_the_last_block() {
        let mut sources: Vec<usize> = (0..16).collect();
        bounded_walk(&mut sources, 15, 8);
        assert!(sources.iter().copied().eq(0..16));

        bounded_walk(&mut sources, 0, 2);
        // 0 <-> 5, then 5 <-> 13
        assert_eq!(sources[0], 5);
        assert_eq!(sources[5], 13);
        assert_eq!(sources[13], 0);
    }
}
