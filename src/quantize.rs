use image::Rgba;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::TracingOptions;
use crate::pixels::PixelBuffer;

/// Index stored in the border cells of an [`IndexedImage`].
pub const OUTSIDE: usize = usize::MAX;

/// A fixed-size set of representative colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Generate the starting palette for `size` entries.
    ///
    /// Fewer than 8 entries give a grayscale ramp. Larger palettes sample the RGB cube on a
    /// regular grid and fill the remaining entries with random colors drawn from `seed`.
    pub fn generate(size: usize, seed: u64) -> Self {
        let mut colors = Vec::with_capacity(size);
        if size < 8 {
            let step = if size > 1 { 255 / (size - 1) } else { 0 };
            colors.extend((0..size).map(|i| {
                let v = (i * step) as u8;
                Rgba([v, v, v, 255])
            }));
            return Self { colors };
        }

        let steps = integer_cbrt(size);
        let step = 255 / (steps - 1);
        for r in 0..steps {
            for g in 0..steps {
                for b in 0..steps {
                    colors.push(Rgba([
                        (r * step) as u8,
                        (g * step) as u8,
                        (b * step) as u8,
                        255,
                    ]));
                }
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        while colors.len() < size {
            colors.push(Rgba([
                rng.random::<u8>(),
                rng.random::<u8>(),
                rng.random::<u8>(),
                rng.random::<u8>(),
            ]));
        }
        Self { colors }
    }

    pub fn from_colors(colors: Vec<Rgba<u8>>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgba<u8>] {
        &self.colors
    }

    pub fn get(&self, index: usize) -> Option<Rgba<u8>> {
        self.colors.get(index).copied()
    }

    /// Index of the closest entry; ties go to the lowest index.
    pub fn nearest(&self, color: Rgba<u8>) -> usize {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (index, entry) in self.colors.iter().enumerate() {
            let distance = color_distance(color, *entry);
            if distance < best_distance {
                best = index;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }
}

/// Sum of the per-channel absolute differences, alpha included.
pub fn color_distance(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| u32::from(x.abs_diff(y)))
        .sum()
}

fn integer_cbrt(n: usize) -> usize {
    let mut root = 1;
    while (root + 1) * (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

/// Palette indices for every pixel, surrounded by a one-cell border of [`OUTSIDE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    palette_len: usize,
    /// `(height + 2, width + 2)` cells; interior pixel `(x, y)` lives at `[y + 1, x + 1]`.
    cells: Array2<usize>,
}

impl IndexedImage {
    fn new(width: u32, height: u32, palette_len: usize) -> Self {
        Self {
            width,
            height,
            palette_len,
            cells: Array2::from_elem((height as usize + 2, width as usize + 2), OUTSIDE),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Length of the palette the image was quantized against.
    pub fn palette_len(&self) -> usize {
        self.palette_len
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Palette index of the interior pixel `(x, y)`.
    pub fn index(&self, x: u32, y: u32) -> usize {
        self.cells[[y as usize + 1, x as usize + 1]]
    }

    /// The padded grid, border included.
    pub fn cells(&self) -> &Array2<usize> {
        &self.cells
    }

    /// Number of pixels assigned to each palette entry.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.palette_len];
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(count) = counts.get_mut(self.index(x, y)) {
                    *count += 1;
                }
            }
        }
        counts
    }

    fn set(&mut self, x: u32, y: u32, index: usize) {
        self.cells[[y as usize + 1, x as usize + 1]] = index;
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ColorAccumulator {
    sums: [u64; 4],
    count: u64,
}

impl ColorAccumulator {
    fn add(&mut self, color: Rgba<u8>) {
        for (sum, channel) in self.sums.iter_mut().zip(color.0.iter()) {
            *sum += u64::from(*channel);
        }
        self.count += 1;
    }

    fn mean(&self) -> Option<Rgba<u8>> {
        if self.count == 0 {
            return None;
        }
        let mut rgba = [0u8; 4];
        for (out, sum) in rgba.iter_mut().zip(self.sums.iter()) {
            *out = (sum / self.count) as u8;
        }
        Some(Rgba(rgba))
    }
}

/// Build a palette for the buffer and assign every pixel to its nearest entry.
///
/// Each pass assigns all pixels and then moves every used entry to the mean of its pixels.
/// Between passes, unused or under-used entries are re-seeded from the worst-matched pixels.
pub fn quantize(pixels: &PixelBuffer, options: &TracingOptions) -> (Palette, IndexedImage) {
    let mut palette = Palette::generate(options.palette_size, options.palette_seed);
    let (w, h) = (pixels.width(), pixels.height());
    let mut indexed = IndexedImage::new(w, h, palette.len());
    if pixels.is_empty() || palette.is_empty() {
        return (palette, indexed);
    }

    let total = w as usize * h as usize;
    let cycles = options.quantize_cycles.max(1);
    for cycle in 0..cycles {
        let mut accumulators = vec![ColorAccumulator::default(); palette.len()];
        for (x, y, px) in pixels.image().enumerate_pixels() {
            let index = palette.nearest(*px);
            indexed.set(x, y, index);
            accumulators[index].add(*px);
        }

        for (entry, acc) in palette.colors.iter_mut().zip(accumulators.iter()) {
            if let Some(mean) = acc.mean() {
                *entry = mean;
            }
        }

        if cycle + 1 < cycles {
            reseed_sparse_entries(
                &mut palette,
                &accumulators,
                pixels,
                &indexed,
                options.min_color_ratio,
                total,
            );
        }
    }

    log::debug!(
        "quantized {w}x{h} pixels into {} colors over {cycles} passes",
        palette.len()
    );
    (palette, indexed)
}

/// Move sparse entries onto the distinct pixel colors that are farthest from their entry.
fn reseed_sparse_entries(
    palette: &mut Palette,
    accumulators: &[ColorAccumulator],
    pixels: &PixelBuffer,
    indexed: &IndexedImage,
    min_color_ratio: f64,
    total: usize,
) {
    let sparse: Vec<usize> = accumulators
        .iter()
        .enumerate()
        .filter(|(_, acc)| acc.count == 0 || (acc.count as f64 / total as f64) < min_color_ratio)
        .map(|(index, _)| index)
        .collect();
    if sparse.is_empty() {
        return;
    }

    let mut candidates: Vec<(u32, usize, Rgba<u8>)> = pixels
        .image()
        .enumerate_pixels()
        .enumerate()
        .filter_map(|(order, (x, y, px))| {
            let assigned = palette.colors[indexed.index(x, y)];
            let distance = color_distance(*px, assigned);
            (distance > 0).then_some((distance, order, *px))
        })
        .collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut chosen: Vec<Rgba<u8>> = Vec::with_capacity(sparse.len());
    let mut colors = candidates.into_iter().map(|(_, _, color)| color);
    for entry in sparse {
        let Some(color) = colors.by_ref().find(|color| !chosen.contains(color)) else {
            break;
        };
        chosen.push(color);
        palette.colors[entry] = color;
    }
}
