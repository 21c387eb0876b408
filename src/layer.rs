use crate::quantize::IndexedImage;

/// Binary mask of the pixels assigned to one palette entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    palette_index: usize,
    width: u32,
    height: u32,
    mask: Vec<bool>,
    pixel_count: usize,
}

impl Layer {
    /// Build a layer from a row-major mask.
    ///
    /// # Panics
    /// Panics if `mask.len()` is not `width * height`.
    pub fn from_mask(palette_index: usize, width: u32, height: u32, mask: Vec<bool>) -> Self {
        assert_eq!(
            mask.len(),
            width as usize * height as usize,
            "layer mask does not match its dimensions"
        );
        let pixel_count = mask.iter().filter(|&&set| set).count();
        Self {
            palette_index,
            width,
            height,
            mask,
            pixel_count,
        }
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in the layer.
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Whether pixel `(x, y)` belongs to the layer. Coordinates outside the image are never set.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.mask[y as usize * self.width as usize + x as usize]
    }
}

/// Split an indexed image into one layer per palette entry that has at least one pixel.
///
/// Layers come back in palette order.
pub fn separate_layers(indexed: &IndexedImage) -> Vec<Layer> {
    let (w, h) = (indexed.width(), indexed.height());
    let len = w as usize * h as usize;
    let mut masks: Vec<Option<Vec<bool>>> = vec![None; indexed.palette_len()];

    for y in 0..h {
        for x in 0..w {
            let index = indexed.index(x, y);
            let Some(slot) = masks.get_mut(index) else {
                continue;
            };
            let mask = slot.get_or_insert_with(|| vec![false; len]);
            mask[y as usize * w as usize + x as usize] = true;
        }
    }

    masks
        .into_iter()
        .enumerate()
        .filter_map(|(index, mask)| mask.map(|mask| Layer::from_mask(index, w, h, mask)))
        .collect()
}
