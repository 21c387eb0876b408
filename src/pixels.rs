use std::path::Path;

use image::{DynamicImage, ImageReader, Rgba, RgbaImage};

use crate::TraceResult;

/// An immutable RGBA bitmap handed to the tracer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Wrap an already decoded RGBA image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Convert any decoded image to RGBA.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::from_image(image.to_rgba8())
    }

    /// Build a buffer from raw RGBA bytes, four per pixel in row-major order.
    ///
    /// A buffer whose length does not match the dimensions is treated as empty.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        let len = data.len();
        let expected = width as usize * height as usize * 4;
        if len == expected
            && let Some(image) = RgbaImage::from_raw(width, height, data)
        {
            return Self { image };
        }
        log::warn!(
            "pixel buffer of {len} bytes does not match {width}x{height} RGBA, tracing it as empty"
        );
        Self::empty()
    }

    /// A 0x0 buffer.
    pub fn empty() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
        }
    }

    /// Decode an image file into a buffer.
    ///
    /// Failing to read the file is an `Io` error. The format is sniffed from the contents and
    /// failing to decode them is an `Image` error.
    pub fn open(path: impl AsRef<Path>) -> TraceResult<Self> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        Ok(Self::from_dynamic(&image))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True when the buffer has no pixels.
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Color of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Iterate over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &Rgba<u8>> {
        self.image.pixels()
    }

    /// Get a reference to the underlying image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the buffer and return the underlying image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self::from_image(image)
    }
}
