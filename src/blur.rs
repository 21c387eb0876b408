use image::{Rgba, RgbaImage};

use crate::pixels::PixelBuffer;

/// Gaussian kernels for radii 1 to 5, indexed by `radius - 1`.
const GAUSSIAN_KERNELS: [&[f64]; 5] = [
    &[0.27901, 0.44198, 0.27901],
    &[0.135336, 0.228569, 0.272192, 0.228569, 0.135336],
    &[
        0.086776, 0.136394, 0.178908, 0.195843, 0.178908, 0.136394, 0.086776,
    ],
    &[
        0.063327, 0.093095, 0.122589, 0.144599, 0.152781, 0.144599, 0.122589, 0.093095, 0.063327,
    ],
    &[
        0.049692, 0.069304, 0.089767, 0.107988, 0.120651, 0.125194, 0.120651, 0.107988, 0.089767,
        0.069304, 0.049692,
    ],
];

/// Blur the buffer while keeping pixels that the blur would change by more than `delta`.
///
/// `radius` is clamped to 5 and a radius of 0 returns an unchanged copy.
pub fn selective_blur(pixels: &PixelBuffer, radius: u32, delta: u32) -> PixelBuffer {
    if radius == 0 || pixels.is_empty() {
        return pixels.clone();
    }
    let kernel = GAUSSIAN_KERNELS[(radius.min(5) - 1) as usize];

    let original = pixels.image();
    let horizontal = convolve(original, kernel, Axis::Horizontal);
    let blurred = convolve(&horizontal, kernel, Axis::Vertical);

    let (w, h) = original.dimensions();
    let mut out = RgbaImage::new(w, h);
    for ((orig_px, blur_px), out_px) in original
        .pixels()
        .zip(blurred.pixels())
        .zip(out.pixels_mut())
    {
        let difference: u32 = orig_px
            .0
            .iter()
            .zip(blur_px.0.iter())
            .map(|(&a, &b)| a.abs_diff(b) as u32)
            .sum();
        *out_px = if difference > delta { *orig_px } else { *blur_px };
    }

    PixelBuffer::from_image(out)
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One separable convolution pass that skips out-of-bounds taps and renormalizes.
fn convolve(image: &RgbaImage, kernel: &[f64], axis: Axis) -> RgbaImage {
    let (w, h) = image.dimensions();
    let radius = (kernel.len() / 2) as i64;

    RgbaImage::from_fn(w, h, |x, y| {
        let mut acc = [0f64; 4];
        let mut weight_sum = 0.0;
        for (k, weight) in kernel.iter().enumerate() {
            let offset = k as i64 - radius;
            let (sx, sy) = match axis {
                Axis::Horizontal => (x as i64 + offset, y as i64),
                Axis::Vertical => (x as i64, y as i64 + offset),
            };
            if sx < 0 || sy < 0 || sx >= w as i64 || sy >= h as i64 {
                continue;
            }
            let px = image.get_pixel(sx as u32, sy as u32);
            for (channel, value) in acc.iter_mut().zip(px.0.iter()) {
                *channel += f64::from(*value) * weight;
            }
            weight_sum += weight;
        }

        let mut rgba = [0u8; 4];
        for (out, value) in rgba.iter_mut().zip(acc.iter()) {
            *out = (value / weight_sum).round().clamp(0.0, 255.0) as u8;
        }
        Rgba(rgba)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, color: [u8; 4]) -> PixelBuffer {
        PixelBuffer::from_image(RgbaImage::from_pixel(w, h, Rgba(color)))
    }

    mod gaussian_kernels {
        use super::*;

        #[test]
        fn kernels_are_normalized_and_centered() {
            for (index, kernel) in GAUSSIAN_KERNELS.iter().enumerate() {
                let radius = index + 1;
                assert_eq!(kernel.len(), 2 * radius + 1, "radius {radius}");

                let sum: f64 = kernel.iter().sum();
                assert!((sum - 1.0).abs() < 1e-4, "radius {radius} sums to {sum}");

                for k in 0..radius {
                    assert_eq!(kernel[k], kernel[2 * radius - k], "radius {radius}");
                    assert!(kernel[k] < kernel[k + 1], "radius {radius}");
                }
            }
        }
    }

    mod selective_blur {
        use super::*;

        mod unit {
            use super::*;

            #[test]
            fn radius_zero_is_identity() {
                let mut image = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
                image.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
                let input = PixelBuffer::from_image(image);
                let result = selective_blur(&input, 0, 1024);
                assert_eq!(result, input);
            }

            #[test]
            fn uniform_image_unchanged() {
                // Renormalized weights keep flat regions flat, even at the borders
                let input = solid(6, 4, [200, 100, 50, 255]);
                for radius in 1..=5 {
                    let result = selective_blur(&input, radius, 1024);
                    for px in result.pixels() {
                        assert!(px.0[0].abs_diff(200) <= 1);
                        assert!(px.0[1].abs_diff(100) <= 1);
                        assert!(px.0[2].abs_diff(50) <= 1);
                        assert!(px.0[3].abs_diff(255) <= 1);
                    }
                }
            }

            #[test]
            fn zero_delta_keeps_strong_edges() {
                // Left half black, right half white: every changed pixel exceeds delta 0
                let mut image = RgbaImage::from_pixel(6, 2, Rgba([0, 0, 0, 255]));
                for y in 0..2 {
                    for x in 3..6 {
                        image.put_pixel(x, y, Rgba([255, 255, 255, 255]));
                    }
                }
                let input = PixelBuffer::from_image(image);
                let result = selective_blur(&input, 2, 0);
                assert_eq!(result.pixel(2, 0).0, [0, 0, 0, 255]);
                assert_eq!(result.pixel(3, 0).0, [255, 255, 255, 255]);
            }

            #[test]
            fn large_delta_smooths_edges() {
                let mut image = RgbaImage::from_pixel(6, 1, Rgba([0, 0, 0, 255]));
                for x in 3..6 {
                    image.put_pixel(x, 0, Rgba([255, 255, 255, 255]));
                }
                let input = PixelBuffer::from_image(image);
                let result = selective_blur(&input, 1, 1024);
                let left = result.pixel(2, 0).0[0];
                let right = result.pixel(3, 0).0[0];
                assert!(left > 0 && left < 255);
                assert!(right > 0 && right < 255);
            }

            #[test]
            fn empty_buffer_passes_through() {
                let result = selective_blur(&PixelBuffer::empty(), 3, 20);
                assert!(result.is_empty());
            }
        }

        mod prop {
            use super::*;
            use proptest::prelude::*;

            proptest! {
                /// selective_blur: dimensions are always preserved
                #[test]
                fn preserves_dimensions(
                    w in 1u32..12,
                    h in 1u32..12,
                    radius in 0u32..=5,
                    delta in 0u32..=1024,
                    seed in proptest::collection::vec(proptest::num::u8::ANY, 4)
                ) {
                    let input = solid(w, h, [seed[0], seed[1], seed[2], seed[3]]);
                    let result = selective_blur(&input, radius, delta);
                    prop_assert_eq!((result.width(), result.height()), (w, h));
                }

                /// selective_blur: every output pixel is the original or the blurred value,
                /// so a zero delta never moves a pixel by more than zero
                #[test]
                fn zero_delta_only_keeps_unchanged_pixels(
                    values in proptest::collection::vec(proptest::num::u8::ANY, 16),
                    radius in 1u32..=5
                ) {
                    let image = RgbaImage::from_fn(4, 4, |x, y| {
                        let v = values[(y * 4 + x) as usize];
                        Rgba([v, v, v, 255])
                    });
                    let input = PixelBuffer::from_image(image);
                    let result = selective_blur(&input, radius, 0);
                    prop_assert_eq!(result, input);
                }
            }
        }
    }
}
