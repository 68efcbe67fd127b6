// src/mask.rs
//
// Single-channel presence mask of a top-down frame. Every search stage reads
// from this instead of the decoded image, so all channel handling lives here.

use image::DynamicImage;

/// Binary top-down mask, row-major, one byte per pixel (0 = off, 1 = on).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Reduce an interleaved buffer with `channels` color channels per pixel.
    /// A pixel is on iff the sum of its channels is greater than zero.
    pub fn from_channels(src: &[u8], width: usize, height: usize, channels: usize) -> Self {
        Self::reduce(src, width, height, channels, channels, f64::from)
    }

    /// Reduce a decoded image at its native depth. Alpha is not a color
    /// channel and is ignored.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);
        match img {
            DynamicImage::ImageLuma8(buf) => Self::reduce(buf.as_raw(), w, h, 1, 1, f64::from),
            DynamicImage::ImageLumaA8(buf) => Self::reduce(buf.as_raw(), w, h, 2, 1, f64::from),
            DynamicImage::ImageRgb8(buf) => Self::reduce(buf.as_raw(), w, h, 3, 3, f64::from),
            DynamicImage::ImageRgba8(buf) => Self::reduce(buf.as_raw(), w, h, 4, 3, f64::from),
            DynamicImage::ImageLuma16(buf) => Self::reduce(buf.as_raw(), w, h, 1, 1, f64::from),
            DynamicImage::ImageLumaA16(buf) => Self::reduce(buf.as_raw(), w, h, 2, 1, f64::from),
            DynamicImage::ImageRgb16(buf) => Self::reduce(buf.as_raw(), w, h, 3, 3, f64::from),
            DynamicImage::ImageRgba16(buf) => Self::reduce(buf.as_raw(), w, h, 4, 3, f64::from),
            DynamicImage::ImageRgb32F(buf) => Self::reduce(buf.as_raw(), w, h, 3, 3, f64::from),
            DynamicImage::ImageRgba32F(buf) => Self::reduce(buf.as_raw(), w, h, 4, 3, f64::from),
            other => {
                let rgb = other.to_rgb32f();
                Self::reduce(rgb.as_raw(), w, h, 3, 3, f64::from)
            }
        }
    }

    /// Per pixel, sum the first `color` of every `stride` samples.
    fn reduce<T: Copy>(
        src: &[T],
        width: usize,
        height: usize,
        stride: usize,
        color: usize,
        value: impl Fn(T) -> f64,
    ) -> Self {
        let mut mask = Self::new(width, height);
        if stride == 0 {
            return mask;
        }
        for (dst, px) in mask.data.iter_mut().zip(src.chunks_exact(stride)) {
            let sum: f64 = px[..color.min(stride)].iter().map(|&v| value(v)).sum();
            *dst = u8::from(sum > 0.0);
        }
        mask
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_on(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] != 0
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = u8::from(on);
        }
    }

    /// The on/off bytes of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn count_on(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Column sums over rows `[row_start, height)`.
    pub fn column_histogram(&self, row_start: usize) -> Vec<u32> {
        let mut hist = vec![0u32; self.width];
        for y in row_start.min(self.height)..self.height {
            for (bin, &v) in hist.iter_mut().zip(self.row(y)) {
                *bin += v as u32;
            }
        }
        hist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_from_channels_sums_all_channels() {
        // pixel 0: black, pixel 1: only blue, pixel 2: only red
        let src = [0, 0, 0, 0, 0, 7, 1, 0, 0];
        let mask = BinaryMask::from_channels(&src, 3, 1, 3);
        assert!(!mask.is_on(0, 0));
        assert!(mask.is_on(1, 0));
        assert!(mask.is_on(2, 0));
    }

    #[test]
    fn test_channel_sum_does_not_wrap() {
        // 128 + 128 would wrap to zero in 8-bit arithmetic
        let src = [128, 128, 0];
        let mask = BinaryMask::from_channels(&src, 1, 1, 3);
        assert!(mask.is_on(0, 0));
    }

    #[test]
    fn test_from_dynamic_ignores_alpha() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 200, 0, 255]));
        let mask = BinaryMask::from_dynamic(&DynamicImage::ImageRgba8(img));
        assert!(!mask.is_on(0, 0), "opaque black must stay off");
        assert!(mask.is_on(1, 0));
    }

    #[test]
    fn test_from_dynamic_gray_and_rgb_agree() {
        let mut gray = GrayImage::new(4, 4);
        let mut rgb = RgbImage::new(4, 4);
        for i in 0..4 {
            gray.put_pixel(i, i, Luma([255]));
            rgb.put_pixel(i, i, Rgb([0, 0, 255]));
        }
        let a = BinaryMask::from_dynamic(&DynamicImage::ImageLuma8(gray));
        let b = BinaryMask::from_dynamic(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(a, b);
        assert_eq!(a.count_on(), 4);
    }

    #[test]
    fn test_column_histogram_bottom_rows_only() {
        let mut mask = BinaryMask::new(3, 4);
        mask.set(0, 0, true); // top half, excluded
        mask.set(1, 2, true);
        mask.set(1, 3, true);
        mask.set(2, 3, true);
        assert_eq!(mask.column_histogram(2), vec![0, 2, 1]);
    }

    #[test]
    fn test_from_dynamic_keeps_16bit_depth() {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(4, 1, vec![0, 1, 100, 65535]).unwrap();
        let mask = BinaryMask::from_dynamic(&DynamicImage::ImageLuma16(img));
        assert!(!mask.is_on(0, 0));
        assert!(mask.is_on(1, 0), "value 1 is on at 16 bits");
        assert!(mask.is_on(2, 0));
        assert!(mask.is_on(3, 0));

        let mut rgba: ImageBuffer<Rgba<u16>, Vec<u16>> = ImageBuffer::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 65535]));
        rgba.put_pixel(1, 0, Rgba([0, 0, 1, 65535]));
        let mask = BinaryMask::from_dynamic(&DynamicImage::ImageRgba16(rgba));
        assert!(!mask.is_on(0, 0));
        assert!(mask.is_on(1, 0));
    }

    #[test]
    fn test_from_dynamic_keeps_float_precision() {
        let mut img: ImageBuffer<Rgb<f32>, Vec<f32>> = ImageBuffer::new(2, 1);
        img.put_pixel(1, 0, Rgb([0.001, 0.0, 0.0]));
        let mask = BinaryMask::from_dynamic(&DynamicImage::ImageRgb32F(img));
        assert!(!mask.is_on(0, 0));
        assert!(mask.is_on(1, 0));
    }
}
