//! Frame differencing for the staleness watchdog.

use image::GrayImage;

/// Summed absolute per-pixel difference between two grayscale frames.
///
/// Dimension mismatch (the window was resized between captures) returns
/// `u64::MAX`: a resize is definitely not a stuck screen.
pub fn abs_diff_sum(a: &GrayImage, b: &GrayImage) -> u64 {
    if a.dimensions() != b.dimensions() {
        return u64::MAX;
    }
    a.as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .map(|(&pa, &pb)| pa.abs_diff(pb) as u64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn identical_frames_diff_zero() {
        let a = GrayImage::from_pixel(64, 48, Luma([77u8]));
        assert_eq!(abs_diff_sum(&a, &a.clone()), 0);
    }

    #[test]
    fn diff_is_summed_per_pixel() {
        let a = GrayImage::from_pixel(10, 10, Luma([100u8]));
        let mut b = a.clone();
        b.put_pixel(0, 0, Luma([150u8]));
        b.put_pixel(5, 5, Luma([80u8]));
        assert_eq!(abs_diff_sum(&a, &b), 50 + 20);
    }

    #[test]
    fn diff_is_symmetric() {
        let a = GrayImage::from_pixel(10, 10, Luma([30u8]));
        let b = GrayImage::from_pixel(10, 10, Luma([200u8]));
        assert_eq!(abs_diff_sum(&a, &b), abs_diff_sum(&b, &a));
    }

    #[test]
    fn dimension_mismatch_is_max() {
        let a = GrayImage::from_pixel(10, 10, Luma([0u8]));
        let b = GrayImage::from_pixel(12, 10, Luma([0u8]));
        assert_eq!(abs_diff_sum(&a, &b), u64::MAX);
    }
}
