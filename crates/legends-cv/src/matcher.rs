//! Normalized cross-correlation template matching on grayscale frames.

use image::{GrayImage, imageops};
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};

/// One reference image to search for.
#[derive(Debug, Clone)]
pub struct Template {
    pub image: GrayImage,
}

impl Template {
    pub fn new(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Best correlation found for one template in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Normalized cross-correlation score, 0.0..=1.0.
    pub score: f32,
    /// Center of the matched region in frame coordinates.
    pub center: (u32, u32),
}

/// Slide the template over the frame and return the single best match.
///
/// A template larger than the frame (emulator resized below the capture
/// resolution) is shrunk to fit, never grown. Returns `None` only for
/// degenerate inputs where no correlation can be computed.
pub fn best_match(frame: &GrayImage, template: &Template) -> Option<Match> {
    let (fw, fh) = frame.dimensions();
    if fw == 0 || fh == 0 || template.width() == 0 || template.height() == 0 {
        return None;
    }

    let shrunk;
    let needle = if template.width() > fw || template.height() > fh {
        let scale = f32::min(
            fw as f32 / template.width() as f32,
            fh as f32 / template.height() as f32,
        );
        let w = ((template.width() as f32 * scale) as u32).max(1).min(fw);
        let h = ((template.height() as f32 * scale) as u32).max(1).min(fh);
        log::debug!(
            "template {}x{} larger than frame {fw}x{fh}, shrinking to {w}x{h}",
            template.width(),
            template.height()
        );
        shrunk = imageops::resize(&template.image, w, h, imageops::FilterType::Triangle);
        &shrunk
    } else {
        &template.image
    };

    let scores = match_template(
        frame,
        needle,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );
    let extremes = find_extremes(&scores);

    // Flat regions make the correlation denominator zero; imageproc yields
    // NaN there and NaN must never win a threshold comparison.
    let score = if extremes.max_value.is_nan() {
        0.0
    } else {
        extremes.max_value
    };

    let (x, y) = extremes.max_value_location;
    Some(Match {
        score,
        center: (x + needle.width() / 2, y + needle.height() / 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    // A flat background of 0 makes the correlation denominator vanish, so
    // synthetic fixtures use a dim non-zero background.
    fn frame_with_block(w: u32, h: u32, bx: u32, by: u32, bw: u32, bh: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(w, h, Luma([10u8]));
        for y in by..by + bh {
            for x in bx..bx + bw {
                img.put_pixel(x, y, Luma([230u8]));
            }
        }
        img
    }

    fn block_template(w: u32, h: u32) -> Template {
        let mut img = GrayImage::from_pixel(w + 4, h + 4, Luma([10u8]));
        for y in 2..2 + h {
            for x in 2..2 + w {
                img.put_pixel(x, y, Luma([230u8]));
            }
        }
        Template::new(img)
    }

    #[test]
    fn exact_region_scores_near_one() {
        let frame = frame_with_block(120, 90, 40, 30, 16, 16);
        let template = block_template(16, 16);

        let m = best_match(&frame, &template).unwrap();
        assert!(m.score > 0.99, "score {}", m.score);
        // Template is 20x20 with the block at offset 2, so the match region
        // starts at (38, 28) and the center lands mid-block.
        assert_eq!(m.center, (48, 38));
    }

    #[test]
    fn absent_pattern_scores_low() {
        let frame = GrayImage::from_pixel(120, 90, Luma([10u8]));
        let template = block_template(16, 16);

        let m = best_match(&frame, &template).unwrap();
        assert!(m.score < 0.9, "score {}", m.score);
    }

    #[test]
    fn oversized_template_is_shrunk_not_rejected() {
        let frame = frame_with_block(60, 45, 10, 10, 16, 16);
        let template = block_template(100, 100);

        let m = best_match(&frame, &template).unwrap();
        assert!(m.score.is_finite());
        assert!(m.center.0 < 60 && m.center.1 < 45);
    }

    #[test]
    fn empty_frame_yields_none() {
        let frame = GrayImage::new(0, 0);
        let template = block_template(4, 4);
        assert!(best_match(&frame, &template).is_none());
    }
}
