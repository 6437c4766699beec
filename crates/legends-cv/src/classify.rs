//! Anchor lookup and best-of-several classification over a single frame.

use image::GrayImage;
use legends_core::Anchor;

use crate::catalog::Catalog;
use crate::matcher::{Match, best_match};

/// Locate one anchor in the frame at the given threshold. Returns the match
/// center in frame coordinates.
pub fn find_with_threshold(
    frame: &GrayImage,
    catalog: &Catalog,
    anchor: Anchor,
    threshold: f32,
) -> Option<(u32, u32)> {
    let template = catalog.get(anchor)?;
    let m = best_match(frame, template)?;
    if m.score >= threshold {
        log::trace!("{anchor} at {:?} (score {:.3})", m.center, m.score);
        Some(m.center)
    } else {
        None
    }
}

/// Locate one anchor at the caller's standard threshold.
pub fn find(
    frame: &GrayImage,
    catalog: &Catalog,
    anchor: Anchor,
    threshold: f32,
) -> Option<(u32, u32)> {
    find_with_threshold(frame, catalog, anchor, threshold)
}

/// Score every candidate against the SAME frame and return the strict
/// highest scorer at or above the threshold.
///
/// This is how near-identical anchors (the demo checkbox states) are told
/// apart: never by independent lookups against different captures, which
/// can see both at once. An exact tie yields the earlier candidate.
pub fn classify_best(
    frame: &GrayImage,
    catalog: &Catalog,
    candidates: &[Anchor],
    threshold: f32,
) -> Option<(Anchor, (u32, u32))> {
    let scored = score_all(frame, catalog, candidates);

    let mut best: Option<(Anchor, Match)> = None;
    for (anchor, m) in scored {
        match &best {
            Some((_, current)) if m.score <= current.score => {}
            _ => best = Some((anchor, m)),
        }
    }

    let (anchor, m) = best?;
    if m.score >= threshold {
        log::debug!("classified {anchor} (score {:.3})", m.score);
        Some((anchor, m.center))
    } else {
        None
    }
}

#[cfg(feature = "parallel")]
fn score_all(
    frame: &GrayImage,
    catalog: &Catalog,
    candidates: &[Anchor],
) -> Vec<(Anchor, Match)> {
    use rayon::prelude::*;
    // Scored in parallel, reduced sequentially so ties stay deterministic.
    candidates
        .par_iter()
        .filter_map(|&anchor| {
            let template = catalog.get(anchor)?;
            best_match(frame, template).map(|m| (anchor, m))
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn score_all(
    frame: &GrayImage,
    catalog: &Catalog,
    candidates: &[Anchor],
) -> Vec<(Anchor, Match)> {
    candidates
        .iter()
        .filter_map(|&anchor| {
            let template = catalog.get(anchor)?;
            best_match(frame, template).map(|m| (anchor, m))
        })
        .collect()
}
