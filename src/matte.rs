// Flood-fill background removal.
// Starting from the top-right pixel, walk every 4-connected neighbor whose
// color is close to that corner's color and mark it as background. Marked
// pixels become fully transparent; everything else is copied as-is.
//
// The seed assumes a uniform backdrop touches the top-right corner. Art
// whose subject reaches that corner will matte the wrong region.

use image::Rgba;
use tracing::{debug, info};

use crate::color::{is_near_black, similar};
use crate::error::Result;
use crate::types::{AnimatedSequence, Mask, RasterImage, SequenceFrame};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Classify the background region connected to the top-right seed.
/// Iterative DFS with a visited set: each pixel is pushed at most once,
/// so time and memory are O(width * height).
pub fn background_mask(image: &RasterImage, tolerance: u8) -> Mask {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let mut mask = Mask::new(w, h);
    if w == 0 || h == 0 {
        return mask;
    }

    let seed = (w - 1, 0usize);
    let reference = image.get_pixel(seed.0 as u32, seed.1 as u32).0;
    let reference = [reference[0], reference[1], reference[2]];

    // A neighbor joins the frontier only if it is close to the reference
    // and not close to black (keeps dark outlines when the backdrop is dark).
    let is_background = |x: usize, y: usize| {
        let px = image.get_pixel(x as u32, y as u32).0;
        !is_near_black(&px) && similar(&px[..3], &reference, tolerance)
    };

    let mut visited = Mask::new(w, h);
    let mut stack = vec![seed];
    visited.set(seed.0, seed.1);

    while let Some((x, y)) = stack.pop() {
        mask.set(x, y);

        let neighbors = [
            (y > 0).then(|| (x, y - 1)),
            (y + 1 < h).then(|| (x, y + 1)),
            (x > 0).then(|| (x - 1, y)),
            (x + 1 < w).then(|| (x + 1, y)),
        ];
        for (nx, ny) in neighbors.into_iter().flatten() {
            if !visited.get(nx, ny) && is_background(nx, ny) {
                visited.set(nx, ny);
                stack.push((nx, ny));
            }
        }
    }

    mask
}

/// Return a copy of `image` with the seed-connected background set to
/// (0, 0, 0, 0). The input is left untouched.
pub fn remove_background(image: &RasterImage, tolerance: u8) -> RasterImage {
    let mask = background_mask(image, tolerance);
    apply_mask(image, &mask)
}

/// Rewrite every masked pixel to transparent; others copied unchanged.
pub fn apply_mask(image: &RasterImage, mask: &Mask) -> RasterImage {
    let mut out = image.clone();
    out.pixels_mut()
        .zip(mask.as_slice())
        .filter(|(_, is_bg)| **is_bg)
        .for_each(|(px, _)| *px = TRANSPARENT);
    out
}

/// Matte every frame independently, keeping each frame's duration.
#[tracing::instrument(skip(sequence), fields(frames = sequence.len()))]
pub fn remove_sequence_background(
    sequence: &AnimatedSequence,
    tolerance: u8,
) -> Result<AnimatedSequence> {
    let mut cleared = 0usize;
    let frames: Vec<SequenceFrame> = sequence
        .frames()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let mask = background_mask(&f.image, tolerance);
            debug!(frame = i, background_px = mask.count(), "matted frame");
            cleared += mask.count();
            SequenceFrame {
                image: apply_mask(&f.image, &mask),
                duration_ms: f.duration_ms,
            }
        })
        .collect();

    info!(cleared_px = cleared, "background removed");
    AnimatedSequence::new(frames)
}
