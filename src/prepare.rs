// Turns a decoded animation into window-ready frames.
// Per frame: fit into the target box (uniform scale, nearest neighbor),
// clear anything close to the key color, then flatten onto a key-colored
// backing buffer so see-through pixels end up exactly the key.

use std::time::Duration;

use image::Rgba;
use image::imageops::{self, FilterType};
use tracing::{debug, info};

use crate::color::{KEY_TOLERANCE, TransparencyKey, is_near_black, similar};
use crate::error::{Error, Result};
use crate::types::{AnimatedSequence, FrameBuffer, RasterImage};

/// Bounding box the sprite is fitted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitBox {
    pub width: u32,
    pub height: u32,
}

impl FitBox {
    pub fn square(size: u32) -> Self {
        Self { width: size, height: size }
    }
}

/// Frames ready for presentation plus the pacing they should play at.
#[derive(Clone, Debug)]
pub struct PreparedSequence {
    pub width: usize,
    pub height: usize,
    pub frames: Vec<FrameBuffer>,
    /// Authored per-frame delays; playback uses `interval` instead.
    pub durations_ms: Vec<u32>,
    pub interval: Duration,
    pub key: TransparencyKey,
}

impl PreparedSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// 1 s / fps; fps must be non-zero.
pub fn frame_interval(fps: u32) -> Result<Duration> {
    if fps == 0 {
        return Err(Error::configuration("fps must be greater than zero"));
    }
    Ok(Duration::from_secs(1) / fps)
}

/// Largest size with the source aspect ratio that fits `target`.
/// One scale factor, min of the two axis ratios, floored; never below 1px.
pub fn fit_dimensions(src_w: u32, src_h: u32, target: FitBox) -> Result<(u32, u32)> {
    if src_w == 0 || src_h == 0 {
        return Err(Error::invalid_image(format!("zero-size source ({src_w}x{src_h})")));
    }
    if target.width == 0 || target.height == 0 {
        return Err(Error::configuration("target size must be greater than zero"));
    }
    let scale = f64::min(
        target.width as f64 / src_w as f64,
        target.height as f64 / src_h as f64,
    );
    let w = ((src_w as f64 * scale) as u32).max(1);
    let h = ((src_h as f64 * scale) as u32).max(1);
    Ok((w, h))
}

/// Clear pixels close to the key color, unless they are near black.
/// Resampling can leave key-ish fringe; the guard keeps dark outlines.
pub fn clear_key_colored(image: &mut RasterImage, key: TransparencyKey) {
    let key = key.rgb();
    image
        .pixels_mut()
        .filter(|px| similar(&px.0[..3], &key, KEY_TOLERANCE) && !is_near_black(&px.0))
        .for_each(|px| *px = Rgba([0, 0, 0, 0]));
}

/// Flatten RGBA onto a buffer pre-filled with the key color.
/// Alpha 0 stays key; partial alpha blends toward the key.
pub fn composite_over_key(image: &RasterImage, key: TransparencyKey) -> FrameBuffer {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let mut out = FrameBuffer::filled(w, h, key.to_0rgb());
    let [kr, kg, kb] = key.rgb();

    let blend = |c: u8, k: u8, a: u32| (c as u32 * a + k as u32 * (255 - a) + 127) / 255;

    out.pixels
        .iter_mut()
        .zip(image.pixels())
        .filter(|(_, px)| px[3] != 0)
        .for_each(|(dst, px)| {
            let a = px[3] as u32;
            let r = blend(px[0], kr, a);
            let g = blend(px[1], kg, a);
            let b = blend(px[2], kb, a);
            *dst = (r << 16) | (g << 8) | b;
        });
    out
}

/// Fit, recolor and flatten every frame of `sequence`.
/// The first frame fixes the output size for the whole session.
#[tracing::instrument(skip(sequence), fields(frames = sequence.len()))]
pub fn prepare_frames(
    sequence: &AnimatedSequence,
    target: FitBox,
    key: TransparencyKey,
    fps: u32,
) -> Result<PreparedSequence> {
    let interval = frame_interval(fps)?;
    let (src_w, src_h) = sequence.dimensions();
    let (w, h) = fit_dimensions(src_w, src_h, target)?;
    debug!(src_w, src_h, w, h, "fitted frame size");

    let frames: Vec<FrameBuffer> = sequence
        .frames()
        .iter()
        .map(|f| {
            // NEAREST keeps hard edges; blended fringe would leak past the key
            let mut scaled = imageops::resize(&f.image, w, h, FilterType::Nearest);
            clear_key_colored(&mut scaled, key);
            composite_over_key(&scaled, key)
        })
        .collect();

    info!(frames = frames.len(), width = w, height = h, ?interval, "frames prepared");
    Ok(PreparedSequence {
        width: w as usize,
        height: h as usize,
        frames,
        durations_ms: sequence.durations(),
        interval,
        key,
    })
}
