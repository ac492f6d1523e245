// Core types shared by the matting engine, preparation and the overlay loop.

use image::RgbaImage;

use crate::error::{Error, Result};

/// A still frame in RGBA, 8 bits per channel.
pub type RasterImage = RgbaImage;

/// Default authored delay when a frame carries none.
pub const DEFAULT_FRAME_DURATION_MS: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A buffer of `width * height` pixels all set to `color`.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Copy `src` with its top-left at (x, y), clipped to this buffer.
    pub fn blit(&mut self, src: &FrameBuffer, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let cols = src.width.min(self.width - x);
        let rows = src.height.min(self.height - y);
        for row in 0..rows {
            let dst_ofs = (y + row) * self.width + x;
            let src_ofs = row * src.width;
            self.pixels[dst_ofs..dst_ofs + cols]
                .copy_from_slice(&src.pixels[src_ofs..src_ofs + cols]);
        }
    }
}

/// Per-pixel background classification; true = background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    bits: Vec<bool>, // length = width * height, row-major
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, bits: vec![false; width * height] }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        self.bits[y * self.width + x] = true;
    }

    /// Number of pixels marked as background.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }
}

/// One frame of an animation plus its authored display time.
#[derive(Clone, Debug)]
pub struct SequenceFrame {
    pub image: RasterImage,
    pub duration_ms: u32,
}

/// Ordered frames, all sharing one size. Built once, read-only after.
#[derive(Clone, Debug)]
pub struct AnimatedSequence {
    frames: Vec<SequenceFrame>,
}

impl AnimatedSequence {
    /// Rejects empty sequences, zero-size frames and mixed dimensions.
    pub fn new(frames: Vec<SequenceFrame>) -> Result<Self> {
        let first = frames
            .first()
            .ok_or_else(|| Error::invalid_image("animation has no frames"))?;
        let (w, h) = first.image.dimensions();
        if w == 0 || h == 0 {
            return Err(Error::invalid_image(format!("zero-size frame ({w}x{h})")));
        }
        if let Some((i, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.image.dimensions() != (w, h))
        {
            let (fw, fh) = f.image.dimensions();
            return Err(Error::invalid_image(format!(
                "frame {i} is {fw}x{fh}, expected {w}x{h}"
            )));
        }
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[SequenceFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// (width, height) shared by every frame.
    pub fn dimensions(&self) -> (u32, u32) {
        self.frames[0].image.dimensions()
    }

    pub fn durations(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.duration_ms).collect()
    }
}

/// Screen rectangle of another window, in desktop pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Opaque native window handle (HWND on Windows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn frame(w: u32, h: u32) -> SequenceFrame {
        SequenceFrame {
            image: RasterImage::from_pixel(w, h, Rgba([1, 2, 3, 255])),
            duration_ms: 40,
        }
    }

    #[test]
    fn sequence_rejects_empty_and_zero_size() {
        assert!(matches!(AnimatedSequence::new(vec![]), Err(Error::InvalidImage(_))));
        assert!(matches!(
            AnimatedSequence::new(vec![frame(0, 5)]),
            Err(Error::InvalidImage(_))
        ));
    }

    #[test]
    fn sequence_rejects_mixed_dimensions() {
        let err = AnimatedSequence::new(vec![frame(4, 4), frame(4, 5)]).unwrap_err();
        assert!(err.to_string().contains("frame 1"));
    }

    #[test]
    fn sequence_keeps_order_and_durations() {
        let mut second = frame(3, 2);
        second.duration_ms = 90;
        let seq = AnimatedSequence::new(vec![frame(3, 2), second]).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.dimensions(), (3, 2));
        assert_eq!(seq.durations(), vec![40, 90]);
    }

    #[test]
    fn blit_clips_to_destination() {
        let mut dst = FrameBuffer::filled(3, 2, 0);
        let src = FrameBuffer::filled(2, 2, 7);
        dst.blit(&src, 2, 1);
        assert_eq!(dst.pixels, vec![0, 0, 0, 0, 0, 7]);
    }

    #[test]
    fn mask_counts_marked_pixels() {
        let mut m = Mask::new(3, 3);
        m.set(0, 0);
        m.set(2, 1);
        assert!(m.get(2, 1));
        assert!(!m.get(1, 1));
        assert_eq!(m.count(), 2);
    }
}
