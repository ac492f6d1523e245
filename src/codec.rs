// Reads an animation from disk into an AnimatedSequence and writes one back.
// Decoding goes through the `image` crate (GIF frames come out already
// composited to full-canvas RGBA). Encoding drives `gif` directly so we can
// pick the disposal method and palette layout.

use std::fs::File;
use std::io::{BufRead, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, ImageReader};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{AnimatedSequence, DEFAULT_FRAME_DURATION_MS, SequenceFrame};

/// Suffix added to the file stem of a background-removed copy.
pub const TRANSPARENT_SUFFIX: &str = "_transparent";

/// Decode `path` into frames with their authored delays.
/// GIFs yield every frame; any other still format yields one frame.
#[tracing::instrument]
pub fn decode(path: &Path) -> Result<AnimatedSequence> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| Error::source_not_found(path, e))?;

    let frames = match reader.format() {
        Some(ImageFormat::Gif) => decode_gif(reader.into_inner())?,
        _ => {
            let still = reader
                .decode()
                .map_err(|e| Error::invalid_image(format!("{}: {e}", path.display())))?;
            vec![SequenceFrame {
                image: still.to_rgba8(),
                duration_ms: DEFAULT_FRAME_DURATION_MS,
            }]
        }
    };

    let sequence = AnimatedSequence::new(frames)?;
    let (w, h) = sequence.dimensions();
    info!(frames = sequence.len(), width = w, height = h, "decoded animation");
    Ok(sequence)
}

fn decode_gif<R: BufRead + Seek>(reader: R) -> Result<Vec<SequenceFrame>> {
    let decoder = GifDecoder::new(reader).map_err(|e| Error::invalid_image(e.to_string()))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| Error::invalid_image(e.to_string()))?;

    Ok(frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let ms = if denom == 0 { 0 } else { numer / denom };
            SequenceFrame {
                image: frame.into_buffer(),
                // a zero delay means the file didn't say; play it like browsers do
                duration_ms: if ms == 0 { DEFAULT_FRAME_DURATION_MS } else { ms },
            }
        })
        .collect())
}

/// Write `sequence` as a looping GIF: infinite repeat, disposal
/// "restore to background", transparent color at palette index 0.
#[tracing::instrument(skip(sequence), fields(frames = sequence.len()))]
pub fn encode(path: &Path, sequence: &AnimatedSequence) -> Result<()> {
    let (w, h) = sequence.dimensions();
    let (w, h) = match (u16::try_from(w), u16::try_from(h)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(Error::encode(format!("{w}x{h} exceeds GIF limits"))),
    };

    let file = File::create(path)
        .map_err(|e| Error::encode(format!("create {}: {e}", path.display())))?;
    let mut encoder = gif::Encoder::new(BufWriter::new(file), w, h, &[])
        .map_err(|e| Error::encode(e.to_string()))?;
    encoder
        .set_repeat(gif::Repeat::Infinite)
        .map_err(|e| Error::encode(e.to_string()))?;

    for (i, f) in sequence.frames().iter().enumerate() {
        let frame = to_gif_frame(f, w, h);
        debug!(frame = i, delay_cs = frame.delay, "encoding frame");
        encoder
            .write_frame(&frame)
            .map_err(|e| Error::encode(format!("frame {i}: {e}")))?;
    }

    let mut out = encoder.into_inner().map_err(|e| Error::encode(e.to_string()))?;
    out.flush().map_err(|e| Error::encode(e.to_string()))?;

    info!(path = %path.display(), "wrote animation");
    Ok(())
}

fn to_gif_frame(f: &SequenceFrame, w: u16, h: u16) -> gif::Frame<'static> {
    let mut rgba = f.image.as_raw().clone();
    let mut frame = gif::Frame::from_rgba_speed(w, h, &mut rgba, 10);
    frame.dispose = gif::DisposalMethod::Background;
    frame.delay = ((f.duration_ms + 5) / 10).clamp(1, u16::MAX as u32) as u16;
    move_transparent_to_index_zero(&mut frame);
    frame
}

/// Swap palette slots so the transparent color lives at index 0.
fn move_transparent_to_index_zero(frame: &mut gif::Frame<'_>) {
    let Some(t) = frame.transparent.filter(|t| *t != 0) else {
        return;
    };
    let Some(palette) = frame.palette.as_mut() else {
        return;
    };
    let slot = t as usize * 3;
    if slot + 3 > palette.len() {
        return;
    }
    for c in 0..3 {
        palette.swap(c, slot + c);
    }
    frame.buffer.to_mut().iter_mut().for_each(|idx| {
        if *idx == 0 {
            *idx = t;
        } else if *idx == t {
            *idx = 0;
        }
    });
    frame.transparent = Some(0);
}

/// `dir/cat.gif` -> `dir/cat_transparent.gif`.
pub fn transparent_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{TRANSPARENT_SUFFIX}.gif"))
}
