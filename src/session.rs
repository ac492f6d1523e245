// Launch flow: (optional) matte -> write `_transparent.gif` -> reload ->
// prepare frames -> open the window -> run. Everything before the window
// runs once, in order, and any failure aborts the launch.

use std::path::PathBuf;

use tracing::info;

use crate::codec;
use crate::config::OverlayConfig;
use crate::draw::Drawer;
use crate::error::Result;
use crate::matte;
use crate::overlay::{Overlay, RunSummary};
use crate::platform;
use crate::prepare::{self, PreparedSequence};

/// Strip the backdrop of `config.source` and write it next to the source.
/// Returns the path of the written file.
pub fn write_transparent_copy(config: &OverlayConfig) -> Result<PathBuf> {
    let source = codec::decode(&config.source)?;
    let cleaned = matte::remove_sequence_background(&source, config.tolerance)?;
    let out = codec::transparent_output_path(&config.source);
    codec::encode(&out, &cleaned)?;
    Ok(out)
}

/// Decode (after background removal, if asked) and prepare frames.
pub fn load_frames(config: &OverlayConfig) -> Result<PreparedSequence> {
    let path = if config.remove_background {
        write_transparent_copy(config)?
    } else {
        config.source.clone()
    };
    let sequence = codec::decode(&path)?;
    prepare::prepare_frames(&sequence, config.fit_box(), config.key, config.fps)
}

/// Full launch with the native window and window manager.
pub fn launch(config: &OverlayConfig) -> Result<RunSummary> {
    let frames = load_frames(config)?;
    info!(width = frames.width, height = frames.height, "opening overlay window");

    let drawer = Drawer::new("GIF Overlay", frames.width, frames.height)?;
    let mut overlay = Overlay::new(drawer, platform::native(), frames, config.poll_interval)?;
    overlay.run()
}
