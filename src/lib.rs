//! Animated GIF sprite overlay.
//!
//! Plays a GIF in a borderless, topmost, color-keyed window that sits on top
//! of whichever window currently has focus. An optional flood-fill matte
//! strips a uniform backdrop from the GIF first.
//!
//! Pipeline: [`matte`] (optional) -> [`codec`] -> [`prepare`] -> [`overlay`].

pub mod clock;
pub mod codec;
pub mod color;
pub mod config;
pub mod draw;
pub mod error;
pub mod matte;
pub mod overlay;
pub mod platform;
pub mod prepare;
pub mod session;
pub mod types;

pub use color::{TransparencyKey, similar};
pub use config::OverlayConfig;
pub use error::{Error, Result};
pub use types::{AnimatedSequence, FrameBuffer, Mask, RasterImage, SequenceFrame};
