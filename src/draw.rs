// Display surface: the borderless minifb window the sprite is drawn into.
// The controller only sees the `DisplaySurface` trait so the loop can be
// driven headless in tests.

use minifb::{MouseButton, Window, WindowOptions};

use crate::error::{Error, Result};
use crate::types::{FrameBuffer, WindowHandle};

/// Input gathered since the last present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    /// Window closed by the OS or user.
    pub quit: bool,
    pub right_button: bool,
}

impl Input {
    pub fn wants_exit(&self) -> bool {
        self.quit || self.right_button
    }
}

pub trait DisplaySurface {
    fn native_handle(&self) -> WindowHandle;

    /// Drain pending events.
    /// Visual: none; closing the window or holding right-click ends playback.
    fn poll_input(&mut self) -> Input;

    /// Push a full frame to the screen.
    /// Visual: the sprite changes to this frame; key-colored pixels show the desktop through.
    fn present(&mut self, frame: &FrameBuffer) -> Result<()>;
}

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Undecorated, topmost, fixed-size window of exactly `width` x `height`.
    /// Visual: a small black borderless box pops up until the first frame lands.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let options = WindowOptions {
            borderless: true,
            title: false,
            resize: false,
            topmost: true,
            none: true,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        // pacing is done by FrameClock
        window.set_target_fps(0);
        Ok(Self { window })
    }
}

impl DisplaySurface for Drawer {
    fn native_handle(&self) -> WindowHandle {
        WindowHandle(self.window.get_window_handle() as isize)
    }

    fn poll_input(&mut self) -> Input {
        Input {
            quit: !self.window.is_open(),
            right_button: self.window.get_mouse_down(MouseButton::Right),
        }
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&frame.pixels, frame.width, frame.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn either_signal_exits() {
        assert!(!Input::default().wants_exit());
        assert!(Input { quit: true, right_button: false }.wants_exit());
        assert!(Input { quit: false, right_button: true }.wants_exit());
    }
}
