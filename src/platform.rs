// OS window-manager services: color-keyed topmost window + foreground tracking.
// Only Windows exposes what we need; elsewhere a no-op manager keeps the
// overlay running in place.

use crate::color::TransparencyKey;
use crate::error::Result;
use crate::types::{Rect, WindowHandle};

pub trait WindowManager {
    /// Flag the window as layered, tool-style and always on top.
    fn make_layered_topmost(&mut self, window: WindowHandle) -> Result<()>;

    /// Pixels equal to `key` show the desktop through the window.
    fn set_color_key(&mut self, window: WindowHandle, key: TransparencyKey) -> Result<()>;

    /// Move without resizing or changing stacking order.
    fn move_window(&mut self, window: WindowHandle, x: i32, y: i32) -> Result<()>;

    /// The focused top-level window, if any.
    fn focused_window(&mut self) -> Option<(WindowHandle, Rect)>;
}

impl<W: WindowManager + ?Sized> WindowManager for Box<W> {
    fn make_layered_topmost(&mut self, window: WindowHandle) -> Result<()> {
        (**self).make_layered_topmost(window)
    }

    fn set_color_key(&mut self, window: WindowHandle, key: TransparencyKey) -> Result<()> {
        (**self).set_color_key(window, key)
    }

    fn move_window(&mut self, window: WindowHandle, x: i32, y: i32) -> Result<()> {
        (**self).move_window(window, x, y)
    }

    fn focused_window(&mut self) -> Option<(WindowHandle, Rect)> {
        (**self).focused_window()
    }
}

/// Picks the native manager for this build target.
pub fn native() -> Box<dyn WindowManager> {
    #[cfg(target_os = "windows")]
    {
        Box::new(win32::Win32WindowManager)
    }
    #[cfg(not(target_os = "windows"))]
    {
        Box::new(NullWindowManager)
    }
}

/// Does nothing; reports no focused window.
#[derive(Debug, Default)]
pub struct NullWindowManager;

impl WindowManager for NullWindowManager {
    fn make_layered_topmost(&mut self, window: WindowHandle) -> Result<()> {
        tracing::warn!(?window, "layered/topmost windows unsupported on this platform");
        Ok(())
    }

    fn set_color_key(&mut self, window: WindowHandle, key: TransparencyKey) -> Result<()> {
        tracing::warn!(?window, %key, "color keying unsupported on this platform");
        Ok(())
    }

    fn move_window(&mut self, _window: WindowHandle, _x: i32, _y: i32) -> Result<()> {
        Ok(())
    }

    fn focused_window(&mut self) -> Option<(WindowHandle, Rect)> {
        None
    }
}

#[cfg(target_os = "windows")]
pub mod win32 {
    use std::ffi::c_void;

    use windows::Win32::Foundation::{COLORREF, HWND, RECT};
    use windows::Win32::UI::WindowsAndMessaging::{
        GWL_EXSTYLE, GetForegroundWindow, GetWindowLongW, GetWindowRect, HWND_TOPMOST,
        LWA_COLORKEY, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER,
        SetLayeredWindowAttributes, SetWindowLongW, SetWindowPos, WS_EX_LAYERED,
        WS_EX_TOOLWINDOW,
    };

    use super::WindowManager;
    use crate::color::TransparencyKey;
    use crate::error::{Error, Result};
    use crate::types::{Rect, WindowHandle};

    pub struct Win32WindowManager;

    fn hwnd(window: WindowHandle) -> HWND {
        HWND(window.0 as *mut c_void)
    }

    /// COLORREF is 0x00BBGGRR.
    fn colorref(key: TransparencyKey) -> COLORREF {
        let [r, g, b] = key.rgb();
        COLORREF(((b as u32) << 16) | ((g as u32) << 8) | r as u32)
    }

    impl WindowManager for Win32WindowManager {
        fn make_layered_topmost(&mut self, window: WindowHandle) -> Result<()> {
            let h = hwnd(window);
            unsafe {
                let styles = GetWindowLongW(h, GWL_EXSTYLE);
                SetWindowLongW(
                    h,
                    GWL_EXSTYLE,
                    styles | (WS_EX_LAYERED.0 | WS_EX_TOOLWINDOW.0) as i32,
                );
                SetWindowPos(h, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE)
                    .map_err(|e| Error::platform(format!("SetWindowPos(TOPMOST): {e}")))?;
            }
            Ok(())
        }

        fn set_color_key(&mut self, window: WindowHandle, key: TransparencyKey) -> Result<()> {
            unsafe { SetLayeredWindowAttributes(hwnd(window), colorref(key), 0, LWA_COLORKEY) }
                .map_err(|e| Error::platform(format!("SetLayeredWindowAttributes: {e}")))
        }

        fn move_window(&mut self, window: WindowHandle, x: i32, y: i32) -> Result<()> {
            unsafe {
                SetWindowPos(
                    hwnd(window),
                    HWND(std::ptr::null_mut()),
                    x,
                    y,
                    0,
                    0,
                    SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
                )
            }
            .map_err(|e| Error::platform(format!("SetWindowPos(move): {e}")))
        }

        fn focused_window(&mut self) -> Option<(WindowHandle, Rect)> {
            let active = unsafe { GetForegroundWindow() };
            if active.0.is_null() {
                return None;
            }
            let mut rect = RECT::default();
            unsafe { GetWindowRect(active, &mut rect) }.ok()?;
            Some((
                WindowHandle(active.0 as isize),
                Rect {
                    left: rect.left,
                    top: rect.top,
                    right: rect.right,
                    bottom: rect.bottom,
                },
            ))
        }
    }

}
