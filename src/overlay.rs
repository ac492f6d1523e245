// The overlay loop. One thread, one window, fixed cadence.
// Each tick: read input, follow the focused window, draw the next frame,
// then sleep until the next frame is due.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::clock::{FpsMeter, FrameClock};
use crate::draw::DisplaySurface;
use crate::error::{Error, Result};
use crate::platform::WindowManager;
use crate::prepare::PreparedSequence;
use crate::types::{FrameBuffer, Rect, WindowHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Running,
    Terminated,
}

/// Index into the prepared frames; always in `0..len`, wraps on advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playback {
    index: usize,
    len: usize,
}

impl Playback {
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::invalid_image("nothing to play: zero frames"));
        }
        Ok(Self { index: 0, len })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.len;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_presented: u64,
}

/// Where the overlay goes to sit on top of `rect`: same left edge,
/// bottom touching the tracked window's top edge.
pub fn anchor_above(rect: Rect, overlay_height: usize) -> (i32, i32) {
    (rect.left, rect.top - overlay_height as i32)
}

pub struct Overlay<S, W> {
    surface: S,
    wm: W,
    handle: WindowHandle,
    frames: PreparedSequence,
    playback: Playback,
    screen: FrameBuffer, // reused every tick
    clock: FrameClock,
    poll_interval: Duration,
    last_poll: Option<Instant>,
    position: Option<(i32, i32)>,
    phase: Phase,
}

impl<S: DisplaySurface, W: WindowManager> Overlay<S, W> {
    /// Make the surface's window layered, topmost and color-keyed.
    /// `poll_interval` of zero queries the focused window every tick.
    /// Visual: the window's key-colored pixels turn see-through and it stays above other windows.
    pub fn new(
        surface: S,
        mut wm: W,
        frames: PreparedSequence,
        poll_interval: Duration,
    ) -> Result<Self> {
        let playback = Playback::new(frames.len())?;
        let handle = surface.native_handle();

        wm.make_layered_topmost(handle)?;
        wm.set_color_key(handle, frames.key)?;

        let screen = FrameBuffer::filled(frames.width, frames.height, frames.key.to_0rgb());
        let clock = FrameClock::new(frames.interval);
        debug!(?handle, key = %frames.key, "overlay window configured");

        Ok(Self {
            surface,
            wm,
            handle,
            frames,
            playback,
            screen,
            clock,
            poll_interval,
            last_poll: None,
            position: None,
            phase: Phase::Initializing,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last position the window was moved to, if it has moved.
    pub fn position(&self) -> Option<(i32, i32)> {
        self.position
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn window_manager(&self) -> &W {
        &self.wm
    }

    /// Run until the user quits (window closed or right click).
    /// A terminated overlay cannot be started again.
    /// Visual: the sprite animates in place until it closes.
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.phase != Phase::Initializing {
            return Err(Error::InvalidState(format!(
                "overlay cannot run from {:?}",
                self.phase
            )));
        }
        self.phase = Phase::Running;
        info!(
            frames = self.frames.len(),
            interval = ?self.clock.interval(),
            "overlay running; right-click to quit"
        );

        let result = self.run_loop();
        self.phase = Phase::Terminated;

        if let Ok(summary) = &result {
            info!(frames = summary.frames_presented, "overlay terminated");
        }
        result
    }

    fn run_loop(&mut self) -> Result<RunSummary> {
        let mut meter = FpsMeter::new();
        let mut presented = 0u64;

        while self.tick()? {
            presented += 1;
            if let Some(fps) = meter.frame() {
                debug!(fps = f64::from(fps), "measured frame rate");
            }
            self.clock.tick();
        }

        Ok(RunSummary { frames_presented: presented })
    }

    /// One frame. Returns false once the user asked to quit; nothing is
    /// drawn on that tick.
    /// Visual: the sprite steps to its next frame, looping after the last.
    fn tick(&mut self) -> Result<bool> {
        /* 1) Input */
        if self.surface.poll_input().wants_exit() {
            return Ok(false);
        }

        /* 2) Follow the focused window */
        self.track_focused_window()?;

        /* 3) Draw the current frame over the key color and advance */
        self.screen.fill(self.frames.key.to_0rgb());
        self.screen.blit(&self.frames.frames[self.playback.index()], 0, 0);
        self.playback.advance();
        self.surface.present(&self.screen)?;

        Ok(true)
    }

    /// Visual: the sprite jumps to sit on the top edge of whichever window
    /// you click into; it stays put while the desktop or itself has focus.
    fn track_focused_window(&mut self) -> Result<()> {
        let now = Instant::now();
        if let Some(last) = self.last_poll {
            if now.duration_since(last) < self.poll_interval {
                return Ok(());
            }
        }
        self.last_poll = Some(now);

        // no focused window (or it's us): stay where we are
        let Some((active, rect)) = self.wm.focused_window() else {
            return Ok(());
        };
        if active == self.handle {
            return Ok(());
        }

        let target = anchor_above(rect, self.frames.height);
        if self.position == Some(target) {
            return Ok(());
        }
        self.wm.move_window(self.handle, target.0, target.1)?;
        self.position = Some(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TransparencyKey;
    use crate::draw::Input;

    const SELF_HANDLE: WindowHandle = WindowHandle(7);

    struct FakeSurface {
        polls: usize,
        exit_on_poll: usize,
        exit_with: Input,
        presented: Vec<u32>, // first pixel of each presented frame
        fail_present: bool,
    }

    impl FakeSurface {
        fn quitting_after(ticks: usize) -> Self {
            Self {
                polls: 0,
                exit_on_poll: ticks,
                exit_with: Input { quit: true, right_button: false },
                presented: Vec::new(),
                fail_present: false,
            }
        }
    }

    impl DisplaySurface for FakeSurface {
        fn native_handle(&self) -> WindowHandle {
            SELF_HANDLE
        }

        fn poll_input(&mut self) -> Input {
            let input = if self.polls == self.exit_on_poll { self.exit_with } else { Input::default() };
            self.polls += 1;
            input
        }

        fn present(&mut self, frame: &FrameBuffer) -> Result<()> {
            if self.fail_present {
                return Err(Error::WindowUpdate("surface gone".into()));
            }
            self.presented.push(frame.pixels[0]);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeWm {
        layered: bool,
        key: Option<TransparencyKey>,
        focused: Option<(WindowHandle, Rect)>,
        queries: usize,
        moves: Vec<(i32, i32)>,
        fail_moves: bool,
    }

    impl WindowManager for FakeWm {
        fn make_layered_topmost(&mut self, window: WindowHandle) -> Result<()> {
            assert_eq!(window, SELF_HANDLE);
            self.layered = true;
            Ok(())
        }

        fn set_color_key(&mut self, _window: WindowHandle, key: TransparencyKey) -> Result<()> {
            self.key = Some(key);
            Ok(())
        }

        fn move_window(&mut self, _window: WindowHandle, x: i32, y: i32) -> Result<()> {
            if self.fail_moves {
                return Err(Error::platform("SetWindowPos failed"));
            }
            self.moves.push((x, y));
            Ok(())
        }

        fn focused_window(&mut self) -> Option<(WindowHandle, Rect)> {
            self.queries += 1;
            self.focused
        }
    }

    /// `n` frames of 4x2, frame i filled with color i + 1.
    fn prepared(n: u32) -> PreparedSequence {
        PreparedSequence {
            width: 4,
            height: 2,
            frames: (0..n).map(|i| FrameBuffer::filled(4, 2, i + 1)).collect(),
            durations_ms: vec![100; n as usize],
            interval: Duration::from_millis(1),
            key: TransparencyKey::MAGENTA,
        }
    }

    fn rect(left: i32, top: i32) -> Rect {
        Rect { left, top, right: left + 300, bottom: top + 200 }
    }

    #[test]
    fn playback_wraps_after_len_advances() {
        let mut p = Playback::new(5).unwrap();
        for _ in 0..5 {
            p.advance();
        }
        assert_eq!(p.index(), 0);
        assert!(Playback::new(0).is_err());
    }

    #[test]
    fn new_configures_window_before_running() {
        let overlay =
            Overlay::new(FakeSurface::quitting_after(0), FakeWm::default(), prepared(2), Duration::ZERO)
                .unwrap();
        assert_eq!(overlay.phase(), Phase::Initializing);
        assert!(overlay.window_manager().layered);
        assert_eq!(overlay.window_manager().key, Some(TransparencyKey::MAGENTA));
    }

    #[test]
    fn frames_cycle_in_order_until_quit() {
        let mut overlay =
            Overlay::new(FakeSurface::quitting_after(7), FakeWm::default(), prepared(3), Duration::ZERO)
                .unwrap();
        let summary = overlay.run().unwrap();

        assert_eq!(summary.frames_presented, 7);
        assert_eq!(overlay.surface().presented, vec![1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(overlay.phase(), Phase::Terminated);
        assert_eq!(overlay.playback().index(), 7 % 3);
    }

    #[test]
    fn right_click_on_first_tick_draws_nothing() {
        let mut surface = FakeSurface::quitting_after(0);
        surface.exit_with = Input { quit: false, right_button: true };
        let mut overlay = Overlay::new(surface, FakeWm::default(), prepared(2), Duration::ZERO).unwrap();

        assert_eq!(overlay.run().unwrap().frames_presented, 0);
        assert!(overlay.surface().presented.is_empty());
    }

    #[test]
    fn terminated_overlay_cannot_rerun() {
        let mut overlay =
            Overlay::new(FakeSurface::quitting_after(1), FakeWm::default(), prepared(1), Duration::ZERO)
                .unwrap();
        overlay.run().unwrap();
        assert!(matches!(overlay.run(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn present_failure_ends_the_run() {
        let mut surface = FakeSurface::quitting_after(5);
        surface.fail_present = true;
        let mut overlay = Overlay::new(surface, FakeWm::default(), prepared(2), Duration::ZERO).unwrap();

        assert!(matches!(overlay.run(), Err(Error::WindowUpdate(_))));
        assert_eq!(overlay.phase(), Phase::Terminated);
        assert_eq!(overlay.surface().polls, 1);
    }

    #[test]
    fn move_failure_ends_the_run() {
        let wm = FakeWm {
            focused: Some((WindowHandle(99), rect(100, 300))),
            fail_moves: true,
            ..FakeWm::default()
        };
        let mut overlay =
            Overlay::new(FakeSurface::quitting_after(5), wm, prepared(2), Duration::ZERO).unwrap();

        assert!(matches!(overlay.run(), Err(Error::Platform(_))));
        assert_eq!(overlay.phase(), Phase::Terminated);
        assert_eq!(overlay.position(), None);
        assert!(overlay.surface().presented.is_empty());
    }

    #[test]
    fn sits_above_the_focused_window() {
        let wm = FakeWm { focused: Some((WindowHandle(99), rect(100, 300))), ..FakeWm::default() };
        let mut overlay =
            Overlay::new(FakeSurface::quitting_after(3), wm, prepared(2), Duration::ZERO).unwrap();
        overlay.run().unwrap();

        assert_eq!(overlay.position(), Some((100, 298)));
        // unchanged target: moved once, queried every tick
        assert_eq!(overlay.window_manager().moves, vec![(100, 298)]);
        assert_eq!(overlay.window_manager().queries, 3);
    }

    #[test]
    fn no_focus_or_self_focus_keeps_position() {
        for focused in [None, Some((SELF_HANDLE, rect(5, 5)))] {
            let wm = FakeWm { focused, ..FakeWm::default() };
            let mut overlay =
                Overlay::new(FakeSurface::quitting_after(2), wm, prepared(2), Duration::ZERO).unwrap();
            assert_eq!(overlay.run().unwrap().frames_presented, 2);
            assert!(overlay.window_manager().moves.is_empty());
            assert_eq!(overlay.position(), None);
        }
    }

    #[test]
    fn poll_interval_throttles_focus_queries() {
        let wm = FakeWm { focused: Some((WindowHandle(99), rect(0, 0))), ..FakeWm::default() };
        let mut overlay =
            Overlay::new(FakeSurface::quitting_after(5), wm, prepared(2), Duration::from_secs(3600))
                .unwrap();
        assert_eq!(overlay.run().unwrap().frames_presented, 5);
        assert_eq!(overlay.window_manager().queries, 1);
    }

    #[test]
    fn anchor_offsets_by_overlay_height() {
        assert_eq!(anchor_above(rect(-10, 40), 64), (-10, -24));
    }
}
