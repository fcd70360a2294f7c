//! Backend for hosts without native window manipulation.
//!
//! Chrome is whatever the host provides, so every window call succeeds
//! without doing anything. The screen size comes from `SIGNAGE_SCREEN`
//! (`WIDTHxHEIGHT`) when set, otherwise it equals the target resolution.

use super::input::{InputSource, PumpResult};
use super::native::{SetWindowPosFlags, StyleMask, WindowHandle, WindowManipulator};
use super::screen::{parse_resolution, Screen};
use crate::geometry::Resolution;

pub struct HeadlessWindows;

impl WindowManipulator for HeadlessWindows {
    fn supports_native_chrome(&self) -> bool {
        false
    }

    fn active_window(&mut self) -> Option<WindowHandle> {
        None
    }

    fn style(&mut self, _handle: WindowHandle) -> StyleMask {
        StyleMask::empty()
    }

    fn set_style(&mut self, _handle: WindowHandle, _style: StyleMask) -> bool {
        true
    }

    fn set_window_pos(
        &mut self,
        _handle: WindowHandle,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
        _flags: SetWindowPosFlags,
    ) -> bool {
        true
    }
}

pub struct HeadlessScreen {
    fallback: Resolution,
    fullscreen: bool,
}

impl HeadlessScreen {
    pub fn new(fallback: Resolution) -> Self {
        Self {
            fallback,
            fullscreen: false,
        }
    }
}

impl Screen for HeadlessScreen {
    fn resolution(&mut self) -> Resolution {
        // Re-read every poll so a changed variable behaves like a mode switch.
        std::env::var("SIGNAGE_SCREEN")
            .ok()
            .and_then(|value| parse_resolution(&value))
            .unwrap_or(self.fallback)
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> bool {
        self.fullscreen = fullscreen;
        true
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_cursor_locked(&mut self, _locked: bool) {}
}

pub struct HeadlessInput;

impl InputSource for HeadlessInput {
    fn pump(&mut self) -> PumpResult {
        PumpResult::default()
    }
}
