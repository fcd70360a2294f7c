//! Bordered/borderless window chrome and top-left pinning.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use super::native::{SetWindowPosFlags, StyleMask, WindowHandle, WindowManipulator};
use crate::geometry::Resolution;

/// Canonical chrome state of the presentation window. The window's style
/// bits always correspond to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStyleState {
    Bordered,
    Borderless,
}

impl WindowStyleState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Bordered => Self::Borderless,
            Self::Borderless => Self::Bordered,
        }
    }

    /// Rewrites the chrome bits of `style`, leaving every other bit alone.
    pub fn apply_to(self, style: StyleMask) -> StyleMask {
        match self {
            Self::Bordered => style.union(StyleMask::CHROME),
            Self::Borderless => style.difference(StyleMask::CHROME),
        }
    }
}

impl fmt::Display for WindowStyleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bordered => write!(f, "bordered"),
            Self::Borderless => write!(f, "borderless"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChromeError {
    #[error("no active window handle is available")]
    HandleUnavailable,
    #[error("native call {call} failed")]
    NativeCallFailed { call: &'static str },
}

/// Drives window style and position through a [`WindowManipulator`].
///
/// The controller never caches the window handle; it is looked up on every
/// call because the OS owns the window's lifetime.
pub struct ChromeController {
    native: Box<dyn WindowManipulator>,
}

impl ChromeController {
    pub fn new(native: Box<dyn WindowManipulator>) -> Self {
        Self { native }
    }

    pub fn supports_native_chrome(&self) -> bool {
        self.native.supports_native_chrome()
    }

    fn handle(&mut self) -> Result<WindowHandle, ChromeError> {
        self.native
            .active_window()
            .ok_or(ChromeError::HandleUnavailable)
    }

    /// Sets the window's chrome bits to `desired` and redraws the frame
    /// without moving, resizing or restacking the window.
    pub fn set_chrome(&mut self, desired: WindowStyleState) -> Result<(), ChromeError> {
        if !self.native.supports_native_chrome() {
            return Ok(());
        }
        let handle = self.handle()?;

        let current = self.native.style(handle);
        let next = desired.apply_to(current);
        if !self.native.set_style(handle, next) {
            return Err(ChromeError::NativeCallFailed { call: "set_style" });
        }

        let redraw = SetWindowPosFlags::NO_MOVE
            | SetWindowPosFlags::NO_SIZE
            | SetWindowPosFlags::NO_ZORDER
            | SetWindowPosFlags::FRAME_CHANGED;
        if !self.native.set_window_pos(handle, 0, 0, 0, 0, redraw) {
            return Err(ChromeError::NativeCallFailed {
                call: "set_window_pos",
            });
        }

        log::info!(
            "Window chrome set to {} (style {:#010x} -> {:#010x})",
            desired,
            current.bits(),
            next.bits()
        );
        Ok(())
    }

    /// Moves the window to screen (0, 0) with the given size, keeping its
    /// place in the z-order.
    pub fn position_top_left(&mut self, size: Resolution) -> Result<(), ChromeError> {
        if !self.native.supports_native_chrome() {
            return Ok(());
        }
        let handle = self.handle()?;

        if !self.native.set_window_pos(
            handle,
            0,
            0,
            size.width,
            size.height,
            SetWindowPosFlags::NO_ZORDER,
        ) {
            return Err(ChromeError::NativeCallFailed {
                call: "set_window_pos",
            });
        }

        log::info!("Window pinned to (0, 0) at {}", size);
        Ok(())
    }

    /// Flips `state` and applies it. Only a switch into borderless re-pins
    /// the window; bordered windows stay where the OS puts them.
    ///
    /// `state` is left unchanged when the chrome could not be applied. Once
    /// the chrome has changed the toggle succeeds even if pinning fails.
    pub fn toggle(
        &mut self,
        state: &mut WindowStyleState,
        size: Resolution,
    ) -> Result<WindowStyleState, ChromeError> {
        let desired = state.toggled();
        self.set_chrome(desired)?;
        *state = desired;

        if desired == WindowStyleState::Borderless {
            if let Err(e) = self.position_top_left(size) {
                log::warn!("Borderless window left unpinned: {}", e);
            }
        }
        Ok(desired)
    }
}
