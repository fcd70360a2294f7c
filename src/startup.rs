//! Frame-gated startup sequence for the presentation window.
//!
//! The OS creates the window asynchronously to the render loop, so chrome is
//! only touched after a few frame boundaries have passed:
//!
//! ```text
//! Created -> AwaitingWindow (3 frames) -> ChromeApplied (2 frames) -> Positioned
//! ```
//!
//! Platforms without native window manipulation go straight to `Positioned`.
//! Each call to [`StartupSequencer::on_frame`] is one frame boundary;
//! suspension is simply returning after recording the next state.

use std::fmt;

use crate::geometry::Resolution;
use crate::window::{ChromeController, ChromeError, WindowStyleState};

pub const WINDOW_CREATION_FRAMES: u32 = 3;
pub const POSITION_SETTLE_FRAMES: u32 = 2;

/// How many extra frames to wait for a window handle before giving up.
pub const MAX_HANDLE_RETRIES: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    Created,
    AwaitingWindow { frames_left: u32 },
    ChromeApplied { frames_left: u32 },
    Positioned,
}

impl fmt::Display for StartupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::AwaitingWindow { .. } => write!(f, "awaiting-window"),
            Self::ChromeApplied { .. } => write!(f, "chrome-applied"),
            Self::Positioned => write!(f, "positioned"),
        }
    }
}

/// Result of one frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupStep {
    pub state: StartupState,
    /// True only on the frame that reached `Positioned`.
    pub ready: bool,
}

pub struct StartupSequencer {
    state: StartupState,
    /// Chrome applied once the window exists.
    initial: WindowStyleState,
    handle_retries: u32,
}

impl StartupSequencer {
    pub fn new(initial: WindowStyleState) -> Self {
        Self {
            state: StartupState::Created,
            initial,
            handle_retries: 0,
        }
    }

    pub fn state(&self) -> StartupState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == StartupState::Positioned
    }

    /// Advances the sequence by one frame boundary. `style` is the single
    /// canonical chrome state shared with the user toggle.
    pub fn on_frame(
        &mut self,
        chrome: &mut ChromeController,
        style: &mut WindowStyleState,
        size: Resolution,
    ) -> StartupStep {
        let next = match self.state {
            StartupState::Created => {
                if chrome.supports_native_chrome() {
                    StartupState::AwaitingWindow {
                        frames_left: WINDOW_CREATION_FRAMES,
                    }
                } else {
                    log::debug!("No native window manipulation; startup sequence skipped");
                    StartupState::Positioned
                }
            }
            StartupState::AwaitingWindow { frames_left } if frames_left > 1 => {
                StartupState::AwaitingWindow {
                    frames_left: frames_left - 1,
                }
            }
            StartupState::AwaitingWindow { .. } => self.apply_initial_chrome(chrome, style),
            StartupState::ChromeApplied { frames_left } if frames_left > 1 => {
                StartupState::ChromeApplied {
                    frames_left: frames_left - 1,
                }
            }
            StartupState::ChromeApplied { .. } => {
                if *style == WindowStyleState::Borderless {
                    if let Err(e) = chrome.position_top_left(size) {
                        log::warn!("Could not pin window to top-left: {}", e);
                    }
                }
                StartupState::Positioned
            }
            StartupState::Positioned => StartupState::Positioned,
        };

        let ready = next == StartupState::Positioned && self.state != StartupState::Positioned;
        if next != self.state {
            log::debug!("Startup: {} -> {}", self.state, next);
        }
        if ready {
            log::info!("Startup sequence complete ({} window)", style);
        }
        self.state = next;
        StartupStep { state: next, ready }
    }

    fn apply_initial_chrome(
        &mut self,
        chrome: &mut ChromeController,
        style: &mut WindowStyleState,
    ) -> StartupState {
        match chrome.set_chrome(self.initial) {
            Ok(()) => *style = self.initial,
            Err(ChromeError::HandleUnavailable) if self.handle_retries < MAX_HANDLE_RETRIES => {
                // The window is still not there; try again next frame.
                self.handle_retries += 1;
                return StartupState::AwaitingWindow { frames_left: 1 };
            }
            Err(e) => log::warn!("Initial window chrome not applied: {}", e),
        }
        StartupState::ChromeApplied {
            frames_left: POSITION_SETTLE_FRAMES,
        }
    }
}
