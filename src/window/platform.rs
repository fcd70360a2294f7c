//! Picks the platform backend once at startup.

use super::headless::{HeadlessInput, HeadlessScreen, HeadlessWindows};
use super::input::InputSource;
use super::native::WindowManipulator;
use super::screen::Screen;
use crate::geometry::Resolution;

/// Every platform capability the player consumes.
pub struct Platform {
    pub name: &'static str,
    pub windows: Box<dyn WindowManipulator>,
    pub screen: Box<dyn Screen>,
    pub input: Box<dyn InputSource>,
}

impl Platform {
    pub fn headless(target: Resolution) -> Self {
        Self {
            name: "headless",
            windows: Box::new(HeadlessWindows),
            screen: Box::new(HeadlessScreen::new(target)),
            input: Box::new(HeadlessInput),
        }
    }
}

/// Creates the presentation window on platforms that have one, falling back
/// to the headless backend when that fails or no native backend exists.
pub fn detect(target: Resolution) -> Platform {
    #[cfg(windows)]
    {
        if let Some(platform) = super::win32::platform(target) {
            return platform;
        }
        log::warn!("Win32 presentation window unavailable; running headless");
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(platform) = super::macos::platform(target) {
            return platform;
        }
        log::warn!("AppKit presentation window unavailable; running headless");
    }

    Platform::headless(target)
}
