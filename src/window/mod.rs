pub mod chrome;
mod headless;
pub mod input;
#[cfg(target_os = "macos")]
mod macos;
pub mod native;
pub mod platform;
pub mod screen;
#[cfg(windows)]
mod win32;

pub use chrome::{ChromeController, ChromeError, WindowStyleState};
pub use input::{InputSource, Key};
pub use platform::{detect as detect_platform, Platform};
pub use screen::Screen;
