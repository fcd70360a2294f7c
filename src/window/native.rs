//! Native window manipulation capability.
//!
//! Each platform supplies one implementation of [`WindowManipulator`]; the
//! rest of the crate never branches on the platform it runs on.

use bitflags::bitflags;

/// Opaque reference to an OS window. The holder does not own the window and
/// must not assume it is still alive on a later call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub usize);

bitflags! {
    /// Window style bits. Values follow the Win32 `WS_*` constants; other
    /// platforms translate to and from them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleMask: u32 {
        const CAPTION = 0x00C0_0000;
        const SYSTEM_MENU = 0x0008_0000;
        const THICK_FRAME = 0x0004_0000;
        const MINIMIZE_BOX = 0x0002_0000;
        const MAXIMIZE_BOX = 0x0001_0000;

        /// Every bit that separates a bordered window from a borderless one.
        const CHROME = Self::CAPTION.bits()
            | Self::SYSTEM_MENU.bits()
            | Self::THICK_FRAME.bits()
            | Self::MINIMIZE_BOX.bits()
            | Self::MAXIMIZE_BOX.bits();

        // Unnamed bits (visibility, child, ...) must survive a round trip.
        const _ = !0;
    }
}

bitflags! {
    /// Flags for [`WindowManipulator::set_window_pos`], Win32 `SWP_*` values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SetWindowPosFlags: u32 {
        const NO_SIZE = 0x0001;
        const NO_MOVE = 0x0002;
        const NO_ZORDER = 0x0004;
        const NO_ACTIVATE = 0x0010;
        /// Re-evaluate the frame after a style change and redraw it.
        const FRAME_CHANGED = 0x0020;
    }
}

pub trait WindowManipulator {
    /// False on platforms where chrome cannot be changed natively; callers
    /// then treat every chrome operation as an immediate success.
    fn supports_native_chrome(&self) -> bool;

    fn active_window(&mut self) -> Option<WindowHandle>;

    fn style(&mut self, handle: WindowHandle) -> StyleMask;

    fn set_style(&mut self, handle: WindowHandle, style: StyleMask) -> bool;

    /// Moves and/or resizes the window. `x`, `y` are top-left screen
    /// coordinates in pixels.
    fn set_window_pos(
        &mut self,
        handle: WindowHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        flags: SetWindowPosFlags,
    ) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_contains_every_frame_bit() {
        for bit in [
            StyleMask::CAPTION,
            StyleMask::SYSTEM_MENU,
            StyleMask::THICK_FRAME,
            StyleMask::MINIMIZE_BOX,
            StyleMask::MAXIMIZE_BOX,
        ] {
            assert!(StyleMask::CHROME.contains(bit));
        }
        assert_eq!(StyleMask::CHROME.bits(), 0x00CF_0000);
    }

    #[test]
    fn test_unknown_bits_survive_removal() {
        // WS_OVERLAPPEDWINDOW | WS_VISIBLE
        let style = StyleMask::from_bits_retain(0x10CF_0000);
        let stripped = style.difference(StyleMask::CHROME);
        assert_eq!(stripped.bits(), 0x1000_0000);
        assert_eq!(stripped.union(StyleMask::CHROME), style);
    }
}
