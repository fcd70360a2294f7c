//! AppKit backend.
//!
//! Style bits are translated to the canonical Win32 layout so the chrome
//! controller works unchanged: `Titled` maps to the caption, `Closable` to
//! the system menu, `Miniaturizable` to the minimize box and `Resizable` to
//! the thick frame plus maximize box. AppKit frames use a bottom-left origin
//! in points; positions arriving here are top-left pixels.
#![allow(unused_unsafe)]

use core_graphics::display::CGDisplay;
use objc2::rc::Retained;
use objc2::{define_class, msg_send, MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{
    NSApplication, NSApplicationActivationPolicy, NSBackingStoreType, NSEventMask, NSEventType,
    NSScreen, NSWindow, NSWindowCollectionBehavior, NSWindowStyleMask,
};
use objc2_foundation::{NSDate, NSPoint, NSRect, NSSize, NSString};

use super::input::{InputSource, Key, PumpResult};
use super::native::{SetWindowPosFlags, StyleMask, WindowHandle, WindowManipulator};
use super::platform::Platform;
use super::screen::Screen;
use crate::geometry::Resolution;

/// AppKit bits with no Win32 counterpart; these pass through untouched.
const PASSTHROUGH_BITS: usize = 0xFFF0;

// Borderless NSWindows refuse key status by default; the presentation window
// must stay key so it can be found as the active window and receive keys.
define_class!(
    #[unsafe(super(NSWindow))]
    #[thread_kind = MainThreadOnly]
    #[name = "SignagePresentationWindow"]
    struct SignageWindow;

    impl SignageWindow {
        #[unsafe(method(canBecomeKeyWindow))]
        fn can_become_key_window(&self) -> bool {
            true
        }

        #[unsafe(method(canBecomeMainWindow))]
        fn can_become_main_window(&self) -> bool {
            true
        }
    }
);

impl SignageWindow {
    fn new(mtm: MainThreadMarker, frame: NSRect, style: NSWindowStyleMask) -> Retained<Self> {
        unsafe {
            msg_send![
                Self::alloc(mtm),
                initWithContentRect: frame,
                styleMask: style,
                backing: NSBackingStoreType::Buffered,
                defer: false
            ]
        }
    }
}

fn to_canonical(mask: NSWindowStyleMask) -> StyleMask {
    let mut style = StyleMask::from_bits_retain((mask.0 & PASSTHROUGH_BITS) as u32);
    if mask.contains(NSWindowStyleMask::Titled) {
        style |= StyleMask::CAPTION;
    }
    if mask.contains(NSWindowStyleMask::Closable) {
        style |= StyleMask::SYSTEM_MENU;
    }
    if mask.contains(NSWindowStyleMask::Miniaturizable) {
        style |= StyleMask::MINIMIZE_BOX;
    }
    if mask.contains(NSWindowStyleMask::Resizable) {
        style |= StyleMask::THICK_FRAME | StyleMask::MAXIMIZE_BOX;
    }
    style
}

fn from_canonical(style: StyleMask) -> NSWindowStyleMask {
    let mut mask = NSWindowStyleMask(style.bits() as usize & PASSTHROUGH_BITS);
    if style.contains(StyleMask::CAPTION) {
        mask |= NSWindowStyleMask::Titled;
    }
    if style.contains(StyleMask::SYSTEM_MENU) {
        mask |= NSWindowStyleMask::Closable;
    }
    if style.contains(StyleMask::MINIMIZE_BOX) {
        mask |= NSWindowStyleMask::Miniaturizable;
    }
    if style.intersects(StyleMask::THICK_FRAME | StyleMask::MAXIMIZE_BOX) {
        mask |= NSWindowStyleMask::Resizable;
    }
    mask
}

fn main_screen_height(mtm: MainThreadMarker) -> f64 {
    NSScreen::mainScreen(mtm)
        .map(|screen| screen.frame().size.height)
        .unwrap_or(0.0)
}

pub struct MacWindows {
    mtm: MainThreadMarker,
}

impl MacWindows {
    fn window_for(&self, handle: WindowHandle) -> Option<Retained<NSWindow>> {
        let app = NSApplication::sharedApplication(self.mtm);
        unsafe { app.windowWithWindowNumber(handle.0 as isize) }
    }
}

impl WindowManipulator for MacWindows {
    fn supports_native_chrome(&self) -> bool {
        true
    }

    fn active_window(&mut self) -> Option<WindowHandle> {
        let app = NSApplication::sharedApplication(self.mtm);
        let window = app.keyWindow().or_else(|| app.mainWindow())?;
        let number = window.windowNumber();
        (number > 0).then_some(WindowHandle(number as usize))
    }

    fn style(&mut self, handle: WindowHandle) -> StyleMask {
        self.window_for(handle)
            .map(|window| to_canonical(window.styleMask()))
            .unwrap_or(StyleMask::empty())
    }

    fn set_style(&mut self, handle: WindowHandle, style: StyleMask) -> bool {
        let Some(window) = self.window_for(handle) else {
            return false;
        };
        window.setStyleMask(from_canonical(style));
        true
    }

    fn set_window_pos(
        &mut self,
        handle: WindowHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        flags: SetWindowPosFlags,
    ) -> bool {
        let Some(window) = self.window_for(handle) else {
            return false;
        };

        if flags.contains(SetWindowPosFlags::NO_MOVE | SetWindowPosFlags::NO_SIZE) {
            if flags.contains(SetWindowPosFlags::FRAME_CHANGED) {
                window.invalidateShadow();
                if let Some(view) = window.contentView() {
                    view.setNeedsDisplay(true);
                }
                window.displayIfNeeded();
            }
            return true;
        }

        let scale = window.backingScaleFactor();
        let current = window.frame();
        let size = if flags.contains(SetWindowPosFlags::NO_SIZE) {
            current.size
        } else {
            NSSize::new(f64::from(width) / scale, f64::from(height) / scale)
        };
        let origin = if flags.contains(SetWindowPosFlags::NO_MOVE) {
            current.origin
        } else {
            let top = f64::from(y) / scale;
            NSPoint::new(
                f64::from(x) / scale,
                main_screen_height(self.mtm) - top - size.height,
            )
        };

        window.setFrame_display(NSRect::new(origin, size), true);
        log::debug!(
            "NSWindow frame set to ({}, {}) {}x{} pt",
            origin.x,
            origin.y,
            size.width,
            size.height
        );
        true
    }
}

pub struct MacScreen {
    window: Retained<NSWindow>,
    cursor_locked: bool,
}

impl Screen for MacScreen {
    fn resolution(&mut self) -> Resolution {
        let display = CGDisplay::main();
        match display.display_mode() {
            Some(mode) => Resolution::new(mode.pixel_width() as i32, mode.pixel_height() as i32),
            None => Resolution::new(display.pixels_wide() as i32, display.pixels_high() as i32),
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> bool {
        if self.is_fullscreen() != fullscreen {
            self.window.toggleFullScreen(None);
        }
        true
    }

    fn is_fullscreen(&self) -> bool {
        self.window
            .styleMask()
            .contains(NSWindowStyleMask::FullScreen)
    }

    fn set_cursor_locked(&mut self, locked: bool) {
        if locked == self.cursor_locked {
            return;
        }
        let display = CGDisplay::main();
        let result = if locked {
            display.hide_cursor()
        } else {
            display.show_cursor()
        };
        if let Err(e) = result {
            log::warn!("Failed to change cursor visibility: {:?}", e);
        }
        let _ = CGDisplay::associate_mouse_and_mouse_cursor_position(!locked);
        self.cursor_locked = locked;
    }
}

pub struct MacInput {
    mtm: MainThreadMarker,
    window: Retained<NSWindow>,
}

impl InputSource for MacInput {
    fn pump(&mut self) -> PumpResult {
        let app = NSApplication::sharedApplication(self.mtm);
        let mut result = PumpResult::default();

        loop {
            let event = unsafe {
                app.nextEventMatchingMask_untilDate_inMode_dequeue(
                    NSEventMask::Any,
                    Some(&NSDate::distantPast()),
                    objc2_foundation::NSDefaultRunLoopMode,
                    true,
                )
            };
            let Some(event) = event else {
                break;
            };

            if event.r#type() == NSEventType::KeyDown {
                result.keys.push(Key::from_mac_keycode(event.keyCode()));
                // Swallowed so AppKit does not beep at unhandled keys.
                continue;
            }
            app.sendEvent(&event);
        }
        app.updateWindows();

        result.close_requested = !self.window.isVisible() && !self.window.isMiniaturized();
        result
    }
}

pub fn platform(target: Resolution) -> Option<Platform> {
    let mtm = MainThreadMarker::new()?;
    let app = NSApplication::sharedApplication(mtm);
    app.setActivationPolicy(NSApplicationActivationPolicy::Regular);
    unsafe { app.finishLaunching() };

    let scale = NSScreen::mainScreen(mtm)
        .map(|screen| screen.backingScaleFactor())
        .unwrap_or(1.0);
    let frame = NSRect::new(
        NSPoint::new(0.0, 0.0),
        NSSize::new(
            f64::from(target.width) / scale,
            f64::from(target.height) / scale,
        ),
    );
    let style = NSWindowStyleMask::Titled
        | NSWindowStyleMask::Closable
        | NSWindowStyleMask::Miniaturizable
        | NSWindowStyleMask::Resizable;

    let window: Retained<NSWindow> = Retained::into_super(SignageWindow::new(mtm, frame, style));
    window.setTitle(&NSString::from_str("Signage"));
    unsafe { window.setReleasedWhenClosed(false) };
    window.setCollectionBehavior(NSWindowCollectionBehavior::FullScreenPrimary);
    window.center();
    window.makeKeyAndOrderFront(None);
    #[allow(deprecated)]
    app.activateIgnoringOtherApps(true);

    log::info!(
        "Created AppKit presentation window {}x{} pt (scale {})",
        frame.size.width,
        frame.size.height,
        scale
    );

    Some(Platform {
        name: "macos",
        windows: Box::new(MacWindows { mtm }),
        screen: Box::new(MacScreen {
            window: window.clone(),
            cursor_locked: false,
        }),
        input: Box::new(MacInput { mtm, window }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titled_window_maps_to_full_chrome() {
        let mask = NSWindowStyleMask::Titled
            | NSWindowStyleMask::Closable
            | NSWindowStyleMask::Miniaturizable
            | NSWindowStyleMask::Resizable;
        assert_eq!(to_canonical(mask), StyleMask::CHROME);
        assert_eq!(from_canonical(StyleMask::CHROME), mask);
    }

    #[test]
    fn test_borderless_round_trips_passthrough_bits() {
        let mask = NSWindowStyleMask::FullSizeContentView;
        assert_eq!(from_canonical(to_canonical(mask)), mask);
    }
}
