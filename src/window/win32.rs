//! Win32 backend.
//!
//! Creates an ordinary overlapped presentation window and controls its
//! chrome through `GWL_STYLE` and `SetWindowPos`. All calls must happen on
//! the thread that created the window.

use std::cell::Cell;
use std::ffi::c_void;

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{
    GetLastError, SetLastError, ERROR_SUCCESS, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::GetActiveWindow;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetSystemMetrics,
    GetWindowLongPtrW, PeekMessageW, RegisterClassW, SetWindowLongPtrW, SetWindowPos, ShowCursor,
    TranslateMessage, CW_USEDEFAULT, GWL_STYLE, MSG, PM_REMOVE, SET_WINDOW_POS_FLAGS,
    SM_CXSCREEN, SM_CYSCREEN, WINDOW_EX_STYLE, WM_CLOSE, WM_KEYDOWN, WNDCLASSW,
    WS_OVERLAPPEDWINDOW, WS_VISIBLE,
};

use super::input::{InputSource, Key, PumpResult};
use super::native::{SetWindowPosFlags, StyleMask, WindowHandle, WindowManipulator};
use super::platform::Platform;
use super::screen::Screen;
use crate::geometry::Resolution;

const CLASS_NAME: PCWSTR = w!("SignagePresentation");

thread_local! {
    static CLOSE_REQUESTED: Cell<bool> = const { Cell::new(false) };
}

unsafe extern "system" fn presentation_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_CLOSE {
        // The app loop decides when to tear the window down.
        CLOSE_REQUESTED.with(|flag| flag.set(true));
        return LRESULT(0);
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn create_presentation_window(size: Resolution) -> Option<HWND> {
    let instance: HINSTANCE = unsafe { GetModuleHandleW(PCWSTR::null()) }.ok()?.into();

    let class = WNDCLASSW {
        hInstance: instance,
        lpszClassName: CLASS_NAME,
        lpfnWndProc: Some(presentation_wndproc),
        ..Default::default()
    };
    if unsafe { RegisterClassW(&class) } == 0 {
        log::warn!("RegisterClassW failed");
        return None;
    }

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            CLASS_NAME,
            w!("Signage"),
            WS_OVERLAPPEDWINDOW | WS_VISIBLE,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            size.width,
            size.height,
            None,
            None,
            Some(instance),
            None,
        )
    };
    match hwnd {
        Ok(hwnd) => Some(hwnd),
        Err(e) => {
            log::warn!("CreateWindowExW failed: {}", e);
            None
        }
    }
}

pub struct Win32Windows;

impl WindowManipulator for Win32Windows {
    fn supports_native_chrome(&self) -> bool {
        true
    }

    fn active_window(&mut self) -> Option<WindowHandle> {
        let hwnd = unsafe { GetActiveWindow() };
        if hwnd.is_invalid() {
            None
        } else {
            Some(WindowHandle(hwnd.0 as usize))
        }
    }

    fn style(&mut self, handle: WindowHandle) -> StyleMask {
        let raw = unsafe { GetWindowLongPtrW(to_hwnd(handle), GWL_STYLE) };
        StyleMask::from_bits_retain(raw as u32)
    }

    fn set_style(&mut self, handle: WindowHandle, style: StyleMask) -> bool {
        // A zero return is only a failure when the last error is set.
        unsafe { SetLastError(ERROR_SUCCESS) };
        let previous =
            unsafe { SetWindowLongPtrW(to_hwnd(handle), GWL_STYLE, style.bits() as isize) };
        previous != 0 || unsafe { GetLastError() } == ERROR_SUCCESS
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
        let result = unsafe {
            SetWindowPos(
                to_hwnd(handle),
                None,
                x,
                y,
                width,
                height,
                SET_WINDOW_POS_FLAGS(flags.bits()),
            )
        };
        if let Err(e) = &result {
            log::debug!("SetWindowPos failed: {}", e);
        }
        result.is_ok()
    }
}

pub struct Win32Screen {
    cursor_locked: bool,
}

impl Screen for Win32Screen {
    fn resolution(&mut self) -> Resolution {
        unsafe { Resolution::new(GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) }
    }

    fn set_fullscreen(&mut self, _fullscreen: bool) -> bool {
        // Borderless chrome pinned at (0, 0) is the fullscreen mode here.
        false
    }

    fn is_fullscreen(&self) -> bool {
        false
    }

    fn set_cursor_locked(&mut self, locked: bool) {
        if locked == self.cursor_locked {
            return;
        }
        // ShowCursor keeps a display counter, so only call it on changes.
        unsafe { ShowCursor((!locked).into()) };
        self.cursor_locked = locked;
    }
}

pub struct Win32Input {
    hwnd: HWND,
}

impl InputSource for Win32Input {
    fn pump(&mut self) -> PumpResult {
        let mut result = PumpResult::default();
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_KEYDOWN {
                    result.keys.push(Key::from_virtual_key(msg.wParam.0 as u16));
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        result.close_requested = CLOSE_REQUESTED.with(|flag| flag.replace(false));
        result
    }
}

impl Drop for Win32Input {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

pub fn platform(target: Resolution) -> Option<Platform> {
    let hwnd = create_presentation_window(target)?;
    log::info!("Created Win32 presentation window {:?}", hwnd.0);

    Some(Platform {
        name: "win32",
        windows: Box::new(Win32Windows),
        screen: Box::new(Win32Screen {
            cursor_locked: false,
        }),
        input: Box::new(Win32Input { hwnd }),
    })
}
