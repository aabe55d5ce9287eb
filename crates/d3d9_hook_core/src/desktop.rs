//! `WindowControl` over user32/gdi32.

use std::ffi::c_void;

use d3d9_wrap_core::types::{Rect, WindowHandle};
use d3d9_wrap_core::window::{Placement, SetPosFlags, WindowControl, WindowExStyle, WindowStyle, ZOrder};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, HWND, POINT, RECT};
use windows::Win32::Graphics::Gdi::{
    ChangeDisplaySettingsExW, EnumDisplaySettingsW, GetMonitorInfoW, MonitorFromWindow, CDS_FULLSCREEN,
    DEVMODEW, DISP_CHANGE_SUCCESSFUL, DM_PELSHEIGHT, DM_PELSWIDTH, ENUM_CURRENT_SETTINGS, MONITORINFO,
    MONITORINFOEXW, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{SetActiveWindow, SetFocus};
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, AttachThreadInput, BringWindowToTop, GetClientRect, GetForegroundWindow, GetMenu,
    GetSystemMetrics, GetWindowLongW, GetWindowPlacement, GetWindowThreadProcessId, IsIconic, IsWindow,
    SetForegroundWindow, SetWindowLongW, SetWindowPlacement, SetWindowPos, ShowWindow, GWL_EXSTYLE,
    GWL_STYLE, HWND_NOTOPMOST, HWND_TOP, HWND_TOPMOST, SET_WINDOW_POS_FLAGS, SM_CXSCREEN, SM_CYSCREEN,
    SW_RESTORE, WINDOWPLACEMENT, WINDOWPLACEMENT_FLAGS, WINDOW_EX_STYLE, WINDOW_STYLE,
};

use crate::native::hwnd;

fn rect_from_native(rect: RECT) -> Rect {
    Rect::new(rect.left, rect.top, rect.right, rect.bottom)
}

fn rect_to_native(rect: Rect) -> RECT {
    RECT { left: rect.left, top: rect.top, right: rect.right, bottom: rect.bottom }
}

/// Device name of the monitor holding `window`, e.g. `\\.\DISPLAY1`.
fn monitor_device(window: WindowHandle) -> Option<[u16; 32]> {
    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = size_of::<MONITORINFOEXW>() as u32;
    unsafe {
        let monitor = MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST);
        GetMonitorInfoW(monitor, &mut info.monitorInfo as *mut MONITORINFO).as_bool().then_some(info.szDevice)
    }
}

pub struct Win32Windows;

impl WindowControl for Win32Windows {
    fn is_window(&self, window: WindowHandle) -> bool {
        !window.is_null() && unsafe { IsWindow(hwnd(window)) }.as_bool()
    }

    fn is_iconic(&self, window: WindowHandle) -> bool {
        unsafe { IsIconic(hwnd(window)) }.as_bool()
    }

    fn restore(&self, window: WindowHandle) {
        let _ = unsafe { ShowWindow(hwnd(window), SW_RESTORE) };
    }

    fn style(&self, window: WindowHandle) -> WindowStyle {
        WindowStyle::from_bits_retain(unsafe { GetWindowLongW(hwnd(window), GWL_STYLE) } as u32)
    }

    fn ex_style(&self, window: WindowHandle) -> WindowExStyle {
        WindowExStyle::from_bits_retain(unsafe { GetWindowLongW(hwnd(window), GWL_EXSTYLE) } as u32)
    }

    fn set_style(&self, window: WindowHandle, style: WindowStyle) {
        unsafe { SetWindowLongW(hwnd(window), GWL_STYLE, style.bits() as i32) };
    }

    fn set_ex_style(&self, window: WindowHandle, ex_style: WindowExStyle) {
        unsafe { SetWindowLongW(hwnd(window), GWL_EXSTYLE, ex_style.bits() as i32) };
    }

    fn has_menu(&self, window: WindowHandle) -> bool {
        !unsafe { GetMenu(hwnd(window)) }.0.is_null()
    }

    fn client_rect(&self, window: WindowHandle) -> Option<Rect> {
        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd(window), &mut rect) }.ok()?;
        Some(rect_from_native(rect))
    }

    fn adjust_rect(&self, client: Rect, style: WindowStyle, has_menu: bool, ex_style: WindowExStyle) -> Rect {
        let mut rect = rect_to_native(client);
        let adjusted = unsafe {
            AdjustWindowRectEx(
                &mut rect,
                WINDOW_STYLE(style.bits()),
                BOOL::from(has_menu),
                WINDOW_EX_STYLE(ex_style.bits()),
            )
        };
        match adjusted {
            Ok(()) => rect_from_native(rect),
            Err(err) => {
                log::warn!("AdjustWindowRectEx failed: {}", err);
                client
            }
        }
    }

    fn monitor_rect(&self, window: WindowHandle) -> Rect {
        let mut info = MONITORINFO { cbSize: size_of::<MONITORINFO>() as u32, ..Default::default() };
        unsafe {
            let monitor = MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST);
            if GetMonitorInfoW(monitor, &mut info).as_bool() {
                rect_from_native(info.rcMonitor)
            } else {
                Rect::sized(GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN))
            }
        }
    }

    fn set_pos(&self, window: WindowHandle, order: ZOrder, rect: Rect, flags: SetPosFlags) -> bool {
        let insert_after = match order {
            ZOrder::Top => HWND_TOP,
            ZOrder::TopMost => HWND_TOPMOST,
            ZOrder::NoTopMost => HWND_NOTOPMOST,
        };
        unsafe {
            SetWindowPos(
                hwnd(window),
                insert_after,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SET_WINDOW_POS_FLAGS(flags.bits()),
            )
        }
        .is_ok()
    }

    fn placement(&self, window: WindowHandle) -> Option<Placement> {
        let mut native = WINDOWPLACEMENT { length: size_of::<WINDOWPLACEMENT>() as u32, ..Default::default() };
        unsafe { GetWindowPlacement(hwnd(window), &mut native) }.ok()?;
        Some(Placement {
            flags: native.flags.0,
            show_cmd: native.showCmd,
            min_position: (native.ptMinPosition.x, native.ptMinPosition.y),
            max_position: (native.ptMaxPosition.x, native.ptMaxPosition.y),
            normal_position: rect_from_native(native.rcNormalPosition),
        })
    }

    fn set_placement(&self, window: WindowHandle, placement: &Placement) -> bool {
        let native = WINDOWPLACEMENT {
            length: size_of::<WINDOWPLACEMENT>() as u32,
            flags: WINDOWPLACEMENT_FLAGS(placement.flags),
            showCmd: placement.show_cmd,
            ptMinPosition: POINT { x: placement.min_position.0, y: placement.min_position.1 },
            ptMaxPosition: POINT { x: placement.max_position.0, y: placement.max_position.1 },
            rcNormalPosition: rect_to_native(placement.normal_position),
        };
        unsafe { SetWindowPlacement(hwnd(window), &native) }.is_ok()
    }

    fn current_thread(&self) -> u32 {
        unsafe { GetCurrentThreadId() }
    }

    fn foreground_thread(&self) -> u32 {
        unsafe {
            let foreground = GetForegroundWindow();
            if foreground.0.is_null() { 0 } else { GetWindowThreadProcessId(foreground, None) }
        }
    }

    fn attach_thread_input(&self, from: u32, to: u32, attach: bool) -> bool {
        unsafe { AttachThreadInput(from, to, BOOL::from(attach)) }.as_bool()
    }

    fn set_foreground(&self, window: WindowHandle) -> bool {
        unsafe { SetForegroundWindow(hwnd(window)) }.as_bool()
    }

    fn set_focus(&self, window: WindowHandle) -> bool {
        unsafe { SetFocus(hwnd(window)) }.is_ok()
    }

    fn set_active(&self, window: WindowHandle) -> bool {
        unsafe { SetActiveWindow(hwnd(window)) }.is_ok()
    }

    fn bring_to_top(&self, window: WindowHandle) -> bool {
        unsafe { BringWindowToTop(hwnd(window)) }.is_ok()
    }

    fn refresh_rate(&self, window: WindowHandle) -> u32 {
        let device = monitor_device(window);
        let name = device.as_ref().map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr()));
        let mut mode = DEVMODEW { dmSize: size_of::<DEVMODEW>() as u16, ..Default::default() };
        if unsafe { EnumDisplaySettingsW(name, ENUM_CURRENT_SETTINGS, &mut mode) }.as_bool() {
            mode.dmDisplayFrequency
        } else {
            log::warn!("EnumDisplaySettings failed, refresh rate unknown");
            0
        }
    }

    fn set_display_resolution(&self, window: WindowHandle, width: u32, height: u32) -> bool {
        let device = monitor_device(window);
        let name = device.as_ref().map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr()));
        let mode = DEVMODEW {
            dmSize: size_of::<DEVMODEW>() as u16,
            dmPelsWidth: width,
            dmPelsHeight: height,
            dmFields: DM_PELSWIDTH | DM_PELSHEIGHT,
            ..Default::default()
        };
        let result = unsafe {
            ChangeDisplaySettingsExW(name, Some(&mode), HWND(std::ptr::null_mut::<c_void>()), CDS_FULLSCREEN, None)
        };
        result == DISP_CHANGE_SUCCESSFUL
    }
}
