//! The window-management capability the core drives.
//!
//! Every method maps onto one (or a tiny fixed group of) user32 calls. Failures are reported as
//! `false`/`None` and the caller decides how to degrade.

use bitflags::bitflags;

use crate::types::{Rect, WindowHandle};

bitflags! {
    /// `WS_*` window styles (`GWL_STYLE`).
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowStyle: u32 {
        const MAXIMIZEBOX = 0x0001_0000;
        const MINIMIZEBOX = 0x0002_0000;
        const THICKFRAME = 0x0004_0000;
        const SYSMENU = 0x0008_0000;
        const CAPTION = 0x00C0_0000;
        const VISIBLE = 0x1000_0000;
        const OVERLAPPEDWINDOW = Self::CAPTION.bits()
            | Self::SYSMENU.bits()
            | Self::THICKFRAME.bits()
            | Self::MINIMIZEBOX.bits()
            | Self::MAXIMIZEBOX.bits();
        const _ = !0;
    }
}

bitflags! {
    /// `WS_EX_*` extended window styles (`GWL_EXSTYLE`).
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowExStyle: u32 {
        const TOPMOST = 0x0000_0008;
        const TOOLWINDOW = 0x0000_0080;
        const _ = !0;
    }
}

bitflags! {
    /// `SWP_*` flags of `SetWindowPos`.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SetPosFlags: u32 {
        const NOSIZE = 0x0001;
        const NOMOVE = 0x0002;
        const NOZORDER = 0x0004;
        const FRAMECHANGED = 0x0020;
        const SHOWWINDOW = 0x0040;
    }
}

impl SetPosFlags {
    /// Re-evaluates the frame after a style write without moving, sizing or reordering.
    pub const FRAME_REFRESH: SetPosFlags = SetPosFlags::NOMOVE
        .union(SetPosFlags::NOSIZE)
        .union(SetPosFlags::NOZORDER)
        .union(SetPosFlags::FRAMECHANGED);
}

/// `hWndInsertAfter` of `SetWindowPos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    Top,
    TopMost,
    NoTopMost,
}

impl ZOrder {
    /// Keeps a window in whichever band it already lives in.
    pub fn keep(ex_style: WindowExStyle) -> ZOrder {
        if ex_style.contains(WindowExStyle::TOPMOST) { ZOrder::TopMost } else { ZOrder::Top }
    }
}

/// `WINDOWPLACEMENT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub flags: u32,
    pub show_cmd: u32,
    pub min_position: (i32, i32),
    pub max_position: (i32, i32),
    pub normal_position: Rect,
}

pub trait WindowControl {
    fn is_window(&self, hwnd: WindowHandle) -> bool;
    fn is_iconic(&self, hwnd: WindowHandle) -> bool;
    fn restore(&self, hwnd: WindowHandle);

    fn style(&self, hwnd: WindowHandle) -> WindowStyle;
    fn ex_style(&self, hwnd: WindowHandle) -> WindowExStyle;
    fn set_style(&self, hwnd: WindowHandle, style: WindowStyle);
    fn set_ex_style(&self, hwnd: WindowHandle, ex_style: WindowExStyle);
    fn has_menu(&self, hwnd: WindowHandle) -> bool;

    fn client_rect(&self, hwnd: WindowHandle) -> Option<Rect>;
    /// Outer rectangle needed for a client rectangle under the given styles.
    fn adjust_rect(&self, client: Rect, style: WindowStyle, has_menu: bool, ex_style: WindowExStyle) -> Rect;
    /// Bounds of the monitor the window is on.
    fn monitor_rect(&self, hwnd: WindowHandle) -> Rect;

    fn set_pos(&self, hwnd: WindowHandle, order: ZOrder, rect: Rect, flags: SetPosFlags) -> bool;
    fn placement(&self, hwnd: WindowHandle) -> Option<Placement>;
    fn set_placement(&self, hwnd: WindowHandle, placement: &Placement) -> bool;

    fn current_thread(&self) -> u32;
    fn foreground_thread(&self) -> u32;
    fn attach_thread_input(&self, from: u32, to: u32, attach: bool) -> bool;
    fn set_foreground(&self, hwnd: WindowHandle) -> bool;
    fn set_focus(&self, hwnd: WindowHandle) -> bool;
    fn set_active(&self, hwnd: WindowHandle) -> bool;
    fn bring_to_top(&self, hwnd: WindowHandle) -> bool;

    /// Refresh rate of the display the window is on, 0 when unknown.
    fn refresh_rate(&self, hwnd: WindowHandle) -> u32;
    /// Switches the monitor holding `hwnd` to the given resolution.
    fn set_display_resolution(&self, hwnd: WindowHandle, width: u32, height: u32) -> bool;
}
