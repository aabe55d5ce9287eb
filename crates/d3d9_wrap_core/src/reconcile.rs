//! Brings the application's window in line with the buffer size the device is created with.

use crate::config::Config;
use crate::types::{Rect, WindowHandle};
use crate::window::{SetPosFlags, WindowControl, WindowExStyle, WindowStyle, ZOrder};

pub struct WindowReconciler<'a, W: ?Sized> {
    config: &'a Config,
    windows: &'a W,
}

impl<'a, W: WindowControl + ?Sized> WindowReconciler<'a, W> {
    pub fn new(config: &'a Config, windows: &'a W) -> Self {
        Self { config, windows }
    }

    /// Sizes `hwnd` so its client area is `width` x `height`, applying the configured border
    /// and position policy. Calling it again with the same target changes nothing.
    pub fn adjust_window(&self, hwnd: WindowHandle, width: u32, height: u32, windowed: bool) {
        let windows = self.windows;
        let config = self.config;

        let size = match (i32::try_from(width), i32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 && windows.is_window(hwnd) => Some((w, h)),
            _ => None,
        };
        let Some((width, height)) = size else {
            log::warn!(
                "Could not set window size: window {:?}, size {}x{}",
                hwnd,
                width,
                height
            );
            return;
        };

        if config.enable_window_mode || windowed {
            self.take_focus(hwnd);
        }

        let screen = windows.monitor_rect(hwnd);
        let (screen_width, screen_height) = (screen.width(), screen.height());

        let original_style = windows.style(hwnd);
        let ex_style = windows.ex_style(hwnd);
        let has_menu = windows.has_menu(hwnd);
        let mut style = original_style | WindowStyle::VISIBLE;

        let bordered = windows.adjust_rect(
            Rect::sized(width, height),
            style | WindowStyle::OVERLAPPEDWINDOW,
            has_menu,
            ex_style,
        );
        if config.window_mode_border
            && !config.fullscreen_window_mode
            && screen_width > bordered.width()
            && screen_height > bordered.height()
        {
            style |= WindowStyle::OVERLAPPEDWINDOW;
        } else if config.fullscreen_window_mode {
            style.remove(WindowStyle::OVERLAPPEDWINDOW);
        }

        if config.enable_window_mode || !original_style.contains(WindowStyle::VISIBLE) {
            let style = if config.enable_window_mode {
                style
            } else {
                original_style | WindowStyle::VISIBLE
            };
            if style != original_style {
                log::debug!("Window {:?} style {:?} -> {:?}", hwnd, original_style, style);
                windows.set_style(hwnd, style);
                windows.set_pos(hwnd, ZOrder::keep(ex_style), Rect::default(), SetPosFlags::FRAME_REFRESH);
            }
        }

        let outer = windows.adjust_rect(
            Rect::sized(width, height),
            windows.style(hwnd),
            has_menu,
            windows.ex_style(hwnd),
        );
        let (outer_width, outer_height) = (outer.width(), outer.height());

        let Some((x, y)) = self.target_position(screen_width, screen_height, outer_width, outer_height) else {
            return;
        };
        let Some(target) = place(screen, x, y, outer_width, outer_height) else {
            log::warn!("Window {:?} position ({}, {}) is out of range", hwnd, x, y);
            return;
        };

        // Placement also fixes up the restore rectangle of minimized/maximized windows.
        match windows.placement(hwnd) {
            Some(mut placement) => {
                placement.normal_position = target;
                if !windows.set_placement(hwnd, &placement) {
                    log::warn!("SetWindowPlacement failed for {:?}", hwnd);
                }
            }
            None => {
                log::debug!("GetWindowPlacement failed for {:?}, using SetWindowPos", hwnd);
                windows.set_pos(
                    hwnd,
                    ZOrder::keep(ex_style),
                    target,
                    SetPosFlags::SHOWWINDOW | SetPosFlags::NOZORDER,
                );
            }
        }
    }

    /// Upper-left corner of the window relative to its monitor, `None` to leave it in place.
    fn target_position(
        &self,
        screen_width: i32,
        screen_height: i32,
        outer_width: i32,
        outer_height: i32,
    ) -> Option<(i32, i32)> {
        let config = self.config;
        let left = config.initial_window_position_left;
        let top = config.initial_window_position_top;

        if config.set_initial_window_position
            && !config.fullscreen_window_mode
            && (left == 0 || outer_width.checked_add(left).is_some_and(|right| right <= screen_width))
            && (top == 0 || outer_height.checked_add(top).is_some_and(|bottom| bottom <= screen_height))
        {
            Some((left, top))
        } else if config.enable_window_mode
            && !config.fullscreen_window_mode
            && screen_width >= outer_width
            && screen_height >= outer_height
        {
            Some(((screen_width - outer_width) / 2, (screen_height - outer_height) / 2))
        } else if config.fullscreen_window_mode {
            Some((0, 0))
        } else {
            None
        }
    }

    /// Makes `hwnd` the active foreground window and refreshes its z-order.
    fn take_focus(&self, hwnd: WindowHandle) {
        let windows = self.windows;

        let current = windows.current_thread();
        let foreground = windows.foreground_thread();
        let attached = foreground != 0
            && foreground != current
            && windows.attach_thread_input(current, foreground, true);

        windows.set_foreground(hwnd);
        windows.set_focus(hwnd);
        windows.set_active(hwnd);
        windows.bring_to_top(hwnd);

        if attached {
            windows.attach_thread_input(current, foreground, false);
        }

        let ex_style = windows.ex_style(hwnd);
        if !ex_style.contains(WindowExStyle::TOPMOST) {
            let flags = SetPosFlags::NOMOVE | SetPosFlags::NOSIZE | SetPosFlags::FRAMECHANGED;
            windows.set_ex_style(hwnd, ex_style | WindowExStyle::TOPMOST);
            windows.set_pos(hwnd, ZOrder::TopMost, Rect::default(), flags);
            windows.set_ex_style(hwnd, ex_style);
            windows.set_pos(hwnd, ZOrder::NoTopMost, Rect::default(), flags);
        }
    }
}

/// Outer rectangle at `(x, y)` relative to `screen`, `None` when it leaves the coordinate space.
fn place(screen: Rect, x: i32, y: i32, width: i32, height: i32) -> Option<Rect> {
    let left = screen.left.checked_add(x)?;
    let top = screen.top.checked_add(y)?;
    Some(Rect::new(left, top, left.checked_add(width)?, top.checked_add(height)?))
}
