//! Rewrites the application's presentation parameters according to the user configuration.

use crate::config::Config;
use crate::geometry::DeviceGeometry;
use crate::reconcile::WindowReconciler;
use crate::types::{
    BehaviorFlags, Format, PresentParams, Rect, WindowHandle, PRESENT_INTERVAL_IMMEDIATE,
    PRESENT_INTERVAL_ONE,
};
use crate::window::{SetPosFlags, WindowControl, WindowExStyle, WindowStyle, ZOrder};

/// Per-pass switches of [`ParameterPolicy::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyPass {
    /// The requested resolution is an exclusive mode of the adapter and forcing is on.
    pub force_exclusive: bool,
    /// Resize the window on this pass. Off for retries so the window is sized once.
    pub adjust_window: bool,
}

pub struct ParameterPolicy<'a, W: ?Sized> {
    config: &'a Config,
    windows: &'a W,
}

impl<'a, W: WindowControl + ?Sized> ParameterPolicy<'a, W> {
    pub fn new(config: &'a Config, windows: &'a W) -> Self {
        Self { config, windows }
    }

    /// Adjusts `params` in place and records the resulting window geometry in `geometry`.
    pub fn apply(
        &self,
        params: &mut PresentParams,
        focus_window: WindowHandle,
        geometry: &mut DeviceGeometry,
        pass: PolicyPass,
    ) {
        let config = self.config;
        let windows = self.windows;

        self.apply_vsync(params);

        if pass.force_exclusive {
            params.windowed = false;
            if params.refresh_rate == 0 {
                let hint = [focus_window, params.device_window, geometry.window]
                    .into_iter()
                    .find(|&hwnd| windows.is_window(hwnd))
                    .unwrap_or(WindowHandle::NULL);
                params.refresh_rate = windows.refresh_rate(hint);
            }
            if params.back_buffer_format.is_unknown() {
                params.back_buffer_format = Format::X8R8G8B8;
            }
        } else if config.enable_window_mode {
            params.windowed = true;
            params.refresh_rate = 0;
        }

        if config.override_refresh_rate != 0 && !params.windowed {
            params.refresh_rate = config.override_refresh_rate;
        }

        let last = *geometry;
        self.capture_geometry(params, focus_window, geometry, &last);

        if pass.adjust_window && params.windowed && windows.is_window(geometry.window) {
            self.size_window(geometry, &last, params.windowed);
        }
    }

    fn apply_vsync(&self, params: &mut PresentParams) {
        let config = self.config;
        if config.enable_vsync
            && (config.force_vsync_mode || params.presentation_interval == PRESENT_INTERVAL_IMMEDIATE)
        {
            params.presentation_interval = PRESENT_INTERVAL_ONE;
        } else if config.force_vsync_mode {
            params.presentation_interval = PRESENT_INTERVAL_IMMEDIATE;
        }
    }

    fn capture_geometry(
        &self,
        params: &PresentParams,
        focus_window: WindowHandle,
        geometry: &mut DeviceGeometry,
        last: &DeviceGeometry,
    ) {
        let windows = self.windows;
        if !windows.is_window(params.device_window)
            && !windows.is_window(geometry.window)
            && !windows.is_window(focus_window)
        {
            return;
        }

        if params.back_buffer_width != 0 {
            geometry.buffer_width = params.back_buffer_width;
        }
        if params.back_buffer_height != 0 {
            geometry.buffer_height = params.back_buffer_height;
        }
        if windows.is_window(focus_window) {
            geometry.window = focus_window;
        } else if windows.is_window(params.device_window) {
            geometry.window = params.device_window;
        }

        if windows.is_iconic(geometry.window) {
            windows.restore(geometry.window);
        }

        if geometry.window != last.window {
            self.prepare_new_window(geometry.window);
        }

        if geometry.buffer_width == 0 || geometry.buffer_height == 0 {
            match windows.client_rect(geometry.window) {
                Some(rect) => {
                    geometry.buffer_width = rect.width().max(0) as u32;
                    geometry.buffer_height = rect.height().max(0) as u32;
                }
                None => log::warn!("GetClientRect failed for {:?}", geometry.window),
            }
        }
    }

    /// A window seen for the first time must be visible and not float above everything.
    fn prepare_new_window(&self, hwnd: WindowHandle) {
        let windows = self.windows;
        let style = windows.style(hwnd);
        let ex_style = windows.ex_style(hwnd);

        if !style.contains(WindowStyle::VISIBLE) {
            log::info!("Adding WS_VISIBLE to window {:?}", hwnd);
            windows.set_style(hwnd, style | WindowStyle::VISIBLE);
            windows.set_pos(hwnd, ZOrder::keep(ex_style), Rect::default(), SetPosFlags::FRAME_REFRESH);
        }

        let unwanted = WindowExStyle::TOOLWINDOW | WindowExStyle::TOPMOST;
        if ex_style.intersects(unwanted) {
            log::info!("Removing {:?} from window {:?}", ex_style & unwanted, hwnd);
            let topmost = ex_style.contains(WindowExStyle::TOPMOST);
            windows.set_ex_style(hwnd, ex_style - unwanted);

            let mut flags = SetPosFlags::NOMOVE | SetPosFlags::NOSIZE | SetPosFlags::FRAMECHANGED;
            let order = if topmost {
                ZOrder::NoTopMost
            } else {
                flags |= SetPosFlags::NOZORDER;
                ZOrder::Top
            };
            windows.set_pos(hwnd, order, Rect::default(), flags);
        }
    }

    fn size_window(&self, geometry: &DeviceGeometry, last: &DeviceGeometry, windowed: bool) {
        let windows = self.windows;
        let any_change = last.buffer_width != geometry.buffer_width
            || last.buffer_height != geometry.buffer_height
            || last.window != geometry.window;

        let client_mismatch = match windows.client_rect(geometry.window) {
            Some(rect) => {
                rect.width() != geometry.buffer_width as i32 || rect.height() != geometry.buffer_height as i32
            }
            None => true,
        };

        if any_change || client_mismatch {
            WindowReconciler::new(self.config, windows).adjust_window(
                geometry.window,
                geometry.buffer_width,
                geometry.buffer_height,
                windowed,
            );
        }

        if any_change && self.config.fullscreen_window_mode {
            if !windows.set_display_resolution(geometry.window, geometry.buffer_width, geometry.buffer_height) {
                log::warn!(
                    "Could not switch display to {}x{}",
                    geometry.buffer_width,
                    geometry.buffer_height
                );
            }
        }
    }
}

/// Normalizes the vertex-processing bits of `CreateDevice` behavior flags.
pub fn normalize_behavior_flags(config: &Config, flags: BehaviorFlags) -> BehaviorFlags {
    const PURE: BehaviorFlags = BehaviorFlags::PUREDEVICE;
    const SOFTWARE: BehaviorFlags = BehaviorFlags::SOFTWARE_VERTEXPROCESSING;
    const HARDWARE: BehaviorFlags = BehaviorFlags::HARDWARE_VERTEXPROCESSING;
    const MIXED: BehaviorFlags = BehaviorFlags::MIXED_VERTEXPROCESSING;

    if config.force_mixed_vertex_processing {
        (flags - (PURE | HARDWARE | SOFTWARE)) | MIXED
    } else if flags.contains(SOFTWARE) {
        flags - (PURE | HARDWARE | MIXED)
    } else if flags.contains(MIXED) {
        flags - (PURE | HARDWARE | SOFTWARE)
    } else if flags.contains(HARDWARE) {
        flags - (MIXED | SOFTWARE)
    } else {
        flags
    }
}

/// Windowed flag to use for capability checks made by the application.
pub fn capability_windowed(config: &Config, windowed: bool) -> bool {
    windowed || config.enable_window_mode
}
