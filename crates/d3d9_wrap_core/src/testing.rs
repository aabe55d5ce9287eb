//! Deterministic stand-ins for user32 and d3d9 used by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::native::{NativeCreate, NativeDevice, NativeFactory};
use crate::types::{DeviceType, DisplayMode, Format, NativePtr, PresentParams, Rect, Status, WindowHandle};
use crate::window::{Placement, SetPosFlags, WindowControl, WindowExStyle, WindowStyle, ZOrder};

// Frame metrics of a captioned window.
const FRAME_SIDE: i32 = 8;
const FRAME_TOP: i32 = 31;
const MENU_HEIGHT: i32 = 20;

/// Side-effecting window calls, in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Restore(WindowHandle),
    SetStyle(WindowHandle, WindowStyle),
    SetExStyle(WindowHandle, WindowExStyle),
    SetPos(WindowHandle, ZOrder),
    SetPlacement(WindowHandle, Rect),
    AttachInput(bool),
    Foreground(WindowHandle),
    Focus(WindowHandle),
    Active(WindowHandle),
    BringToTop(WindowHandle),
    DisplayResolution(WindowHandle, u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeWindow {
    pub style: WindowStyle,
    pub ex_style: WindowExStyle,
    /// Outer window rectangle.
    pub rect: Rect,
    pub menu: bool,
    pub iconic: bool,
    pub placement_fails: bool,
}

impl FakeWindow {
    pub fn visible(rect: Rect) -> Self {
        Self {
            style: WindowStyle::VISIBLE,
            ex_style: WindowExStyle::empty(),
            rect,
            menu: false,
            iconic: false,
            placement_fails: false,
        }
    }

    pub fn hidden(rect: Rect) -> Self {
        Self { style: WindowStyle::empty(), ..Self::visible(rect) }
    }
}

fn frame(style: WindowStyle, menu: bool) -> (i32, i32, i32, i32) {
    let (mut side, mut top, mut bottom) = (0, 0, 0);
    if style.intersects(WindowStyle::CAPTION) {
        side = FRAME_SIDE;
        top = FRAME_TOP;
        bottom = FRAME_SIDE;
    }
    if menu {
        top += MENU_HEIGHT;
    }
    (side, top, side, bottom)
}

#[derive(Default)]
struct Desktop {
    windows: HashMap<WindowHandle, FakeWindow>,
    calls: Vec<Call>,
}

/// A single-monitor desktop. Threads: the caller is thread 1, the foreground window's is 2.
pub struct FakeWindows {
    monitor: Rect,
    desktop: Mutex<Desktop>,
}

impl FakeWindows {
    pub fn new(monitor: Rect) -> Self {
        Self { monitor, desktop: Mutex::new(Desktop::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, Desktop> {
        self.desktop.lock().unwrap()
    }

    pub fn add(&self, hwnd: WindowHandle, window: FakeWindow) {
        self.lock().windows.insert(hwnd, window);
    }

    pub fn update(&self, hwnd: WindowHandle, f: impl FnOnce(&mut FakeWindow)) {
        f(self.lock().windows.get_mut(&hwnd).expect("unknown window"));
    }

    pub fn window(&self, hwnd: WindowHandle) -> FakeWindow {
        self.lock().windows.get(&hwnd).cloned().expect("unknown window")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn ex_style_writes(&self, hwnd: WindowHandle) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::SetExStyle(h, _) if *h == hwnd))
            .count()
    }

    pub fn client_size(&self, hwnd: WindowHandle) -> (i32, i32) {
        let rect = self.client_rect(hwnd).expect("unknown window");
        (rect.width(), rect.height())
    }

    fn with_window<R>(&self, hwnd: WindowHandle, call: Option<Call>, f: impl FnOnce(&mut FakeWindow) -> R) -> Option<R> {
        let mut desktop = self.lock();
        let result = desktop.windows.get_mut(&hwnd).map(f);
        if let (Some(_), Some(call)) = (&result, call) {
            desktop.calls.push(call);
        }
        result
    }

    fn record(&self, call: Call) -> bool {
        self.lock().calls.push(call);
        true
    }
}

impl WindowControl for FakeWindows {
    fn is_window(&self, hwnd: WindowHandle) -> bool {
        self.lock().windows.contains_key(&hwnd)
    }

    fn is_iconic(&self, hwnd: WindowHandle) -> bool {
        self.with_window(hwnd, None, |w| w.iconic).unwrap_or(false)
    }

    fn restore(&self, hwnd: WindowHandle) {
        self.with_window(hwnd, Some(Call::Restore(hwnd)), |w| w.iconic = false);
    }

    fn style(&self, hwnd: WindowHandle) -> WindowStyle {
        self.with_window(hwnd, None, |w| w.style).unwrap_or_default()
    }

    fn ex_style(&self, hwnd: WindowHandle) -> WindowExStyle {
        self.with_window(hwnd, None, |w| w.ex_style).unwrap_or_default()
    }

    fn set_style(&self, hwnd: WindowHandle, style: WindowStyle) {
        self.with_window(hwnd, Some(Call::SetStyle(hwnd, style)), |w| w.style = style);
    }

    fn set_ex_style(&self, hwnd: WindowHandle, ex_style: WindowExStyle) {
        self.with_window(hwnd, Some(Call::SetExStyle(hwnd, ex_style)), |w| w.ex_style = ex_style);
    }

    fn has_menu(&self, hwnd: WindowHandle) -> bool {
        self.with_window(hwnd, None, |w| w.menu).unwrap_or(false)
    }

    fn client_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
        self.with_window(hwnd, None, |w| {
            let (left, top, right, bottom) = frame(w.style, w.menu);
            Rect::sized(w.rect.width() - left - right, w.rect.height() - top - bottom)
        })
    }

    fn adjust_rect(&self, client: Rect, style: WindowStyle, has_menu: bool, _ex_style: WindowExStyle) -> Rect {
        let (left, top, right, bottom) = frame(style, has_menu);
        Rect::new(client.left - left, client.top - top, client.right + right, client.bottom + bottom)
    }

    fn monitor_rect(&self, _hwnd: WindowHandle) -> Rect {
        self.monitor
    }

    fn set_pos(&self, hwnd: WindowHandle, order: ZOrder, rect: Rect, flags: SetPosFlags) -> bool {
        self.with_window(hwnd, Some(Call::SetPos(hwnd, order)), |w| {
            if !flags.contains(SetPosFlags::NOMOVE) {
                let (width, height) = (w.rect.width(), w.rect.height());
                w.rect = Rect::new(rect.left, rect.top, rect.left + width, rect.top + height);
            }
            if !flags.contains(SetPosFlags::NOSIZE) {
                w.rect.right = w.rect.left + rect.width();
                w.rect.bottom = w.rect.top + rect.height();
            }
            if !flags.contains(SetPosFlags::NOZORDER) {
                match order {
                    ZOrder::TopMost => w.ex_style |= WindowExStyle::TOPMOST,
                    ZOrder::NoTopMost => w.ex_style.remove(WindowExStyle::TOPMOST),
                    ZOrder::Top => {}
                }
            }
            if flags.contains(SetPosFlags::SHOWWINDOW) {
                w.style |= WindowStyle::VISIBLE;
            }
        })
        .is_some()
    }

    fn placement(&self, hwnd: WindowHandle) -> Option<Placement> {
        self.with_window(hwnd, None, |w| {
            (!w.placement_fails).then(|| Placement { show_cmd: 1, normal_position: w.rect, ..Default::default() })
        })
        .flatten()
    }

    fn set_placement(&self, hwnd: WindowHandle, placement: &Placement) -> bool {
        let rect = placement.normal_position;
        self.with_window(hwnd, Some(Call::SetPlacement(hwnd, rect)), |w| w.rect = rect).is_some()
    }

    fn current_thread(&self) -> u32 {
        1
    }

    fn foreground_thread(&self) -> u32 {
        2
    }

    fn attach_thread_input(&self, _from: u32, _to: u32, attach: bool) -> bool {
        self.record(Call::AttachInput(attach))
    }

    fn set_foreground(&self, hwnd: WindowHandle) -> bool {
        self.record(Call::Foreground(hwnd))
    }

    fn set_focus(&self, hwnd: WindowHandle) -> bool {
        self.record(Call::Focus(hwnd))
    }

    fn set_active(&self, hwnd: WindowHandle) -> bool {
        self.record(Call::Active(hwnd))
    }

    fn bring_to_top(&self, hwnd: WindowHandle) -> bool {
        self.record(Call::BringToTop(hwnd))
    }

    fn refresh_rate(&self, _hwnd: WindowHandle) -> u32 {
        60
    }

    fn set_display_resolution(&self, hwnd: WindowHandle, width: u32, height: u32) -> bool {
        self.record(Call::DisplayResolution(hwnd, width, height))
    }
}

/// Observable state of one device created by [`FakeFactory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub antialias_enabled: bool,
    pub resets: Vec<PresentParams>,
}

#[derive(Default)]
struct Driver {
    modes: Vec<DisplayMode>,
    mode_queries: usize,
    fail_mode_at: Option<u32>,
    mode_adapters: Vec<u32>,
    quality_levels: HashMap<u32, u32>,
    rejected_formats: Vec<(Format, u32)>,
    checks: Vec<(Format, u32)>,
    creation_failures: HashMap<u32, Status>,
    reset_failures: HashMap<u32, Status>,
    created: Vec<PresentParams>,
    native_calls: Vec<NativeCreate>,
    devices: Vec<DeviceState>,
}

/// Scriptable `IDirect3D9`. Creation and reset outcomes are keyed by multisample type,
/// 0 being the plain path.
pub struct FakeFactory {
    ptr: NativePtr,
    driver: Arc<Mutex<Driver>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::at(NativePtr(0xF000))
    }

    pub fn at(ptr: NativePtr) -> Self {
        Self { ptr, driver: Arc::new(Mutex::new(Driver::default())) }
    }

    pub fn with_modes(modes: &[(u32, u32)]) -> Self {
        let factory = Self::new();
        factory.lock().modes = modes
            .iter()
            .map(|&(width, height)| DisplayMode { width, height, refresh_rate: 60, format: Format::X8R8G8B8 })
            .collect();
        factory
    }

    fn lock(&self) -> MutexGuard<'_, Driver> {
        self.driver.lock().unwrap()
    }

    /// `(samples, quality level count)` pairs supported for every format.
    pub fn set_quality_levels(&self, levels: &[(u32, u32)]) {
        self.lock().quality_levels = levels.iter().copied().collect();
    }

    pub fn reject_format(&self, format: Format, samples: u32) {
        self.lock().rejected_formats.push((format, samples));
    }

    pub fn fail_creation_with(&self, samples: u32, status: Status) {
        self.lock().creation_failures.insert(samples, status);
    }

    pub fn fail_reset_with(&self, samples: u32, status: Status) {
        self.lock().reset_failures.insert(samples, status);
    }

    pub fn fail_mode_enumeration_at(&self, index: u32) {
        self.lock().fail_mode_at = Some(index);
    }

    pub fn mode_queries(&self) -> usize {
        self.lock().mode_queries
    }

    /// Adapter of every mode enumeration call.
    pub fn queried_adapters(&self) -> Vec<u32> {
        self.lock().mode_adapters.clone()
    }

    pub fn checks(&self) -> Vec<(Format, u32)> {
        self.lock().checks.clone()
    }

    /// Parameters of every native creation attempt.
    pub fn created(&self) -> Vec<PresentParams> {
        self.lock().created.clone()
    }

    pub fn attempted_samples(&self) -> Vec<u32> {
        self.lock().created.iter().map(|p| p.multisample_type).collect()
    }

    pub fn native_calls(&self) -> Vec<NativeCreate> {
        self.lock().native_calls.clone()
    }

    pub fn device(&self, index: usize) -> DeviceState {
        self.lock().devices[index].clone()
    }
}

impl NativeFactory for FakeFactory {
    type Device = FakeDevice;

    fn native_ptr(&self) -> NativePtr {
        self.ptr
    }

    fn adapter_mode_count(&self, _adapter: u32, _format: Format) -> u32 {
        self.lock().modes.len() as u32
    }

    fn enum_adapter_mode(&self, adapter: u32, _format: Format, mode: u32) -> Result<DisplayMode, Status> {
        let mut driver = self.lock();
        driver.mode_queries += 1;
        driver.mode_adapters.push(adapter);
        if driver.fail_mode_at == Some(mode) {
            return Err(Status::INVALID_CALL);
        }
        driver.modes.get(mode as usize).copied().ok_or(Status::INVALID_CALL)
    }

    fn check_multisample(
        &self,
        _adapter: u32,
        _device_type: DeviceType,
        format: Format,
        _windowed: bool,
        samples: u32,
    ) -> Result<u32, Status> {
        let mut driver = self.lock();
        driver.checks.push((format, samples));
        if driver.rejected_formats.contains(&(format, samples)) {
            return Err(Status::NOT_AVAILABLE);
        }
        driver.quality_levels.get(&samples).copied().ok_or(Status::NOT_AVAILABLE)
    }

    fn create_device(&self, call: &NativeCreate, params: &mut PresentParams) -> Result<FakeDevice, Status> {
        let mut driver = self.lock();
        driver.created.push(*params);
        driver.native_calls.push(*call);
        if let Some(&status) = driver.creation_failures.get(&params.multisample_type) {
            return Err(status);
        }
        let index = driver.devices.len();
        driver.devices.push(DeviceState::default());
        Ok(FakeDevice {
            index,
            ptr: NativePtr(0xD000 + 0x10 * index),
            driver: Arc::clone(&self.driver),
        })
    }
}

pub struct FakeDevice {
    index: usize,
    ptr: NativePtr,
    driver: Arc<Mutex<Driver>>,
}

impl NativeDevice for FakeDevice {
    fn native_ptr(&self) -> NativePtr {
        self.ptr
    }

    fn enable_multisample_antialias(&self) -> Result<(), Status> {
        self.driver.lock().unwrap().devices[self.index].antialias_enabled = true;
        Ok(())
    }

    fn reset(&self, params: &mut PresentParams) -> Result<(), Status> {
        let mut driver = self.driver.lock().unwrap();
        driver.devices[self.index].resets.push(*params);
        match driver.reset_failures.get(&params.multisample_type) {
            Some(&status) => Err(status),
            None => Ok(()),
        }
    }
}
