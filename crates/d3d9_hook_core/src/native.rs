//! `NativeFactory` / `NativeDevice` over the real d3d9 interfaces.
//!
//! Neither adapter owns a COM reference: the application holds the only one, and the hooked
//! Release slots tell the core when it goes away.

use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::ptr;

use d3d9_wrap_core::native::{CreateEntry, NativeCreate, NativeDevice, NativeFactory};
use d3d9_wrap_core::types::{
    DeviceType, DisplayMode, DisplayModeEx, Format, NativePtr, PresentFlags, PresentParams, Status,
    SwapEffect, WindowHandle,
};
use windows::core::{Interface, HRESULT};
use windows::Win32::Foundation::{BOOL, HWND};
use windows::Win32::Graphics::Direct3D9::{
    IDirect3D9, IDirect3DDevice9, D3DADAPTER_IDENTIFIER9, D3DDEVTYPE, D3DDISPLAYMODE, D3DDISPLAYMODEEX, D3DFORMAT,
    D3DMULTISAMPLE_TYPE, D3DPRESENT_PARAMETERS, D3DRS_MULTISAMPLEANTIALIAS, D3DSCANLINEORDERING,
    D3DSWAPEFFECT,
};

use crate::vtable::{self, DeviceOriginals, FactoryOriginals};

pub(crate) fn status(error: windows::core::Error) -> Status {
    Status(error.code().0)
}

pub(crate) fn hresult(status: Status) -> HRESULT {
    HRESULT(status.0)
}

pub(crate) fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

pub(crate) fn window_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as usize)
}

pub(crate) fn present_params_from_native(params: &D3DPRESENT_PARAMETERS) -> PresentParams {
    PresentParams {
        back_buffer_width: params.BackBufferWidth,
        back_buffer_height: params.BackBufferHeight,
        back_buffer_format: Format(params.BackBufferFormat.0 as u32),
        back_buffer_count: params.BackBufferCount,
        multisample_type: params.MultiSampleType.0 as u32,
        multisample_quality: params.MultiSampleQuality,
        swap_effect: SwapEffect(params.SwapEffect.0 as u32),
        device_window: window_handle(params.hDeviceWindow),
        windowed: params.Windowed.as_bool(),
        enable_auto_depth_stencil: params.EnableAutoDepthStencil.as_bool(),
        auto_depth_stencil_format: Format(params.AutoDepthStencilFormat.0 as u32),
        flags: PresentFlags::from_bits_retain(params.Flags),
        refresh_rate: params.FullScreen_RefreshRateInHz,
        presentation_interval: params.PresentationInterval,
    }
}

pub(crate) fn present_params_to_native(params: &PresentParams) -> D3DPRESENT_PARAMETERS {
    D3DPRESENT_PARAMETERS {
        BackBufferWidth: params.back_buffer_width,
        BackBufferHeight: params.back_buffer_height,
        BackBufferFormat: D3DFORMAT(params.back_buffer_format.0 as _),
        BackBufferCount: params.back_buffer_count,
        MultiSampleType: D3DMULTISAMPLE_TYPE(params.multisample_type as _),
        MultiSampleQuality: params.multisample_quality,
        SwapEffect: D3DSWAPEFFECT(params.swap_effect.0 as _),
        hDeviceWindow: hwnd(params.device_window),
        Windowed: BOOL::from(params.windowed),
        EnableAutoDepthStencil: BOOL::from(params.enable_auto_depth_stencil),
        AutoDepthStencilFormat: D3DFORMAT(params.auto_depth_stencil_format.0 as _),
        Flags: params.flags.bits(),
        FullScreen_RefreshRateInHz: params.refresh_rate,
        PresentationInterval: params.presentation_interval,
    }
}

pub(crate) fn display_mode_ex_from_native(mode: &D3DDISPLAYMODEEX) -> DisplayModeEx {
    DisplayModeEx {
        width: mode.Width,
        height: mode.Height,
        refresh_rate: mode.RefreshRate,
        format: Format(mode.Format.0 as u32),
        scanline_ordering: mode.ScanLineOrdering.0 as u32,
    }
}

fn display_mode_ex_to_native(mode: &DisplayModeEx) -> D3DDISPLAYMODEEX {
    D3DDISPLAYMODEEX {
        Size: size_of::<D3DDISPLAYMODEEX>() as u32,
        Width: mode.width,
        Height: mode.height,
        RefreshRate: mode.refresh_rate,
        Format: D3DFORMAT(mode.format.0 as _),
        ScanLineOrdering: D3DSCANLINEORDERING(mode.scanline_ordering as _),
    }
}

pub struct Win32Factory {
    raw: *mut c_void,
    interface: ManuallyDrop<IDirect3D9>,
    originals: FactoryOriginals,
}

// The d3d9 runtime serializes access to the factory itself.
unsafe impl Send for Win32Factory {}
unsafe impl Sync for Win32Factory {}

impl Win32Factory {
    /// # Safety
    /// `raw` must point to a live `IDirect3D9` whose vtable was hooked with `originals`.
    pub(crate) unsafe fn from_raw(raw: *mut c_void, originals: FactoryOriginals) -> Self {
        Self { raw, interface: ManuallyDrop::new(unsafe { IDirect3D9::from_raw(raw) }), originals }
    }

    /// Logs the description and driver of every adapter.
    pub(crate) fn log_adapters(&self) {
        let count = unsafe { self.interface.GetAdapterCount() };
        for adapter in 0..count {
            let mut identifier = D3DADAPTER_IDENTIFIER9::default();
            match unsafe { self.interface.GetAdapterIdentifier(adapter, 0, &mut identifier) } {
                Ok(()) => log::info!(
                    "Adapter {}: {} ({})",
                    adapter,
                    c_text(&identifier.Description),
                    c_text(&identifier.Driver)
                ),
                Err(err) => log::warn!("GetAdapterIdentifier({}) failed: {}", adapter, err),
            }
        }
    }
}

fn c_text<C: Copy + Into<i16>>(chars: &[C]) -> String {
    let bytes: Vec<u8> = chars.iter().map(|&c| Into::<i16>::into(c) as u8).take_while(|&b| b != 0).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl NativeFactory for Win32Factory {
    type Device = Win32Device;

    fn native_ptr(&self) -> NativePtr {
        NativePtr(self.raw as usize)
    }

    fn adapter_mode_count(&self, adapter: u32, format: Format) -> u32 {
        unsafe { self.interface.GetAdapterModeCount(adapter, D3DFORMAT(format.0 as _)) }
    }

    fn enum_adapter_mode(&self, adapter: u32, format: Format, mode: u32) -> Result<DisplayMode, Status> {
        let mut native = D3DDISPLAYMODE::default();
        unsafe { self.interface.EnumAdapterModes(adapter, D3DFORMAT(format.0 as _), mode, &mut native) }
            .map_err(status)?;
        Ok(DisplayMode {
            width: native.Width,
            height: native.Height,
            refresh_rate: native.RefreshRate,
            format: Format(native.Format.0 as u32),
        })
    }

    fn check_multisample(
        &self,
        adapter: u32,
        device_type: DeviceType,
        format: Format,
        windowed: bool,
        samples: u32,
    ) -> Result<u32, Status> {
        let mut quality_levels = 0;
        unsafe {
            (self.originals.check_multisample)(
                self.raw,
                adapter,
                D3DDEVTYPE(device_type.0 as _),
                D3DFORMAT(format.0 as _),
                BOOL::from(windowed),
                D3DMULTISAMPLE_TYPE(samples as _),
                &mut quality_levels,
            )
        }
        .ok()
        .map_err(status)?;
        Ok(quality_levels)
    }

    fn create_device(&self, call: &NativeCreate, params: &mut PresentParams) -> Result<Win32Device, Status> {
        let mut native = present_params_to_native(params);
        let mut device: *mut c_void = ptr::null_mut();
        let device_type = D3DDEVTYPE(call.device_type.0 as _);
        let focus_window = hwnd(call.focus_window);
        let behavior_flags = call.behavior_flags.bits();

        let result = match call.entry {
            CreateEntry::CreateDevice => unsafe {
                (self.originals.create_device)(
                    self.raw,
                    call.adapter,
                    device_type,
                    focus_window,
                    behavior_flags,
                    &mut native,
                    &mut device,
                )
            },
            CreateEntry::CreateDeviceEx { fullscreen_mode } => {
                let Some(create_device_ex) = self.originals.create_device_ex else {
                    log::error!("CreateDeviceEx on a factory without an extended vtable");
                    return Err(Status::INVALID_CALL);
                };
                let mut mode = fullscreen_mode.as_ref().map(display_mode_ex_to_native);
                let mode_ptr = mode.as_mut().map_or(ptr::null_mut(), |m| m as *mut D3DDISPLAYMODEEX);
                unsafe {
                    create_device_ex(
                        self.raw,
                        call.adapter,
                        device_type,
                        focus_window,
                        behavior_flags,
                        &mut native,
                        mode_ptr,
                        &mut device,
                    )
                }
            }
        };

        *params = present_params_from_native(&native);
        result.ok().map_err(status)?;
        if device.is_null() {
            return Err(Status::INVALID_CALL);
        }

        match unsafe { vtable::install_device_hooks(device) } {
            Ok(originals) => Ok(unsafe { Win32Device::from_raw(device, originals) }),
            Err(err) => {
                log::error!("Failed to hook device {:p}: {:?}", device, err);
                // Hand the reference back; the device is unusable without its hooks.
                drop(unsafe { IDirect3DDevice9::from_raw(device) });
                Err(Status::NOT_AVAILABLE)
            }
        }
    }
}

pub struct Win32Device {
    raw: *mut c_void,
    interface: ManuallyDrop<IDirect3DDevice9>,
    originals: DeviceOriginals,
}

unsafe impl Send for Win32Device {}
unsafe impl Sync for Win32Device {}

impl Win32Device {
    /// # Safety
    /// `raw` must point to a live `IDirect3DDevice9` whose vtable was hooked with `originals`.
    unsafe fn from_raw(raw: *mut c_void, originals: DeviceOriginals) -> Self {
        Self { raw, interface: ManuallyDrop::new(unsafe { IDirect3DDevice9::from_raw(raw) }), originals }
    }
}

impl NativeDevice for Win32Device {
    fn native_ptr(&self) -> NativePtr {
        NativePtr(self.raw as usize)
    }

    fn enable_multisample_antialias(&self) -> Result<(), Status> {
        unsafe { self.interface.SetRenderState(D3DRS_MULTISAMPLEANTIALIAS, 1) }.map_err(status)
    }

    fn reset(&self, params: &mut PresentParams) -> Result<(), Status> {
        let mut native = present_params_to_native(params);
        let result = unsafe { (self.originals.reset)(self.raw, &mut native) };
        *params = present_params_from_native(&native);
        result.ok().map_err(status)
    }
}
