//! Replacement vtable entries. Every hook degrades to the original function when the object
//! is unknown to the interceptor.

use std::ffi::c_void;
use std::sync::Arc;

use d3d9_wrap_core::device::CreateRequest;
use d3d9_wrap_core::native::CreateEntry;
use d3d9_wrap_core::types::{BehaviorFlags, DeviceType, NativePtr, Status};
use windows::core::HRESULT;
use windows::Win32::Foundation::{BOOL, HWND, S_OK};
use windows::Win32::Graphics::Direct3D9::{
    D3DDEVTYPE, D3DDISPLAYMODEEX, D3DFORMAT, D3DMULTISAMPLE_TYPE, D3DPRESENT_PARAMETERS,
};

use crate::native::{display_mode_ex_from_native, hresult, present_params_from_native, present_params_to_native, window_handle};
use crate::{runtime, vtable};

// ============================================================
// IDirect3D9 / IDirect3D9Ex
// ============================================================

pub(crate) unsafe extern "system" fn factory_release(this: *mut c_void) -> u32 {
    let Some(originals) = (unsafe { vtable::factory_originals(this) }) else {
        log::error!("Release on unknown factory vtable {:p}", this);
        return 0;
    };
    let remaining = unsafe { (originals.release)(this) };

    if let Some(wrapper) = runtime().interceptor().release_factory(NativePtr(this as usize), remaining) {
        // The reference handed out when the factory was adopted.
        unsafe { Arc::decrement_strong_count(Arc::as_ptr(&wrapper)) };
    }
    remaining
}

pub(crate) unsafe extern "system" fn check_device_type(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    adapter_format: D3DFORMAT,
    back_buffer_format: D3DFORMAT,
    windowed: BOOL,
) -> HRESULT {
    let Some(originals) = (unsafe { vtable::factory_originals(this) }) else {
        return hresult(Status::INVALID_CALL);
    };
    let windowed = runtime().interceptor().capability_windowed(windowed.as_bool());
    unsafe {
        (originals.check_device_type)(
            this,
            adapter,
            device_type,
            adapter_format,
            back_buffer_format,
            BOOL::from(windowed),
        )
    }
}

pub(crate) unsafe extern "system" fn check_device_multisample_type(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    surface_format: D3DFORMAT,
    windowed: BOOL,
    multisample_type: D3DMULTISAMPLE_TYPE,
    quality_levels: *mut u32,
) -> HRESULT {
    let Some(originals) = (unsafe { vtable::factory_originals(this) }) else {
        return hresult(Status::INVALID_CALL);
    };
    let windowed = runtime().interceptor().capability_windowed(windowed.as_bool());
    unsafe {
        (originals.check_multisample)(
            this,
            adapter,
            device_type,
            surface_format,
            BOOL::from(windowed),
            multisample_type,
            quality_levels,
        )
    }
}

pub(crate) unsafe extern "system" fn create_device(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    focus_window: HWND,
    behavior_flags: u32,
    params: *mut D3DPRESENT_PARAMETERS,
    returned_device: *mut *mut c_void,
) -> HRESULT {
    unsafe {
        intercept_create(
            this,
            adapter,
            device_type,
            focus_window,
            behavior_flags,
            params,
            CreateEntry::CreateDevice,
            returned_device,
        )
    }
}

pub(crate) unsafe extern "system" fn create_device_ex(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    focus_window: HWND,
    behavior_flags: u32,
    params: *mut D3DPRESENT_PARAMETERS,
    fullscreen_mode: *mut D3DDISPLAYMODEEX,
    returned_device: *mut *mut c_void,
) -> HRESULT {
    let fullscreen_mode = unsafe { fullscreen_mode.as_ref() }.map(display_mode_ex_from_native);
    unsafe {
        intercept_create(
            this,
            adapter,
            device_type,
            focus_window,
            behavior_flags,
            params,
            CreateEntry::CreateDeviceEx { fullscreen_mode },
            returned_device,
        )
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn intercept_create(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    focus_window: HWND,
    behavior_flags: u32,
    params: *mut D3DPRESENT_PARAMETERS,
    entry: CreateEntry,
    returned_device: *mut *mut c_void,
) -> HRESULT {
    let runtime = runtime();
    let Some(factory) = (unsafe { runtime.factory(this) }) else {
        log::error!("CreateDevice on unknown factory {:p}", this);
        return hresult(Status::INVALID_CALL);
    };

    let mut local = unsafe { params.as_ref() }.map(present_params_from_native);
    let request = CreateRequest {
        adapter,
        device_type: DeviceType(device_type.0 as u32),
        focus_window: window_handle(focus_window),
        behavior_flags: BehaviorFlags::from_bits_retain(behavior_flags),
        params: local.as_mut(),
        entry,
        return_slot: returned_device as usize,
    };

    match runtime.interceptor().create_device(&factory, request) {
        Ok(device) => unsafe {
            if let Some(local) = local {
                *params = present_params_to_native(&local);
            }
            *returned_device = device.native_ptr().0 as *mut c_void;
            // The application's reference, dropped by the hooked Release.
            let _ = Arc::into_raw(device);
            S_OK
        },
        Err(status) => hresult(status),
    }
}

// ============================================================
// IDirect3DDevice9
// ============================================================

pub(crate) unsafe extern "system" fn device_release(this: *mut c_void) -> u32 {
    let Some(originals) = (unsafe { vtable::device_originals(this) }) else {
        log::error!("Release on unknown device vtable {:p}", this);
        return 0;
    };
    let remaining = unsafe { (originals.release)(this) };

    if let Some(wrapper) = runtime().interceptor().release_device(NativePtr(this as usize), remaining) {
        unsafe { Arc::decrement_strong_count(Arc::as_ptr(&wrapper)) };
    }
    remaining
}

pub(crate) unsafe extern "system" fn reset(this: *mut c_void, params: *mut D3DPRESENT_PARAMETERS) -> HRESULT {
    let interceptor = runtime().interceptor();
    let Some(device) = interceptor.find_device(NativePtr(this as usize)) else {
        return match unsafe { vtable::device_originals(this) } {
            Some(originals) => unsafe { (originals.reset)(this, params) },
            None => hresult(Status::INVALID_CALL),
        };
    };

    let mut local = unsafe { params.as_ref() }.map(present_params_from_native);
    match interceptor.reset_device(&device, local.as_mut()) {
        Ok(()) => {
            if let Some(local) = local {
                unsafe { *params = present_params_to_native(&local) };
            }
            S_OK
        }
        Err(status) => hresult(status),
    }
}
