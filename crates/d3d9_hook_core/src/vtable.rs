//! Vtable slot patching for `IDirect3D9(Ex)` and `IDirect3DDevice9`.
//!
//! Original entries are kept per vtable address. They are recorded before the slots are
//! overwritten, so a hook can always reach the function it replaced.

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::Context;
use windows::core::HRESULT;
use windows::Win32::Foundation::{BOOL, HWND};
use windows::Win32::Graphics::Direct3D9::{
    D3DDEVTYPE, D3DDISPLAYMODEEX, D3DFORMAT, D3DMULTISAMPLE_TYPE, D3DPRESENT_PARAMETERS,
};
use windows::Win32::System::Memory::{VirtualProtect, PAGE_EXECUTE_READWRITE, PAGE_PROTECTION_FLAGS};

use crate::hooks;

const RELEASE: usize = 2;
const CHECK_DEVICE_TYPE: usize = 9;
const CHECK_DEVICE_MULTISAMPLE_TYPE: usize = 11;
const CREATE_DEVICE: usize = 16;
const CREATE_DEVICE_EX: usize = 20;
const RESET: usize = 16;

pub(crate) type FnRelease = unsafe extern "system" fn(this: *mut c_void) -> u32;

pub(crate) type FnCheckDeviceType = unsafe extern "system" fn(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    adapter_format: D3DFORMAT,
    back_buffer_format: D3DFORMAT,
    windowed: BOOL,
) -> HRESULT;

pub(crate) type FnCheckDeviceMultiSampleType = unsafe extern "system" fn(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    surface_format: D3DFORMAT,
    windowed: BOOL,
    multisample_type: D3DMULTISAMPLE_TYPE,
    quality_levels: *mut u32,
) -> HRESULT;

pub(crate) type FnCreateDevice = unsafe extern "system" fn(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    focus_window: HWND,
    behavior_flags: u32,
    params: *mut D3DPRESENT_PARAMETERS,
    returned_device: *mut *mut c_void,
) -> HRESULT;

pub(crate) type FnCreateDeviceEx = unsafe extern "system" fn(
    this: *mut c_void,
    adapter: u32,
    device_type: D3DDEVTYPE,
    focus_window: HWND,
    behavior_flags: u32,
    params: *mut D3DPRESENT_PARAMETERS,
    fullscreen_mode: *mut D3DDISPLAYMODEEX,
    returned_device: *mut *mut c_void,
) -> HRESULT;

pub(crate) type FnReset =
    unsafe extern "system" fn(this: *mut c_void, params: *mut D3DPRESENT_PARAMETERS) -> HRESULT;

#[derive(Clone, Copy)]
pub(crate) struct FactoryOriginals {
    pub release: FnRelease,
    pub check_device_type: FnCheckDeviceType,
    pub check_multisample: FnCheckDeviceMultiSampleType,
    pub create_device: FnCreateDevice,
    /// Only present on `IDirect3D9Ex` vtables.
    pub create_device_ex: Option<FnCreateDeviceEx>,
}

#[derive(Clone, Copy)]
pub(crate) struct DeviceOriginals {
    pub release: FnRelease,
    pub reset: FnReset,
}

static FACTORY_VTABLES: OnceLock<Mutex<HashMap<usize, FactoryOriginals>>> = OnceLock::new();
static DEVICE_VTABLES: OnceLock<Mutex<HashMap<usize, DeviceOriginals>>> = OnceLock::new();

fn lock<T>(table: &'static OnceLock<Mutex<HashMap<usize, T>>>) -> MutexGuard<'static, HashMap<usize, T>> {
    table
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

unsafe fn vtable_of(object: *mut c_void) -> *mut usize {
    unsafe { *(object as *const *mut usize) }
}

unsafe fn read_slot<T>(vtable: *mut usize, index: usize) -> T {
    unsafe {
        let entry = vtable.add(index).read();
        std::mem::transmute_copy(&entry)
    }
}

unsafe fn patch_vtable_entry(vtable: *mut usize, index: usize, new_fn: usize) -> anyhow::Result<()> {
    unsafe {
        let entry = vtable.add(index);
        if entry.read() == new_fn {
            return Ok(());
        }

        let mut old_protect = PAGE_PROTECTION_FLAGS(0);
        VirtualProtect(entry as _, size_of::<usize>(), PAGE_EXECUTE_READWRITE, &mut old_protect)
            .with_context(|| format!("VirtualProtect failed for vtable entry {}", index))?;

        entry.write(new_fn);

        VirtualProtect(entry as _, size_of::<usize>(), old_protect, &mut old_protect)
            .with_context(|| format!("VirtualProtect restore failed for vtable entry {}", index))?;
        Ok(())
    }
}

/// Hooks Release, CheckDeviceType, CheckDeviceMultiSampleType and CreateDevice of a factory,
/// plus CreateDeviceEx when `extended`.
///
/// # Safety
/// `factory` must point to a live `IDirect3D9` (`IDirect3D9Ex` when `extended`).
pub(crate) unsafe fn install_factory_hooks(factory: *mut c_void, extended: bool) -> anyhow::Result<FactoryOriginals> {
    unsafe {
        let vtable = vtable_of(factory);
        let key = vtable as usize;

        let originals = {
            let mut tables = lock(&FACTORY_VTABLES);
            let originals = match tables.get(&key).copied() {
                Some(known) => known,
                None => FactoryOriginals {
                    release: read_slot(vtable, RELEASE),
                    check_device_type: read_slot(vtable, CHECK_DEVICE_TYPE),
                    check_multisample: read_slot(vtable, CHECK_DEVICE_MULTISAMPLE_TYPE),
                    create_device: read_slot(vtable, CREATE_DEVICE),
                    create_device_ex: None,
                },
            };
            let originals = match originals.create_device_ex {
                None if extended => FactoryOriginals {
                    create_device_ex: Some(read_slot(vtable, CREATE_DEVICE_EX)),
                    ..originals
                },
                _ => originals,
            };
            tables.insert(key, originals);
            originals
        };

        patch_vtable_entry(vtable, RELEASE, hooks::factory_release as usize)?;
        patch_vtable_entry(vtable, CHECK_DEVICE_TYPE, hooks::check_device_type as usize)?;
        patch_vtable_entry(vtable, CHECK_DEVICE_MULTISAMPLE_TYPE, hooks::check_device_multisample_type as usize)?;
        patch_vtable_entry(vtable, CREATE_DEVICE, hooks::create_device as usize)?;
        if extended {
            patch_vtable_entry(vtable, CREATE_DEVICE_EX, hooks::create_device_ex as usize)?;
        }

        log::debug!("Factory vtable {:#x} hooked (extended: {})", key, extended);
        Ok(originals)
    }
}

/// Hooks Release and Reset of a device.
///
/// # Safety
/// `device` must point to a live `IDirect3DDevice9`.
pub(crate) unsafe fn install_device_hooks(device: *mut c_void) -> anyhow::Result<DeviceOriginals> {
    unsafe {
        let vtable = vtable_of(device);
        let key = vtable as usize;

        let originals = *lock(&DEVICE_VTABLES).entry(key).or_insert_with(|| DeviceOriginals {
            release: read_slot(vtable, RELEASE),
            reset: read_slot(vtable, RESET),
        });

        patch_vtable_entry(vtable, RESET, hooks::reset as usize)?;
        patch_vtable_entry(vtable, RELEASE, hooks::device_release as usize)?;

        log::debug!("Device vtable {:#x} hooked", key);
        Ok(originals)
    }
}

/// Functions replaced in the vtable of `factory`.
///
/// # Safety
/// `factory` must point to a live COM object.
pub(crate) unsafe fn factory_originals(factory: *mut c_void) -> Option<FactoryOriginals> {
    let key = unsafe { vtable_of(factory) } as usize;
    lock(&FACTORY_VTABLES).get(&key).copied()
}

/// Functions replaced in the vtable of `device`.
///
/// # Safety
/// `device` must point to a live COM object.
pub(crate) unsafe fn device_originals(device: *mut c_void) -> Option<DeviceOriginals> {
    let key = unsafe { vtable_of(device) } as usize;
    lock(&DEVICE_VTABLES).get(&key).copied()
}
