//! d3d9-proxy: drop-in d3d9.dll that routes device creation through the wrapper core.
//!
//! This crate is responsible for:
//! - Loading the system d3d9.dll and forwarding all its exports.
//! - Hooking the factories returned by Direct3DCreate9 / Direct3DCreate9Ex.
//! - Reading `d3d9_wrapper.json` and starting the log.
#![cfg(windows)]
#![allow(non_snake_case)]

use std::ffi::c_void;
use std::sync::OnceLock;

use d3d9_wrap_core::{Config, CONFIG_FILE_PATH};
use log::LevelFilter;
use windows::core::{HRESULT, PCWSTR};
use windows::Win32::Foundation::{BOOL, HMODULE};
use windows::Win32::System::SystemServices::DLL_PROCESS_ATTACH;

mod logger;
mod proxy;

fn initialize() {
    let config = Config::load(CONFIG_FILE_PATH);
    logger::init(config.as_ref().map_or(LevelFilter::Info, |c| c.log_level));

    let config = config.unwrap_or_else(|err| {
        log::error!("{:#}, using defaults", err);
        Config::default()
    });
    log::info!("Logger initialized. Loading the system d3d9.dll...");
    d3d9_hook_core::init(config);

    proxy::initialize();
}

#[unsafe(no_mangle)]
pub extern "system" fn DllMain(_h_inst_dll: HMODULE, fdw_reason: u32, _lpv_reserved: *mut c_void) -> BOOL {
    if fdw_reason == DLL_PROCESS_ATTACH {
        initialize();
    }
    BOOL(1)
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn Direct3DCreate9(sdk_version: u32) -> *mut c_void {
    static EXPORT: OnceLock<usize> = OnceLock::new();
    let create: unsafe extern "system" fn(u32) -> *mut c_void =
        unsafe { proxy::original(&EXPORT, "Direct3DCreate9\0") };
    let d3d9 = unsafe { create(sdk_version) };

    if !d3d9.is_null() {
        if let Err(err) = unsafe { d3d9_hook_core::install_on_d3d9(d3d9, false) } {
            log::error!("Failed to hook IDirect3D9: {:?}", err);
        }
    }

    d3d9
}

#[unsafe(no_mangle)]
pub unsafe extern "system" fn Direct3DCreate9Ex(sdk_version: u32, out: *mut *mut c_void) -> HRESULT {
    static EXPORT: OnceLock<usize> = OnceLock::new();
    let create: unsafe extern "system" fn(u32, *mut *mut c_void) -> HRESULT =
        unsafe { proxy::original(&EXPORT, "Direct3DCreate9Ex\0") };
    let hr = unsafe { create(sdk_version, out) };

    if hr.is_ok() && !out.is_null() {
        let d3d9 = unsafe { *out };
        if !d3d9.is_null() {
            if let Err(err) = unsafe { d3d9_hook_core::install_on_d3d9(d3d9, true) } {
                log::error!("Failed to hook IDirect3D9Ex: {:?}", err);
            }
        }
    }

    hr
}

forward_export!(D3DPERF_BeginEvent(col: u32, wsz_name: PCWSTR) -> i32);
forward_export!(D3DPERF_EndEvent() -> i32);
forward_export!(D3DPERF_GetStatus() -> u32);
forward_export!(D3DPERF_QueryRepeatFrame() -> BOOL);
forward_export!(D3DPERF_SetMarker(col: u32, wsz_name: PCWSTR) -> ());
forward_export!(D3DPERF_SetOptions(dw_options: u32) -> ());
forward_export!(D3DPERF_SetRegion(col: u32, wsz_name: PCWSTR) -> ());
forward_export!(DebugSetLevel(level: i32) -> ());
forward_export!(DebugSetMute() -> ());
forward_export!(Direct3D9EnableMaximizedWindowedModeShim() -> ());
forward_export!(Direct3DShaderValidatorCreate9() -> *mut c_void);
forward_export!(PSGPError() -> *mut c_void);
forward_export!(PSGPSampleTexture() -> *mut c_void);
