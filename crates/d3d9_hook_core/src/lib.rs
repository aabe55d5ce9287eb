//! d3d9_hook_core: binds the wrapper core to the live d3d9 runtime.
//!
//! Responsibilities:
//! - Patch IDirect3D9 Release (2), CheckDeviceType (9), CheckDeviceMultiSampleType (11),
//!   CreateDevice (16) and, on IDirect3D9Ex, CreateDeviceEx (20).
//! - Patch IDirect3DDevice9 Release (2) and Reset (16) of every created device.
//! - Route those calls through the process-wide [`Interceptor`].

#![cfg(windows)]

use std::ffi::c_void;
use std::sync::{Arc, Once, OnceLock};

use d3d9_wrap_core::device::{FactoryWrapper, Interceptor};
use d3d9_wrap_core::types::NativePtr;
use d3d9_wrap_core::{Config, CONFIG_FILE_PATH};

mod desktop;
mod hooks;
mod native;
mod vtable;

pub use desktop::Win32Windows;
pub use native::{Win32Device, Win32Factory};

use vtable::FactoryOriginals;

pub type Win32Interceptor = Interceptor<Win32Factory, Win32Windows>;

pub struct Runtime {
    interceptor: Win32Interceptor,
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

impl Runtime {
    fn new(config: Config) -> Self {
        log::debug!("Wrapper configuration: {:?}", config);
        Self { interceptor: Interceptor::new(config, Win32Windows) }
    }

    pub fn interceptor(&self) -> &Win32Interceptor {
        &self.interceptor
    }

    /// Wraps a factory and hands one strong reference to the application side.
    unsafe fn adopt_factory(&self, raw: *mut c_void, originals: FactoryOriginals) -> Arc<FactoryWrapper<Win32Factory>> {
        let wrapper = self.interceptor.wrap_factory(unsafe { Win32Factory::from_raw(raw, originals) });
        if Arc::strong_count(&wrapper) == 1 {
            let _ = Arc::into_raw(Arc::clone(&wrapper));
        }
        wrapper
    }

    /// The wrapper of a factory whose vtable is hooked, adopting it on first sight.
    pub(crate) unsafe fn factory(&self, raw: *mut c_void) -> Option<Arc<FactoryWrapper<Win32Factory>>> {
        if let Some(wrapper) = self.interceptor.find_factory(NativePtr(raw as usize)) {
            return Some(wrapper);
        }
        let originals = unsafe { vtable::factory_originals(raw) }?;
        Some(unsafe { self.adopt_factory(raw, originals) })
    }
}

/// Sets up the process-wide runtime. Later calls keep the first configuration.
pub fn init(config: Config) {
    if RUNTIME.set(Runtime::new(config)).is_err() {
        log::warn!("Wrapper runtime was already initialized");
    }
}

/// The process-wide runtime, loading the configuration file if [`init`] was never called.
pub fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Runtime::new(Config::load_or_default(CONFIG_FILE_PATH)))
}

/// Hooks a factory returned by `Direct3DCreate9` / `Direct3DCreate9Ex`.
///
/// # Safety
/// `factory` must be a valid `IDirect3D9` pointer (`IDirect3D9Ex` when `extended`).
pub unsafe fn install_on_d3d9(factory: *mut c_void, extended: bool) -> anyhow::Result<()> {
    let originals = unsafe { vtable::install_factory_hooks(factory, extended) }?;
    let wrapper = unsafe { runtime().adopt_factory(factory, originals) };

    static ADAPTERS_LOGGED: Once = Once::new();
    ADAPTERS_LOGGED.call_once(|| wrapper.native().log_adapters());
    log::info!("[HOOK] IDirect3D9{} {:p} hooked.", if extended { "Ex" } else { "" }, factory);
    Ok(())
}
