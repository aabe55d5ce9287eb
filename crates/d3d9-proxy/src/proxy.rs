use std::ffi::c_void;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::PathBuf;
use std::sync::{LazyLock, OnceLock};

use windows::core::{PCSTR, PCWSTR};
use windows::Win32::Foundation::HMODULE;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::Win32::System::SystemInformation::GetSystemDirectoryW;
use windows::Win32::UI::WindowsAndMessaging::{MessageBoxA, MB_ICONERROR};

fn fatal(message: &str) -> ! {
    log::error!("Proxy error! {}", message);
    let text = format!("{}\0", message);
    unsafe {
        MessageBoxA(None, PCSTR(text.as_ptr()), PCSTR(b"d3d9 wrapper\0".as_ptr()), MB_ICONERROR);
    }
    std::process::exit(0);
}

/// Base address of the system d3d9.dll.
static SYSTEM_D3D9: LazyLock<usize> = LazyLock::new(|| {
    let mut buffer = vec![0u16; 260];
    let len = unsafe { GetSystemDirectoryW(Some(&mut buffer)) } as usize;
    buffer.truncate(len);
    let mut path = PathBuf::from(std::ffi::OsString::from_wide(&buffer));
    path.push("d3d9.dll");

    let wide_path: Vec<u16> = path.as_os_str().encode_wide().chain(Some(0)).collect();
    match unsafe { LoadLibraryW(PCWSTR(wide_path.as_ptr())) } {
        Ok(module) => {
            log::info!("Loaded {}", path.display());
            module.0 as usize
        }
        Err(err) => fatal(&format!("Cannot load {}: {}", path.display(), err)),
    }
});

/// Loads the system d3d9.dll.
pub fn initialize() {
    LazyLock::force(&SYSTEM_D3D9);
}

/// Address of the NUL-terminated export `name`.
fn resolve(name: &str) -> usize {
    let module = HMODULE(*SYSTEM_D3D9 as *mut c_void);
    match unsafe { GetProcAddress(module, PCSTR::from_raw(name.as_ptr())) } {
        Some(export) => export as usize,
        None => fatal(&format!(
            "Cannot find {} in the system d3d9.dll",
            name.trim_end_matches('\0')
        )),
    }
}

/// The system implementation of export `name`, resolved once into `slot`.
///
/// # Safety
/// `T` must be the function pointer type of the export.
#[inline]
pub unsafe fn original<T: Copy>(slot: &OnceLock<usize>, name: &str) -> T {
    let address = *slot.get_or_init(|| resolve(name));
    unsafe { std::mem::transmute_copy(&address) }
}

/// Exports `$name` and forwards every call to the system d3d9.dll. Ordinals come from `d3d9.def`.
#[macro_export]
macro_rules! forward_export {
    ($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "system" fn $name($($arg: $ty),*) -> $ret {
            static EXPORT: std::sync::OnceLock<usize> = std::sync::OnceLock::new();
            let forward: unsafe extern "system" fn($($ty),*) -> $ret =
                unsafe { $crate::proxy::original(&EXPORT, concat!(stringify!($name), "\0")) };
            unsafe { forward($($arg),*) }
        }
    };
}
