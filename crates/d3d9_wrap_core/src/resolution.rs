use crate::config::Config;
use crate::native::NativeFactory;
use crate::types::Format;

/// Whether the requested back-buffer size should be forced into exclusive fullscreen:
/// forcing is on and the adapter lists the exact size as an X8R8G8B8 display mode.
pub fn supports_exclusive_mode<F: NativeFactory + ?Sized>(
    config: &Config,
    factory: &F,
    adapter: u32,
    width: u32,
    height: u32,
) -> bool {
    if !config.force_exclusive_fullscreen || width == 0 || height == 0 {
        return false;
    }

    let count = factory.adapter_mode_count(adapter, Format::X8R8G8B8);
    for index in 0..count {
        match factory.enum_adapter_mode(adapter, Format::X8R8G8B8, index) {
            Ok(mode) if mode.width == width && mode.height == height => return true,
            Ok(_) => {}
            Err(status) => {
                log::warn!("EnumAdapterModes failed on adapter {} mode {}: {}", adapter, index, status);
                break;
            }
        }
    }
    false
}
