//! The slice of the native d3d9 API the core calls into.

use crate::types::{BehaviorFlags, DeviceType, DisplayMode, DisplayModeEx, Format, NativePtr, PresentParams, Status, WindowHandle};

/// Arguments of one native `CreateDevice` / `CreateDeviceEx` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeCreate {
    pub adapter: u32,
    pub device_type: DeviceType,
    pub focus_window: WindowHandle,
    pub behavior_flags: BehaviorFlags,
    pub entry: CreateEntry,
}

/// Which factory method the application called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateEntry {
    CreateDevice,
    CreateDeviceEx { fullscreen_mode: Option<DisplayModeEx> },
}

impl NativeCreate {
    /// The call to issue for `params`: the fullscreen display mode only goes with exclusive mode.
    pub fn for_params(&self, params: &PresentParams) -> NativeCreate {
        match self.entry {
            CreateEntry::CreateDeviceEx { fullscreen_mode: Some(_) } if params.windowed => NativeCreate {
                entry: CreateEntry::CreateDeviceEx { fullscreen_mode: None },
                ..*self
            },
            _ => *self,
        }
    }
}

/// `IDirect3D9` / `IDirect3D9Ex`.
pub trait NativeFactory {
    type Device: NativeDevice;

    fn native_ptr(&self) -> NativePtr;

    fn adapter_mode_count(&self, adapter: u32, format: Format) -> u32;
    fn enum_adapter_mode(&self, adapter: u32, format: Format, mode: u32) -> Result<DisplayMode, Status>;

    /// Number of quality levels for `samples` on `format`.
    fn check_multisample(
        &self,
        adapter: u32,
        device_type: DeviceType,
        format: Format,
        windowed: bool,
        samples: u32,
    ) -> Result<u32, Status>;

    /// Creates a device. The native call may rewrite `params`.
    fn create_device(&self, call: &NativeCreate, params: &mut PresentParams) -> Result<Self::Device, Status>;
}

/// `IDirect3DDevice9`
pub trait NativeDevice {
    fn native_ptr(&self) -> NativePtr;
    /// Sets `D3DRS_MULTISAMPLEANTIALIAS` to `TRUE`.
    fn enable_multisample_antialias(&self) -> Result<(), Status>;
    fn reset(&self, params: &mut PresentParams) -> Result<(), Status>;
}
