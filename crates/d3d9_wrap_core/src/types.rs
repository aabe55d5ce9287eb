//! Plain-data mirrors of the d3d9 structures the interception core reads and rewrites.
//!
//! These types carry no pointers into native memory, so the negotiation and reconciliation
//! logic can run (and be tested) without a live `d3d9.dll`.

use std::fmt;

use bitflags::bitflags;

/// Native-style status code (`HRESULT` value).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Status = Status(0);
    pub const INVALID_CALL: Status = Status(0x8876_086Cu32 as i32);
    pub const NOT_AVAILABLE: Status = Status(0x8876_086Au32 as i32);
    pub const DEVICE_LOST: Status = Status(0x8876_0868u32 as i32);

    pub fn is_ok(self) -> bool {
        self.0 >= 0
    }

    fn name(self) -> Option<&'static str> {
        match self {
            Status::OK => Some("D3D_OK"),
            Status::INVALID_CALL => Some("D3DERR_INVALIDCALL"),
            Status::NOT_AVAILABLE => Some("D3DERR_NOTAVAILABLE"),
            Status::DEVICE_LOST => Some("D3DERR_DEVICELOST"),
            _ => None,
        }
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:08X})", name, self.0 as u32),
            None => write!(f, "0x{:08X}", self.0 as u32),
        }
    }
}

impl std::error::Error for Status {}

/// Address of a native COM object. Only ever compared, never dereferenced by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativePtr(pub usize);

impl NativePtr {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Opaque OS window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub usize);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// `D3DFORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Format(pub u32);

impl Format {
    pub const UNKNOWN: Format = Format(0);
    pub const X8R8G8B8: Format = Format(22);
    pub const D24S8: Format = Format(75);

    pub fn is_unknown(self) -> bool {
        self == Format::UNKNOWN
    }

    /// Unknown formats are checked as the default 32-bit format.
    pub fn or_default_32bit(self) -> Format {
        if self.is_unknown() { Format::X8R8G8B8 } else { self }
    }
}

/// `D3DDEVTYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceType(pub u32);

impl DeviceType {
    pub const HAL: DeviceType = DeviceType(1);
}

/// `D3DSWAPEFFECT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SwapEffect(pub u32);

impl SwapEffect {
    pub const DISCARD: SwapEffect = SwapEffect(1);
    pub const COPY: SwapEffect = SwapEffect(3);
}

pub const PRESENT_INTERVAL_DEFAULT: u32 = 0;
pub const PRESENT_INTERVAL_ONE: u32 = 0x0000_0001;
pub const PRESENT_INTERVAL_IMMEDIATE: u32 = 0x8000_0000;

/// Highest multisample sample count d3d9 defines (`D3DMULTISAMPLE_16_SAMPLES`).
pub const MAX_MULTISAMPLE_SAMPLES: u32 = 16;

bitflags! {
    /// `D3DPRESENTFLAG_*`
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PresentFlags: u32 {
        const LOCKABLE_BACKBUFFER = 0x0000_0001;
        const DISCARD_DEPTHSTENCIL = 0x0000_0002;
        const DEVICECLIP = 0x0000_0004;
        const _ = !0;
    }
}

bitflags! {
    /// `D3DCREATE_*` behavior flags.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BehaviorFlags: u32 {
        const FPU_PRESERVE = 0x0000_0002;
        const MULTITHREADED = 0x0000_0004;
        const PUREDEVICE = 0x0000_0010;
        const SOFTWARE_VERTEXPROCESSING = 0x0000_0020;
        const HARDWARE_VERTEXPROCESSING = 0x0000_0040;
        const MIXED_VERTEXPROCESSING = 0x0000_0080;
        const _ = !0;
    }
}

/// `D3DPRESENT_PARAMETERS`, owned copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentParams {
    pub back_buffer_width: u32,
    pub back_buffer_height: u32,
    pub back_buffer_format: Format,
    pub back_buffer_count: u32,
    pub multisample_type: u32,
    pub multisample_quality: u32,
    pub swap_effect: SwapEffect,
    pub device_window: WindowHandle,
    pub windowed: bool,
    pub enable_auto_depth_stencil: bool,
    pub auto_depth_stencil_format: Format,
    pub flags: PresentFlags,
    pub refresh_rate: u32,
    pub presentation_interval: u32,
}

/// `D3DDISPLAYMODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: u32,
    pub format: Format,
}

/// `D3DDISPLAYMODEEX`, the optional fullscreen descriptor of `CreateDeviceEx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayModeEx {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: u32,
    pub format: Format,
    pub scanline_ordering: u32,
}

/// Screen-space rectangle, `RECT` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Rectangle of the given size anchored at the origin.
    pub fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}
