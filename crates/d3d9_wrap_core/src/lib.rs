//! Platform-independent core of the d3d9 wrapper.
//!
//! Everything here works on plain-data mirrors of the d3d9 structures and talks to the OS only
//! through [`native::NativeFactory`], [`native::NativeDevice`] and [`window::WindowControl`].
//! The Windows glue lives in `d3d9_hook_core`.

pub mod config;
pub mod device;
pub mod geometry;
pub mod identity;
pub mod multisample;
pub mod native;
pub mod policy;
pub mod reconcile;
pub mod resolution;
pub mod types;
pub mod window;

#[cfg(test)]
mod testing;

pub use config::{Config, CONFIG_FILE_PATH};
pub use device::{CreateRequest, DeviceWrapper, FactoryWrapper, Interceptor};
pub use native::{CreateEntry, NativeCreate, NativeDevice, NativeFactory};
pub use types::Status;
pub use window::WindowControl;
