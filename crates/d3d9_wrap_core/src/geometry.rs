use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::types::{NativePtr, WindowHandle};

/// Identifies the geometry record of one created device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceKey {
    /// Address of the caller's device out-pointer.
    pub return_slot: usize,
    pub device: NativePtr,
    pub window: WindowHandle,
}

/// Last known window geometry and negotiated multisampling of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceGeometry {
    pub window: WindowHandle,
    pub buffer_width: u32,
    pub buffer_height: u32,
    pub multisample_enabled: bool,
    pub multisample_type: u32,
    pub multisample_quality: u32,
}

/// Process-wide geometry records. Entries live for the whole process.
#[derive(Default)]
pub struct GeometryStore {
    records: Mutex<HashMap<DeviceKey, DeviceGeometry>>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DeviceKey, DeviceGeometry>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &DeviceKey) -> Option<DeviceGeometry> {
        self.lock().get(key).copied()
    }

    pub fn insert(&self, key: DeviceKey, geometry: DeviceGeometry) {
        self.lock().insert(key, geometry);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
