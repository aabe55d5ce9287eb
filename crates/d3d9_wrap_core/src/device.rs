//! Device creation and reset as seen by the application.
//!
//! [`Interceptor`] owns the configuration, the identity tables and the geometry records, and
//! runs every creation through the same sequence: validate, normalize, check the resolution,
//! rewrite the parameters, negotiate multisampling, fall back to a plain device, then commit.
//! Nothing is committed (caller parameters, geometry, identity) unless a device was created.

use std::sync::Arc;

use crate::config::Config;
use crate::geometry::{DeviceGeometry, DeviceKey, GeometryStore};
use crate::identity::IdentityTable;
use crate::multisample::{apply_multisample, create_multisampled, MultisampleSetting};
use crate::native::{CreateEntry, NativeCreate, NativeDevice, NativeFactory};
use crate::policy::{capability_windowed, normalize_behavior_flags, ParameterPolicy, PolicyPass};
use crate::resolution::supports_exclusive_mode;
use crate::types::{BehaviorFlags, DeviceType, NativePtr, PresentParams, Status, WindowHandle};
use crate::window::WindowControl;

/// Application-facing stand-in for a native factory.
pub struct FactoryWrapper<F> {
    native: F,
}

impl<F: NativeFactory> FactoryWrapper<F> {
    pub fn native(&self) -> &F {
        &self.native
    }

    pub fn native_ptr(&self) -> NativePtr {
        self.native.native_ptr()
    }
}

/// Application-facing stand-in for a native device.
pub struct DeviceWrapper<F: NativeFactory> {
    native: F::Device,
    factory: Arc<FactoryWrapper<F>>,
    key: DeviceKey,
    adapter: u32,
}

impl<F: NativeFactory> DeviceWrapper<F> {
    pub fn native_ptr(&self) -> NativePtr {
        self.native.native_ptr()
    }

    /// The factory the device was created from.
    pub fn factory(&self) -> &Arc<FactoryWrapper<F>> {
        &self.factory
    }

    pub fn key(&self) -> DeviceKey {
        self.key
    }
}

/// Arguments of an intercepted `CreateDevice` / `CreateDeviceEx`.
pub struct CreateRequest<'a> {
    pub adapter: u32,
    pub device_type: DeviceType,
    pub focus_window: WindowHandle,
    pub behavior_flags: BehaviorFlags,
    /// `None` when the application passed a null parameter block.
    pub params: Option<&'a mut PresentParams>,
    pub entry: CreateEntry,
    /// Address of the application's device out-pointer, 0 when null.
    pub return_slot: usize,
}

pub struct Interceptor<F: NativeFactory, W> {
    config: Config,
    windows: W,
    factories: IdentityTable<FactoryWrapper<F>>,
    devices: IdentityTable<DeviceWrapper<F>>,
    geometry: GeometryStore,
}

impl<F: NativeFactory, W: WindowControl> Interceptor<F, W> {
    pub fn new(config: Config, windows: W) -> Self {
        Self {
            config,
            windows,
            factories: IdentityTable::new(),
            devices: IdentityTable::new(),
            geometry: GeometryStore::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn windows(&self) -> &W {
        &self.windows
    }

    pub fn geometry(&self) -> &GeometryStore {
        &self.geometry
    }

    /// Returns the wrapper of `native`, creating it on first sight.
    pub fn wrap_factory(&self, native: F) -> Arc<FactoryWrapper<F>> {
        let ptr = native.native_ptr();
        self.factories.find_or_insert_with(ptr, move || FactoryWrapper { native })
    }

    pub fn find_factory(&self, native: NativePtr) -> Option<Arc<FactoryWrapper<F>>> {
        self.factories.find(native)
    }

    pub fn find_device(&self, native: NativePtr) -> Option<Arc<DeviceWrapper<F>>> {
        self.devices.find(native)
    }

    /// Forgets the factory wrapper of `native` once the native reference count hit zero.
    /// Returns the wrapper so the caller can drop the reference it handed out.
    pub fn release_factory(&self, native: NativePtr, remaining: u32) -> Option<Arc<FactoryWrapper<F>>> {
        if remaining != 0 {
            return None;
        }
        let wrapper = self.factories.find(native)?;
        self.factories.delete(&wrapper);
        log::debug!("Factory {:#x} released", native.0);
        Some(wrapper)
    }

    /// Device counterpart of [`Interceptor::release_factory`].
    pub fn release_device(&self, native: NativePtr, remaining: u32) -> Option<Arc<DeviceWrapper<F>>> {
        if remaining != 0 {
            return None;
        }
        let wrapper = self.devices.find(native)?;
        self.devices.delete(&wrapper);
        log::debug!("Device {:#x} released", native.0);
        Some(wrapper)
    }

    /// Windowed flag to report for the application's own capability checks.
    pub fn capability_windowed(&self, windowed: bool) -> bool {
        capability_windowed(&self.config, windowed)
    }

    /// Creates a device on behalf of the application.
    ///
    /// On success the caller's parameter block holds the parameters the device was actually
    /// created with. On failure it is left as passed and the native status is returned.
    pub fn create_device(
        &self,
        factory: &Arc<FactoryWrapper<F>>,
        request: CreateRequest<'_>,
    ) -> Result<Arc<DeviceWrapper<F>>, Status> {
        let CreateRequest { adapter, device_type, focus_window, behavior_flags, params, entry, return_slot } =
            request;
        let Some(caller_params) = params.filter(|_| return_slot != 0) else {
            log::warn!("CreateDevice called with null parameters or device slot");
            return Err(Status::INVALID_CALL);
        };

        let config = &self.config;
        let call = NativeCreate {
            adapter,
            device_type,
            focus_window,
            behavior_flags: normalize_behavior_flags(config, behavior_flags),
            entry,
        };

        let original = *caller_params;
        let force_exclusive = supports_exclusive_mode(
            config,
            factory.native(),
            adapter,
            original.back_buffer_width,
            original.back_buffer_height,
        );

        let policy = ParameterPolicy::new(config, &self.windows);
        let mut geometry = DeviceGeometry::default();
        let mut params = original;
        policy.apply(&mut params, focus_window, &mut geometry, PolicyPass { force_exclusive, adjust_window: true });

        let multisampled = if config.anti_aliasing != 0 {
            create_multisampled(factory.native(), &call, &params, config.anti_aliasing)
        } else {
            None
        };

        let (native, params, multisample) = match multisampled {
            Some(created) => (created.device, created.params, Some(created.setting)),
            None => {
                if config.anti_aliasing != 0 {
                    // Multisample edits are discarded, the policy is re-run without resizing.
                    params = original;
                    policy.apply(
                        &mut params,
                        focus_window,
                        &mut geometry,
                        PolicyPass { force_exclusive, adjust_window: false },
                    );
                }
                match factory.native().create_device(&call.for_params(&params), &mut params) {
                    Ok(device) => (device, params, None),
                    Err(status) => {
                        log::error!(
                            "CreateDevice failed with {}: adapter {}, {:?}, focus {:?}, {:?}, {:#?}",
                            status,
                            adapter,
                            device_type,
                            focus_window,
                            call.behavior_flags,
                            params
                        );
                        return Err(status);
                    }
                }
            }
        };

        *caller_params = params;
        record_multisample(&mut geometry, multisample);

        let key = DeviceKey { return_slot, device: native.native_ptr(), window: geometry.window };
        self.geometry.insert(key, geometry);

        let wrapper = Arc::new(DeviceWrapper { native, factory: Arc::clone(factory), key, adapter });
        self.devices.save(&wrapper, key.device);

        log::info!(
            "Created device {:#x}: {}x{}, windowed {}, multisample {}",
            key.device.0,
            params.back_buffer_width,
            params.back_buffer_height,
            params.windowed,
            params.multisample_type
        );
        Ok(wrapper)
    }

    /// Resets `device` with the policy and the negotiated multisampling re-applied.
    ///
    /// A failing multisampled reset is retried once without multisampling.
    pub fn reset_device(&self, device: &DeviceWrapper<F>, params: Option<&mut PresentParams>) -> Result<(), Status> {
        let Some(caller_params) = params else {
            return Err(Status::INVALID_CALL);
        };

        let config = &self.config;
        let original = *caller_params;
        let force_exclusive = supports_exclusive_mode(
            config,
            device.factory.native(),
            device.adapter,
            original.back_buffer_width,
            original.back_buffer_height,
        );

        let policy = ParameterPolicy::new(config, &self.windows);
        let mut geometry = self.geometry.get(&device.key).unwrap_or_default();
        let mut params = original;
        policy.apply(&mut params, WindowHandle::NULL, &mut geometry, PolicyPass { force_exclusive, adjust_window: true });

        let mut multisample = geometry.multisample_enabled.then_some(MultisampleSetting {
            samples: geometry.multisample_type,
            quality: geometry.multisample_quality,
        });
        if let Some(setting) = multisample {
            apply_multisample(&mut params, setting);
        }

        let mut result = device.native.reset(&mut params);
        if let (Err(status), Some(_)) = (result, multisample) {
            log::warn!("Multisampled Reset failed with {}, retrying without multisampling", status);
            params = original;
            policy.apply(
                &mut params,
                WindowHandle::NULL,
                &mut geometry,
                PolicyPass { force_exclusive, adjust_window: false },
            );
            multisample = None;
            result = device.native.reset(&mut params);
        }

        if let Err(status) = result {
            log::error!("Reset failed with {}: {:#?}", status, params);
            return Err(status);
        }

        *caller_params = params;
        record_multisample(&mut geometry, multisample);
        self.geometry.insert(device.key, geometry);
        Ok(())
    }
}

fn record_multisample(geometry: &mut DeviceGeometry, setting: Option<MultisampleSetting>) {
    let setting = setting.unwrap_or(MultisampleSetting { samples: 0, quality: 0 });
    geometry.multisample_enabled = setting.samples != 0;
    geometry.multisample_type = setting.samples;
    geometry.multisample_quality = setting.quality;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeFactory, FakeWindow, FakeWindows};
    use crate::types::{DisplayModeEx, Format, Rect, SwapEffect, PRESENT_INTERVAL_IMMEDIATE, PRESENT_INTERVAL_ONE};

    const GAME: WindowHandle = WindowHandle(0x100);
    const SLOT: usize = 0x7FF0_1000;

    fn interceptor(config: Config) -> Interceptor<FakeFactory, FakeWindows> {
        let windows = FakeWindows::new(Rect::sized(1920, 1080));
        windows.add(GAME, FakeWindow::visible(Rect::sized(1280, 720)));
        Interceptor::new(config, windows)
    }

    fn windowed(width: u32, height: u32) -> PresentParams {
        PresentParams {
            back_buffer_width: width,
            back_buffer_height: height,
            back_buffer_count: 1,
            swap_effect: SwapEffect::DISCARD,
            device_window: GAME,
            windowed: true,
            ..Default::default()
        }
    }

    fn request(params: &mut PresentParams) -> CreateRequest<'_> {
        CreateRequest {
            adapter: 0,
            device_type: DeviceType::HAL,
            focus_window: GAME,
            behavior_flags: BehaviorFlags::HARDWARE_VERTEXPROCESSING,
            params: Some(params),
            entry: CreateEntry::CreateDevice,
            return_slot: SLOT,
        }
    }

    #[test]
    fn anti_aliasing_settles_on_first_working_sample_count() {
        let interceptor = interceptor(Config { anti_aliasing: 4, ..Default::default() });
        let factory = interceptor.wrap_factory(FakeFactory::new());
        let native = factory.native();
        native.set_quality_levels(&[(4, 1), (2, 1), (1, 1)]);
        native.fail_creation_with(4, Status::NOT_AVAILABLE);

        let mut params = windowed(1920, 1080);
        let device = interceptor.create_device(&factory, request(&mut params)).unwrap();

        assert_eq!(native.attempted_samples(), vec![4, 2]);
        assert_eq!(params.multisample_type, 2);
        assert!(params.enable_auto_depth_stencil);
        assert!(native.device(0).antialias_enabled);

        let geometry = interceptor.geometry().get(&device.key()).unwrap();
        assert!(geometry.multisample_enabled);
        assert_eq!(geometry.multisample_type, 2);
        assert_eq!(geometry.window, GAME);
        assert_eq!((geometry.buffer_width, geometry.buffer_height), (1920, 1080));
    }

    #[test]
    fn without_anti_aliasing_one_plain_creation_is_made() {
        let interceptor = interceptor(Config::default());
        let factory = interceptor.wrap_factory(FakeFactory::new());

        let mut params = windowed(1280, 720);
        interceptor.create_device(&factory, request(&mut params)).unwrap();

        let native = factory.native();
        assert_eq!(native.attempted_samples(), vec![0]);
        assert!(native.checks().is_empty());
        assert_eq!(params, windowed(1280, 720));
    }

    #[test]
    fn null_arguments_are_rejected_before_any_work() {
        let interceptor = interceptor(Config { anti_aliasing: 4, ..Default::default() });
        let factory = interceptor.wrap_factory(FakeFactory::new());

        let mut unused = windowed(800, 600);
        let no_params = CreateRequest { params: None, ..request(&mut unused) };
        assert_eq!(interceptor.create_device(&factory, no_params).err(), Some(Status::INVALID_CALL));

        let mut params = windowed(800, 600);
        let no_slot = CreateRequest { return_slot: 0, ..request(&mut params) };
        assert_eq!(interceptor.create_device(&factory, no_slot).err(), Some(Status::INVALID_CALL));

        assert!(interceptor.geometry().is_empty());
        assert!(factory.native().created().is_empty());
        assert!(interceptor.windows().calls().is_empty());
        assert_eq!(params, windowed(800, 600));
    }

    #[test]
    fn listed_resolution_is_forced_exclusive() {
        let interceptor = interceptor(Config { force_exclusive_fullscreen: true, ..Default::default() });
        let factory = interceptor.wrap_factory(FakeFactory::with_modes(&[(1280, 720), (1920, 1080)]));

        let mut params = windowed(1920, 1080);
        interceptor.create_device(&factory, request(&mut params)).unwrap();

        assert!(!params.windowed);
        assert_eq!(params.refresh_rate, 60);
        assert_eq!(params.back_buffer_format, Format::X8R8G8B8);
    }

    #[test]
    fn unlisted_resolution_stays_windowed() {
        let interceptor = interceptor(Config { force_exclusive_fullscreen: true, ..Default::default() });
        let factory = interceptor.wrap_factory(FakeFactory::with_modes(&[(1280, 720)]));

        let mut params = windowed(1920, 1080);
        interceptor.create_device(&factory, request(&mut params)).unwrap();

        assert!(params.windowed);
        assert_eq!(params.refresh_rate, 0);
    }

    #[test]
    fn native_failure_is_returned_without_committing() {
        let interceptor = interceptor(Config::default());
        let factory = interceptor.wrap_factory(FakeFactory::new());
        factory.native().fail_creation_with(0, Status::DEVICE_LOST);

        let mut params = windowed(1280, 720);
        let result = interceptor.create_device(&factory, request(&mut params));

        assert_eq!(result.err(), Some(Status::DEVICE_LOST));
        assert_eq!(params, windowed(1280, 720));
        assert!(interceptor.geometry().is_empty());
        assert!(interceptor.find_device(NativePtr(0xD000)).is_none());
    }

    #[test]
    fn exhausted_anti_aliasing_falls_back_to_policy_only_parameters() {
        let config = Config { anti_aliasing: 2, enable_vsync: true, ..Default::default() };
        let interceptor = interceptor(config);
        let factory = interceptor.wrap_factory(FakeFactory::new());
        let native = factory.native();
        native.set_quality_levels(&[(2, 1), (1, 1)]);
        native.fail_creation_with(2, Status::NOT_AVAILABLE);
        native.fail_creation_with(1, Status::NOT_AVAILABLE);

        let mut params = PresentParams { presentation_interval: PRESENT_INTERVAL_IMMEDIATE, ..windowed(1280, 720) };
        let device = interceptor.create_device(&factory, request(&mut params)).unwrap();

        assert_eq!(native.attempted_samples(), vec![2, 1, 0]);
        assert_eq!(params.multisample_type, 0);
        assert!(!params.enable_auto_depth_stencil);
        assert_eq!(params.presentation_interval, PRESENT_INTERVAL_ONE);
        assert!(!interceptor.geometry().get(&device.key()).unwrap().multisample_enabled);
        assert!(!native.device(0).antialias_enabled);
    }

    #[test]
    fn fallback_pass_does_not_resize_twice() {
        let config = Config { anti_aliasing: 2, enable_window_mode: true, ..Default::default() };
        let interceptor = interceptor(config);
        let factory = interceptor.wrap_factory(FakeFactory::new());

        let mut params = windowed(1024, 768);
        interceptor.create_device(&factory, request(&mut params)).unwrap();

        let placements = interceptor
            .windows()
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::SetPlacement(..)))
            .count();
        assert_eq!(placements, 1);
        assert_eq!(interceptor.windows().client_size(GAME), (1024, 768));
    }

    #[test]
    fn behavior_flags_reach_the_native_call_normalized() {
        let interceptor = interceptor(Config { force_mixed_vertex_processing: true, ..Default::default() });
        let factory = interceptor.wrap_factory(FakeFactory::new());

        let mut params = windowed(800, 600);
        let flags = BehaviorFlags::PUREDEVICE | BehaviorFlags::HARDWARE_VERTEXPROCESSING;
        let req = CreateRequest { behavior_flags: flags, ..request(&mut params) };
        interceptor.create_device(&factory, req).unwrap();

        assert_eq!(factory.native().native_calls()[0].behavior_flags, BehaviorFlags::MIXED_VERTEXPROCESSING);
    }

    #[test]
    fn wrappers_are_stable_per_native_object() {
        let interceptor = interceptor(Config::default());
        let first = interceptor.wrap_factory(FakeFactory::new());
        let again = interceptor.wrap_factory(FakeFactory::new());
        let other = interceptor.wrap_factory(FakeFactory::at(NativePtr(0xE000)));

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));

        let device = interceptor.create_device(&first, request(&mut windowed(800, 600))).unwrap();
        let found = interceptor.find_device(device.native_ptr()).unwrap();
        assert!(Arc::ptr_eq(&device, &found));
        assert!(Arc::ptr_eq(device.factory(), &first));
        assert_eq!(device.key().return_slot, SLOT);
        assert_eq!(device.key().window, GAME);
    }

    #[test]
    fn release_to_zero_forgets_the_wrapper() {
        let interceptor = interceptor(Config::default());
        let factory = interceptor.wrap_factory(FakeFactory::new());
        let device = interceptor.create_device(&factory, request(&mut windowed(800, 600))).unwrap();
        let ptr = device.native_ptr();

        assert!(interceptor.release_device(ptr, 1).is_none());
        assert!(interceptor.find_device(ptr).is_some());

        let released = interceptor.release_device(ptr, 0).unwrap();
        assert!(Arc::ptr_eq(&released, &device));
        assert!(interceptor.find_device(ptr).is_none());

        let factory_ptr = factory.native_ptr();
        assert!(interceptor.release_factory(factory_ptr, 0).is_some());
        assert!(interceptor.find_factory(factory_ptr).is_none());
    }

    #[test]
    fn reset_reapplies_policy_and_multisampling() {
        let config = Config { anti_aliasing: 4, enable_vsync: true, ..Default::default() };
        let interceptor = interceptor(config);
        let factory = interceptor.wrap_factory(FakeFactory::new());
        factory.native().set_quality_levels(&[(4, 3)]);
        let device = interceptor.create_device(&factory, request(&mut windowed(1280, 720))).unwrap();

        let mut params = PresentParams { presentation_interval: PRESENT_INTERVAL_IMMEDIATE, ..windowed(1280, 720) };
        interceptor.reset_device(&device, Some(&mut params)).unwrap();

        let resets = factory.native().device(0).resets;
        assert_eq!(resets.len(), 1);
        assert_eq!(resets[0].multisample_type, 4);
        assert_eq!(resets[0].multisample_quality, 2);
        assert_eq!(params.presentation_interval, PRESENT_INTERVAL_ONE);
        assert_eq!(params.multisample_type, 4);
    }

    #[test]
    fn failing_multisampled_reset_retries_plain_and_forgets_multisampling() {
        let interceptor = interceptor(Config { anti_aliasing: 2, ..Default::default() });
        let factory = interceptor.wrap_factory(FakeFactory::new());
        factory.native().set_quality_levels(&[(2, 1)]);
        let device = interceptor.create_device(&factory, request(&mut windowed(1280, 720))).unwrap();
        factory.native().fail_reset_with(2, Status::DEVICE_LOST);

        let mut params = windowed(1280, 720);
        interceptor.reset_device(&device, Some(&mut params)).unwrap();

        let samples: Vec<u32> = factory.native().device(0).resets.iter().map(|p| p.multisample_type).collect();
        assert_eq!(samples, vec![2, 0]);
        assert_eq!(params.multisample_type, 0);
        assert!(!interceptor.geometry().get(&device.key()).unwrap().multisample_enabled);

        // The next reset goes straight to the plain path.
        interceptor.reset_device(&device, Some(&mut windowed(1280, 720))).unwrap();
        assert_eq!(factory.native().device(0).resets.len(), 3);
        assert_eq!(factory.native().device(0).resets[2].multisample_type, 0);
    }

    #[test]
    fn failed_reset_keeps_caller_parameters() {
        let interceptor = interceptor(Config::default());
        let factory = interceptor.wrap_factory(FakeFactory::new());
        let device = interceptor.create_device(&factory, request(&mut windowed(800, 600))).unwrap();
        factory.native().fail_reset_with(0, Status::DEVICE_LOST);

        let mut params = windowed(1024, 768);
        assert_eq!(interceptor.reset_device(&device, Some(&mut params)), Err(Status::DEVICE_LOST));
        assert_eq!(params, windowed(1024, 768));
        assert_eq!(interceptor.reset_device(&device, None), Err(Status::INVALID_CALL));
    }

    #[test]
    fn reset_reevaluates_exclusive_forcing() {
        let interceptor = interceptor(Config { force_exclusive_fullscreen: true, ..Default::default() });
        let factory = interceptor.wrap_factory(FakeFactory::with_modes(&[(1920, 1080)]));
        let mut created = windowed(1280, 720);
        let device = interceptor
            .create_device(&factory, CreateRequest { adapter: 1, ..request(&mut created) })
            .unwrap();
        assert!(created.windowed);

        let mut params = windowed(1920, 1080);
        interceptor.reset_device(&device, Some(&mut params)).unwrap();

        assert!(!params.windowed);
        assert_eq!(params.refresh_rate, 60);
        assert_eq!(params.back_buffer_format, Format::X8R8G8B8);
        let resets = factory.native().device(0).resets;
        assert!(!resets[0].windowed);

        let adapters = factory.native().queried_adapters();
        assert!(!adapters.is_empty());
        assert!(adapters.iter().all(|&adapter| adapter == 1));
    }

    fn create_ex(params: &mut PresentParams) -> CreateRequest<'_> {
        let mode = DisplayModeEx { width: 1920, height: 1080, refresh_rate: 60, ..Default::default() };
        CreateRequest { entry: CreateEntry::CreateDeviceEx { fullscreen_mode: Some(mode) }, ..request(params) }
    }

    fn display_modes_sent(factory: &FakeFactory) -> Vec<bool> {
        factory
            .native_calls()
            .iter()
            .map(|call| matches!(call.entry, CreateEntry::CreateDeviceEx { fullscreen_mode: Some(_) }))
            .collect()
    }

    #[test]
    fn create_device_ex_sends_display_mode_only_when_exclusive() {
        let interceptor = interceptor(Config { force_exclusive_fullscreen: true, ..Default::default() });
        let factory = interceptor.wrap_factory(FakeFactory::with_modes(&[(1920, 1080)]));

        let mut exclusive = windowed(1920, 1080);
        interceptor.create_device(&factory, create_ex(&mut exclusive)).unwrap();
        let mut windowed_params = windowed(1280, 720);
        let mut second = create_ex(&mut windowed_params);
        second.return_slot = SLOT + 8;
        interceptor.create_device(&factory, second).unwrap();

        assert!(!exclusive.windowed);
        assert!(windowed_params.windowed);
        assert_eq!(display_modes_sent(factory.native()), vec![true, false]);
    }

    #[test]
    fn create_device_ex_fallback_keeps_display_mode_rule() {
        let config = Config { anti_aliasing: 2, force_exclusive_fullscreen: true, ..Default::default() };
        let interceptor = interceptor(config);
        let factory = interceptor.wrap_factory(FakeFactory::with_modes(&[(1920, 1080)]));
        let native = factory.native();
        native.set_quality_levels(&[(2, 1), (1, 1)]);
        native.fail_creation_with(2, Status::NOT_AVAILABLE);
        native.fail_creation_with(1, Status::NOT_AVAILABLE);

        let mut exclusive = windowed(1920, 1080);
        interceptor.create_device(&factory, create_ex(&mut exclusive)).unwrap();
        assert_eq!(native.attempted_samples(), vec![2, 1, 0]);
        assert_eq!(display_modes_sent(native), vec![true, true, true]);

        let mut windowed_params = windowed(1280, 720);
        let mut second = create_ex(&mut windowed_params);
        second.return_slot = SLOT + 8;
        interceptor.create_device(&factory, second).unwrap();
        assert_eq!(native.attempted_samples(), vec![2, 1, 0, 2, 1, 0]);
        assert_eq!(display_modes_sent(native), vec![true, true, true, false, false, false]);
    }

    #[test]
    fn capability_checks_follow_window_mode() {
        let forced = interceptor(Config { enable_window_mode: true, ..Default::default() });
        assert!(forced.capability_windowed(false));
        assert!(!interceptor(Config::default()).capability_windowed(false));
    }
}
