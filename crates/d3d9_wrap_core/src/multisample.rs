//! Anti-aliasing negotiation: walk sample counts downwards and keep the first one the driver
//! both accepts and manages to create a device with.

use crate::native::{NativeCreate, NativeDevice, NativeFactory};
use crate::types::{Format, PresentFlags, PresentParams, Status, SwapEffect, MAX_MULTISAMPLE_SAMPLES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultisampleSetting {
    pub samples: u32,
    pub quality: u32,
}

/// Sample counts to try for a configured anti-aliasing level, highest first.
pub fn candidates(anti_aliasing: u32) -> impl Iterator<Item = u32> {
    (1..=anti_aliasing.min(MAX_MULTISAMPLE_SAMPLES)).rev()
}

/// First-fit search over `candidates`.
///
/// `validate` returns the quality-level count of a sample count, or `None` to skip it.
/// `attempt` is called at most once per validated candidate; the first `Ok` ends the search.
/// On exhaustion the status of the last failed attempt is returned, if any attempt was made.
pub fn negotiate<T>(
    candidates: impl IntoIterator<Item = u32>,
    mut validate: impl FnMut(u32) -> Option<u32>,
    mut attempt: impl FnMut(MultisampleSetting) -> Result<T, Status>,
) -> Result<(T, MultisampleSetting), Option<Status>> {
    let mut last_failure = None;
    for samples in candidates {
        let Some(levels) = validate(samples) else {
            continue;
        };
        let setting = MultisampleSetting { samples, quality: levels.saturating_sub(1) };
        match attempt(setting) {
            Ok(value) => return Ok((value, setting)),
            Err(status) => {
                log::debug!("Device creation with {} samples failed: {}", samples, status);
                last_failure = Some(status);
            }
        }
    }
    Err(last_failure)
}

/// Rewrites `params` for a multisampled swap chain.
pub fn apply_multisample(params: &mut PresentParams, setting: MultisampleSetting) {
    params.multisample_type = setting.samples;
    params.multisample_quality = setting.quality;

    params.flags.remove(PresentFlags::LOCKABLE_BACKBUFFER);
    params.swap_effect = SwapEffect::DISCARD;

    if !params.enable_auto_depth_stencil {
        params.enable_auto_depth_stencil = true;
        params.auto_depth_stencil_format = Format::D24S8;
    }

    if params.back_buffer_count == 0 {
        params.back_buffer_count = 1;
    }
}

/// Device created by [`create_multisampled`] together with the parameters it was created with.
pub struct Multisampled<D> {
    pub device: D,
    pub params: PresentParams,
    pub setting: MultisampleSetting,
}

/// Tries to create a multisampled device from the policy-adjusted `base` parameters.
///
/// Each candidate starts from a fresh copy of `base`. Returns `None` when no candidate works;
/// the caller then creates a plain device.
pub fn create_multisampled<F: NativeFactory + ?Sized>(
    factory: &F,
    call: &NativeCreate,
    base: &PresentParams,
    anti_aliasing: u32,
) -> Option<Multisampled<F::Device>> {
    let buffer_format = base.back_buffer_format.or_default_32bit();
    let stencil_format = base.auto_depth_stencil_format.or_default_32bit();

    let validate = |samples: u32| {
        let check = |format: Format| {
            factory
                .check_multisample(call.adapter, call.device_type, format, base.windowed, samples)
                .ok()
        };
        Some(check(buffer_format)?.min(check(stencil_format)?))
    };

    let attempt = |setting: MultisampleSetting| {
        let mut params = *base;
        apply_multisample(&mut params, setting);
        let device = factory.create_device(&call.for_params(&params), &mut params)?;
        Ok((device, params))
    };

    match negotiate(candidates(anti_aliasing), validate, attempt) {
        Ok(((device, params), setting)) => {
            if let Err(status) = device.enable_multisample_antialias() {
                log::warn!("Could not enable D3DRS_MULTISAMPLEANTIALIAS: {}", status);
            }
            log::info!("Setting MultiSample {} Quality {}", setting.samples, setting.quality);
            Some(Multisampled { device, params, setting })
        }
        Err(last_failure) => {
            log::warn!("Failed to enable AntiAliasing (last error: {:?})", last_failure);
            None
        }
    }
}
