// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Generic device kinds
//!
//! Placeholder kinds used to assemble a machine from a description file
//! before real hardware models exist. They hold no emulation logic: each one
//! reports a class and a token size, waits in its start hook until the
//! devices named in its [`GenericConfig`] are running, counts resets in its
//! token and accepts one settable integer.
//!
//! Token layout (little endian):
//!
//! ```text
//! Offset | Size | Field
//! -------|------|-------------------------
//! 0x00   | 8    | value (INT_GENERIC_VALUE)
//! 0x08   | 4    | reset count
//! 0x0C   | 4    | reserved
//! ```

use super::info::{devinfo, DeviceFct, DeviceInfo, DeviceStart};
use super::{Device, DeviceClass, DeviceInterface, DeviceType, TypeFilter};
use log::{trace, warn};
use std::rc::Rc;

/// Settable integer stored in the token
pub const INT_GENERIC_VALUE: u32 = devinfo::INT_DEVICE_SPECIFIC;
/// Number of resets since start
pub const INT_GENERIC_RESETS: u32 = devinfo::INT_DEVICE_SPECIFIC + 1;
/// Clock from the inline configuration (CPU and sound kinds)
pub const INT_GENERIC_CLOCK: u32 = devinfo::INT_DEVICE_SPECIFIC + 2;
/// The device's memory region (memory kind), as `RefCell<Vec<u8>>`
pub const PTR_GENERIC_SHARED_REGION: u32 = devinfo::PTR_DEVICE_SPECIFIC;

/// Token size of every generic kind
pub const GENERIC_TOKEN_BYTES: usize = 16;

/// Inline configuration size of clocked kinds
pub const GENERIC_CLOCK_CONFIG_BYTES: usize = 4;

const VALUE_OFFSET: usize = 0x00;
const RESETS_OFFSET: usize = 0x08;

/// Static configuration of a generic device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericConfig {
    /// Tags that must be started before this device starts
    pub depends_on: Vec<String>,
}

/// Generic CPU core
pub struct GenericCpu;
/// Generic video stage
pub struct GenericVideo;
/// Generic sound chip
pub struct GenericSound;
/// Generic memory block sharing its region with other devices
pub struct GenericMemory;

pub static GENERIC_CPU: GenericCpu = GenericCpu;
pub static GENERIC_VIDEO: GenericVideo = GenericVideo;
pub static GENERIC_SOUND: GenericSound = GenericSound;
pub static GENERIC_MEMORY: GenericMemory = GenericMemory;

/// Look up a generic kind by its description name
///
/// Accepted names: `cpu`, `video`, `sound`, `memory`.
pub fn lookup_type(kind: &str) -> Option<DeviceType> {
    match kind {
        "cpu" => Some(GENERIC_CPU.device_type()),
        "video" => Some(GENERIC_VIDEO.device_type()),
        "sound" => Some(GENERIC_SOUND.device_type()),
        "memory" => Some(GENERIC_MEMORY.device_type()),
        _ => None,
    }
}

/// Store a clock in a device's inline configuration
///
/// Returns `false` if the device kind has no room for a clock.
pub fn set_clock(device: &mut Device, clock: u32) -> bool {
    let config = device.inline_config_mut();
    if config.len() < GENERIC_CLOCK_CONFIG_BYTES {
        return false;
    }
    config[..GENERIC_CLOCK_CONFIG_BYTES].copy_from_slice(&clock.to_le_bytes());
    true
}

struct Descriptor {
    name: &'static str,
    class: DeviceClass,
    inline_config_bytes: usize,
}

fn describe(descriptor: &Descriptor, state: u32, info: &mut DeviceInfo) {
    match state {
        devinfo::INT_TOKEN_BYTES => info.set_int(GENERIC_TOKEN_BYTES as i64),
        devinfo::INT_INLINE_CONFIG_BYTES => info.set_int(descriptor.inline_config_bytes as i64),
        devinfo::INT_CLASS => info.set_int(descriptor.class.into()),

        devinfo::FCT_SET_INFO => info.set_fct(DeviceFct::SetInfo(generic_set_info)),
        devinfo::FCT_START => info.set_fct(DeviceFct::Start(generic_start)),
        devinfo::FCT_STOP => info.set_fct(DeviceFct::Stop(generic_stop)),
        devinfo::FCT_RESET => info.set_fct(DeviceFct::Reset(generic_reset)),

        devinfo::STR_NAME => info.set_str(descriptor.name),
        devinfo::STR_FAMILY => info.set_str("Generic"),
        devinfo::STR_VERSION => info.set_str("1.0"),
        devinfo::STR_SOURCE_FILE => info.set_str(file!()),
        devinfo::STR_CREDITS => info.set_str("Copyright 2025 itsakeyfut"),
        _ => {}
    }
}

fn describe_device(descriptor: &Descriptor, device: &Device, state: u32, info: &mut DeviceInfo) {
    match state {
        INT_GENERIC_VALUE => info.set_int(read_i64(device, VALUE_OFFSET)),
        INT_GENERIC_RESETS => info.set_int(i64::from(read_u32(device, RESETS_OFFSET))),
        INT_GENERIC_CLOCK => {
            let config = device.inline_config();
            if config.len() >= GENERIC_CLOCK_CONFIG_BYTES {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&config[..GENERIC_CLOCK_CONFIG_BYTES]);
                info.set_int(i64::from(u32::from_le_bytes(bytes)));
            }
        }
        _ => describe(descriptor, state, info),
    }
}

const CPU: Descriptor = Descriptor {
    name: "Generic CPU",
    class: DeviceClass::CpuChip,
    inline_config_bytes: GENERIC_CLOCK_CONFIG_BYTES,
};

const VIDEO: Descriptor = Descriptor {
    name: "Generic Video",
    class: DeviceClass::Video,
    inline_config_bytes: 0,
};

const SOUND: Descriptor = Descriptor {
    name: "Generic Sound",
    class: DeviceClass::SoundChip,
    inline_config_bytes: GENERIC_CLOCK_CONFIG_BYTES,
};

const MEMORY: Descriptor = Descriptor {
    name: "Generic Memory",
    class: DeviceClass::Peripheral,
    inline_config_bytes: 0,
};

impl DeviceInterface for GenericCpu {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        describe(&CPU, state, info);
    }

    fn device_info(&self, device: &Device, state: u32, info: &mut DeviceInfo) {
        describe_device(&CPU, device, state, info);
    }
}

impl DeviceInterface for GenericVideo {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        describe(&VIDEO, state, info);
    }

    fn device_info(&self, device: &Device, state: u32, info: &mut DeviceInfo) {
        describe_device(&VIDEO, device, state, info);
    }
}

impl DeviceInterface for GenericSound {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        describe(&SOUND, state, info);
    }

    fn device_info(&self, device: &Device, state: u32, info: &mut DeviceInfo) {
        describe_device(&SOUND, device, state, info);
    }
}

impl DeviceInterface for GenericMemory {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        describe(&MEMORY, state, info);
    }

    fn device_info(&self, device: &Device, state: u32, info: &mut DeviceInfo) {
        match state {
            PTR_GENERIC_SHARED_REGION => {
                if let Some(region) = device.region() {
                    let shared: Rc<dyn std::any::Any> = region;
                    info.set_ptr(shared);
                }
            }
            _ => describe_device(&MEMORY, device, state, info),
        }
    }
}

// ========== Hooks ==========

fn generic_start(device: &Device) -> DeviceStart {
    let Some(config) = device.static_config::<GenericConfig>() else {
        return DeviceStart::Ok;
    };
    if config.depends_on.is_empty() {
        return DeviceStart::Ok;
    }

    let Some(machine) = device.machine() else {
        warn!("'{}' has dependencies but no machine", device.tag());
        return DeviceStart::MissingDependency;
    };

    for dependency in &config.depends_on {
        match machine
            .devices()
            .find_by_tag(TypeFilter::Wildcard, dependency)
        {
            Some(provider) if provider.is_started() => {}
            Some(_) => {
                trace!("'{}' waits for '{}'", device.tag(), dependency);
                return DeviceStart::MissingDependency;
            }
            None => {
                warn!(
                    "'{}' depends on '{}', which is not registered",
                    device.tag(),
                    dependency
                );
                return DeviceStart::MissingDependency;
            }
        }
    }
    DeviceStart::Ok
}

fn generic_stop(device: &Device) {
    trace!(
        "'{}' stopped after {} resets",
        device.tag(),
        read_u32(device, RESETS_OFFSET)
    );
}

fn generic_reset(device: &Device) {
    let resets = read_u32(device, RESETS_OFFSET).wrapping_add(1);
    if let Some(mut token) = device.token_mut() {
        token[RESETS_OFFSET..RESETS_OFFSET + 4].copy_from_slice(&resets.to_le_bytes());
    }
}

fn generic_set_info(device: &Device, state: u32, info: &DeviceInfo) {
    if state == INT_GENERIC_VALUE {
        if let Some(mut token) = device.token_mut() {
            token[VALUE_OFFSET..VALUE_OFFSET + 8].copy_from_slice(&info.int().to_le_bytes());
        }
    }
}

fn read_u32(device: &Device, offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    if let Some(token) = device.token() {
        bytes.copy_from_slice(&token[offset..offset + 4]);
    }
    u32::from_le_bytes(bytes)
}

fn read_i64(device: &Device, offset: usize) -> i64 {
    let mut bytes = [0u8; 8];
    if let Some(token) = device.token() {
        bytes.copy_from_slice(&token[offset..offset + 8]);
    }
    i64::from_le_bytes(bytes)
}
