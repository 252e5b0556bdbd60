// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Mock device kinds shared by the device tests

use super::super::*;
use crate::core::machine::{MachineConfig, RunningMachine};
use std::cell::Cell;

thread_local! {
    static START_CALLS: Cell<usize> = const { Cell::new(0) };
    static STOP_CALLS: Cell<usize> = const { Cell::new(0) };
    static RESET_CALLS: Cell<usize> = const { Cell::new(0) };
}

pub fn start_calls() -> usize {
    START_CALLS.with(Cell::get)
}

pub fn stop_calls() -> usize {
    STOP_CALLS.with(Cell::get)
}

pub fn reset_calls() -> usize {
    RESET_CALLS.with(Cell::get)
}

fn bump(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    counter.with(|c| c.set(c.get() + 1));
}

/// Device-specific integer backed by the first 8 token bytes
pub const INT_TEST_VALUE: u32 = devinfo::INT_DEVICE_SPECIFIC;
/// Device-specific callback slot; the token records whether one is set
pub const FCT_TEST_CALLBACK: u32 = devinfo::FCT_DEVICE_SPECIFIC;
/// Device-specific string: the device's tag
pub const STR_TEST_TAG: u32 = devinfo::STR_DEVICE_SPECIFIC;

// ========== TestCpu: full set of hooks ==========

pub struct TestCpu;
pub static TEST_CPU: TestCpu = TestCpu;

fn cpu_start(_device: &Device) -> DeviceStart {
    bump(&START_CALLS);
    DeviceStart::Ok
}

fn cpu_stop(_device: &Device) {
    bump(&STOP_CALLS);
}

fn cpu_reset(_device: &Device) {
    bump(&RESET_CALLS);
}

fn cpu_set_info(device: &Device, state: u32, info: &DeviceInfo) {
    let Some(mut token) = device.token_mut() else {
        return;
    };
    match state {
        INT_TEST_VALUE => token[..8].copy_from_slice(&info.int().to_le_bytes()),
        FCT_TEST_CALLBACK => token[8] = u8::from(info.fct().is_some()),
        _ => {}
    }
}

impl DeviceInterface for TestCpu {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(16),
            devinfo::INT_INLINE_CONFIG_BYTES => info.set_int(4),
            devinfo::INT_CLASS => info.set_int(DeviceClass::CpuChip.into()),
            devinfo::FCT_SET_INFO => info.set_fct(DeviceFct::SetInfo(cpu_set_info)),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(cpu_start)),
            devinfo::FCT_STOP => info.set_fct(DeviceFct::Stop(cpu_stop)),
            devinfo::FCT_RESET => info.set_fct(DeviceFct::Reset(cpu_reset)),
            devinfo::STR_NAME => info.set_str("Test CPU"),
            devinfo::STR_FAMILY => info.set_str("Test"),
            _ => {}
        }
    }

    fn device_info(&self, device: &Device, state: u32, info: &mut DeviceInfo) {
        match state {
            INT_TEST_VALUE => {
                if let Some(token) = device.token() {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(&token[..8]);
                    info.set_int(i64::from_le_bytes(bytes));
                }
            }
            FCT_TEST_CALLBACK => {
                if device.token().is_some_and(|token| token[8] != 0) {
                    info.set_fct(DeviceFct::Callback(|_, _| {}));
                }
            }
            STR_TEST_TAG => info.set_str(device.tag()),
            _ => self.type_info(state, info),
        }
    }
}

// ========== TestSound: start hook only ==========

pub struct TestSound;
pub static TEST_SOUND: TestSound = TestSound;

fn sound_start(_device: &Device) -> DeviceStart {
    bump(&START_CALLS);
    DeviceStart::Ok
}

impl DeviceInterface for TestSound {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(4),
            devinfo::INT_CLASS => info.set_int(DeviceClass::SoundChip.into()),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(sound_start)),
            devinfo::STR_NAME => info.set_str("Test Sound"),
            _ => {}
        }
    }
}

// ========== ChainDevice: starts once its requirements are started ==========

/// Static configuration of a [`ChainDevice`]
pub struct Requires(pub Vec<String>);

pub struct ChainDevice;
pub static CHAIN_DEVICE: ChainDevice = ChainDevice;

fn chain_start(device: &Device) -> DeviceStart {
    bump(&START_CALLS);
    let Some(Requires(tags)) = device.static_config::<Requires>() else {
        return DeviceStart::Ok;
    };
    let Some(machine) = device.machine() else {
        return DeviceStart::MissingDependency;
    };
    let ready = tags.iter().all(|tag| {
        machine
            .devices()
            .find_by_tag(DEVICE_TYPE_WILDCARD, tag)
            .is_some_and(Device::is_started)
    });
    if ready {
        DeviceStart::Ok
    } else {
        DeviceStart::MissingDependency
    }
}

impl DeviceInterface for ChainDevice {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(4),
            devinfo::INT_CLASS => info.set_int(DeviceClass::Other.into()),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(chain_start)),
            devinfo::STR_NAME => info.set_str("Chain"),
            _ => {}
        }
    }
}

// ========== ZeroToken: misconfigured token size ==========

pub struct ZeroToken;
pub static ZERO_TOKEN: ZeroToken = ZeroToken;

impl DeviceInterface for ZeroToken {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(0),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(sound_start)),
            devinfo::STR_NAME => info.set_str("Zero Token"),
            _ => {}
        }
    }
}

// ========== HugeToken: token size no allocation could satisfy ==========

pub struct HugeToken;
pub static HUGE_TOKEN: HugeToken = HugeToken;

impl DeviceInterface for HugeToken {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(i64::MAX),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(sound_start)),
            devinfo::STR_NAME => info.set_str("Huge Token"),
            _ => {}
        }
    }
}

// ========== NoStart: missing mandatory start hook ==========

pub struct NoStart;
pub static NO_START: NoStart = NoStart;

impl DeviceInterface for NoStart {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        if state == devinfo::INT_TOKEN_BYTES {
            info.set_int(4);
        }
    }
}

// ========== Builders ==========

pub fn cpu() -> DeviceType {
    TEST_CPU.device_type()
}

pub fn sound() -> DeviceType {
    TEST_SOUND.device_type()
}

pub fn chain() -> DeviceType {
    CHAIN_DEVICE.device_type()
}

/// Add a chain device requiring `requires`
pub fn add_chain(config: &mut MachineConfig, tag: &str, requires: &[&str]) {
    config
        .devices_mut()
        .add(chain(), tag)
        .unwrap()
        .set_static_config(Requires(
            requires.iter().map(|tag| tag.to_string()).collect(),
        ));
}

/// A started machine with one CPU and one sound device
pub fn started_machine() -> std::rc::Rc<RunningMachine> {
    let mut config = MachineConfig::new("test");
    config.devices_mut().add(cpu(), "maincpu").unwrap();
    config.devices_mut().add(sound(), "ym").unwrap();
    config.add_region("maincpu", 0x100);
    RunningMachine::start(config).unwrap()
}

#[test]
fn test_mock_types_are_distinct() {
    assert_ne!(cpu(), sound());
    assert_ne!(cpu(), chain());
    assert_eq!(cpu(), DeviceType::of(&TEST_CPU));
}
