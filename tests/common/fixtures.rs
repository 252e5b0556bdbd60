// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Test fixtures for common test scenarios

use devcore::core::device::{
    devinfo, Device, DeviceClass, DeviceFct, DeviceInfo, DeviceInterface, DeviceStart,
};
use devcore::core::machine::{MachineConfig, MachineDescription};
use std::io::Write;
use tempfile::NamedTempFile;

/// A device kind defined outside the crate: a blitter that needs a screen
pub struct Blitter;

pub static BLITTER: Blitter = Blitter;

fn blitter_start(device: &Device) -> DeviceStart {
    let Some(machine) = device.machine() else {
        return DeviceStart::MissingDependency;
    };
    match machine.devices().class_first(DeviceClass::Video) {
        Some(screen) if screen.is_started() => DeviceStart::Ok,
        _ => DeviceStart::MissingDependency,
    }
}

impl DeviceInterface for Blitter {
    fn type_info(&self, state: u32, info: &mut DeviceInfo) {
        match state {
            devinfo::INT_TOKEN_BYTES => info.set_int(32),
            devinfo::INT_CLASS => info.set_int(DeviceClass::Peripheral.into()),
            devinfo::FCT_START => info.set_fct(DeviceFct::Start(blitter_start)),
            devinfo::STR_NAME => info.set_str("Blitter"),
            devinfo::STR_FAMILY => info.set_str("Test"),
            _ => {}
        }
    }
}

/// Configuration of the built-in board
#[allow(dead_code)]
pub fn default_config() -> MachineConfig {
    MachineDescription::default_board()
        .expect("built-in board parses")
        .into_config()
        .expect("built-in board is valid")
}

/// Write a machine description to a temporary `.toml` file
#[allow(dead_code)]
pub fn description_file(text: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("machine")
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(text.as_bytes())
        .expect("Failed to write description");
    file.flush().expect("Failed to flush description");
    file
}
