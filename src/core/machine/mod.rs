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

//! Running machine
//!
//! The device core only needs three things from its host: the device list
//! being run, memory regions looked up by tag, and somewhere to register
//! reset and exit callbacks. The [`Machine`] trait captures exactly that.
//! [`RunningMachine`] is the reference host used by the CLI and the tests.
//!
//! # Example
//!
//! ```
//! use devcore::core::device::generic::GENERIC_CPU;
//! use devcore::core::device::DeviceInterface;
//! use devcore::core::machine::{MachineConfig, RunningMachine};
//!
//! let mut config = MachineConfig::new("demo");
//! config.devices_mut().add(GENERIC_CPU.device_type(), "maincpu").unwrap();
//! config.add_region("maincpu", 0x4000);
//!
//! let machine = RunningMachine::start(config).unwrap();
//! machine.reset().unwrap();
//! let config = machine.exit().unwrap();
//! assert!(!config.devices().first(GENERIC_CPU.device_type()).unwrap().is_started());
//! ```

pub mod config;

pub use config::MachineDescription;

use crate::core::device::{
    attach_machine, devinfo, start_all, DeviceClass, DeviceList, TempStringPool,
};
use crate::core::error::{EmulatorError, Result};
use log::{debug, info};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared memory region
pub type RegionRef = Rc<RefCell<Vec<u8>>>;

/// Handle to a running machine, as seen by devices
pub type MachineRef = Rc<dyn Machine>;

/// Reset or exit callback
pub type MachineCallback = fn(&MachineRef) -> Result<()>;

/// Host services available to devices while a machine runs
pub trait Machine {
    /// Name of the machine, for diagnostics
    fn name(&self) -> &str;

    /// Devices of this machine
    fn devices(&self) -> &DeviceList;

    /// Memory region registered under `tag`, if any
    fn memory_region(&self, tag: &str) -> Option<RegionRef>;

    /// Register a callback to run on every machine reset
    fn add_reset_callback(&self, callback: MachineCallback);

    /// Register a callback to run when the machine exits
    fn add_exit_callback(&self, callback: MachineCallback);
}

/// Machine configuration: the device list and declared memory regions
#[derive(Debug, Default)]
pub struct MachineConfig {
    name: String,
    devices: DeviceList,
    /// (tag, size) pairs in declaration order
    regions: Vec<(String, usize)>,
}

impl MachineConfig {
    /// Create an empty configuration
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            devices: DeviceList::new(),
            regions: Vec::new(),
        }
    }

    /// Name of the machine
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Devices declared so far
    pub fn devices(&self) -> &DeviceList {
        &self.devices
    }

    /// Device list, for adding and removing devices
    pub fn devices_mut(&mut self) -> &mut DeviceList {
        &mut self.devices
    }

    /// Declare a zero-filled memory region
    ///
    /// Declaring the same tag again replaces the earlier size.
    pub fn add_region(&mut self, tag: &str, size: usize) {
        let existing = self.regions.iter_mut().find(|(name, _)| name == tag);
        match existing {
            Some(region) => region.1 = size,
            None => self.regions.push((tag.to_string(), size)),
        }
    }

    /// Declared regions as (tag, size)
    pub fn regions(&self) -> &[(String, usize)] {
        &self.regions
    }
}

/// Reference host for a single run of a machine configuration
pub struct RunningMachine {
    config: MachineConfig,
    regions: HashMap<String, RegionRef>,
    reset_callbacks: RefCell<Vec<MachineCallback>>,
    exit_callbacks: RefCell<Vec<MachineCallback>>,
}

impl RunningMachine {
    /// Allocate regions for a configuration without starting devices
    pub fn new(config: MachineConfig) -> Rc<Self> {
        let regions = config
            .regions
            .iter()
            .map(|(tag, size)| {
                (tag.clone(), Rc::new(RefCell::new(vec![0u8; *size])))
            })
            .collect();

        Rc::new(Self {
            config,
            regions,
            reset_callbacks: RefCell::new(Vec::new()),
            exit_callbacks: RefCell::new(Vec::new()),
        })
    }

    /// Build a machine, attach its devices and start them
    ///
    /// # Errors
    ///
    /// Returns the fatal device error if startup fails.
    pub fn start(config: MachineConfig) -> Result<Rc<Self>> {
        let machine = Self::new(config);
        let handle: MachineRef = machine.clone();

        info!(
            "Starting machine '{}' with {} devices",
            machine.config.name(),
            machine.config.devices().len()
        );
        attach_machine(&handle);
        start_all(&handle)?;
        Ok(machine)
    }

    /// Run every reset callback in registration order
    pub fn reset(self: &Rc<Self>) -> Result<()> {
        let handle: MachineRef = self.clone();
        let callbacks = self.reset_callbacks.borrow().clone();
        debug!("Machine reset: {} callbacks", callbacks.len());
        for callback in callbacks {
            callback(&handle)?;
        }
        Ok(())
    }

    /// Run every exit callback and hand the configuration back
    ///
    /// The returned configuration still holds every device record, so it can
    /// be started again.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::MachineInUse`] if another handle to this
    /// machine is still alive.
    pub fn exit(self: Rc<Self>) -> Result<MachineConfig> {
        {
            let handle: MachineRef = self.clone();
            let callbacks = std::mem::take(&mut *self.exit_callbacks.borrow_mut());
            debug!("Machine exit: {} callbacks", callbacks.len());
            for callback in callbacks {
                callback(&handle)?;
            }
            self.reset_callbacks.borrow_mut().clear();
        }

        match Rc::try_unwrap(self) {
            Ok(machine) => {
                info!("Machine '{}' exited", machine.config.name());
                Ok(machine.config)
            }
            Err(machine) => Err(EmulatorError::MachineInUse {
                name: machine.config.name().to_string(),
                handles: Rc::strong_count(&machine) - 1,
            }),
        }
    }

    /// Configuration this machine runs
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Snapshot of every device for reporting
    pub fn summarize(&self) -> Vec<DeviceSummary> {
        let mut pool = TempStringPool::new();
        self.config
            .devices()
            .iter()
            .map(|device| DeviceSummary {
                tag: device.tag().to_string(),
                name: device
                    .get_info_string(&mut pool, devinfo::STR_NAME)
                    .to_string(),
                family: device
                    .get_info_string(&mut pool, devinfo::STR_FAMILY)
                    .to_string(),
                class: device.class(),
                started: device.is_started(),
                token_bytes: device.token_bytes(),
                region_bytes: device.region_bytes(),
            })
            .collect()
    }
}

impl Machine for RunningMachine {
    fn name(&self) -> &str {
        self.config.name()
    }

    fn devices(&self) -> &DeviceList {
        self.config.devices()
    }

    fn memory_region(&self, tag: &str) -> Option<RegionRef> {
        self.regions.get(tag).cloned()
    }

    fn add_reset_callback(&self, callback: MachineCallback) {
        self.reset_callbacks.borrow_mut().push(callback);
    }

    fn add_exit_callback(&self, callback: MachineCallback) {
        self.exit_callbacks.borrow_mut().push(callback);
    }
}

/// Per-device report produced by [`RunningMachine::summarize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub tag: String,
    pub name: String,
    pub family: String,
    pub class: DeviceClass,
    pub started: bool,
    pub token_bytes: usize,
    pub region_bytes: usize,
}
