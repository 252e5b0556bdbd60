// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Device lifecycle controller
//!
//! Drives the devices of a running machine through their lifecycle:
//!
//! 1. [`attach_machine`] binds every device to the run context.
//! 2. [`start_all`] allocates a zeroed token per device, resolves its memory
//!    region, then sweeps the list invoking start hooks until every device
//!    has started. A hook returns [`DeviceStart::MissingDependency`] while
//!    something it needs is not up yet; a sweep that starts nothing new means
//!    the remaining devices can never start.
//! 3. [`reset_all`] and [`stop_all`] are registered on the machine as its
//!    reset and exit callbacks, so the host decides when they run.
//!
//! Sweeps always walk the list in registration order. The list is only
//! borrowed immutably while a sweep runs, so devices cannot be added or
//! removed mid-sweep.

use super::info::{devinfo, DeviceFct, DeviceStart};
use super::Device;
use crate::core::error::{DeviceError, Result};
use crate::core::machine::MachineRef;
use log::{debug, error, info, trace, warn};

/// Largest token a device type may request
pub const MAX_TOKEN_BYTES: usize = 0x100_0000;

/// Bind every device to a running machine
///
/// Pure bookkeeping; nothing is allocated.
pub fn attach_machine(machine: &MachineRef) {
    for device in machine.devices() {
        device.bind_machine(machine);
    }
}

/// Allocate and start every device of a machine
///
/// Registers [`reset_all`] and [`stop_all`] as the machine's reset and exit
/// callbacks before doing anything else.
///
/// # Returns
///
/// Number of sweeps it took to start everything.
///
/// # Errors
///
/// - [`DeviceError::ZeroTokenSize`] if a type reports a 0 byte token; no
///   start hook has run when this is returned.
/// - [`DeviceError::TokenTooLarge`] if a type reports a negative token size
///   or one above [`MAX_TOKEN_BYTES`]. Nothing is allocated for it.
/// - [`DeviceError::CircularDependency`] if a sweep makes no progress.
///   Devices already started stay started.
///
/// # Panics
///
/// Panics if a device is already started or its type has no start hook.
pub fn start_all(machine: &MachineRef) -> Result<usize> {
    machine.add_reset_callback(reset_all);
    machine.add_exit_callback(stop_all);

    let devices = machine.devices();
    let total = devices.len();

    for device in devices {
        assert!(
            !device.is_started(),
            "device '{}' is already started",
            device.tag()
        );

        // Token size comes from the type: the device has no token to answer with yet
        let requested = device.device_type().get_info_int(devinfo::INT_TOKEN_BYTES);
        let token_bytes = match usize::try_from(requested) {
            Ok(0) => {
                let name = device.name();
                error!(
                    "Device {} ({}) specifies a 0 token length",
                    name,
                    device.tag()
                );
                return Err(DeviceError::ZeroTokenSize {
                    name,
                    tag: device.tag().to_string(),
                }
                .into());
            }
            Ok(bytes) if bytes <= MAX_TOKEN_BYTES => bytes,
            _ => {
                let name = device.name();
                error!(
                    "Device {} ({}) specifies an invalid {} byte token",
                    name,
                    device.tag(),
                    requested
                );
                return Err(DeviceError::TokenTooLarge {
                    name,
                    tag: device.tag().to_string(),
                    bytes: requested,
                }
                .into());
            }
        };

        device.bind_token(token_bytes);
        device.bind_machine(machine);
        device.bind_region(machine.memory_region(device.tag()));
        debug!(
            "Allocated {} token bytes for '{}' (region: {} bytes)",
            token_bytes,
            device.tag(),
            device.region_bytes()
        );
    }

    let mut started = 0;
    let mut sweeps = 0;
    while started < total {
        let previous = started;
        started = 0;
        sweeps += 1;

        for device in devices {
            if !device.is_started() {
                let start = device
                    .get_info_fct(devinfo::FCT_START)
                    .and_then(DeviceFct::as_start)
                    .unwrap_or_else(|| panic!("device '{}' has no start hook", device.tag()));

                match start(device) {
                    DeviceStart::Ok => {
                        trace!("Sweep {}: started '{}'", sweeps, device.tag());
                        device.mark_started();
                    }
                    DeviceStart::MissingDependency => {
                        trace!("Sweep {}: '{}' is waiting", sweeps, device.tag());
                    }
                }
            }
            started += usize::from(device.is_started());
        }

        if started == previous {
            error!(
                "Circular dependency in device startup; unable to start {}/{} devices",
                total - started,
                total
            );
            return Err(DeviceError::CircularDependency {
                unstarted: total - started,
                total,
            }
            .into());
        }
    }

    info!(
        "Started {} devices on '{}' in {} sweeps",
        total,
        machine.name(),
        sweeps
    );
    Ok(sweeps)
}

/// Reset every device in registration order
///
/// Devices without a reset hook are skipped.
pub fn reset_all(machine: &MachineRef) -> Result<()> {
    debug!("Resetting devices on '{}'", machine.name());
    for device in machine.devices() {
        device.reset();
    }
    Ok(())
}

/// Stop every device and release its live state
///
/// Each device's stop hook runs if it has one; afterwards the token is freed
/// and the run context and region are cleared whether or not a hook ran.
/// Devices are visited in registration order.
pub fn stop_all(machine: &MachineRef) -> Result<()> {
    debug!("Stopping devices on '{}'", machine.name());
    for device in machine.devices() {
        if device.has_token() {
            if let Some(stop) = device
                .get_info_fct(devinfo::FCT_STOP)
                .and_then(DeviceFct::as_stop)
            {
                trace!("Stopping '{}'", device.tag());
                stop(device);
            }
        }
        device.clear_live();
    }
    Ok(())
}

impl Device {
    /// Run this device's reset hook, if it has one
    pub fn reset(&self) {
        if !self.has_token() {
            warn!("Ignoring reset of '{}': it holds no token", self.tag());
            return;
        }
        if let Some(reset) = self
            .get_info_fct(devinfo::FCT_RESET)
            .and_then(DeviceFct::as_reset)
        {
            trace!("Resetting '{}'", self.tag());
            reset(self);
        }
    }
}
