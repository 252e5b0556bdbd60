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

//! Core components
//!
//! This module contains the device management core:
//! - Device interface, info queries and tag namespace
//! - Device registry
//! - Lifecycle controller (start, reset, stop)
//! - Running machine host and machine descriptions

pub mod device;
pub mod error;
pub mod machine;

// Re-export commonly used types
pub use device::{Device, DeviceClass, DeviceList, DeviceType, DEVICE_TYPE_WILDCARD};
pub use error::{DeviceError, EmulatorError, Result};
pub use machine::{Machine, MachineConfig, MachineDescription, RunningMachine};
