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

//! Device management core for multi-component emulation
//!
//! This library lets independently implemented hardware models (CPUs,
//! video and sound chips, peripherals) be registered, queried and started as
//! one machine without the core knowing anything about a specific model.
//!
//! # Example
//!
//! ```
//! use devcore::core::machine::{MachineDescription, RunningMachine};
//!
//! let config = MachineDescription::default_board()?.into_config()?;
//! let machine = RunningMachine::start(config)?;
//!
//! // Host-driven reset and exit
//! machine.reset()?;
//! let _config = machine.exit()?;
//! # Ok::<(), devcore::core::error::EmulatorError>(())
//! ```

pub mod core;
