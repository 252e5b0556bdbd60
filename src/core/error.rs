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

/// Emulator error types
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Device configuration error: {0}")]
    Device(#[from] DeviceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("Invalid machine description: {0}")]
    InvalidConfig(String),

    #[error("Machine '{name}' is still referenced by {handles} other handle(s)")]
    MachineInUse { name: String, handles: usize },
}

impl EmulatorError {
    /// Whether this error is a misconfiguration that must terminate the run
    ///
    /// Only device errors are fatal; I/O and parse failures while reading a
    /// machine description happen before anything is registered.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EmulatorError::Device(_))
    }
}

/// Device configuration errors
///
/// Every variant describes a programming or configuration mistake in the
/// way devices were declared or wired together. None of them can be retried;
/// callers avoid them by checking existence before `add`/`remove` and by
/// declaring dependencies that can be satisfied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Attempted to add duplicate device: type={type_name} tag={tag}")]
    DuplicateDevice { type_name: String, tag: String },

    #[error("Attempted to remove non-existent device: type={type_name} tag={tag}")]
    DeviceNotFound { type_name: String, tag: String },

    #[error("Device {name} ({tag}) specifies a 0 token length")]
    ZeroTokenSize { name: String, tag: String },

    #[error("Device {name} ({tag}) specifies an invalid {bytes} byte token")]
    TokenTooLarge {
        name: String,
        tag: String,
        bytes: i64,
    },

    #[error("Circular dependency in device startup; unable to start {unstarted}/{total} devices")]
    CircularDependency { unstarted: usize, total: usize },

    #[error("Device '{tag}' has no token; it must be started before its info can be set")]
    NotStarted { tag: String },

    #[error("Device '{tag}' does not provide a set-info hook")]
    NoSetInfo { tag: String },
}

impl DeviceError {
    /// Device errors are always fatal
    pub fn is_fatal(&self) -> bool {
        true
    }
}
