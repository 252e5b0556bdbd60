// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Machine descriptions
//!
//! A machine description is a TOML file listing the devices of a machine
//! and the memory regions they resolve by tag:
//!
//! ```toml
//! name = "usgames"
//!
//! [[device]]
//! type = "cpu"
//! tag = "maincpu"
//! clock = 2000000
//!
//! [[device]]
//! type = "video"
//! tag = "gfxdecode"
//! depends_on = ["maincpu", ".charram"]
//!
//! [[device]]
//! type = "memory"
//! tag = "charram"
//!
//! [[region]]
//! tag = "charram"
//! size = 0x800
//! ```
//!
//! A device with an `owner` is registered as `owner:tag`. A dependency
//! starting with `.` names a sibling: it is resolved against the device's
//! own tag, so `.charram` on `board:gfxdecode` means `board:charram`.

use super::MachineConfig;
use crate::core::device::generic::{self, GenericConfig};
use crate::core::device::tag::{build_tag, inherit_tag, leaf_of};
use crate::core::device::TypeFilter;
use crate::core::error::{EmulatorError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Description of the small arcade board the CLI runs by default
pub const DEFAULT_DESCRIPTION: &str = r#"
name = "usgames"

[[device]]
type = "cpu"
tag = "maincpu"
clock = 2000000

[[device]]
type = "video"
tag = "gfxdecode"
depends_on = ["maincpu", ".charram"]

[[device]]
type = "memory"
tag = "videoram"

[[device]]
type = "memory"
tag = "charram"

[[device]]
type = "video"
tag = "screen"
depends_on = [".gfxdecode", ".videoram"]

[[region]]
tag = "maincpu"
size = 0x80000

[[region]]
tag = "videoram"
size = 0x1000

[[region]]
tag = "charram"
size = 0x800
"#;

/// Parsed machine description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDescription {
    /// Machine name
    pub name: String,

    /// Devices, in registration order
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceDescription>,

    /// Memory regions resolved by tag
    #[serde(default, rename = "region")]
    pub regions: Vec<RegionDescription>,
}

/// One `[[device]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescription {
    /// Generic kind: cpu, video, sound or memory
    #[serde(rename = "type")]
    pub kind: String,

    /// Tag, relative to `owner` if one is given
    pub tag: String,

    /// Tag of an already declared device owning this one
    #[serde(default)]
    pub owner: Option<String>,

    /// Tags that must start first; `.leaf` names a sibling
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Clock for kinds with a clock in their inline configuration
    #[serde(default)]
    pub clock: Option<u32>,
}

/// One `[[region]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescription {
    /// Tag of the device the region belongs to
    pub tag: String,

    /// Size in bytes
    pub size: usize,
}

impl MachineDescription {
    /// Parse a description from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::Parse`] if the text is not a valid
    /// description.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EmulatorError::Parse(e.to_string()))
    }

    /// Read and parse a description file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading machine description from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// The built-in default board
    pub fn default_board() -> Result<Self> {
        Self::parse(DEFAULT_DESCRIPTION)
    }

    /// Register every described device and region
    ///
    /// # Errors
    ///
    /// - [`EmulatorError::InvalidConfig`] for an empty tag, an unknown owner
    ///   or a device that depends on itself
    /// - [`EmulatorError::UnknownDeviceType`] for an unknown kind
    /// - [`EmulatorError::Device`] for duplicate devices
    pub fn into_config(self) -> Result<MachineConfig> {
        let mut config = MachineConfig::new(&self.name);

        for entry in self.devices {
            if entry.tag.is_empty() {
                return Err(EmulatorError::InvalidConfig(format!(
                    "device of type '{}' has an empty tag",
                    entry.kind
                )));
            }

            let device_type = generic::lookup_type(&entry.kind)
                .ok_or_else(|| EmulatorError::UnknownDeviceType(entry.kind.clone()))?;

            let tag = match &entry.owner {
                Some(owner) => {
                    let owner_device = config
                        .devices()
                        .find_by_tag(TypeFilter::Wildcard, owner)
                        .ok_or_else(|| {
                            EmulatorError::InvalidConfig(format!(
                                "owner '{}' of '{}' is not declared before it",
                                owner, entry.tag
                            ))
                        })?;
                    build_tag(Some(owner_device), &entry.tag)
                }
                None => build_tag(None, &entry.tag),
            };

            let leaf = leaf_of(&tag);
            let mut depends_on = Vec::with_capacity(entry.depends_on.len());
            for dependency in &entry.depends_on {
                let resolved = match dependency.strip_prefix('.') {
                    Some(sibling) if sibling == leaf => None,
                    Some(sibling) => Some(inherit_tag(&tag, sibling)),
                    None if *dependency == tag => None,
                    None => Some(dependency.clone()),
                };
                let Some(resolved) = resolved else {
                    return Err(EmulatorError::InvalidConfig(format!(
                        "device '{}' depends on itself",
                        tag
                    )));
                };
                depends_on.push(resolved);
            }

            let device = config.devices_mut().add(device_type, &tag)?;
            device.set_static_config(GenericConfig { depends_on });
            if let Some(clock) = entry.clock {
                if !generic::set_clock(device, clock) {
                    return Err(EmulatorError::InvalidConfig(format!(
                        "device '{}' of type '{}' has no clock",
                        tag, entry.kind
                    )));
                }
            }
        }

        for region in self.regions {
            config.add_region(&region.tag, region.size);
        }

        Ok(config)
    }
}
