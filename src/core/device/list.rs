// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Device registry
//!
//! The list keeps devices in registration order and an index of positions
//! per device type. All lookups and positional indices follow registration
//! order, filtered by type (or any type, with [`DEVICE_TYPE_WILDCARD`]) or
//! by class.
//!
//! # Example
//!
//! ```
//! use devcore::core::device::generic::{GENERIC_CPU, GENERIC_SOUND};
//! use devcore::core::device::{DeviceInterface, DeviceList, DEVICE_TYPE_WILDCARD};
//!
//! let mut devices = DeviceList::new();
//! devices.add(GENERIC_CPU.device_type(), "maincpu").unwrap();
//! devices.add(GENERIC_SOUND.device_type(), "ym").unwrap();
//! devices.add(GENERIC_CPU.device_type(), "audiocpu").unwrap();
//!
//! assert_eq!(devices.count(DEVICE_TYPE_WILDCARD), 3);
//! assert_eq!(devices.index_of(GENERIC_CPU.device_type(), "audiocpu"), Some(1));
//! ```
//!
//! [`DEVICE_TYPE_WILDCARD`]: super::DEVICE_TYPE_WILDCARD

use super::{Device, DeviceClass, DeviceType, TypeFilter};
use crate::core::error::DeviceError;
use log::{debug, error};
use std::collections::HashMap;

/// Ordered collection of registered devices
#[derive(Debug, Default)]
pub struct DeviceList {
    /// Devices in registration order
    devices: Vec<Device>,
    /// Positions in `devices` per type, ascending
    by_type: HashMap<DeviceType, Vec<usize>>,
}

impl DeviceList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new device at the end of the list
    ///
    /// The inline configuration is sized from the type and zeroed. The
    /// returned reference can be used to fill in configuration before the
    /// machine starts.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DuplicateDevice`] if a device with the same
    /// type and tag is already registered.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is empty.
    pub fn add(&mut self, device_type: DeviceType, tag: &str) -> Result<&mut Device, DeviceError> {
        assert!(!tag.is_empty(), "device tags must not be empty");

        if self.find_by_tag(device_type, tag).is_some() {
            let type_name = device_type.name();
            error!(
                "Attempted to add duplicate device: type={} tag={}",
                type_name, tag
            );
            return Err(DeviceError::DuplicateDevice {
                type_name,
                tag: tag.to_string(),
            });
        }

        let device = Device::new(device_type, tag);
        debug!(
            "Adding device '{}' ({}, {:?}, {} inline config bytes)",
            tag,
            device.name(),
            device.class(),
            device.inline_config().len()
        );

        let position = self.devices.len();
        self.devices.push(device);
        self.by_type.entry(device_type).or_default().push(position);
        Ok(&mut self.devices[position])
    }

    /// Remove a device and release its storage
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DeviceNotFound`] if no device with this type
    /// and tag is registered.
    pub fn remove(&mut self, device_type: DeviceType, tag: &str) -> Result<(), DeviceError> {
        let Some(position) = self.position(device_type.into(), tag) else {
            let type_name = device_type.name();
            error!(
                "Attempted to remove non-existent device: type={} tag={}",
                type_name, tag
            );
            return Err(DeviceError::DeviceNotFound {
                type_name,
                tag: tag.to_string(),
            });
        };

        debug!("Removing device '{}' ({})", tag, device_type.name());
        self.devices.remove(position);
        self.rebuild_type_index();
        Ok(())
    }

    /// Number of registered devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Is the list empty
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// All devices in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.devices.iter()
    }

    /// Devices passing a type filter, in registration order
    pub fn iter_type(&self, filter: impl Into<TypeFilter>) -> impl Iterator<Item = &Device> + '_ {
        let filter = filter.into();
        self.devices
            .iter()
            .filter(move |device| filter.matches(device.device_type()))
    }

    /// Devices of a class, in registration order
    pub fn iter_class(&self, class: DeviceClass) -> impl Iterator<Item = &Device> + '_ {
        self.devices
            .iter()
            .filter(move |device| device.class() == class)
    }

    // ========== Type-based access ==========

    /// Number of devices passing a type filter
    pub fn count(&self, filter: impl Into<TypeFilter>) -> usize {
        match filter.into() {
            TypeFilter::Wildcard => self.devices.len(),
            TypeFilter::Type(device_type) => self.by_type.get(&device_type).map_or(0, Vec::len),
        }
    }

    /// First device passing a type filter
    pub fn first(&self, filter: impl Into<TypeFilter>) -> Option<&Device> {
        match filter.into() {
            TypeFilter::Wildcard => self.devices.first(),
            TypeFilter::Type(device_type) => self
                .by_type
                .get(&device_type)
                .and_then(|positions| positions.first())
                .map(|&position| &self.devices[position]),
        }
    }

    /// Device after `previous` passing a type filter
    ///
    /// Returns `None` at the end of the list or if `previous` is not in this
    /// list.
    pub fn next(&self, previous: &Device, filter: impl Into<TypeFilter>) -> Option<&Device> {
        let start = self.position_of(previous)? + 1;
        match filter.into() {
            TypeFilter::Wildcard => self.devices.get(start),
            TypeFilter::Type(device_type) => {
                let positions = self.by_type.get(&device_type)?;
                let slot = positions.partition_point(|&position| position < start);
                positions.get(slot).map(|&position| &self.devices[position])
            }
        }
    }

    /// First device passing a type filter with this exact tag
    pub fn find_by_tag(&self, filter: impl Into<TypeFilter>, tag: &str) -> Option<&Device> {
        self.position(filter.into(), tag)
            .map(|position| &self.devices[position])
    }

    /// Mutable access to a registered device, for configuration
    pub fn find_by_tag_mut(
        &mut self,
        filter: impl Into<TypeFilter>,
        tag: &str,
    ) -> Option<&mut Device> {
        let position = self.position(filter.into(), tag)?;
        Some(&mut self.devices[position])
    }

    /// Index of a tagged device among devices passing a type filter
    pub fn index_of(&self, filter: impl Into<TypeFilter>, tag: &str) -> Option<usize> {
        self.iter_type(filter)
            .position(|device| device.tag() == tag)
    }

    /// Device at `index` among devices passing a type filter
    pub fn find_by_index(&self, filter: impl Into<TypeFilter>, index: usize) -> Option<&Device> {
        match filter.into() {
            TypeFilter::Wildcard => self.devices.get(index),
            TypeFilter::Type(device_type) => self
                .by_type
                .get(&device_type)
                .and_then(|positions| positions.get(index))
                .map(|&position| &self.devices[position]),
        }
    }

    // ========== Class-based access ==========

    /// Number of devices of a class
    pub fn class_count(&self, class: DeviceClass) -> usize {
        self.iter_class(class).count()
    }

    /// First device of a class
    pub fn class_first(&self, class: DeviceClass) -> Option<&Device> {
        self.iter_class(class).next()
    }

    /// Device after `previous` with the given class
    pub fn class_next(&self, previous: &Device, class: DeviceClass) -> Option<&Device> {
        let start = self.position_of(previous)? + 1;
        self.devices[start..]
            .iter()
            .find(|device| device.class() == class)
    }

    /// First device of a class with this exact tag
    pub fn class_find_by_tag(&self, class: DeviceClass, tag: &str) -> Option<&Device> {
        self.iter_class(class).find(|device| device.tag() == tag)
    }

    /// Index of a tagged device among devices of a class
    pub fn class_index_of(&self, class: DeviceClass, tag: &str) -> Option<usize> {
        self.iter_class(class)
            .position(|device| device.tag() == tag)
    }

    /// Device at `index` among devices of a class
    pub fn class_find_by_index(&self, class: DeviceClass, index: usize) -> Option<&Device> {
        self.iter_class(class).nth(index)
    }

    // ========== Internals ==========

    fn position(&self, filter: TypeFilter, tag: &str) -> Option<usize> {
        match filter {
            TypeFilter::Wildcard => self.devices.iter().position(|device| device.tag() == tag),
            TypeFilter::Type(device_type) => self
                .by_type
                .get(&device_type)?
                .iter()
                .copied()
                .find(|&position| self.devices[position].tag() == tag),
        }
    }

    fn position_of(&self, device: &Device) -> Option<usize> {
        self.devices
            .iter()
            .position(|candidate| std::ptr::eq(candidate, device))
    }

    fn rebuild_type_index(&mut self) {
        self.by_type.clear();
        for (position, device) in self.devices.iter().enumerate() {
            self.by_type
                .entry(device.device_type())
                .or_default()
                .push(position);
        }
    }
}

impl<'a> IntoIterator for &'a DeviceList {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
