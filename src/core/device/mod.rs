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

//! Device interface
//!
//! This module defines how independently implemented hardware models are
//! described to the rest of the emulator. A model never exposes its concrete
//! type; it implements [`DeviceInterface`], a stateless dispatcher that
//! answers numbered info requests, and the core only ever talks to it through
//! that dispatcher.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 DeviceList                    │
//! ├───────────────────────────────────────────────┤
//! │  devices: Vec<Device>     (registration order)│
//! │  by_type: DeviceType -> [index, ...]          │
//! └───────────────────────────────────────────────┘
//!          │ each Device holds
//!          ▼
//! ┌──────────────────┐   type_info / device_info   ┌──────────────────┐
//! │ Device           │ ──────────────────────────▶ │ DeviceInterface  │
//! │  tag, class      │                             │ (one per kind)   │
//! │  inline config   │ ◀── start / stop / reset ── │                  │
//! │  token (live)    │                             └──────────────────┘
//! └──────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! - **Registered**: created by [`DeviceList::add`] during configuration
//! - **Bound**: a running machine is attached, no token yet
//! - **Started**: a zeroed token is allocated and the start hook succeeded
//! - **Stopped**: token released and live fields cleared; the record stays in
//!   the list and can be bound again by the next run
//!
//! # Example
//!
//! ```
//! use devcore::core::device::{
//!     devinfo, DeviceClass, DeviceFct, DeviceInfo, DeviceInterface, DeviceList, DeviceStart,
//!     DeviceType, Device,
//! };
//!
//! struct Latch;
//!
//! fn latch_start(_device: &Device) -> DeviceStart {
//!     DeviceStart::Ok
//! }
//!
//! impl DeviceInterface for Latch {
//!     fn type_info(&self, state: u32, info: &mut DeviceInfo) {
//!         match state {
//!             devinfo::INT_TOKEN_BYTES => info.set_int(1),
//!             devinfo::INT_CLASS => info.set_int(DeviceClass::Peripheral.into()),
//!             devinfo::FCT_START => info.set_fct(DeviceFct::Start(latch_start)),
//!             devinfo::STR_NAME => info.set_str("Latch"),
//!             _ => {}
//!         }
//!     }
//! }
//!
//! static LATCH: Latch = Latch;
//!
//! let mut devices = DeviceList::new();
//! devices.add(DeviceType::of(&LATCH), "latch").unwrap();
//! assert_eq!(devices.class_count(DeviceClass::Peripheral), 1);
//! ```

pub mod generic;
pub mod info;
pub mod lifecycle;
pub mod list;
pub mod string_pool;
pub mod tag;

#[cfg(test)]
mod tests;

pub use info::{
    devinfo, DeviceCallbackFn, DeviceFct, DeviceInfo, DeviceResetFn, DeviceSetInfoFn,
    DeviceStart, DeviceStartFn, DeviceStopFn, SharedPtr,
};
pub use lifecycle::{attach_machine, reset_all, start_all, stop_all};
pub use list::DeviceList;
pub use string_pool::TempStringPool;
pub use tag::{build_tag, inherit_tag};

use crate::core::machine::{MachineRef, RegionRef};
use std::any::{Any, TypeId};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

/// Dispatcher for one kind of device
///
/// Implementations are stateless; all per-instance state lives in the
/// device's token. A kind answers two sorts of query:
///
/// - **type queries** through [`DeviceInterface::type_info`], used before any
///   instance exists (token size, inline config size, class, hooks, names).
///   These must never depend on live state.
/// - **device queries** through [`DeviceInterface::device_info`], used on a
///   bound or started device. The default forwards to `type_info`.
///
/// Unknown request codes leave the slot untouched, so the caller sees the
/// family default (0, no pointer, no function, empty string).
pub trait DeviceInterface: 'static {
    /// Answer a type-level info request
    fn type_info(&self, state: u32, info: &mut DeviceInfo);

    /// Answer an info request about a specific device
    fn device_info(&self, device: &Device, state: u32, info: &mut DeviceInfo) {
        let _ = device;
        self.type_info(state, info);
    }

    /// Device type backed by this dispatcher
    fn device_type(&'static self) -> DeviceType
    where
        Self: Sized,
    {
        DeviceType::of(self)
    }
}

/// Identity and dispatcher of a device kind
///
/// Two `DeviceType`s are equal when they wrap the same implementing Rust
/// type.
#[derive(Clone, Copy)]
pub struct DeviceType {
    id: TypeId,
    interface: &'static dyn DeviceInterface,
}

impl DeviceType {
    /// Device type for a static dispatcher
    pub fn of<T: DeviceInterface>(interface: &'static T) -> Self {
        Self {
            id: TypeId::of::<T>(),
            interface,
        }
    }

    /// The dispatcher behind this type
    pub fn interface(&self) -> &'static dyn DeviceInterface {
        self.interface
    }

    /// Name reported by the type, for diagnostics
    pub fn name(&self) -> String {
        let mut info = DeviceInfo::Str(String::new());
        self.interface.type_info(devinfo::STR_NAME, &mut info);
        match info {
            DeviceInfo::Str(name) if !name.is_empty() => name,
            _ => "<unnamed device>".to_string(),
        }
    }

    /// Class reported by the type
    pub fn class(&self) -> DeviceClass {
        DeviceClass::from(self.get_info_int(devinfo::INT_CLASS))
    }
}

impl PartialEq for DeviceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DeviceType {}

impl Hash for DeviceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceType").field(&self.name()).finish()
    }
}

/// Type selector for registry lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    /// Match devices of any type
    Wildcard,
    /// Match devices of exactly this type
    Type(DeviceType),
}

/// Matches every device type in lookups and counts
pub const DEVICE_TYPE_WILDCARD: TypeFilter = TypeFilter::Wildcard;

impl TypeFilter {
    /// Does a device of `device_type` pass this filter
    pub fn matches(&self, device_type: DeviceType) -> bool {
        match self {
            TypeFilter::Wildcard => true,
            TypeFilter::Type(wanted) => *wanted == device_type,
        }
    }
}

impl From<DeviceType> for TypeFilter {
    fn from(device_type: DeviceType) -> Self {
        TypeFilter::Type(device_type)
    }
}

/// Coarse device category, independent of the exact type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// No particular category
    General,
    /// Input, storage and other peripherals
    Peripheral,
    /// Audio output stage
    Audio,
    /// Video output stage
    Video,
    /// CPU core
    CpuChip,
    /// Sound generator
    SoundChip,
    /// Timer/counter chip
    Timer,
    /// Anything else
    Other,
}

impl From<i64> for DeviceClass {
    fn from(value: i64) -> Self {
        match value {
            0 => DeviceClass::General,
            1 => DeviceClass::Peripheral,
            2 => DeviceClass::Audio,
            3 => DeviceClass::Video,
            4 => DeviceClass::CpuChip,
            5 => DeviceClass::SoundChip,
            6 => DeviceClass::Timer,
            _ => DeviceClass::Other,
        }
    }
}

impl From<DeviceClass> for i64 {
    fn from(class: DeviceClass) -> Self {
        match class {
            DeviceClass::General => 0,
            DeviceClass::Peripheral => 1,
            DeviceClass::Audio => 2,
            DeviceClass::Video => 3,
            DeviceClass::CpuChip => 4,
            DeviceClass::SoundChip => 5,
            DeviceClass::Timer => 6,
            DeviceClass::Other => 7,
        }
    }
}

/// A registered device
///
/// The configuration part (type, class, tag, static and inline config) is
/// fixed once the device is added. The live part (started flag, token, run
/// context, memory region) is filled in by the lifecycle controller and
/// cleared again when the run ends. Live fields use interior mutability so a
/// start sweep can run against a shared `&DeviceList` while start hooks look
/// up other devices in the same list.
pub struct Device {
    /// Kind of this device
    device_type: DeviceType,
    /// Class, cached from the type at registration
    class: DeviceClass,
    /// Unique tag within its type
    tag: String,
    /// Type-specific static configuration
    static_config: Option<Rc<dyn Any>>,
    /// Inline configuration bytes, zeroed at registration
    inline_config: Vec<u8>,
    /// Set-info hook, fetched from the type at registration
    set_info: Option<DeviceSetInfoFn>,

    /// Start hook reported success
    started: Cell<bool>,
    /// Private runtime state
    token: RefCell<Option<Box<[u8]>>>,
    /// Size of the token in bytes
    token_bytes: Cell<usize>,
    /// Run context this device is bound to
    machine: RefCell<Option<Weak<dyn crate::core::machine::Machine>>>,
    /// Memory region resolved by tag
    region: RefCell<Option<RegionRef>>,
    /// Length of the resolved region
    region_bytes: Cell<usize>,
}

impl Device {
    /// Create a registered (not yet bound) device
    pub(crate) fn new(device_type: DeviceType, tag: &str) -> Self {
        let config_bytes = device_type.get_info_int(devinfo::INT_INLINE_CONFIG_BYTES);
        let config_len = usize::try_from(config_bytes).unwrap_or(0);
        let set_info = device_type
            .get_info_fct(devinfo::FCT_SET_INFO)
            .and_then(DeviceFct::as_set_info);

        Self {
            device_type,
            class: device_type.class(),
            tag: tag.to_string(),
            static_config: None,
            inline_config: vec![0; config_len],
            set_info,
            started: Cell::new(false),
            token: RefCell::new(None),
            token_bytes: Cell::new(0),
            machine: RefCell::new(None),
            region: RefCell::new(None),
            region_bytes: Cell::new(0),
        }
    }

    /// Type of this device
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Class of this device
    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Tag of this device
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Name reported by the device type
    pub fn name(&self) -> String {
        self.device_type.name()
    }

    /// Static configuration, if it was set with type `T`
    pub fn static_config<T: Any>(&self) -> Option<&T> {
        self.static_config.as_deref()?.downcast_ref::<T>()
    }

    /// Attach static configuration
    pub fn set_static_config<T: Any>(&mut self, config: T) {
        self.static_config = Some(Rc::new(config));
    }

    /// Share an existing static configuration blob
    pub fn set_static_config_shared(&mut self, config: Rc<dyn Any>) {
        self.static_config = Some(config);
    }

    /// Inline configuration bytes
    pub fn inline_config(&self) -> &[u8] {
        &self.inline_config
    }

    /// Mutable inline configuration bytes
    pub fn inline_config_mut(&mut self) -> &mut [u8] {
        &mut self.inline_config
    }

    /// Has the start hook succeeded for the current run
    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Does this device currently hold a token
    pub fn has_token(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Borrow the token, if allocated
    ///
    /// # Panics
    ///
    /// Panics if the token is already mutably borrowed.
    pub fn token(&self) -> Option<Ref<'_, [u8]>> {
        Ref::filter_map(self.token.borrow(), |token| token.as_deref()).ok()
    }

    /// Mutably borrow the token, if allocated
    ///
    /// # Panics
    ///
    /// Panics if the token is already borrowed.
    pub fn token_mut(&self) -> Option<RefMut<'_, [u8]>> {
        RefMut::filter_map(self.token.borrow_mut(), |token| token.as_deref_mut()).ok()
    }

    /// Size of the token in bytes (0 when unbound)
    pub fn token_bytes(&self) -> usize {
        self.token_bytes.get()
    }

    /// Running machine this device is bound to
    pub fn machine(&self) -> Option<MachineRef> {
        self.machine.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Memory region resolved for this device's tag
    pub fn region(&self) -> Option<RegionRef> {
        self.region.borrow().clone()
    }

    /// Length of the resolved memory region (0 when none)
    pub fn region_bytes(&self) -> usize {
        self.region_bytes.get()
    }

    pub(crate) fn set_info_hook(&self) -> Option<DeviceSetInfoFn> {
        self.set_info
    }

    pub(crate) fn bind_machine(&self, machine: &MachineRef) {
        *self.machine.borrow_mut() = Some(Rc::downgrade(machine));
    }

    pub(crate) fn bind_token(&self, token_bytes: usize) {
        *self.token.borrow_mut() = Some(vec![0; token_bytes].into_boxed_slice());
        self.token_bytes.set(token_bytes);
    }

    pub(crate) fn bind_region(&self, region: Option<RegionRef>) {
        let bytes = region.as_ref().map_or(0, |r| r.borrow().len());
        *self.region.borrow_mut() = region;
        self.region_bytes.set(bytes);
    }

    pub(crate) fn mark_started(&self) {
        self.started.set(true);
    }

    /// Drop every live field and return to the registered state
    pub(crate) fn clear_live(&self) {
        self.started.set(false);
        *self.token.borrow_mut() = None;
        self.token_bytes.set(0);
        *self.machine.borrow_mut() = None;
        *self.region.borrow_mut() = None;
        self.region_bytes.set(0);
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("type", &self.device_type)
            .field("class", &self.class)
            .field("tag", &self.tag)
            .field("inline_config", &self.inline_config.len())
            .field("started", &self.started.get())
            .field("token_bytes", &self.token_bytes.get())
            .field("region_bytes", &self.region_bytes.get())
            .finish()
    }
}
