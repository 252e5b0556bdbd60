// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Device info queries
//!
//! Every property of a device, from its token size to its start hook, is
//! read through a numbered request code. Request codes are grouped in four
//! disjoint families; each accessor only accepts codes from its own family
//! and treats anything else as a programming error.
//!
//! ```text
//! Family           | Range             | Slot variant
//! -----------------|-------------------|------------------------------
//! Integer          | 0x00000 - 0x0FFFF | DeviceInfo::Int(i64)
//! Pointer          | 0x10000 - 0x1FFFF | DeviceInfo::Ptr(Option<Rc<dyn Any>>)
//! Function pointer | 0x20000 - 0x2FFFF | DeviceInfo::Fct(Option<DeviceFct>)
//! String           | 0x30000 - 0x3FFFF | DeviceInfo::Str(String)
//! ```
//!
//! Device kinds may define their own codes from each family's
//! `*_DEVICE_SPECIFIC` value up to the family's `*_LAST`.

use super::string_pool::TempStringPool;
use super::{Device, DeviceType};
use crate::core::error::DeviceError;
use log::trace;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Request codes understood by every device kind
pub mod devinfo {
    /// First integer request
    pub const INT_FIRST: u32 = 0x00000;
    /// Bytes of token state per device (must be nonzero)
    pub const INT_TOKEN_BYTES: u32 = INT_FIRST;
    /// Bytes of inline configuration per device
    pub const INT_INLINE_CONFIG_BYTES: u32 = INT_FIRST + 1;
    /// Device class, as an integer
    pub const INT_CLASS: u32 = INT_FIRST + 2;
    /// First integer request free for device kinds
    pub const INT_DEVICE_SPECIFIC: u32 = 0x08000;
    /// Last integer request
    pub const INT_LAST: u32 = 0x0FFFF;

    /// First pointer request
    pub const PTR_FIRST: u32 = 0x10000;
    /// First pointer request free for device kinds
    pub const PTR_DEVICE_SPECIFIC: u32 = 0x18000;
    /// Last pointer request
    pub const PTR_LAST: u32 = 0x1FFFF;

    /// First function pointer request
    pub const FCT_FIRST: u32 = 0x20000;
    /// Set-info hook (optional)
    pub const FCT_SET_INFO: u32 = FCT_FIRST;
    /// Start hook (mandatory)
    pub const FCT_START: u32 = FCT_FIRST + 1;
    /// Stop hook (optional)
    pub const FCT_STOP: u32 = FCT_FIRST + 2;
    /// Reset hook (optional)
    pub const FCT_RESET: u32 = FCT_FIRST + 3;
    /// First function pointer request free for device kinds
    pub const FCT_DEVICE_SPECIFIC: u32 = 0x28000;
    /// Last function pointer request
    pub const FCT_LAST: u32 = 0x2FFFF;

    /// First string request
    pub const STR_FIRST: u32 = 0x30000;
    /// Name of the device kind
    pub const STR_NAME: u32 = STR_FIRST;
    /// Family of the device kind
    pub const STR_FAMILY: u32 = STR_FIRST + 1;
    /// Version of the implementation
    pub const STR_VERSION: u32 = STR_FIRST + 2;
    /// Source file of the implementation
    pub const STR_SOURCE_FILE: u32 = STR_FIRST + 3;
    /// Copyright/credits line
    pub const STR_CREDITS: u32 = STR_FIRST + 4;
    /// First string request free for device kinds
    pub const STR_DEVICE_SPECIFIC: u32 = 0x38000;
    /// Last string request
    pub const STR_LAST: u32 = 0x3FFFF;
}

/// Shared value handed out by pointer requests
///
/// This is the only sanctioned way for one device to reach state owned by
/// another, e.g. a shared memory region. Receivers downcast to the concrete
/// type they expect.
pub type SharedPtr = Rc<dyn Any>;

/// Outcome of a start hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStart {
    /// Device is running
    Ok,
    /// A device this one needs has not started yet; retry on the next sweep
    MissingDependency,
}

/// Start hook
pub type DeviceStartFn = fn(&Device) -> DeviceStart;
/// Stop hook
pub type DeviceStopFn = fn(&Device);
/// Reset hook
pub type DeviceResetFn = fn(&Device);
/// Set-info hook: receives the request code and the new value
pub type DeviceSetInfoFn = fn(&Device, u32, &DeviceInfo);
/// Device-specific line callback (e.g. an interrupt line)
pub type DeviceCallbackFn = fn(&Device, i32);

/// Function pointer answer
#[derive(Clone, Copy)]
pub enum DeviceFct {
    SetInfo(DeviceSetInfoFn),
    Start(DeviceStartFn),
    Stop(DeviceStopFn),
    Reset(DeviceResetFn),
    Callback(DeviceCallbackFn),
}

impl DeviceFct {
    pub fn as_set_info(self) -> Option<DeviceSetInfoFn> {
        match self {
            DeviceFct::SetInfo(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_start(self) -> Option<DeviceStartFn> {
        match self {
            DeviceFct::Start(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_stop(self) -> Option<DeviceStopFn> {
        match self {
            DeviceFct::Stop(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_reset(self) -> Option<DeviceResetFn> {
        match self {
            DeviceFct::Reset(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_callback(self) -> Option<DeviceCallbackFn> {
        match self {
            DeviceFct::Callback(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Debug for DeviceFct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            DeviceFct::SetInfo(_) => "SetInfo",
            DeviceFct::Start(_) => "Start",
            DeviceFct::Stop(_) => "Stop",
            DeviceFct::Reset(_) => "Reset",
            DeviceFct::Callback(_) => "Callback",
        };
        write!(f, "DeviceFct::{}", kind)
    }
}

/// In/out slot for an info request
///
/// Accessors seed the slot with their family's default; the device kind
/// overwrites it with its answer. Setters pass the new value the same way.
#[derive(Debug, Clone)]
pub enum DeviceInfo {
    Int(i64),
    Ptr(Option<SharedPtr>),
    Fct(Option<DeviceFct>),
    Str(String),
}

impl DeviceInfo {
    /// Answer with an integer
    pub fn set_int(&mut self, value: i64) {
        *self = DeviceInfo::Int(value);
    }

    /// Answer with a shared pointer
    pub fn set_ptr(&mut self, value: SharedPtr) {
        *self = DeviceInfo::Ptr(Some(value));
    }

    /// Answer with a function pointer
    pub fn set_fct(&mut self, value: DeviceFct) {
        *self = DeviceInfo::Fct(Some(value));
    }

    /// Answer with a string
    ///
    /// Writes into the buffer already in the slot, so pooled buffers keep
    /// their allocation.
    pub fn set_str(&mut self, value: &str) {
        match self {
            DeviceInfo::Str(buffer) => {
                buffer.clear();
                buffer.push_str(value);
            }
            other => *other = DeviceInfo::Str(value.to_string()),
        }
    }

    /// Integer value, or 0 for other variants
    pub fn int(&self) -> i64 {
        match self {
            DeviceInfo::Int(value) => *value,
            _ => 0,
        }
    }

    /// Pointer value, if any
    pub fn ptr(&self) -> Option<SharedPtr> {
        match self {
            DeviceInfo::Ptr(value) => value.clone(),
            _ => None,
        }
    }

    /// Function pointer value, if any
    pub fn fct(&self) -> Option<DeviceFct> {
        match self {
            DeviceInfo::Fct(value) => *value,
            _ => None,
        }
    }

    /// String value, or "" for other variants
    pub fn str(&self) -> &str {
        match self {
            DeviceInfo::Str(value) => value,
            _ => "",
        }
    }

    fn into_string(self) -> String {
        match self {
            DeviceInfo::Str(value) => value,
            _ => String::new(),
        }
    }
}

fn assert_range(state: u32, first: u32, last: u32, family: &str) {
    assert!(
        (first..=last).contains(&state),
        "{} info request {:#07x} outside {:#07x}..={:#07x}",
        family,
        state,
        first,
        last
    );
}

fn assert_int(state: u32) {
    assert_range(state, devinfo::INT_FIRST, devinfo::INT_LAST, "Integer");
}

fn assert_ptr(state: u32) {
    assert_range(state, devinfo::PTR_FIRST, devinfo::PTR_LAST, "Pointer");
}

fn assert_fct(state: u32) {
    assert_range(state, devinfo::FCT_FIRST, devinfo::FCT_LAST, "Function");
}

fn assert_str(state: u32) {
    assert_range(state, devinfo::STR_FIRST, devinfo::STR_LAST, "String");
}

impl DeviceType {
    /// Integer answer to a type query
    ///
    /// # Panics
    ///
    /// Panics if `state` is not an integer request.
    pub fn get_info_int(&self, state: u32) -> i64 {
        assert_int(state);
        let mut info = DeviceInfo::Int(0);
        self.interface().type_info(state, &mut info);
        info.int()
    }

    /// Function pointer answer to a type query
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a function pointer request.
    pub fn get_info_fct(&self, state: u32) -> Option<DeviceFct> {
        assert_fct(state);
        let mut info = DeviceInfo::Fct(None);
        self.interface().type_info(state, &mut info);
        info.fct()
    }

    /// String answer to a type query, written into the next pool buffer
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a string request.
    pub fn get_info_string<'p>(&self, pool: &'p mut TempStringPool, state: u32) -> &'p str {
        assert_str(state);
        let mut info = DeviceInfo::Str(pool.take_next());
        self.interface().type_info(state, &mut info);
        pool.store(info.into_string())
    }
}

impl Device {
    /// Integer answer to a device query
    ///
    /// # Panics
    ///
    /// Panics if `state` is not an integer request.
    pub fn get_info_int(&self, state: u32) -> i64 {
        assert_int(state);
        let mut info = DeviceInfo::Int(0);
        self.device_type()
            .interface()
            .device_info(self, state, &mut info);
        info.int()
    }

    /// Pointer answer to a device query
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a pointer request.
    pub fn get_info_ptr(&self, state: u32) -> Option<SharedPtr> {
        assert_ptr(state);
        let mut info = DeviceInfo::Ptr(None);
        self.device_type()
            .interface()
            .device_info(self, state, &mut info);
        info.ptr()
    }

    /// Function pointer answer to a device query
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a function pointer request.
    pub fn get_info_fct(&self, state: u32) -> Option<DeviceFct> {
        assert_fct(state);
        let mut info = DeviceInfo::Fct(None);
        self.device_type()
            .interface()
            .device_info(self, state, &mut info);
        info.fct()
    }

    /// String answer to a device query, written into the next pool buffer
    ///
    /// The returned string stays valid until the pool hands out
    /// `TEMP_STRING_POOL_ENTRIES` more buffers.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a string request.
    pub fn get_info_string<'p>(&self, pool: &'p mut TempStringPool, state: u32) -> &'p str {
        assert_str(state);
        let mut info = DeviceInfo::Str(pool.take_next());
        self.device_type()
            .interface()
            .device_info(self, state, &mut info);
        pool.store(info.into_string())
    }

    /// Push a new integer value into a started device
    ///
    /// # Panics
    ///
    /// Panics if `state` is not an integer request.
    pub fn set_info_int(&self, state: u32, value: i64) -> Result<(), DeviceError> {
        assert_int(state);
        self.push_info(state, &DeviceInfo::Int(value))
    }

    /// Push a new pointer value into a started device
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a pointer request.
    pub fn set_info_ptr(&self, state: u32, value: Option<SharedPtr>) -> Result<(), DeviceError> {
        assert_ptr(state);
        self.push_info(state, &DeviceInfo::Ptr(value))
    }

    /// Push a new function pointer into a started device
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a function pointer request.
    pub fn set_info_fct(&self, state: u32, value: Option<DeviceFct>) -> Result<(), DeviceError> {
        assert_fct(state);
        self.push_info(state, &DeviceInfo::Fct(value))
    }

    fn push_info(&self, state: u32, info: &DeviceInfo) -> Result<(), DeviceError> {
        if !self.has_token() {
            return Err(DeviceError::NotStarted {
                tag: self.tag().to_string(),
            });
        }
        let set_info = self.set_info_hook().ok_or_else(|| DeviceError::NoSetInfo {
            tag: self.tag().to_string(),
        })?;

        trace!("set_info {:#07x} on '{}'", state, self.tag());
        set_info(self, state, info);
        Ok(())
    }
}
