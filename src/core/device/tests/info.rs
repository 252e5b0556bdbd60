// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Info request tests: queries, setters and the string pool

use super::super::string_pool::TEMP_STRING_POOL_ENTRIES;
use super::super::*;
use super::helpers::*;
use crate::core::error::DeviceError;
use crate::core::machine::Machine;

#[test]
fn test_type_queries() {
    let cpu = cpu();
    assert_eq!(cpu.get_info_int(devinfo::INT_TOKEN_BYTES), 16);
    assert_eq!(cpu.get_info_int(devinfo::INT_INLINE_CONFIG_BYTES), 4);
    assert_eq!(cpu.class(), DeviceClass::CpuChip);
    assert!(cpu
        .get_info_fct(devinfo::FCT_START)
        .and_then(DeviceFct::as_start)
        .is_some());
    assert_eq!(cpu.name(), "Test CPU");

    let mut pool = TempStringPool::new();
    assert_eq!(cpu.get_info_string(&mut pool, devinfo::STR_FAMILY), "Test");
}

#[test]
fn test_unknown_requests_return_defaults() {
    let mut devices = DeviceList::new();
    let device = devices.add(sound(), "ym").unwrap();
    let mut pool = TempStringPool::new();

    assert_eq!(device.get_info_int(devinfo::INT_DEVICE_SPECIFIC + 7), 0);
    assert!(device.get_info_ptr(devinfo::PTR_DEVICE_SPECIFIC).is_none());
    assert!(device.get_info_fct(devinfo::FCT_STOP).is_none());
    assert_eq!(device.get_info_string(&mut pool, devinfo::STR_CREDITS), "");
}

#[test]
fn test_unnamed_type() {
    assert_eq!(NO_START.device_type().name(), "<unnamed device>");
    assert_eq!(NO_START.device_type().class(), DeviceClass::General);
}

#[test]
fn test_device_query_before_start() {
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), "maincpu").unwrap();
    assert_eq!(device.get_info_int(INT_TEST_VALUE), 0);
    assert!(device.get_info_fct(FCT_TEST_CALLBACK).is_none());
}

#[test]
fn test_set_info_before_start_fails() {
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), "maincpu").unwrap();

    assert_eq!(
        device.set_info_int(INT_TEST_VALUE, 5),
        Err(DeviceError::NotStarted {
            tag: "maincpu".to_string()
        })
    );
}

#[test]
fn test_set_info_without_hook_fails() {
    let machine = started_machine();
    let ym = machine.devices().find_by_tag(sound(), "ym").unwrap();

    assert_eq!(
        ym.set_info_int(devinfo::INT_DEVICE_SPECIFIC, 5),
        Err(DeviceError::NoSetInfo {
            tag: "ym".to_string()
        })
    );
}

#[test]
fn test_set_info_int_round_trip() {
    let machine = started_machine();
    let maincpu = machine.devices().find_by_tag(cpu(), "maincpu").unwrap();

    maincpu.set_info_int(INT_TEST_VALUE, -42).unwrap();
    assert_eq!(maincpu.get_info_int(INT_TEST_VALUE), -42);
    maincpu.set_info_int(INT_TEST_VALUE, 7).unwrap();
    assert_eq!(maincpu.get_info_int(INT_TEST_VALUE), 7);
}

#[test]
fn test_set_info_fct_and_clear() {
    let machine = started_machine();
    let maincpu = machine.devices().find_by_tag(cpu(), "maincpu").unwrap();

    maincpu
        .set_info_fct(FCT_TEST_CALLBACK, Some(DeviceFct::Callback(|_, _| {})))
        .unwrap();
    assert!(maincpu
        .get_info_fct(FCT_TEST_CALLBACK)
        .and_then(DeviceFct::as_callback)
        .is_some());

    maincpu.set_info_fct(FCT_TEST_CALLBACK, None).unwrap();
    assert!(maincpu.get_info_fct(FCT_TEST_CALLBACK).is_none());
}

#[test]
fn test_set_info_ptr_ignored_by_device() {
    let machine = started_machine();
    let maincpu = machine.devices().find_by_tag(cpu(), "maincpu").unwrap();

    let value: SharedPtr = std::rc::Rc::new(3u8);
    assert!(maincpu
        .set_info_ptr(devinfo::PTR_DEVICE_SPECIFIC, Some(value))
        .is_ok());
    assert!(maincpu.get_info_ptr(devinfo::PTR_DEVICE_SPECIFIC).is_none());
}

// ========== String pool ==========

#[test]
fn test_string_results_reuse_buffers() {
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), "maincpu").unwrap();
    let mut pool = TempStringPool::new();

    let mut addresses = Vec::new();
    for _ in 0..=TEMP_STRING_POOL_ENTRIES {
        let name = device.get_info_string(&mut pool, devinfo::STR_NAME);
        addresses.push(name.as_ptr() as usize);
    }

    assert_eq!(addresses[0], addresses[TEMP_STRING_POOL_ENTRIES]);
    for window in addresses[..TEMP_STRING_POOL_ENTRIES].windows(2) {
        assert_ne!(window[0], window[1]);
    }
    assert_eq!(pool.acquired(), TEMP_STRING_POOL_ENTRIES + 1);
    assert_eq!(pool.current(), "Test CPU");
}

#[test]
fn test_device_string_query() {
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), "maincpu").unwrap();
    let mut pool = TempStringPool::new();
    assert_eq!(device.get_info_string(&mut pool, STR_TEST_TAG), "maincpu");
}

#[test]
fn test_long_strings_are_clipped() {
    let tag = "t".repeat(300);
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), &tag).unwrap();
    let mut pool = TempStringPool::new();

    let value = device.get_info_string(&mut pool, STR_TEST_TAG);
    assert_eq!(value.len(), 255);
    assert!(tag.starts_with(value));
}

// ========== Request code ranges ==========

#[test]
#[should_panic(expected = "Integer info request")]
fn test_int_query_with_pointer_code_panics() {
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), "maincpu").unwrap();
    device.get_info_int(devinfo::PTR_FIRST);
}

#[test]
#[should_panic(expected = "Pointer info request")]
fn test_ptr_query_with_function_code_panics() {
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), "maincpu").unwrap();
    device.get_info_ptr(devinfo::FCT_START);
}

#[test]
#[should_panic(expected = "Function info request")]
fn test_type_fct_query_with_int_code_panics() {
    cpu().get_info_fct(devinfo::INT_CLASS);
}

#[test]
#[should_panic(expected = "String info request")]
fn test_string_query_past_last_code_panics() {
    let mut pool = TempStringPool::new();
    cpu().get_info_string(&mut pool, devinfo::STR_LAST + 1);
}

#[test]
#[should_panic(expected = "Integer info request")]
fn test_int_setter_with_string_code_panics() {
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), "maincpu").unwrap();
    let _ = device.set_info_int(devinfo::STR_NAME, 1);
}

#[test]
fn test_family_bounds_accepted() {
    let mut devices = DeviceList::new();
    let device = devices.add(cpu(), "maincpu").unwrap();
    let mut pool = TempStringPool::new();

    assert_eq!(device.get_info_int(devinfo::INT_LAST), 0);
    assert!(device.get_info_ptr(devinfo::PTR_LAST).is_none());
    assert!(device.get_info_fct(devinfo::FCT_LAST).is_none());
    assert_eq!(device.get_info_string(&mut pool, devinfo::STR_LAST), "");
}
