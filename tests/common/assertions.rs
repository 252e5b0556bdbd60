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

//! Custom assertions for device lifecycle tests

use devcore::core::device::DeviceList;

/// Assert every device in the list holds its live state
#[allow(dead_code)]
pub fn assert_all_started(devices: &DeviceList) {
    for device in devices {
        assert!(device.is_started(), "device '{}' not started", device.tag());
        assert!(device.has_token(), "device '{}' has no token", device.tag());
        assert!(
            device.machine().is_some(),
            "device '{}' is not bound to a machine",
            device.tag()
        );
    }
}

/// Assert every device in the list is back in the registered state
#[allow(dead_code)]
pub fn assert_all_stopped(devices: &DeviceList) {
    for device in devices {
        assert!(
            !device.is_started(),
            "device '{}' still started",
            device.tag()
        );
        assert!(
            !device.has_token(),
            "device '{}' kept its token",
            device.tag()
        );
        assert_eq!(
            device.token_bytes(),
            0,
            "device '{}' token size",
            device.tag()
        );
        assert!(
            device.machine().is_none(),
            "device '{}' still bound",
            device.tag()
        );
        assert!(
            device.region().is_none(),
            "device '{}' kept its region",
            device.tag()
        );
        assert_eq!(
            device.region_bytes(),
            0,
            "device '{}' region size",
            device.tag()
        );
    }
}
