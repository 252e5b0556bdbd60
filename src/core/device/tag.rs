// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Device tag namespace
//!
//! Tags are hierarchical names separated by `:`. A device owned by another
//! device is named `owner:leaf`; siblings share everything up to and
//! including the last separator.
//!
//! ```
//! use devcore::core::device::tag::{build_tag, inherit_tag};
//!
//! assert_eq!(build_tag(None, "cpu"), "cpu");
//! assert_eq!(inherit_tag("board:cpu", "sound"), "board:sound");
//! ```

use super::Device;

/// Separator between levels of a tag
pub const TAG_SEPARATOR: char = ':';

/// Build a tag for a device owned by `owner`
///
/// Returns `owner_tag:leaf`, or just `leaf` when there is no owner.
pub fn build_tag(owner: Option<&Device>, leaf: &str) -> String {
    match owner {
        Some(device) => join_tag(device.tag(), leaf),
        None => leaf.to_string(),
    }
}

/// Build a tag with the same prefix as `source`
///
/// Everything in `source` up to and including the last separator is kept
/// and `leaf` is appended. A source without a separator yields `leaf`.
pub fn inherit_tag(source: &str, leaf: &str) -> String {
    match source.rfind(TAG_SEPARATOR) {
        Some(divider) => {
            let mut tag = String::with_capacity(divider + 1 + leaf.len());
            tag.push_str(&source[..=divider]);
            tag.push_str(leaf);
            tag
        }
        None => leaf.to_string(),
    }
}

/// Join an owner tag and a leaf
pub fn join_tag(owner: &str, leaf: &str) -> String {
    let mut tag = String::with_capacity(owner.len() + 1 + leaf.len());
    tag.push_str(owner);
    tag.push(TAG_SEPARATOR);
    tag.push_str(leaf);
    tag
}

/// Last component of a tag
pub fn leaf_of(tag: &str) -> &str {
    match tag.rfind(TAG_SEPARATOR) {
        Some(divider) => &tag[divider + 1..],
        None => tag,
    }
}
