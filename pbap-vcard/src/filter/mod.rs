// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! vCard Property Filter
//!
//! Strips properties the peer did not ask for from an already composed
//! vCard. Each filterable property is removed together with its
//! continuation lines: the lines after it that do not start a recognized
//! property, up to but excluding the final line of the record.
//!
//! IM and SIP have no mask bit and are always removed. They are matched by
//! case-insensitive substring anywhere in a line, so any line that merely
//! contains `IM` or `SIP` (a name such as "Kim", a base64 photo chunk) is
//! dropped as well.

mod mask;

pub use mask::{FilterError, FilterMask};

use crate::composer::VCardVersion;

/// When a filterable property is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suppress {
    /// Mask bit cleared.
    WhenCleared,
    /// Mask bit cleared and the target is vCard 2.1 (FN is optional there).
    WhenClearedOnV21,
    /// Mask bit cleared, or the target is vCard 2.1 (matched case-insensitively).
    WhenClearedOrV21,
}

/// One row of the filter table.
#[derive(Debug, Clone, Copy)]
struct FilteredProperty {
    tag: &'static str,
    bit: usize,
    rule: Suppress,
}

impl FilteredProperty {
    const fn new(tag: &'static str, bit: usize, rule: Suppress) -> Self {
        FilteredProperty { tag, bit, rule }
    }
}

/// Filterable properties, in removal order.
const FILTERED_PROPERTIES: [FilteredProperty; 10] = [
    FilteredProperty::new("FN", 1, Suppress::WhenClearedOnV21),
    FilteredProperty::new("PHOTO", 3, Suppress::WhenCleared),
    FilteredProperty::new("BDAY", 4, Suppress::WhenCleared),
    FilteredProperty::new("ADR", 5, Suppress::WhenCleared),
    FilteredProperty::new("EMAIL", 8, Suppress::WhenCleared),
    FilteredProperty::new("TITLE", 12, Suppress::WhenCleared),
    FilteredProperty::new("ORG", 16, Suppress::WhenCleared),
    FilteredProperty::new("NOTE", 17, Suppress::WhenCleared),
    FilteredProperty::new("URL", 20, Suppress::WhenCleared),
    FilteredProperty::new("NICKNAME", 23, Suppress::WhenClearedOrV21),
];

/// Markers removed regardless of the mask.
const ALWAYS_SUPPRESSED: [&str; 2] = ["IM", "SIP"];

/// Line prefixes that start a property; anything else continues the previous one.
const RECOGNIZED_TAGS: [&str; 12] = [
    "N:", "TEL", "VERSION", "URL", "FN", "BDAY", "ADR", "EMAIL", "TITLE", "ORG", "NOTE",
    "NICKNAME",
];

const PHOTO_BIT: usize = 3;

/// Property filter derived from a peer mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    allowed: [bool; FILTERED_PROPERTIES.len()],
}

impl Default for PropertyFilter {
    /// A filter that allows every filterable property.
    fn default() -> Self {
        PropertyFilter {
            allowed: [true; FILTERED_PROPERTIES.len()],
        }
    }
}

impl PropertyFilter {
    /// Builds a filter from an optional mask; `None` allows everything.
    pub fn from_mask(mask: Option<&FilterMask>) -> Result<Self, FilterError> {
        let mut filter = PropertyFilter::default();
        if let Some(mask) = mask {
            filter.set_mask(mask)?;
        }
        Ok(filter)
    }

    /// Replaces the allowed set with the bits of `mask`.
    ///
    /// On error the previous state is kept.
    pub fn set_mask(&mut self, mask: &FilterMask) -> Result<(), FilterError> {
        let mut allowed = [true; FILTERED_PROPERTIES.len()];
        for (slot, property) in allowed.iter_mut().zip(FILTERED_PROPERTIES.iter()) {
            *slot = mask.bit(property.bit)?;
        }
        self.allowed = allowed;
        Ok(())
    }

    /// Whether photos should be composed at all.
    pub fn is_photo_included(&self) -> bool {
        FILTERED_PROPERTIES
            .iter()
            .position(|property| property.bit == PHOTO_BIT)
            .map_or(true, |index| self.allowed[index])
    }

    /// Filters one encoded vCard.
    ///
    /// The result has no empty lines and every line ends with a single `\n`.
    pub fn apply(&self, vcard: &str, version: VCardVersion) -> String {
        let mut lines: Vec<&str> = vcard.lines().collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        let mut keep = vec![true; lines.len()];

        for (property, allowed) in FILTERED_PROPERTIES.iter().zip(self.allowed.iter()) {
            let suppressed = match property.rule {
                Suppress::WhenCleared => !allowed,
                Suppress::WhenClearedOnV21 => !allowed && version == VCardVersion::V21,
                Suppress::WhenClearedOrV21 => !allowed || version == VCardVersion::V21,
            };
            if !suppressed {
                continue;
            }
            let ignore_case =
                property.rule == Suppress::WhenClearedOrV21 && version == VCardVersion::V21;

            for i in 0..lines.len() {
                if keep[i] && starts_with_tag(lines[i], property.tag, ignore_case) {
                    keep[i] = false;
                    remove_continuation(&lines, &mut keep, i);
                }
            }
        }

        let upper = vcard.to_uppercase();
        for marker in ALWAYS_SUPPRESSED {
            if !upper.contains(marker) {
                continue;
            }
            for (line, kept) in lines.iter().zip(keep.iter_mut()) {
                if line.to_uppercase().contains(marker) {
                    *kept = false;
                }
            }
        }

        let mut filtered = String::with_capacity(vcard.len());
        for (line, kept) in lines.iter().zip(keep.iter()) {
            if *kept && !line.is_empty() {
                filtered.push_str(line);
                filtered.push('\n');
            }
        }
        filtered
    }
}

/// Blanks the lines continuing the property at `start`, stopping before the last line.
fn remove_continuation(lines: &[&str], keep: &mut [bool], start: usize) {
    let last = lines.len().saturating_sub(1);
    for j in start + 1..last {
        if keep[j] && is_recognized(lines[j]) {
            break;
        }
        keep[j] = false;
    }
}

fn is_recognized(line: &str) -> bool {
    RECOGNIZED_TAGS.iter().any(|tag| line.starts_with(tag))
}

fn starts_with_tag(line: &str, tag: &str, ignore_case: bool) -> bool {
    if ignore_case {
        line.get(..tag.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(tag))
    } else {
        line.starts_with(tag)
    }
}
