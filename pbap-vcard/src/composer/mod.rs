// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Record Composer Module
//!
//! Turns stored records into encoded vCards, one record per call. Two
//! variants exist: contacts and call-log entries. Both pull records lazily
//! from a `RecordCursor` and halt on the first failure.

mod builder;
mod call_log;
mod contact;

pub use builder::{fold_line, VCardBuilder};
pub use call_log::{compose_call, compose_owner_vcard, display_name, CallLogComposer};
pub use contact::{compose_contact, ContactComposer};

use crate::config::ExportConfig;
use crate::error::ExportError;

/// Target vCard version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VCardVersion {
    #[default]
    V21,
    V30,
}

impl VCardVersion {
    /// Returns the `VERSION` property value.
    pub fn as_str(&self) -> &'static str {
        match self {
            VCardVersion::V21 => "2.1",
            VCardVersion::V30 => "3.0",
        }
    }
}

/// Per-export composition settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    pub version: VCardVersion,
    pub include_photo: bool,
    pub fold_width: usize,
    /// Call-log name used when the number may not be disclosed.
    pub unknown_number_label: String,
}

impl ComposeOptions {
    /// Derives options from the export config.
    ///
    /// `photo_requested` is the peer's photo choice; the config can veto it.
    pub fn new(version: VCardVersion, config: &ExportConfig, photo_requested: bool) -> Self {
        ComposeOptions {
            version,
            include_photo: config.include_photos && photo_requested,
            fold_width: config.fold_width,
            unknown_number_label: config.unknown_number_label.clone(),
        }
    }
}

/// Produces encoded vCards one record at a time.
pub trait RecordComposer {
    /// Whether another record remains.
    fn has_more(&self) -> bool;

    /// Composes the next record.
    ///
    /// After an error the composer must not be advanced again.
    fn next_entry(&mut self) -> Result<String, ExportError>;

    /// Reason for the last failure, if any.
    fn error_reason(&self) -> Option<&str>;

    /// Releases the underlying cursor. Idempotent.
    fn close(&mut self);
}
