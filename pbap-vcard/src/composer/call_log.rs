// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Call-log and owner composers.

use chrono::{DateTime, Utc};

use crate::config::DEFAULT_UNKNOWN_NUMBER_LABEL;
use crate::error::ExportError;
use crate::phone::translate_pause_wait;
use crate::source::{
    CallRecord, CallType, PhoneKind, Presentation, RecordCursor, RecordSource, Selection,
};

use super::{ComposeOptions, RecordComposer, VCardBuilder, VCardVersion};

const CALL_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Composes the call-log entries matched by a selection.
pub struct CallLogComposer<'a> {
    cursor: Option<Box<dyn RecordCursor<CallRecord> + 'a>>,
    options: ComposeOptions,
    error: Option<String>,
}

impl<'a> CallLogComposer<'a> {
    /// Opens a cursor over `selection`.
    pub fn init<S: RecordSource + ?Sized>(
        source: &'a S,
        selection: &Selection,
        options: ComposeOptions,
    ) -> Result<Self, ExportError> {
        let cursor = source.select_calls(selection)?;
        Ok(CallLogComposer {
            cursor: Some(cursor),
            options,
            error: None,
        })
    }

    fn fail(&mut self, reason: String) -> ExportError {
        self.error = Some(reason.clone());
        ExportError::EncodingFailed(reason)
    }
}

impl RecordComposer for CallLogComposer<'_> {
    fn has_more(&self) -> bool {
        self.error.is_none() && self.cursor.as_ref().is_some_and(|cursor| cursor.has_next())
    }

    fn next_entry(&mut self) -> Result<String, ExportError> {
        if let Some(reason) = &self.error {
            return Err(ExportError::EncodingFailed(reason.clone()));
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(ExportError::EncodingFailed("composer closed".to_string()));
        };
        let record = match cursor.advance() {
            Ok(record) => record,
            Err(e) => return Err(self.fail(format!("call unavailable: {}", e))),
        };
        match compose_call(&record, &self.options) {
            Ok(vcard) => {
                tracing::trace!(id = record.id, vcard = %vcard, "composed call");
                Ok(vcard)
            }
            Err(e) => Err(self.fail(e.to_string())),
        }
    }

    fn error_reason(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn close(&mut self) {
        self.cursor = None;
    }
}

/// Name shown for a call: the cached contact name, else the number when it
/// may be disclosed, else `unknown_number_label`. Never empty.
pub fn display_name(record: &CallRecord, unknown_number_label: &str) -> String {
    if let Some(name) = record.cached_name.as_deref().filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    match disclosed_number(record) {
        Some(number) => number.to_string(),
        None if unknown_number_label.is_empty() => DEFAULT_UNKNOWN_NUMBER_LABEL.to_string(),
        None => unknown_number_label.to_string(),
    }
}

fn disclosed_number(record: &CallRecord) -> Option<&str> {
    if record.presentation != Presentation::Allowed {
        return None;
    }
    record.number.as_deref().filter(|number| !number.is_empty())
}

/// Encodes one call-log entry.
pub fn compose_call(record: &CallRecord, options: &ComposeOptions) -> Result<String, ExportError> {
    let timestamp = DateTime::<Utc>::from_timestamp_millis(record.date_ms)
        .ok_or_else(|| {
            ExportError::EncodingFailed(format!(
                "call {} has out-of-range timestamp {}",
                record.id, record.date_ms
            ))
        })?
        .format(CALL_DATETIME_FORMAT)
        .to_string();

    let name = display_name(record, &options.unknown_number_label);
    let mut card = VCardBuilder::new(options.version, options.fold_width);
    card.structured("N", &[], &[name.as_str(), "", "", "", ""]);
    if options.version == VCardVersion::V30 {
        card.text("FN", &[], &name);
    }
    if let Some(number) = disclosed_number(record) {
        let types: &[&str] = match record.cached_number_kind {
            Some(PhoneKind::Home) => &["HOME"],
            Some(PhoneKind::Mobile) => &["CELL"],
            Some(PhoneKind::Work) => &["WORK"],
            Some(_) => &["VOICE"],
            None => &[],
        };
        card.raw_typed("TEL", types, &translate_pause_wait(number));
    }
    let direction = match record.call_type {
        CallType::Incoming => "RECEIVED",
        CallType::Outgoing => "DIALED",
        CallType::Missed => "MISSED",
    };
    card.raw("X-IRMC-CALL-DATETIME", &[direction], &timestamp);

    Ok(card.build())
}

/// Encodes the local device identity.
pub fn compose_owner_vcard(
    name: &str,
    number: &str,
    version: VCardVersion,
    fold_width: usize,
) -> String {
    let mut card = VCardBuilder::new(version, fold_width);
    card.structured("N", &[], &[name, "", "", "", ""]);
    if version == VCardVersion::V30 {
        card.text("FN", &[], name);
    }
    if !number.is_empty() {
        card.raw_typed("TEL", &["CELL"], &translate_pause_wait(number));
    }
    card.build()
}
