// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Contact composer.

use crate::error::ExportError;
use crate::phone::translate_pause_wait;
use crate::source::{ContactRecord, PhoneKind, PhoneNumber, RecordCursor, RecordSource, Selection};

use super::{ComposeOptions, RecordComposer, VCardBuilder};

/// Composes the contacts matched by a selection.
pub struct ContactComposer<'a> {
    cursor: Option<Box<dyn RecordCursor<ContactRecord> + 'a>>,
    options: ComposeOptions,
    error: Option<String>,
}

impl<'a> ContactComposer<'a> {
    /// Opens a cursor over `selection`.
    pub fn init<S: RecordSource + ?Sized>(
        source: &'a S,
        selection: &Selection,
        options: ComposeOptions,
    ) -> Result<Self, ExportError> {
        let cursor = source.select_contacts(selection)?;
        Ok(ContactComposer {
            cursor: Some(cursor),
            options,
            error: None,
        })
    }
}

impl RecordComposer for ContactComposer<'_> {
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
        match cursor.advance() {
            Ok(record) => {
                let vcard = compose_contact(&record, &self.options);
                tracing::trace!(id = record.id, vcard = %vcard, "composed contact");
                Ok(vcard)
            }
            Err(e) => {
                let reason = format!("contact unavailable: {}", e);
                self.error = Some(reason.clone());
                Err(ExportError::EncodingFailed(reason))
            }
        }
    }

    fn error_reason(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn close(&mut self) {
        self.cursor = None;
    }
}

/// Encodes one contact.
pub fn compose_contact(record: &ContactRecord, options: &ComposeOptions) -> String {
    let mut card = VCardBuilder::new(options.version, options.fold_width);

    let display = formatted_name(record);
    match (&record.family_name, &record.given_name) {
        (None, None) => card.structured("N", &[], &[display.as_str(), "", "", "", ""]),
        (family, given) => card.structured(
            "N",
            &[],
            &[
                family.as_deref().unwrap_or_default(),
                given.as_deref().unwrap_or_default(),
                "",
                "",
                "",
            ],
        ),
    };
    card.text("FN", &[], &display);

    if let Some(nickname) = &record.nickname {
        card.text("NICKNAME", &[], nickname);
    }
    for phone in &record.phones {
        let custom;
        let types: Vec<&str> = match phone.kind {
            PhoneKind::Custom => {
                custom = custom_type(phone);
                vec![custom.as_str()]
            }
            kind => phone_types(kind).to_vec(),
        };
        card.raw_typed("TEL", &types, &translate_pause_wait(&phone.number));
    }
    for email in &record.emails {
        card.text("EMAIL", &label_types(email.label.as_deref()), &email.value);
    }
    for address in &record.addresses {
        card.structured(
            "ADR",
            &label_types(address.label.as_deref()),
            &["", "", address.value.as_str(), "", "", "", ""],
        );
    }
    if let Some(organization) = &record.organization {
        card.text("ORG", &[], organization);
    }
    if let Some(title) = &record.title {
        card.text("TITLE", &[], title);
    }
    for website in &record.websites {
        card.text("URL", &[], website);
    }
    if options.include_photo {
        if let Some(photo) = record.photo.as_deref().filter(|photo| !photo.is_empty()) {
            card.photo(photo);
        }
    }
    if let Some(note) = &record.note {
        card.text("NOTE", &[], note);
    }
    if let Some(birthday) = &record.birthday {
        card.text("BDAY", &[], birthday);
    }
    for im in &record.ims {
        let scheme = im.label.as_deref().unwrap_or("x-im").to_lowercase();
        card.raw("IMPP", &[], &format!("{}:{}", scheme, im.value));
    }
    for sip in &record.sip_addresses {
        card.raw("X-SIP", &[], sip);
    }

    card.build()
}

/// Display name, falling back to the structured name parts.
fn formatted_name(record: &ContactRecord) -> String {
    if let Some(name) = record.display_name.as_deref().filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    [record.given_name.as_deref(), record.family_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn phone_types(kind: PhoneKind) -> &'static [&'static str] {
    match kind {
        PhoneKind::Home => &["HOME"],
        PhoneKind::Mobile => &["CELL"],
        PhoneKind::Work => &["WORK"],
        PhoneKind::FaxWork => &["WORK", "FAX"],
        PhoneKind::FaxHome => &["HOME", "FAX"],
        PhoneKind::Pager => &["PAGER"],
        PhoneKind::Other | PhoneKind::Custom => &["VOICE"],
    }
}

/// `X-` type for a custom label, e.g. `Boat` becomes `X-BOAT`.
fn custom_type(phone: &PhoneNumber) -> String {
    let label: String = phone
        .label
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if label.is_empty() {
        "VOICE".to_string()
    } else {
        format!("X-{}", label.to_ascii_uppercase())
    }
}

fn label_types(label: Option<&str>) -> Vec<&str> {
    label.filter(|label| !label.is_empty()).into_iter().collect()
}
