// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Record types stored in the phonebook and call log.

/// Phone number type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneKind {
    Home,
    Mobile,
    Work,
    FaxWork,
    FaxHome,
    Pager,
    Other,
    Custom,
}

impl PhoneKind {
    /// Returns the storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneKind::Home => "HOME",
            PhoneKind::Mobile => "CELL",
            PhoneKind::Work => "WORK",
            PhoneKind::FaxWork => "FAX_WORK",
            PhoneKind::FaxHome => "FAX_HOME",
            PhoneKind::Pager => "PAGER",
            PhoneKind::Other => "OTHER",
            PhoneKind::Custom => "CUSTOM",
        }
    }

    /// Parses the storage representation; unknown values map to `Other`.
    pub fn parse(s: &str) -> Self {
        match s {
            "HOME" => PhoneKind::Home,
            "CELL" => PhoneKind::Mobile,
            "WORK" => PhoneKind::Work,
            "FAX_WORK" => PhoneKind::FaxWork,
            "FAX_HOME" => PhoneKind::FaxHome,
            "PAGER" => PhoneKind::Pager,
            "CUSTOM" => PhoneKind::Custom,
            _ => PhoneKind::Other,
        }
    }
}

/// A phone number attached to a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub kind: PhoneKind,
    /// Free-form label for `PhoneKind::Custom`.
    pub label: Option<String>,
    /// Dial string as stored, pause/wait markers included.
    pub number: String,
}

/// A typed value (email, address, IM handle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledValue {
    /// Type label such as `HOME`, or the IM protocol.
    pub label: Option<String>,
    pub value: String,
}

impl LabeledValue {
    fn new(label: Option<&str>, value: &str) -> Self {
        LabeledValue {
            label: label.map(str::to_string),
            value: value.to_string(),
        }
    }
}

/// A contact as held by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactRecord {
    /// Store-assigned identity; 0 until inserted.
    pub id: i64,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub nickname: Option<String>,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub note: Option<String>,
    /// Birthday as `YYYY-MM-DD`.
    pub birthday: Option<String>,
    pub photo: Option<Vec<u8>>,
    /// Contacts outside a visible group are not part of the phonebook.
    pub visible: bool,
    pub phones: Vec<PhoneNumber>,
    pub emails: Vec<LabeledValue>,
    pub addresses: Vec<LabeledValue>,
    pub websites: Vec<String>,
    pub ims: Vec<LabeledValue>,
    pub sip_addresses: Vec<String>,
}

impl ContactRecord {
    /// Creates a visible contact with a display name.
    pub fn new(display_name: &str) -> Self {
        ContactRecord {
            display_name: Some(display_name.to_string()),
            visible: true,
            ..Default::default()
        }
    }

    /// Creates a visible contact without any name.
    pub fn unnamed() -> Self {
        ContactRecord {
            visible: true,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, given: &str, family: &str) -> Self {
        self.given_name = Some(given.to_string());
        self.family_name = Some(family.to_string());
        self
    }

    pub fn with_phone(mut self, kind: PhoneKind, number: &str) -> Self {
        self.phones.push(PhoneNumber {
            kind,
            label: None,
            number: number.to_string(),
        });
        self
    }

    pub fn with_custom_phone(mut self, label: &str, number: &str) -> Self {
        self.phones.push(PhoneNumber {
            kind: PhoneKind::Custom,
            label: Some(label.to_string()),
            number: number.to_string(),
        });
        self
    }

    pub fn with_email(mut self, label: &str, email: &str) -> Self {
        self.emails.push(LabeledValue::new(Some(label), email));
        self
    }

    pub fn with_address(mut self, label: &str, address: &str) -> Self {
        self.addresses.push(LabeledValue::new(Some(label), address));
        self
    }

    pub fn with_website(mut self, url: &str) -> Self {
        self.websites.push(url.to_string());
        self
    }

    /// Adds an IM handle; `protocol` is a URI scheme such as `xmpp`.
    pub fn with_im(mut self, protocol: &str, handle: &str) -> Self {
        self.ims.push(LabeledValue::new(Some(protocol), handle));
        self
    }

    pub fn with_sip(mut self, address: &str) -> Self {
        self.sip_addresses.push(address.to_string());
        self
    }

    pub fn with_nickname(mut self, nickname: &str) -> Self {
        self.nickname = Some(nickname.to_string());
        self
    }

    pub fn with_organization(mut self, organization: &str, title: &str) -> Self {
        self.organization = Some(organization.to_string());
        self.title = Some(title.to_string());
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn with_birthday(mut self, birthday: &str) -> Self {
        self.birthday = Some(birthday.to_string());
        self
    }

    pub fn with_photo(mut self, photo: Vec<u8>) -> Self {
        self.photo = Some(photo);
        self
    }

    /// Moves the contact out of every visible group.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Direction of a call-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    Incoming = 1,
    Outgoing = 2,
    Missed = 3,
}

impl CallType {
    /// Parses the stored integer.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CallType::Incoming),
            2 => Some(CallType::Outgoing),
            3 => Some(CallType::Missed),
            _ => None,
        }
    }
}

/// Whether the caller allowed their number to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Allowed = 1,
    Restricted = 2,
    Unknown = 3,
    Payphone = 4,
}

impl Presentation {
    /// Parses the stored integer; unknown values are treated as `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Presentation::Allowed,
            2 => Presentation::Restricted,
            4 => Presentation::Payphone,
            _ => Presentation::Unknown,
        }
    }
}

/// A call-log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// Store-assigned identity; increases with insertion time.
    pub id: i64,
    pub number: Option<String>,
    pub presentation: Presentation,
    pub call_type: CallType,
    /// Milliseconds since the Unix epoch.
    pub date_ms: i64,
    /// Contact name cached at call time.
    pub cached_name: Option<String>,
    pub cached_number_kind: Option<PhoneKind>,
}

impl CallRecord {
    /// Creates an entry with a disclosed number.
    pub fn new(call_type: CallType, number: &str, date_ms: i64) -> Self {
        CallRecord {
            id: 0,
            number: Some(number.to_string()),
            presentation: Presentation::Allowed,
            call_type,
            date_ms,
            cached_name: None,
            cached_number_kind: None,
        }
    }

    pub fn with_name(mut self, name: &str, kind: PhoneKind) -> Self {
        self.cached_name = Some(name.to_string());
        self.cached_number_kind = Some(kind);
        self
    }

    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }
}
