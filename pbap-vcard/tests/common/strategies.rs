// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies

use proptest::prelude::*;

use pbap_vcard::VCardVersion;

/// Eight-byte filter masks.
pub fn mask_bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 8)
}

pub fn version_strategy() -> impl Strategy<Value = VCardVersion> {
    prop_oneof![Just(VCardVersion::V21), Just(VCardVersion::V30)]
}

/// Property lines as a composer would emit them, plus continuation lines.
fn property_line_strategy() -> impl Strategy<Value = String> {
    let value = "[A-Za-z0-9 .@]{0,20}";
    prop_oneof![
        value.prop_map(|v| format!("N:{};;;;", v)),
        value.prop_map(|v| format!("FN:{}", v)),
        value.prop_map(|v| format!("TEL;CELL:{}", v)),
        value.prop_map(|v| format!("EMAIL;HOME:{}", v)),
        value.prop_map(|v| format!("ADR;HOME:;;{};;;;", v)),
        value.prop_map(|v| format!("ORG:{}", v)),
        value.prop_map(|v| format!("TITLE:{}", v)),
        value.prop_map(|v| format!("URL:{}", v)),
        value.prop_map(|v| format!("NOTE:{}", v)),
        value.prop_map(|v| format!("BDAY:{}", v)),
        value.prop_map(|v| format!("NICKNAME:{}", v)),
        value.prop_map(|v| format!("nickname:{}", v)),
        value.prop_map(|v| format!("IMPP:xmpp:{}", v)),
        value.prop_map(|v| format!("X-SIP:{}", v)),
        value.prop_map(|v| format!(" {}", v)),
    ]
}

/// Encoded vCards with arbitrary property mixes.
pub fn vcard_strategy() -> impl Strategy<Value = (String, VCardVersion)> {
    (
        prop::collection::vec(property_line_strategy(), 0..12),
        version_strategy(),
    )
        .prop_map(|(lines, version)| {
            let mut card = format!("BEGIN:VCARD\r\nVERSION:{}\r\n", version.as_str());
            for line in lines {
                card.push_str(&line);
                card.push_str("\r\n");
            }
            card.push_str("END:VCARD\r\n");
            (card, version)
        })
}
