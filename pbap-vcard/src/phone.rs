// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Phone number normalization.
//!
//! Two independent passes: dial-string control characters are rewritten
//! while a number is composed, and punctuation is stripped from the
//! composed `TEL` lines just before they are written.

/// Pause character as stored in dial strings.
pub const PAUSE: char = ',';

/// Wait character as stored in dial strings.
pub const WAIT: char = ';';

/// Rewrites stored pause/wait markers to the RFC 3601 `p` and `w`.
///
/// No other formatting is applied to the number.
pub fn translate_pause_wait(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            PAUSE => 'p',
            WAIT => 'w',
            other => other,
        })
        .collect()
}

/// Removes `(`, `)`, `-` and spaces from every line starting with `TEL`.
///
/// Lines are re-joined with `\n`; empty lines are dropped.
pub fn strip_telephone_formatting(vcard: &str) -> String {
    let mut out = String::with_capacity(vcard.len());
    for line in vcard.lines() {
        if line.is_empty() {
            continue;
        }
        if line.starts_with("TEL") {
            out.extend(line.chars().filter(|c| !matches!(c, '(' | ')' | '-' | ' ')));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}
