// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! vCard 2.1/3.0 Line Builder
//!
//! Accumulates CRLF-terminated content lines. Type parameters, escaping and
//! charset tagging follow the target version; long lines are folded.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::VCardVersion;

/// Builds one encoded vCard.
#[derive(Debug)]
pub struct VCardBuilder {
    version: VCardVersion,
    fold_width: usize,
    out: String,
}

impl VCardBuilder {
    /// Starts a vCard with the `BEGIN` and `VERSION` lines.
    pub fn new(version: VCardVersion, fold_width: usize) -> Self {
        let mut builder = VCardBuilder {
            version,
            fold_width,
            out: String::with_capacity(256),
        };
        builder.push_line("BEGIN:VCARD");
        builder.push_line(&format!("VERSION:{}", version.as_str()));
        builder
    }

    /// Adds an escaped text property.
    pub fn text(&mut self, name: &str, types: &[&str], value: &str) -> &mut Self {
        let escaped = self.escape(value);
        let line = format!(
            "{}{}{}:{}",
            name,
            self.type_params(types),
            self.charset_param(value),
            escaped
        );
        self.push_line(&line);
        self
    }

    /// Adds a structured property; each component is escaped separately.
    pub fn structured(&mut self, name: &str, types: &[&str], components: &[&str]) -> &mut Self {
        let value = components
            .iter()
            .map(|component| self.escape(component))
            .collect::<Vec<_>>()
            .join(";");
        let charset = self.charset_param(&components.concat());
        let line = format!("{}{}{}:{}", name, self.type_params(types), charset, value);
        self.push_line(&line);
        self
    }

    /// Adds a property whose value and parameters are written verbatim.
    pub fn raw(&mut self, name: &str, params: &[&str], value: &str) -> &mut Self {
        let mut line = String::from(name);
        for param in params {
            line.push(';');
            line.push_str(param);
        }
        line.push(':');
        line.push_str(value);
        self.push_line(&line);
        self
    }

    /// Adds a typed property with an unescaped value, such as `TEL`.
    pub fn raw_typed(&mut self, name: &str, types: &[&str], value: &str) -> &mut Self {
        let line = format!("{}{}:{}", name, self.type_params(types), value);
        self.push_line(&line);
        self
    }

    /// Adds a base64 `PHOTO` property.
    pub fn photo(&mut self, data: &[u8]) -> &mut Self {
        let encoded = BASE64.encode(data);
        let image_type = image_type(data);
        match self.version {
            VCardVersion::V21 => {
                self.push_line(&format!("PHOTO;ENCODING=BASE64;{}:{}", image_type, encoded));
                // Inline binary data on 2.1 ends with an empty line.
                self.out.push_str("\r\n");
            }
            VCardVersion::V30 => {
                self.push_line(&format!("PHOTO;ENCODING=b;TYPE={}:{}", image_type, encoded));
            }
        }
        self
    }

    /// Finishes the vCard with `END:VCARD`.
    pub fn build(mut self) -> String {
        self.push_line("END:VCARD");
        self.out
    }

    fn type_params(&self, types: &[&str]) -> String {
        if types.is_empty() {
            return String::new();
        }
        match self.version {
            VCardVersion::V21 => types.iter().map(|t| format!(";{}", t)).collect(),
            VCardVersion::V30 => format!(";TYPE={}", types.join(",")),
        }
    }

    fn charset_param(&self, value: &str) -> &'static str {
        if self.version == VCardVersion::V21 && !value.is_ascii() {
            ";CHARSET=UTF-8"
        } else {
            ""
        }
    }

    fn escape(&self, value: &str) -> String {
        match self.version {
            VCardVersion::V21 => value.replace(';', "\\;"),
            VCardVersion::V30 => value
                .replace('\\', "\\\\")
                .replace(',', "\\,")
                .replace(';', "\\;")
                .replace("\r\n", "\\n")
                .replace('\n', "\\n"),
        }
    }

    /// Appends one logical line. Embedded newlines (2.1 only) become
    /// continuation lines.
    fn push_line(&mut self, line: &str) {
        for (index, segment) in line.split('\n').enumerate() {
            let segment = segment.trim_end_matches('\r');
            if index > 0 {
                self.out.push_str("\r\n ");
            }
            self.out.push_str(&fold_line(segment, self.fold_width));
        }
        self.out.push_str("\r\n");
    }
}

/// Folds a line to at most `width` octets per physical line.
///
/// Continuation lines start with a single space. Folds only at UTF-8
/// character boundaries.
pub fn fold_line(line: &str, width: usize) -> String {
    if line.len() <= width {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / width * 3);
    let mut current_len = 0;
    let mut first_segment = true;

    for c in line.chars() {
        let char_len = c.len_utf8();
        let effective_max = if first_segment { width } else { width.saturating_sub(1) };

        if current_len + char_len > effective_max && current_len > 0 {
            result.push_str("\r\n ");
            current_len = 1;
            first_segment = false;
        }

        result.push(c);
        current_len += char_len;
    }

    result
}

fn image_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        "PNG"
    } else if data.starts_with(b"GIF8") {
        "GIF"
    } else {
        "JPEG"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_params_by_version() {
        let mut v21 = VCardBuilder::new(VCardVersion::V21, 75);
        v21.raw("TEL", &["CELL"], "5551234").text("EMAIL", &["HOME", "PREF"], "a@b.example");
        let out = v21.build();
        assert!(out.contains("TEL;CELL:5551234\r\n"));
        assert!(out.contains("EMAIL;HOME;PREF:a@b.example\r\n"));

        let mut v30 = VCardBuilder::new(VCardVersion::V30, 75);
        v30.text("EMAIL", &["HOME", "PREF"], "a@b.example");
        assert!(v30.build().contains("EMAIL;TYPE=HOME,PREF:a@b.example\r\n"));
    }

    #[test]
    fn test_escaping() {
        let mut v30 = VCardBuilder::new(VCardVersion::V30, 75);
        v30.text("NOTE", &[], "a,b;c\\d\ne");
        assert!(v30.build().contains("NOTE:a\\,b\\;c\\\\d\\ne\r\n"));

        let mut v21 = VCardBuilder::new(VCardVersion::V21, 75);
        v21.text("NOTE", &[], "a,b;c\nnext");
        assert!(v21.build().contains("NOTE:a,b\\;c\r\n next\r\n"));
    }

    #[test]
    fn test_charset_on_v21_only() {
        let mut v21 = VCardBuilder::new(VCardVersion::V21, 75);
        v21.structured("N", &[], &["Müller", "Anna", "", "", ""]);
        assert!(v21.build().contains("N;CHARSET=UTF-8:Müller;Anna;;;\r\n"));

        let mut v30 = VCardBuilder::new(VCardVersion::V30, 75);
        v30.structured("N", &[], &["Müller", "Anna", "", "", ""]);
        assert!(v30.build().contains("N:Müller;Anna;;;\r\n"));
    }

    #[test]
    fn test_photo_encoding() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        let mut v21 = VCardBuilder::new(VCardVersion::V21, 75);
        v21.photo(&jpeg);
        assert!(v21
            .build()
            .contains("PHOTO;ENCODING=BASE64;JPEG:/9j/4A==\r\n\r\nEND:VCARD"));

        let png = [0x89, b'P', b'N', b'G'];
        let mut v30 = VCardBuilder::new(VCardVersion::V30, 75);
        v30.photo(&png);
        assert!(v30.build().contains("PHOTO;ENCODING=b;TYPE=PNG:"));
    }

    #[test]
    fn test_short_line_unchanged() {
        assert_eq!(fold_line("FN:John Doe", 75), "FN:John Doe");
    }

    #[test]
    fn test_fold_at_width() {
        let folded = fold_line(&"X".repeat(80), 75);
        let first: String = folded.chars().take_while(|&c| c != '\r').collect();
        assert_eq!(first.len(), 75);
        assert_eq!(folded.replace("\r\n ", ""), "X".repeat(80));
    }

    #[test]
    fn test_fold_respects_utf8() {
        let line = format!("NOTE:{}", "日".repeat(30));
        let folded = fold_line(&line, 75);
        for part in folded.split("\r\n ") {
            assert!(part.len() <= 75);
        }
        assert_eq!(folded.replace("\r\n ", ""), line);
    }
}
