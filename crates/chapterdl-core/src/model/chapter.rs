use std::fmt;

use crate::url_model::sanitize_filename;

/// Chapter identifier as returned by URL discovery (e.g. `"Chapter 12"`, `"Cap. 10.5"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterId(String);

impl ChapterId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into().trim().to_string())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// First decimal number in the label (`"Chapter 10.5 - Finale"` → 10.5).
    pub fn number(&self) -> Option<f64> {
        number_token(&self.0)?.parse().ok()
    }

    /// Folder name: `Chapter_<NN>` with the integer part padded to two digits.
    pub fn folder_name(&self) -> String {
        let Some(token) = number_token(&self.0) else {
            return self.label_folder_name();
        };
        let (int_part, frac_part) = match token.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (token, None),
        };
        let padded = match int_part.parse::<u64>() {
            Ok(n) => format!("{:02}", n),
            Err(_) => int_part.to_string(),
        };
        match frac_part {
            Some(f) => format!("Chapter_{}.{}", padded, f),
            None => format!("Chapter_{}", padded),
        }
    }

    /// `Chapter_<sanitized label>`; used when the number alone is ambiguous.
    pub fn label_folder_name(&self) -> String {
        format!("Chapter_{}", sanitize_filename(&self.0))
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digits, optionally followed by `.` and more digits.
fn number_token(label: &str) -> Option<&str> {
    let bytes = label.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    Some(&label[start..end])
}
