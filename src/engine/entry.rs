//! Key list entries

use crate::error::ViewerError;

/// One discovered key and its rendered value.
///
/// For a failed fetch `value_text` holds the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub key_type: String,
    pub key: String,
    pub value_text: String,
    pub is_error: bool,
}

impl KeyEntry {
    pub fn loaded(key: impl Into<String>, key_type: impl Into<String>, value_text: String) -> Self {
        Self {
            key_type: key_type.into(),
            key: key.into(),
            value_text,
            is_error: false,
        }
    }

    pub fn failed(key: impl Into<String>, key_type: impl Into<String>, error: &ViewerError) -> Self {
        Self {
            key_type: key_type.into(),
            key: key.into(),
            value_text: error.to_string(),
            is_error: true,
        }
    }

    /// Second line of the list item
    pub fn description(&self) -> String {
        if self.is_error {
            return format!("get error: {}", self.value_text);
        }
        let len = self.value_text.len();
        format!(
            "key: {} bytes, value: {} B ({})",
            self.key.len(),
            len,
            humanize_bytes(len as u64)
        )
    }
}

/// SI byte size: `82 B`, `1.2 kB`, `13 MB`
pub fn humanize_bytes(size: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
    if size < 10 {
        return format!("{} B", size);
    }
    let exp = ((size as f64).ln() / 1000f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = ((size as f64) / 1000f64.powi(exp as i32) * 10.0 + 0.5).floor() / 10.0;
    if value < 10.0 {
        format!("{:.1} {}", value, UNITS[exp])
    } else {
        format!("{:.0} {}", value, UNITS[exp])
    }
}
