//! # Flags
//!
//! Shared submission types between the client pipeline and the server.
//!
//! ## Overall Payloads
//!
//! Requests/responses between the form and the backend.
//!
//! ### Submission
//! - JSON, `{name, flag1, flag2, flag3, flag4}`, all strings
//! - Missing fields default to empty strings instead of failing parse
//! - `x-csrf-token` header carries the delivery token from `/api/csrf-token`
//!
//! ### Fields
//! - The four challenge fields are a fixed ordered list, each with its own
//!   label and description
//! - Addressing fields by index instead of by string key keeps the form,
//!   the validator, and the email renderer in sync

use serde::{Deserialize, Serialize};

/// Accepted case-insensitive flag prefixes.
pub const FLAG_PREFIXES: [&str; 2] = ["flag{", "ctf{"];

/// Metadata for one challenge field.
pub struct FlagField {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// The four challenge fields, in form order.
pub const FLAG_FIELDS: [FlagField; 4] = [
    FlagField {
        key: "flag1",
        label: "Network/DNS",
        description: "DNS records investigation",
    },
    FlagField {
        key: "flag2",
        label: "Crypto/XOR",
        description: "XOR Marathon challenge",
    },
    FlagField {
        key: "flag3",
        label: "Web/Email",
        description: "Hidden flag email challenge",
    },
    FlagField {
        key: "flag4",
        label: "Steganography",
        description: "AI Espionage challenge",
    },
];

/// A flag submission as it travels over the wire.
///
/// Doubles as the in-progress draft on the client side.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flag1: String,
    #[serde(default)]
    pub flag2: String,
    #[serde(default)]
    pub flag3: String,
    #[serde(default)]
    pub flag4: String,
}

impl FlagSubmission {
    /// Flag values in `FLAG_FIELDS` order.
    pub fn flags(&self) -> [&str; 4] {
        [&self.flag1, &self.flag2, &self.flag3, &self.flag4]
    }

    pub fn flag_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.flag1,
            1 => &mut self.flag2,
            2 => &mut self.flag3,
            3 => &mut self.flag4,
            _ => panic!("no flag field at index {index}"),
        }
    }

    /// Cross-field rule: a submission needs at least one flag.
    pub fn has_flags(&self) -> bool {
        self.flags().iter().any(|flag| !flag.is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_empty() {
        let parsed: FlagSubmission = serde_json::from_str(r#"{"name":"Alice"}"#).unwrap();

        assert_eq!(parsed.name, "Alice");
        assert_eq!(parsed.flags(), ["", "", "", ""]);
        assert!(!parsed.has_flags());
    }

    #[test]
    fn test_has_flags() {
        let mut submission = FlagSubmission::default();
        assert!(!submission.has_flags());

        *submission.flag_mut(2) = "CTF{abc}".to_string();
        assert!(submission.has_flags());
        assert_eq!(submission.flag3, "CTF{abc}");
    }

    #[test]
    fn test_clear() {
        let mut submission = FlagSubmission {
            name: "Alice".to_string(),
            flag1: "CTF{abc}".to_string(),
            ..Default::default()
        };

        submission.clear();
        assert_eq!(submission, FlagSubmission::default());
    }
}
