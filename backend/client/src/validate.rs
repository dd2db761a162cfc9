use flags::{FLAG_FIELDS, FLAG_PREFIXES, FlagSubmission};
use lazy_static::lazy_static;
use regex::Regex;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;

lazy_static! {
    static ref NAME: Regex = Regex::new(r"^[\p{L} .'-]+$").unwrap();
}

/// A field of the submission form that validation can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    /// Index into [`flags::FLAG_FIELDS`].
    Flag(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Per-field findings of one validation pass. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

/// Check a draft against the per-field rules without mutating it.
///
/// The cross-field at-least-one-flag rule lives in the submit path, not
/// here, so a name-only draft still validates cleanly.
pub fn validate(draft: &FlagSubmission) -> ValidationResult {
    let mut result = ValidationResult::default();

    if draft.name.is_empty() {
        result.push(Field::Name, "Name is required");
    } else if draft.name.chars().count() < NAME_MIN_LEN {
        result.push(
            Field::Name,
            format!("Name must be at least {NAME_MIN_LEN} characters"),
        );
    } else if draft.name.chars().count() > NAME_MAX_LEN {
        result.push(
            Field::Name,
            format!("Name must be at most {NAME_MAX_LEN} characters"),
        );
    } else if !NAME.is_match(&draft.name) {
        result.push(
            Field::Name,
            "Name may only contain letters, spaces, hyphens, apostrophes, and periods",
        );
    }

    for (index, value) in draft.flags().iter().enumerate() {
        if value.is_empty() {
            continue;
        }

        let lowered = value.to_lowercase();
        if !FLAG_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
            result.push(
                Field::Flag(index),
                format!(
                    "{} flag must start with flag{{ or CTF{{",
                    FLAG_FIELDS[index].label
                ),
            );
        }
    }

    result
}
