//! # Cookie Consent
//!
//! Saved cookie-category preferences.
//!
//! - `cookies-consent` holds the category booleans as JSON
//! - `cookies-consent-date` holds the decision time as RFC 3339
//! - `necessary` is always true and not user-editable, forced on every
//!   load and save
//! - Any later decision overwrites the record; only an explicit reset
//!   removes it

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

pub const CONSENT_KEY: &str = "cookies-consent";
pub const CONSENT_DATE_KEY: &str = "cookies-consent-date";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConsentRecord {
    pub necessary: bool,
    pub analytics: bool,
    pub marketing: bool,
    pub functional: bool,
}

impl ConsentRecord {
    pub fn all_accepted() -> Self {
        Self {
            necessary: true,
            analytics: true,
            marketing: true,
            functional: true,
        }
    }

    pub fn necessary_only() -> Self {
        Self {
            necessary: true,
            analytics: false,
            marketing: false,
            functional: false,
        }
    }
}

pub struct ConsentStore<'a, S: KeyValueStore> {
    store: &'a S,
}

impl<'a, S: KeyValueStore> ConsentStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The saved record, if the user has decided before.
    pub fn load(&self) -> Option<ConsentRecord> {
        let raw = self.store.get(CONSENT_KEY)?;
        let mut record: ConsentRecord = serde_json::from_str(&raw).ok()?;

        record.necessary = true;
        Some(record)
    }

    pub fn accept_all(&self) {
        self.save(ConsentRecord::all_accepted());
    }

    pub fn accept_necessary(&self) {
        self.save(ConsentRecord::necessary_only());
    }

    pub fn save(&self, mut record: ConsentRecord) {
        record.necessary = true;

        if let Ok(raw) = serde_json::to_string(&record) {
            self.store.set(CONSENT_KEY, &raw);
            self.store.set(CONSENT_DATE_KEY, &Utc::now().to_rfc3339());
        }
    }

    pub fn decided_at(&self) -> Option<String> {
        self.store.get(CONSENT_DATE_KEY)
    }

    pub fn reset(&self) {
        self.store.remove(CONSENT_KEY);
        self.store.remove(CONSENT_DATE_KEY);
    }
}
