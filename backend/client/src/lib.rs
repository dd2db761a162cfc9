//! # Client Pipeline
//!
//! Everything that happens before a submission reaches the network.
//!
//! ## Flow
//!
//! - Every keystroke runs through [`sanitize::sanitize`] before landing in
//!   the draft
//! - On submit, [`validate::validate`] checks the name and each non-empty
//!   flag and returns one message per offending field
//! - A submission also needs at least one flag, a cross-field rule separate
//!   from per-field validation
//! - [`ledger::RateLimiter`] holds a rolling window of submission
//!   timestamps in local storage, max 5 per hour
//! - Checking capacity and consuming a slot are the same operation, so a
//!   denied attempt never touches the stored ledger
//! - Only then does [`submit::SubmitClient`] fetch a delivery token and
//!   POST the draft
//!
//! ## Storage
//!
//! - Local persistence goes through the [`storage::KeyValueStore`] trait
//! - Tests run against [`storage::MemoryStore`], the UI binds the same
//!   logic to real browser storage
//! - Keys: `flag-submissions` (ledger), `cookies-consent` and
//!   `cookies-consent-date` (consent record)
//!
//! ## Notes
//!
//! - The rate limit is per storage profile, not per identity. Advisory
//!   only, not a security boundary.
//! - Two tabs racing the same ledger can both observe capacity and both
//!   append, slightly exceeding the cap. Acceptable.

pub mod consent;
pub mod error;
pub mod ledger;
pub mod sanitize;
pub mod storage;
pub mod submit;
pub mod validate;
