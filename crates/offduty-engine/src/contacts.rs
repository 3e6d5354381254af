//! Whitelisted contacts and blocked-call log entries.

use serde::{Deserialize, Serialize};

use crate::phone;

/// A contact whose calls are always allowed.
///
/// Uniqueness is not enforced; a whitelist may list the same number twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistedContact {
    pub name: String,
    #[serde(rename = "phoneE164")]
    pub phone_e164: String,
}

impl WhitelistedContact {
    pub fn new(name: impl Into<String>, phone_e164: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_e164: phone_e164.into(),
        }
    }

    pub fn matches(&self, number: &str) -> bool {
        phone::equivalent(&self.phone_e164, number)
    }
}

/// One blocked call, as recorded in the call log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedCallEntry {
    /// Normalized caller number.
    pub number: String,
    /// Unix epoch milliseconds of the decision.
    #[serde(rename = "timestamp")]
    pub timestamp_millis: i64,
}

/// First whitelist entry matching `number`, if any.
pub fn find_match<'a>(
    whitelist: &'a [WhitelistedContact],
    number: &str,
) -> Option<&'a WhitelistedContact> {
    whitelist.iter().find(|c| c.matches(number))
}

/// Remove every entry whose number is equivalent to `number`.
///
/// Returns how many entries were removed.
pub fn remove_number(whitelist: &mut Vec<WhitelistedContact>, number: &str) -> usize {
    let before = whitelist.len();
    whitelist.retain(|c| !c.matches(number));
    before - whitelist.len()
}
