use log::warn;
use std::collections::BTreeSet;

use crate::models::PrayerName;

/// Prayers logged for one calendar day.
///
/// Stored as a JSON array of prayer names under `prayers_{yyyy-MM-dd}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRecord {
    names: BTreeSet<PrayerName>,
}

impl CompletionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, prayer: PrayerName) -> bool {
        self.names.contains(&prayer)
    }

    /// Returns true when the prayer was not yet logged.
    pub fn insert(&mut self, prayer: PrayerName) -> bool {
        self.names.insert(prayer)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PrayerName> + '_ {
        self.names.iter().copied()
    }

    /// How many names in `other` are missing from `self`.
    pub fn newly_added(&self, other: &CompletionRecord) -> usize {
        other.names.difference(&self.names).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let names: Vec<PrayerName> = self.iter().collect();
        serde_json::to_string(&names)
    }

    /// Malformed input reads as an empty record; unknown names are dropped.
    pub fn from_json(raw: &str) -> Self {
        let values: Vec<String> = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring malformed completion list {:?}: {}", raw, e);
                return Self::default();
            }
        };

        let mut record = Self::default();
        for value in values {
            match value.parse::<PrayerName>() {
                Ok(prayer) => {
                    record.insert(prayer);
                }
                Err(_) => warn!("Dropping unknown prayer name {:?}", value),
            }
        }
        record
    }
}

impl FromIterator<PrayerName> for CompletionRecord {
    fn from_iter<I: IntoIterator<Item = PrayerName>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl Extend<PrayerName> for CompletionRecord {
    fn extend<I: IntoIterator<Item = PrayerName>>(&mut self, iter: I) {
        self.names.extend(iter);
    }
}
