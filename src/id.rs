use chrono::Utc;
use log::warn;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::models::{CatchId, CatchRecord};

/// Source of fresh catch identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> CatchId;
}

/// Millisecond timestamps that never repeat, even when two catches are logged
/// within the same millisecond.
#[derive(Debug, Default)]
pub struct MonotonicIds {
    last: i64,
}

impl MonotonicIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start past every numeric id in `existing`.
    pub fn after(existing: &[CatchRecord]) -> Self {
        let last = existing
            .iter()
            .filter_map(|record| record.id.as_str().parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        Self { last }
    }

    /// `None` once the counter has reached `i64::MAX`.
    fn next_with_clock(&mut self, now: i64) -> Option<i64> {
        let next = now.max(self.last.checked_add(1)?);
        self.last = next;
        Some(next)
    }
}

impl IdGenerator for MonotonicIds {
    fn next_id(&mut self) -> CatchId {
        match self.next_with_clock(Utc::now().timestamp_millis()) {
            Some(id) => CatchId::new(id.to_string()),
            None => {
                warn!("Numeric ids are exhausted, handing out a random id");
                RandomIds.next_id()
            }
        }
    }
}

/// 128 random bits from the operating system, hex encoded.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> CatchId {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);

        CatchId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    #[default]
    Monotonic,
    Random,
}

impl IdScheme {
    pub fn generator(self, existing: &[CatchRecord]) -> Box<dyn IdGenerator + Send> {
        match self {
            IdScheme::Monotonic => Box::new(MonotonicIds::after(existing)),
            IdScheme::Random => Box::new(RandomIds),
        }
    }
}

impl std::str::FromStr for IdScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monotonic" => Ok(IdScheme::Monotonic),
            "random" => Ok(IdScheme::Random),
            other => Err(format!("unknown id scheme `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_case::test_case;

    use super::*;
    use crate::models::seed_catches;

    #[test]
    fn same_millisecond_does_not_repeat() {
        let mut ids = MonotonicIds::new();

        assert_eq!(ids.next_with_clock(1_000), Some(1_000));
        assert_eq!(ids.next_with_clock(1_000), Some(1_001));
        assert_eq!(ids.next_with_clock(999), Some(1_002));
        assert_eq!(ids.next_with_clock(5_000), Some(5_000));
    }

    #[test]
    fn starts_after_existing_ids() {
        let mut ids = MonotonicIds::after(&seed_catches());

        assert_eq!(ids.next_with_clock(0), Some(4));
    }

    #[test]
    fn largest_stored_id_does_not_overflow() {
        let mut record = seed_catches().remove(0);
        record.id = CatchId::new(i64::MAX.to_string());
        let mut ids = MonotonicIds::after(&[record.clone()]);

        assert_eq!(ids.next_with_clock(0), None);

        let id = ids.next_id();
        assert_ne!(id, record.id);
        assert_eq!(id.as_str().len(), 32);
    }

    #[test]
    fn rapid_generation_is_unique() {
        let mut monotonic = MonotonicIds::new();
        let mut random = RandomIds;

        let monotonic: HashSet<_> = (0..1000).map(|_| monotonic.next_id()).collect();
        let random: HashSet<_> = (0..1000).map(|_| random.next_id()).collect();

        assert_eq!(monotonic.len(), 1000);
        assert_eq!(random.len(), 1000);
    }

    #[test]
    fn random_ids_are_hex() {
        let id = RandomIds.next_id();

        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test_case("monotonic", Some(IdScheme::Monotonic) ; "monotonic")]
    #[test_case(" Random ", Some(IdScheme::Random) ; "random with padding")]
    #[test_case("uuid", None ; "unknown")]
    fn parse_scheme(input: &str, expected: Option<IdScheme>) {
        assert_eq!(input.parse::<IdScheme>().ok(), expected);
    }
}
