//! Summary numbers derived from a snapshot of the journal.
//!
//! Nothing here is cached: every call walks the catches it is given.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::CatchRecord;

pub fn total_count(catches: &[CatchRecord]) -> usize {
    catches.len()
}

/// Zero for an empty journal. `Sum` for floats would start at `-0.0`.
pub fn total_weight(catches: &[CatchRecord]) -> f64 {
    catches.iter().fold(0.0, |sum, c| sum + c.weight)
}

/// Distinct species names, compared exactly as stored.
pub fn species_count(catches: &[CatchRecord]) -> usize {
    catches
        .iter()
        .map(|c| c.species.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Distinct locations, compared exactly as stored.
pub fn location_count(catches: &[CatchRecord]) -> usize {
    catches
        .iter()
        .map(|c| c.location.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// The heaviest catch. Among equally heavy catches the one listed first wins.
pub fn personal_best(catches: &[CatchRecord]) -> Option<&CatchRecord> {
    catches.iter().fold(None, |best, c| match best {
        Some(best) if best.weight >= c.weight => Some(best),
        _ => Some(c),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub total_weight: f64,
    pub species_count: usize,
    pub location_count: usize,
    pub personal_best: Option<CatchRecord>,
}

impl Summary {
    pub fn of(catches: &[CatchRecord]) -> Self {
        Self {
            total_count: total_count(catches),
            total_weight: total_weight(catches),
            species_count: species_count(catches),
            location_count: location_count(catches),
            personal_best: personal_best(catches).cloned(),
        }
    }
}
