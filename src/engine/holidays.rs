// src/engine/holidays.rs

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::Holiday;

/// Branch-applicable non-teaching dates, indexed for O(1) membership tests
/// during enumeration and projection.
#[derive(Debug, Default)]
pub struct HolidaySet {
    dates: HashSet<NaiveDate>,
}

impl HolidaySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_branch(rows: &[Holiday], branch_id: i64) -> Self {
        Self {
            dates: rows
                .iter()
                .filter(|h| h.applies_to(branch_id))
                .map(|h| h.date)
                .collect(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}
