//! Quarter templates and result merging.

use super::{Quarter, QuarterError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A quarter paired with the number of events that fell in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterCount {
    pub quarter: Quarter,
    pub count: i64,
}

/// Every quarter of a date range in chronological order, each with a count.
///
/// Built zero-filled by [`build_quarter_template`] so that quarters with no
/// activity still show up in reports and on chart axes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuarterTemplate {
    entries: Vec<QuarterCount>,
}

impl QuarterTemplate {
    pub fn entries(&self) -> &[QuarterCount] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quarters in chronological order.
    pub fn quarters(&self) -> impl Iterator<Item = Quarter> + '_ {
        self.entries.iter().map(|e| e.quarter)
    }

    /// Labels in chronological order (the chart x axis).
    pub fn labels(&self) -> Vec<String> {
        self.quarters().map(|q| q.label()).collect()
    }

    /// Counts in template order.
    pub fn counts(&self) -> Vec<i64> {
        self.entries.iter().map(|e| e.count).collect()
    }

    /// Sum of all counts.
    pub fn total(&self) -> i64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Looks up the count recorded for `label`.
    pub fn get(&self, label: &str) -> Option<i64> {
        self.position(label).map(|i| self.entries[i].count)
    }

    /// Returns the quarter a date is bucketed into.
    ///
    /// Mirrors the generated `CASE WHEN date <= cutoff` expression: the first
    /// quarter whose last day is on or after `date`, or the final quarter when
    /// `date` is later than every cutoff. Returns `None` for an empty template.
    pub fn bucket_for(&self, date: NaiveDate) -> Option<Quarter> {
        let (last, rest) = self.entries.split_last()?;
        rest.iter()
            .map(|e| e.quarter)
            .find(|q| date <= q.last_day())
            .or(Some(last.quarter))
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.quarter.label() == label)
    }
}

/// Builds the cutoff list and zero-filled template for a date range.
///
/// Walks from the quarter containing `start` to the quarter containing `end`
/// (inclusive), one quarter at a time. Each quarter except the last
/// contributes its last day to the cutoff list, so the returned list is
/// always one shorter than the template.
pub fn build_quarter_template(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(Vec<NaiveDate>, QuarterTemplate), QuarterError> {
    if start > end {
        return Err(QuarterError::InvalidRange { start, end });
    }

    let last = Quarter::containing(end);
    let mut current = Quarter::containing(start);
    let mut cutoffs = Vec::new();
    let mut entries = vec![QuarterCount {
        quarter: current,
        count: 0,
    }];

    while current < last {
        cutoffs.push(current.last_day());
        current = current.next();
        entries.push(QuarterCount {
            quarter: current,
            count: 0,
        });
    }

    Ok((cutoffs, QuarterTemplate { entries }))
}

/// Overlays sparse `(label, count)` results onto a copy of `template`.
///
/// Labels are matched by exact string equality and the count replaces the
/// template's. The input template is left untouched, so one template can be
/// filled independently for any number of categories.
pub fn merge_results<I, S>(template: &QuarterTemplate, raw: I) -> Result<QuarterTemplate, QuarterError>
where
    I: IntoIterator<Item = (S, i64)>,
    S: AsRef<str>,
{
    let mut filled = template.clone();
    for (label, count) in raw {
        let label = label.as_ref();
        let index = filled
            .position(label)
            .ok_or_else(|| QuarterError::UnknownQuarter {
                label: label.to_string(),
            })?;
        filled.entries[index].count = count;
    }
    Ok(filled)
}
