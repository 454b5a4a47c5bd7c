use serde::Serialize;

use crate::meals::MealRecord;

/// Dietary adherence statistics over one session's meals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    pub total: u64,
    pub on_diet_count: u64,
    pub off_diet_count: u64,
    /// Longest run of consecutive on-diet meals.
    pub best_streak: u64,
}

/// Computes [`SummaryResult`] in a single pass.
///
/// `records` must already be in chronological order; no sorting happens
/// here, so the streak follows whatever order the caller supplies.
pub fn summarize<'a, I>(records: I) -> SummaryResult
where
    I: IntoIterator<Item = &'a MealRecord>,
{
    let mut summary = SummaryResult::default();
    let mut current = 0;
    for record in records {
        summary.total += 1;
        if record.on_diet {
            summary.on_diet_count += 1;
            current += 1;
            summary.best_streak = summary.best_streak.max(current);
        } else {
            current = 0;
        }
    }
    summary.off_diet_count = summary.total - summary.on_diet_count;
    summary
}
