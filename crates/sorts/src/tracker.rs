//! Rebalancing dates to holding periods.

use famafrench_primitives::{BucketAssignment, HoldingPeriod, SortPanel};
use famafrench_traits::BucketSorter;
use tracing::{debug, info};

/// Run a sorter on every date of a panel, skipping warm-up dates.
#[must_use]
pub fn sort_panel<S: BucketSorter + ?Sized>(sorter: &S, panel: &SortPanel) -> Vec<BucketAssignment> {
    let mut out = Vec::with_capacity(panel.n_dates());
    for date in panel.dates() {
        match sorter.assign(date, panel.on(date)) {
            Some(a) => out.push(a),
            None => debug!(
                sort = sorter.name(),
                %date,
                population = panel.on(date).len(),
                required = sorter.min_population(),
                "population below threshold, skipping date"
            ),
        }
    }
    info!(sort = sorter.name(), dates = panel.n_dates(), formed = out.len(), "bucket sort complete");
    out
}

/// Pair each assignment with the next one's date as exclusive end.
///
/// Assignments are ordered by date first; `k` assignments give `k - 1`
/// periods and the last rebalancing date opens none.
#[must_use]
pub fn holding_periods(mut assignments: Vec<BucketAssignment>) -> Vec<HoldingPeriod> {
    assignments.sort_by_key(|a| a.date);
    let ends: Vec<_> = assignments.iter().skip(1).map(|a| a.date).collect();
    assignments
        .into_iter()
        .zip(ends)
        .map(|(assignment, end)| HoldingPeriod::new(assignment.date, end, assignment))
        .collect()
}
