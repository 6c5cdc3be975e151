use crate::domain::record::{Record, ScoredRecord};
use crate::domain::scoring;

pub const DEFAULT_LIMIT: usize = 5;

/// Scores every record and returns the best `limit` of them, highest score first.
///
/// Ties keep their input order (`sort_by` is stable), so the same catalog always yields the
/// same ranking.
pub fn rank(records: Vec<Record>, limit: usize) -> Vec<ScoredRecord> {
    let mut scored: Vec<ScoredRecord> = records
        .into_iter()
        .map(|record| {
            let score = scoring::score(&record);
            ScoredRecord { record, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}
