use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::collect;
use crate::models::{ActivityGroup, ActivityRecord};
use crate::store::ActivityStore;

pub const DEFAULT_LIMIT: usize = 20;

/// Orders by timestamp descending and truncates to the newest `limit`
/// records. Absent timestamps sort strictly oldest (collector order among
/// themselves). Truncation happens after the global sort so no population
/// can starve another.
pub fn rank(mut records: Vec<ActivityRecord>, limit: usize) -> Vec<ActivityRecord> {
    // Option<DateTime> orders None first, so comparing b to a puts the
    // newest timestamps first and absent ones last. sort_by is stable.
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records.truncate(limit);
    records
}

/// Groups a ranked sequence into day buckets relative to `now` (UTC calendar
/// days). Records without a timestamp are skipped. Buckets appear in the
/// order their label is first encountered, which for a ranked input means
/// recency order.
pub fn bucketize(records: &[ActivityRecord], now: DateTime<Utc>) -> Vec<ActivityGroup> {
    let today = now.date_naive();
    let mut groups: Vec<ActivityGroup> = Vec::new();

    for record in records {
        let Some(timestamp) = record.timestamp else {
            continue;
        };
        let date = timestamp.date_naive();
        let label = match today.signed_duration_since(date).num_days() {
            0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            _ => date.format("%b %-d, %Y").to_string(),
        };

        match groups.iter_mut().find(|group| group.label == label) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(ActivityGroup {
                label,
                records: vec![record.clone()],
            }),
        }
    }

    groups
}

/// One engine instance per store handle. Each `recent_feed` call is a fully
/// independent run: fresh working set, no shared cache, result replaces
/// whatever the caller held before.
pub struct FeedEngine<S> {
    store: Arc<S>,
}

impl<S: ActivityStore + 'static> FeedEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn recent_feed(&self, limit: usize) -> Vec<ActivityGroup> {
        self.recent_feed_at(limit, Utc::now()).await
    }

    /// Same run with a pinned bucketing clock.
    pub async fn recent_feed_at(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<ActivityGroup> {
        let collected = collect::collect_all(Arc::clone(&self.store)).await;
        let ranked = rank(collected, limit);
        bucketize(&ranked, now)
    }
}
