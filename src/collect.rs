use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::warn;

use crate::models::{ActivityRecord, ActorRole};
use crate::normalize::normalize;
use crate::store::ActivityStore;

/// Fetches and normalizes every actor's events across both populations.
///
/// Fetches fan out concurrently (one task per actor) and the working set is
/// only assembled once every task has finished. Failures never escape: a
/// failed listing skips its population, a failed fetch contributes zero
/// records for that actor, and both are logged.
pub async fn collect_all<S: ActivityStore + 'static>(store: Arc<S>) -> Vec<ActivityRecord> {
    let mut actors = Vec::new();
    for population in [ActorRole::Learner, ActorRole::Instructor] {
        match store.list_actors(population).await {
            Ok(profiles) => actors.extend(profiles),
            Err(err) => warn!(
                population = population.as_str(),
                error = %err,
                "actor listing failed, population contributes no records"
            ),
        }
    }

    let mut tasks = JoinSet::new();
    for (slot, actor) in actors.into_iter().enumerate() {
        let store = Arc::clone(&store);
        tasks.spawn(async move {
            let events = match store.list_events(actor.id, actor.role).await {
                Ok(events) => events,
                Err(err) => {
                    warn!(
                        actor_id = %actor.id,
                        population = actor.role.as_str(),
                        error = %err,
                        "event fetch failed, actor contributes no records"
                    );
                    Vec::new()
                }
            };
            let records: Vec<ActivityRecord> =
                events.iter().map(|event| normalize(event, &actor)).collect();
            (slot, records)
        });
    }

    // Reassemble in actor order so emission is deterministic regardless of
    // task completion order.
    let mut slots: Vec<(usize, Vec<ActivityRecord>)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(slot) => slots.push(slot),
            Err(err) => warn!(error = %err, "event fetch task panicked"),
        }
    }
    slots.sort_by_key(|(slot, _)| *slot);

    slots
        .into_iter()
        .flat_map(|(_, records)| records)
        .collect()
}
