//! Per-entity folds over flat event lists.
//!
//! Summaries are never cached: every query folds the whole list again, so
//! there is no invalidation to get wrong.

use std::collections::HashMap;

use chrono::NaiveDate;

/// An event attributed to one entity (an employee) on one date.
pub trait EntityEvent {
    fn entity_id(&self) -> &str;
    fn event_date(&self) -> NaiveDate;
}

/// Outcome of an action addressed to an event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    NotFound,
}

/// The most recent event seen so far for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latest {
    pub id: u64,
    pub date: NaiveDate,
}

impl Latest {
    /// Replace only on a strictly later date; the earlier occurrence wins ties.
    pub fn offer(slot: &mut Option<Latest>, id: u64, date: NaiveDate) {
        match slot {
            Some(current) if date <= current.date => {}
            _ => *slot = Some(Latest { id, date }),
        }
    }
}

/// Left fold grouping `events` by entity. Accumulators come back in the
/// order their entity was first seen.
pub fn fold_by_entity<E, A>(
    events: &[E],
    mut seed: impl FnMut(&E) -> A,
    mut step: impl FnMut(&mut A, &E),
) -> Vec<A>
where
    E: EntityEvent,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accs: Vec<A> = Vec::new();
    for event in events {
        let slot = *index.entry(event.entity_id()).or_insert_with(|| {
            accs.push(seed(event));
            accs.len() - 1
        });
        step(&mut accs[slot], event);
    }
    accs
}

/// Events for one entity, most recent first. Events sharing a date keep
/// their insertion order.
pub fn history_for<'a, E: EntityEvent>(events: &'a [E], entity_id: &str) -> Vec<&'a E> {
    let mut history: Vec<&E> = events
        .iter()
        .filter(|e| e.entity_id() == entity_id)
        .collect();
    history.sort_by(|a, b| b.event_date().cmp(&a.event_date()));
    history
}
