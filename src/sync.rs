/// Debounced, single-writer persistence of the group cache
///
/// The engine is a state machine with no timers of its own:
///
/// ```text
/// Idle --schedule--> Scheduled --fire(current)--> Writing --settle--> Idle
///                    Scheduled --schedule------> Scheduled (older tickets go stale)
/// ```
///
/// The page calls `schedule` on every mutation, sleeps for the debounce
/// window, then hands the returned ticket to `flush`. Only the newest ticket
/// of a burst writes. A ticket that fires while another write is in flight is
/// handled by the `ReentryPolicy`.
use crate::error::StoreError;
use crate::storage::GroupStore;
use crate::tab_data::{Group, normalize_groups, now_display, prune_empty};
use log::{debug, error};
use std::cell::RefCell;

/// What happens to a ticket that fires while a write is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReentryPolicy {
    /// Drop it. The edit is lost unless another mutation schedules again.
    Discard,
    /// Keep the newest payload and write it as soon as the in-flight write settles
    #[default]
    QueueLatest,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Scheduled,
    Writing,
}

/// Handle for one scheduled write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Fire {
    /// A later `schedule` superseded this ticket
    Stale,
    /// A write was in flight and the payload was dropped
    Skipped,
    /// A write was in flight; the payload waits for `settle`
    Deferred,
    /// Persist these groups (already normalized and pruned)
    Write(Vec<Group>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    /// No newer payload arrived while writing, so the written list is the latest state
    pub current: bool,
    /// A deferred payload to fire right away
    pub refire: Option<Ticket>,
}

#[derive(Debug)]
pub struct SyncEngine {
    policy: ReentryPolicy,
    generation: u64,
    pending: Option<Vec<Group>>,
    writing: Option<u64>,
    deferred: bool,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(ReentryPolicy::default())
    }
}

impl SyncEngine {
    pub fn new(policy: ReentryPolicy) -> Self {
        SyncEngine {
            policy,
            generation: 0,
            pending: None,
            writing: None,
            deferred: false,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> SyncPhase {
        if self.writing.is_some() {
            SyncPhase::Writing
        } else if self.pending.is_some() {
            SyncPhase::Scheduled
        } else {
            SyncPhase::Idle
        }
    }

    /// Replaces any pending payload; every earlier ticket goes stale
    pub fn schedule(&mut self, groups: Vec<Group>) -> Ticket {
        self.generation += 1;
        self.pending = Some(groups);
        Ticket(self.generation)
    }

    /// Adopts `groups`, already persisted by another context, as the latest state.
    /// Every outstanding ticket goes stale. A write in flight carries an older list,
    /// so `groups` is queued to be written again once it settles.
    pub fn rebase(&mut self, groups: Vec<Group>) {
        self.generation += 1;
        if self.writing.is_some() {
            self.pending = Some(groups);
            self.deferred = true;
        } else {
            self.pending = None;
            self.deferred = false;
        }
    }

    pub fn fire(&mut self, ticket: Ticket) -> Fire {
        if ticket.0 != self.generation || self.pending.is_none() {
            return Fire::Stale;
        }
        if self.writing.is_some() {
            return match self.policy {
                ReentryPolicy::Discard => {
                    self.pending = None;
                    Fire::Skipped
                }
                ReentryPolicy::QueueLatest => {
                    self.deferred = true;
                    Fire::Deferred
                }
            };
        }
        let Some(groups) = self.pending.take() else {
            return Fire::Stale;
        };
        self.writing = Some(self.generation);
        Fire::Write(prepare_for_write(groups, &now_display()))
    }

    /// Releases the write guard. Call after every `Fire::Write`, whatever the outcome.
    pub fn settle(&mut self) -> Settled {
        let written = self.writing.take();
        let current = written == Some(self.generation) && self.pending.is_none();
        let refire = if self.deferred && self.pending.is_some() {
            Some(Ticket(self.generation))
        } else {
            None
        };
        self.deferred = false;
        Settled { current, refire }
    }
}

/// Normalizes every group and drops the ones without tabs
pub fn prepare_for_write(groups: Vec<Group>, now: &str) -> Vec<Group> {
    prune_empty(normalize_groups(groups, now))
}

/// Result of one `flush`
#[derive(Debug, Clone, PartialEq)]
pub enum Flush {
    /// Nothing written: the ticket was stale, skipped or deferred
    Idle(Fire),
    Saved {
        groups: Vec<Group>,
        current: bool,
        refire: Option<Ticket>,
    },
    Failed {
        error: StoreError,
        refire: Option<Ticket>,
    },
}

impl Flush {
    pub fn refire(&self) -> Option<Ticket> {
        match self {
            Flush::Idle(_) => None,
            Flush::Saved { refire, .. } | Flush::Failed { refire, .. } => *refire,
        }
    }
}

/// Fires `ticket` and, if it wins, writes its payload to `store`.
/// The engine is never borrowed across the write.
pub async fn flush<S: GroupStore>(engine: &RefCell<SyncEngine>, store: &S, ticket: Ticket) -> Flush {
    let fired = engine.borrow_mut().fire(ticket);
    let groups = match fired {
        Fire::Write(groups) => groups,
        other => {
            debug!("sync ticket {:?} not written: {:?}", ticket, other);
            return Flush::Idle(other);
        }
    };

    debug!("writing {} groups", groups.len());
    let result = store.save(&groups).await;
    let settled = engine.borrow_mut().settle();

    match result {
        Ok(()) => Flush::Saved {
            groups,
            current: settled.current,
            refire: settled.refire,
        },
        Err(e) => {
            error!("sync failed: {}", e);
            Flush::Failed {
                error: e,
                refire: settled.refire,
            }
        }
    }
}

/// Flushes `ticket`, then every deferred payload it hands back, in order
pub async fn flush_all<S: GroupStore>(engine: &RefCell<SyncEngine>, store: &S, ticket: Ticket) -> Vec<Flush> {
    let mut reports = Vec::new();
    let mut next = Some(ticket);
    while let Some(ticket) = next {
        let report = flush(engine, store, ticket).await;
        next = report.refire();
        reports.push(report);
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GroupCache;
    use crate::storage::MemoryStore;
    use crate::tab_data::TabRecord;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::Cell;

    /// Holds its first `save` open until the gate is released
    struct GatedStore {
        inner: MemoryStore,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
        in_flight: Cell<usize>,
        max_in_flight: Cell<usize>,
    }

    impl GatedStore {
        fn new(gate: oneshot::Receiver<()>) -> Self {
            GatedStore {
                inner: MemoryStore::new(),
                gate: RefCell::new(Some(gate)),
                in_flight: Cell::new(0),
                max_in_flight: Cell::new(0),
            }
        }
    }

    impl GroupStore for GatedStore {
        async fn load(&self) -> Result<Vec<Group>, StoreError> {
            self.inner.load().await
        }

        async fn save(&self, groups: &[Group]) -> Result<(), StoreError> {
            self.in_flight.set(self.in_flight.get() + 1);
            self.max_in_flight
                .set(self.max_in_flight.get().max(self.in_flight.get()));
            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let result = self.inner.save(groups).await;
            self.in_flight.set(self.in_flight.get() - 1);
            result
        }
    }

    /// Applies flush reports the way the manager page does
    fn apply_reports(cache: &mut GroupCache, reports: Vec<Flush>) {
        for report in reports {
            if let Flush::Saved {
                groups,
                current: true,
                ..
            } = report
            {
                cache.replace(groups);
            }
        }
    }

    fn group(id: &str, tabs: usize) -> Group {
        Group {
            id: id.to_string(),
            create_time: "2026-10-19 08:00:00".to_string(),
            custom_name: id.to_string(),
            tabs: (0..tabs)
                .map(|i| TabRecord::new(&format!("Tab {}", i), &format!("https://{}.io/{}", id, i), ""))
                .collect(),
        }
    }

    fn ids(groups: &[Group]) -> Vec<&str> {
        groups.iter().map(|g| g.id.as_str()).collect()
    }

    #[test]
    fn test_phases() {
        let mut engine = SyncEngine::default();
        assert_eq!(engine.phase(), SyncPhase::Idle);

        let ticket = engine.schedule(vec![group("a", 1)]);
        assert_eq!(engine.phase(), SyncPhase::Scheduled);

        assert!(matches!(engine.fire(ticket), Fire::Write(_)));
        assert_eq!(engine.phase(), SyncPhase::Writing);

        engine.settle();
        assert_eq!(engine.phase(), SyncPhase::Idle);
    }

    #[test]
    fn test_burst_coalesces_to_last_payload() {
        let mut engine = SyncEngine::default();
        let tickets: Vec<Ticket> = (1..=5)
            .map(|n| engine.schedule(vec![group(&format!("g{}", n), 1)]))
            .collect();

        let fired: Vec<Fire> = tickets.iter().map(|t| engine.fire(*t)).collect();

        let writes: Vec<&Fire> = fired.iter().filter(|f| matches!(f, Fire::Write(_))).collect();
        assert_eq!(writes.len(), 1);
        assert_eq!(fired[4], Fire::Write(vec![group("g5", 1)]));
        assert!(fired[..4].iter().all(|f| *f == Fire::Stale));
    }

    #[test]
    fn test_write_prunes_empty_groups() {
        let mut engine = SyncEngine::default();
        let ticket = engine.schedule(vec![group("a", 2), group("empty", 0), group("b", 1)]);

        match engine.fire(ticket) {
            Fire::Write(groups) => assert_eq!(ids(&groups), vec!["a", "b"]),
            other => panic!("expected write, got {:?}", other),
        }
    }

    #[test]
    fn test_write_normalizes_missing_fields() {
        let mut engine = SyncEngine::default();
        let ticket = engine.schedule(vec![Group {
            tabs: vec![TabRecord::default()],
            ..Group::default()
        }]);

        let Fire::Write(groups) = engine.fire(ticket) else {
            panic!("expected write");
        };
        assert!(!groups[0].id.is_empty());
        assert!(!groups[0].create_time.is_empty());
        assert_eq!(groups[0].custom_name, groups[0].create_time);
        assert_eq!(groups[0].tabs[0].url, "#");
    }

    #[test]
    fn test_discard_policy_drops_reentrant_fire() {
        let mut engine = SyncEngine::new(ReentryPolicy::Discard);
        let first = engine.schedule(vec![group("a", 1)]);
        assert!(matches!(engine.fire(first), Fire::Write(_)));

        let second = engine.schedule(vec![group("b", 1)]);
        assert_eq!(engine.fire(second), Fire::Skipped);

        // the written list predates the dropped edit, so the cache must not be replaced
        let settled = engine.settle();
        assert_eq!(settled.refire, None);
        assert!(!settled.current);
        assert_eq!(engine.phase(), SyncPhase::Idle);
    }

    #[test]
    fn test_queue_latest_refires_after_settle() {
        let mut engine = SyncEngine::new(ReentryPolicy::QueueLatest);
        let first = engine.schedule(vec![group("a", 1)]);
        assert!(matches!(engine.fire(first), Fire::Write(_)));

        let second = engine.schedule(vec![group("b", 1)]);
        assert_eq!(engine.fire(second), Fire::Deferred);
        let third = engine.schedule(vec![group("c", 1)]);
        assert_eq!(engine.fire(third), Fire::Deferred);

        let settled = engine.settle();
        assert!(!settled.current);
        let refire = settled.refire.expect("deferred payload");
        assert_eq!(engine.fire(refire), Fire::Write(vec![group("c", 1)]));
        assert!(engine.settle().current);
    }

    #[test]
    fn test_schedule_during_write_without_fire_is_not_lost() {
        let mut engine = SyncEngine::new(ReentryPolicy::Discard);
        let first = engine.schedule(vec![group("a", 1)]);
        engine.fire(first);

        let second = engine.schedule(vec![group("b", 1)]);
        let settled = engine.settle();
        assert!(!settled.current);

        // the debounce timer for `second` fires after the write settled
        assert_eq!(engine.fire(second), Fire::Write(vec![group("b", 1)]));
    }

    #[test]
    fn test_settle_clears_guard_after_failure() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let engine = RefCell::new(SyncEngine::default());

        let ticket = engine.borrow_mut().schedule(vec![group("a", 1)]);
        let report = block_on(flush(&engine, &store, ticket));

        assert!(matches!(report, Flush::Failed { error: StoreError::Write(_), .. }));
        assert_eq!(engine.borrow().phase(), SyncPhase::Idle);

        store.fail_writes(false);
        let ticket = engine.borrow_mut().schedule(vec![group("a", 1)]);
        assert!(matches!(block_on(flush(&engine, &store, ticket)), Flush::Saved { .. }));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_flush_writes_once_per_burst() {
        let store = MemoryStore::new();
        let engine = RefCell::new(SyncEngine::default());

        let tickets: Vec<Ticket> = (1..=3)
            .map(|n| engine.borrow_mut().schedule(vec![group("a", n)]))
            .collect();
        let reports: Vec<Flush> = tickets
            .into_iter()
            .map(|t| block_on(flush(&engine, &store, t)))
            .collect();

        assert_eq!(store.writes(), 1);
        assert_eq!(store.stored()[0].tabs.len(), 3);
        assert!(matches!(reports[2], Flush::Saved { current: true, .. }));
    }

    #[test]
    fn test_no_empty_group_ever_persisted() {
        let store = MemoryStore::new();
        let engine = RefCell::new(SyncEngine::default());
        let mut cache = crate::cache::GroupCache::from_groups(vec![group("a", 1), group("b", 2)]);

        cache.remove_tab(0, 0).unwrap();
        cache.remove_tab(1, 1).unwrap();
        cache.remove_tab(1, 0).unwrap();
        let ticket = engine.borrow_mut().schedule(cache.snapshot());
        block_on(flush(&engine, &store, ticket));

        assert!(store.stored().is_empty());
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_overlapping_flushes_keep_one_write_in_flight() {
        let (release, gate) = oneshot::channel();
        let store = GatedStore::new(gate);
        let engine = RefCell::new(SyncEngine::default());
        let mut cache = GroupCache::new();

        let first = engine.borrow_mut().schedule(vec![group("a", 1)]);
        let (first_report, second_report) = block_on(async {
            let writer = flush(&engine, &store, first);
            let edit_during_write = async {
                let second = engine.borrow_mut().schedule(vec![group("b", 1)]);
                let report = flush(&engine, &store, second).await;
                release.send(()).unwrap();
                report
            };
            futures::join!(writer, edit_during_write)
        });

        assert_eq!(second_report, Flush::Idle(Fire::Deferred));
        let refire = first_report.refire().expect("deferred payload refires");
        assert!(matches!(first_report, Flush::Saved { current: false, .. }));
        apply_reports(&mut cache, vec![first_report]);
        assert!(cache.is_empty());

        apply_reports(&mut cache, block_on(flush_all(&engine, &store, refire)));

        assert_eq!(store.max_in_flight.get(), 1);
        assert_eq!(store.inner.writes(), 2);
        assert_eq!(ids(&store.inner.stored()), vec!["b"]);
        assert_eq!(cache.snapshot(), store.inner.stored());
    }

    #[test]
    fn test_rebase_drops_stale_pending_edit() {
        let old = group("old", 2);
        let store = MemoryStore::with_groups(vec![old.clone()]);
        let engine = RefCell::new(SyncEngine::default());
        let mut cache = GroupCache::from_groups(vec![old.clone()]);

        cache.remove_tab(0, 0).unwrap();
        let ticket = engine.borrow_mut().schedule(cache.snapshot());

        // another context archives a window before the debounce fires
        let fresh = vec![group("fresh", 1), old];
        block_on(store.save(&fresh)).unwrap();
        engine.borrow_mut().rebase(fresh.clone());
        cache.replace(fresh.clone());

        let reports = block_on(flush_all(&engine, &store, ticket));
        apply_reports(&mut cache, reports);

        assert_eq!(ids(&store.stored()), vec!["fresh", "old"]);
        assert_eq!(cache.snapshot(), fresh);
        assert_eq!(engine.borrow().phase(), SyncPhase::Idle);
    }

    #[test]
    fn test_rebase_during_write_rewrites_adopted_list() {
        let store = MemoryStore::new();
        let engine = RefCell::new(SyncEngine::default());
        let mut cache = GroupCache::new();

        let ticket = engine.borrow_mut().schedule(vec![group("stale", 1)]);
        let Fire::Write(stale) = engine.borrow_mut().fire(ticket) else {
            panic!("expected write");
        };
        let fresh = vec![group("fresh", 1)];
        engine.borrow_mut().rebase(fresh.clone());
        cache.replace(fresh.clone());
        block_on(store.save(&stale)).unwrap();

        let settled = engine.borrow_mut().settle();
        assert!(!settled.current);
        let refire = settled.refire.expect("adopted list is rewritten");

        apply_reports(&mut cache, block_on(flush_all(&engine, &store, refire)));

        assert_eq!(ids(&store.stored()), vec!["fresh"]);
        assert_eq!(cache.snapshot(), store.stored());
    }
}
