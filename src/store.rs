//! The tuple space itself: the synchronized, indexed collection of tuples
//! that `out`/`rd`/`in`/`rdp`/`inp` operate on (spec section 4.6,
//! component C6).
//!
//! Grounded in `original_source/src/LindaDB/public/ldb/store.hxx`. The
//! original pairs a `shared_mutex`-guarded index with a tiny
//! `atomic<int>`/`mutex`/`condition_variable` trio used purely as a wakeup
//! channel: `out` marks "something changed" and notifies one waiter;
//! blocked `rd`/`in` calls loop on "did I get it yet; did something change
//! since I last checked; otherwise sleep" rather than waiting on the data
//! itself. That increment-before-notify shape is what keeps a notification
//! from being lost if it lands between a failed lookup and the wait call —
//! the retry loop re-checks `check_and_reset_sync_need()` before
//! re-blocking. This module reproduces it with
//! `std::sync::{RwLock, Mutex, Condvar}` plus `AtomicUsize`, per spec
//! section 5's mandate for OS-thread blocking with no cooperative
//! scheduling (the teacher repo's own concurrency primitives wrap
//! `tokio::sync`, which this crate deliberately does not pull in — see
//! `DESIGN.md`).

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Condvar, Mutex, RwLock};

use crate::broadcast::{Broadcast, NullBroadcast};
use crate::config::StoreConfig;
use crate::index::Tree;
use crate::template::Template;
use crate::tuple::Tuple;

/// The in-memory tuple space.
///
/// Cheap to share across threads behind an `Arc<Store>`: every method takes
/// `&self`, with interior locking scoped as tightly as the original's
/// `shared_lock`/`scoped_lock` split (reads take a shared lock on the
/// index; mutations take an exclusive one, held only while touching the
/// tree itself, never while blocking on a broadcast round or condvar).
pub struct Store {
    index: RwLock<Tree<Tuple>>,
    sync_needed: AtomicUsize,
    read_mtx: Mutex<()>,
    wait_read: Condvar,
    broadcast: Box<dyn Broadcast>,
    config: StoreConfig,
}

impl Store {
    /// Creates an empty store with the default (no-op) broadcast sink.
    pub fn new(config: StoreConfig) -> Self {
        Store {
            index: RwLock::new(Tree::new(config.payload_capacity())),
            sync_needed: AtomicUsize::new(0),
            read_mtx: Mutex::new(()),
            wait_read: Condvar::new(),
            broadcast: Box::new(NullBroadcast),
            config,
        }
    }

    /// Creates an empty store wired up to a replication transport.
    pub fn with_broadcast(config: StoreConfig, broadcast: Box<dyn Broadcast>) -> Self {
        Store {
            broadcast,
            ..Self::new(config)
        }
    }

    /// `out`: inserts `tuple`, unconditionally (the tuple space is a
    /// multiset — inserting an equal tuple twice leaves two copies).
    ///
    /// Broadcasts before the local mutation settles, matching the
    /// original's `out`: the await handle is obtained first, the tree is
    /// updated under an exclusive lock, and the handle is joined *while
    /// that lock is still held* (spec section 5: the Awaiter wait must be
    /// held under the writer lock so peers observe mutations in the same
    /// order the local store commits them) before readers are notified.
    pub fn insert(&self, tuple: Tuple) {
        log::trace!("out: inserting a tuple of arity {}", tuple.len());
        let awaiter = self.broadcast.on_insert(&tuple);
        {
            let mut index = self.index.write().expect("index lock poisoned");
            index.insert(tuple);
            awaiter.join();
        }
        self.notify_readers();
    }

    /// `rdp`: a single non-blocking attempt to find a tuple matching
    /// `template`, leaving it in the space.
    pub fn try_read(&self, template: &Template) -> Option<Tuple> {
        let index = self.index.read().expect("index lock poisoned");
        index.search(|t: &Tuple| template.match_tuple(t)).cloned()
    }

    /// `inp`: a single non-blocking attempt to find and remove a tuple
    /// matching `template`.
    ///
    /// As with [`Store::insert`], the broadcast awaiter is joined while the
    /// writer lock is still held, so a peer never observes this removal out
    /// of order relative to whatever the writer lock serializes it against
    /// locally (spec section 5).
    pub fn try_take(&self, template: &Template) -> Option<Tuple> {
        let mut index = self.index.write().expect("index lock poisoned");
        let removed = index.remove(|t: &Tuple| template.match_tuple(t));
        if let Some(tuple) = &removed {
            log::trace!("in: removed a tuple of arity {}", tuple.len());
            self.broadcast.on_remove(tuple).join();
        }
        removed
    }

    /// `rd`: blocks until a tuple matching `template` is found, then
    /// returns it without removing it.
    pub fn read(&self, template: &Template) -> Tuple {
        loop {
            if let Some(found) = self.try_read(template) {
                return found;
            }
            if self.check_and_reset_sync_need() {
                continue;
            }
            self.wait_for_sync();
        }
    }

    /// `in`: blocks until a tuple matching `template` is found, removing
    /// it before returning.
    pub fn take(&self, template: &Template) -> Tuple {
        loop {
            if let Some(found) = self.try_take(template) {
                return found;
            }
            if self.check_and_reset_sync_need() {
                continue;
            }
            self.wait_for_sync();
        }
    }

    /// A point-in-time copy of every tuple currently in the space, in
    /// index order. Diagnostic only — the space may have changed by the
    /// time the caller reads the result.
    pub fn snapshot(&self) -> Vec<Tuple> {
        let index = self.index.read().expect("index lock poisoned");
        index.iter().cloned().collect()
    }

    /// The number of tuples currently in the space.
    pub fn len(&self) -> usize {
        self.index.read().expect("index lock poisoned").len()
    }

    /// True if the space holds no tuples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn wait_for_sync(&self) {
        let guard = self.read_mtx.lock().expect("read lock poisoned");
        let _guard = self
            .wait_read
            .wait_while(guard, |_| !self.check_sync_need())
            .expect("read lock poisoned");
    }

    fn notify_readers(&self) {
        self.mark_sync_need();
        if self.config.notify_all() {
            self.wait_read.notify_all();
        } else {
            self.wait_read.notify_one();
        }
    }

    fn check_and_reset_sync_need(&self) -> bool {
        self.sync_needed.swap(0, AtomicOrdering::AcqRel) > 0
    }

    fn check_sync_need(&self) -> bool {
        self.sync_needed.load(AtomicOrdering::Acquire) > 0
    }

    fn mark_sync_need(&self) {
        self.sync_needed.fetch_add(1, AtomicOrdering::AcqRel);
    }
}

impl Default for Store {
    fn default() -> Self {
        Store::new(
            StoreConfig::default()
                .build()
                .expect("the default configuration is always valid"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, ValueTag};
    use std::sync::Arc;
    use std::time::Duration;

    fn tup(values: Vec<Value>) -> Tuple {
        Tuple::from_values(values).unwrap()
    }

    #[test]
    fn insert_then_try_read_finds_it_without_removing() {
        let store = Store::default();
        store.insert(tup(vec!["k".into(), 1i32.into()]));
        let template = Template::new(tup(vec!["k".into(), Value::wildcard(ValueTag::Int32)]));
        assert!(store.try_read(&template).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn try_take_removes_the_matched_tuple() {
        let store = Store::default();
        store.insert(tup(vec!["k".into(), 1i32.into()]));
        let template = Template::new(tup(vec!["k".into(), Value::wildcard(ValueTag::Int32)]));
        let found = store.try_take(&template).unwrap();
        assert_eq!(found[1], Value::Int32(1));
        assert!(store.is_empty());
        assert!(store.try_take(&template).is_none());
    }

    #[test]
    fn duplicate_tuples_are_distinct_multiset_members() {
        let store = Store::default();
        store.insert(tup(vec!["dup".into()]));
        store.insert(tup(vec!["dup".into()]));
        assert_eq!(store.len(), 2);
        let template = Template::new(tup(vec!["dup".into()]));
        store.try_take(&template).unwrap();
        assert_eq!(store.len(), 1);
        store.try_take(&template).unwrap();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn blocking_take_is_released_by_a_concurrent_insert() {
        let store = Arc::new(Store::default());
        let reader_store = Arc::clone(&store);
        let handle = std::thread::spawn(move || {
            let template = Template::new(tup(vec!["signal".into()]));
            reader_store.take(&template)
        });

        // give the blocking reader time to reach the condvar wait.
        std::thread::sleep(Duration::from_millis(50));
        store.insert(tup(vec!["signal".into()]));

        let found = handle.join().expect("reader thread should not panic");
        assert_eq!(found, tup(vec!["signal".into()]));
    }

    #[test]
    fn non_matching_insert_does_not_satisfy_a_blocked_take() {
        let store = Arc::new(Store::default());
        let reader_store = Arc::clone(&store);
        let handle = std::thread::spawn(move || {
            let template = Template::new(tup(vec!["target".into()]));
            reader_store.take(&template)
        });

        std::thread::sleep(Duration::from_millis(30));
        store.insert(tup(vec!["decoy".into()]));
        std::thread::sleep(Duration::from_millis(30));
        assert!(!handle.is_finished());

        store.insert(tup(vec!["target".into()]));
        let found = handle.join().expect("reader thread should not panic");
        assert_eq!(found, tup(vec!["target".into()]));
    }
}
