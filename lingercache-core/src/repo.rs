use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::Item;

/// Identity of an instance: the address of its `Arc` allocation.
///
/// The repo keeps the `Arc` alive while the key is stored, so the address
/// cannot be reused by another instance in the meantime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct InstanceKey(usize);

impl InstanceKey {
    pub(crate) fn of<I>(instance: &Arc<I>) -> Self {
        Self(Arc::as_ptr(instance) as *const () as usize)
    }
}

/// Items keyed by instance identity.
///
/// Every operation runs under a single mutex. `lock()` hands that mutex out
/// so a caller can chain several operations into one critical section.
pub(crate) struct ItemsRepo<I> {
    items: Mutex<HashMap<InstanceKey, Arc<Item<I>>>>,
}

/// Exclusive access to the repo for the lifetime of the guard.
pub(crate) struct RepoGuard<'a, I> {
    items: MutexGuard<'a, HashMap<InstanceKey, Arc<Item<I>>>>,
}

impl<I> ItemsRepo<I> {
    pub(crate) fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn lock(&self) -> RepoGuard<'_, I> {
        RepoGuard {
            items: self.items.lock(),
        }
    }

    pub(crate) fn get_by(&self, instance: &Arc<I>) -> Option<Arc<Item<I>>> {
        self.lock().get_by(instance)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.lock().len()
    }
}

impl<I> RepoGuard<'_, I> {
    pub(crate) fn get_by(&self, instance: &Arc<I>) -> Option<Arc<Item<I>>> {
        self.items.get(&InstanceKey::of(instance)).cloned()
    }

    /// Stores `item` unless its instance already has one; returns whichever item is stored.
    pub(crate) fn add(&mut self, item: Arc<Item<I>>) -> Arc<Item<I>> {
        let key = InstanceKey::of(item.instance());
        Arc::clone(self.items.entry(key).or_insert(item))
    }

    pub(crate) fn get_dead_items(&self, ttl: Duration, now: Instant) -> Vec<Arc<Item<I>>> {
        self.items
            .values()
            .filter(|item| item.is_dead(ttl, now))
            .cloned()
            .collect()
    }

    /// Removes the given items. Items that are no longer stored are skipped.
    pub(crate) fn remove(&mut self, items: &[Arc<Item<I>>]) -> usize {
        let mut removed = 0;
        for item in items {
            let key = InstanceKey::of(item.instance());
            if matches!(self.items.get(&key), Some(stored) if Arc::ptr_eq(stored, item)) {
                self.items.remove(&key);
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::test_item;
    use crate::{Clock, ManualClock};

    fn repo_with_clock() -> (ItemsRepo<String>, Arc<ManualClock>) {
        (ItemsRepo::new(), Arc::new(ManualClock::new()))
    }

    #[test]
    fn test_lookup_is_by_identity() {
        let (repo, clock) = repo_with_clock();
        let a = Arc::new("same".to_string());
        let b = Arc::new("same".to_string());

        repo.lock().add(Arc::new(test_item(Arc::clone(&a), clock)));

        assert!(repo.get_by(&a).is_some());
        assert!(repo.get_by(&b).is_none());
    }

    #[test]
    fn test_add_keeps_first_item() {
        let (repo, clock) = repo_with_clock();
        let instance = Arc::new("shader".to_string());

        let first = repo.lock().add(Arc::new(test_item(Arc::clone(&instance), clock.clone())));
        let second = repo.lock().add(Arc::new(test_item(Arc::clone(&instance), clock)));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_get_dead_items_does_not_remove() {
        let (repo, clock) = repo_with_clock();
        let item = repo.lock().add(Arc::new(test_item(
            Arc::new("mesh".to_string()),
            clock.clone(),
        )));
        item.increment();
        item.decrement();
        clock.advance(Duration::from_secs(1));

        let dead = repo.lock().get_dead_items(Duration::from_secs(1), clock.now());
        assert_eq!(dead.len(), 1);
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (repo, clock) = repo_with_clock();
        let item = repo.lock().add(Arc::new(test_item(Arc::new("font".to_string()), clock)));

        assert_eq!(repo.lock().remove(&[Arc::clone(&item)]), 1);
        assert_eq!(repo.lock().remove(&[Arc::clone(&item)]), 0);
        assert_eq!(repo.len(), 0);
    }

    #[test]
    fn test_remove_skips_replaced_item() {
        let (repo, clock) = repo_with_clock();
        let instance = Arc::new("atlas".to_string());
        let stale = repo.lock().add(Arc::new(test_item(Arc::clone(&instance), clock.clone())));
        repo.lock().remove(&[Arc::clone(&stale)]);
        let fresh = repo.lock().add(Arc::new(test_item(Arc::clone(&instance), clock)));

        assert_eq!(repo.lock().remove(&[stale]), 0);
        assert!(Arc::ptr_eq(&repo.get_by(&instance).unwrap(), &fresh));
    }
}
