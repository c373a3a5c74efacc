use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::Ordering;

cfg_if::cfg_if! {
    if #[cfg(all(test, feature = "loom"))] {
        use loom::sync::atomic::AtomicBool;
    } else {
        use core::sync::atomic::AtomicBool;
    }
}

use crate::collections::DoublyLinkedList;

const LOCKED: bool = true;
const UNLOCKED: bool = false;

/// a [`DoublyLinkedList`] behind a single exclusive spin lock. every index
/// lookup and the relink that follows it happen under the same lock
/// acquisition, so indices cannot go stale mid-operation
pub struct SharedList {
    is_locked: AtomicBool,
    list: UnsafeCell<DoublyLinkedList>,
}

unsafe impl Send for SharedList {}
unsafe impl Sync for SharedList {}

impl SharedList {
    pub fn new(list: DoublyLinkedList) -> Self {
        Self {
            is_locked: AtomicBool::new(UNLOCKED),
            list: UnsafeCell::new(list),
        }
    }

    /// spin until the list is ours
    pub fn lock(&self) -> ListGuard<'_> {
        while !self.try_acquire() {
            while self.is_locked.load(Ordering::Relaxed) == LOCKED {
                spin();
            }
        }

        ListGuard { shared: self }
    }

    pub fn try_lock(&self) -> Option<ListGuard<'_>> {
        if self.try_acquire() {
            Some(ListGuard { shared: self })
        } else {
            None
        }
    }

    /// run `f` with exclusive access to the list
    pub fn with<R>(&self, f: impl FnOnce(&mut DoublyLinkedList) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    pub fn into_inner(self) -> DoublyLinkedList {
        self.list.into_inner()
    }

    fn try_acquire(&self) -> bool {
        self.is_locked
            .compare_exchange(UNLOCKED, LOCKED, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    fn unlock(&self) {
        self.is_locked.store(UNLOCKED, Ordering::Release);
    }
}

#[cfg(all(test, feature = "loom"))]
fn spin() {
    loom::thread::yield_now();
}

#[cfg(not(all(test, feature = "loom")))]
fn spin() {
    core::hint::spin_loop();
}

/// exclusive access to a [`SharedList`]; the lock is released on drop
pub struct ListGuard<'a> {
    shared: &'a SharedList,
}

impl Deref for ListGuard<'_> {
    type Target = DoublyLinkedList;

    fn deref(&self) -> &DoublyLinkedList {
        // SAFETY: holding the guard means holding the lock
        unsafe { &*self.shared.list.get() }
    }
}

impl DerefMut for ListGuard<'_> {
    fn deref_mut(&mut self) -> &mut DoublyLinkedList {
        // SAFETY: holding the guard means holding the lock, and the guard is
        // borrowed mutably for as long as the reference lives
        unsafe { &mut *self.shared.list.get() }
    }
}

impl Drop for ListGuard<'_> {
    fn drop(&mut self) {
        self.shared.unlock();
    }
}


#[cfg(all(test, feature = "loom"))]
mod loom_test {
    use loom::sync::Arc;
    use loom::thread;

    use super::*;

    #[test]
    fn concurrent_appends_are_serialized() {
        loom::model(|| {
            let shared = Arc::new(SharedList::new(
                DoublyLinkedList::new("Head").expect("failed to create list"),
            ));

            let handles: Vec<_> = ["A", "B"]
                .into_iter()
                .map(|value| {
                    let shared = shared.clone();
                    thread::spawn(move || shared.lock().append(value).expect("failed to append"))
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            let list = shared.lock();
            assert_eq!(list.len(), 3);
            assert_eq!(list.head(), Some("Head"));
            list.assert_invariants();
        });
    }
}
