//! Per-user serialization of read-modify-write cycles

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::state::UserId;

#[derive(Debug, Default)]
pub(crate) struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Run `f` while holding the lock for `user_id`
    pub(crate) fn with_user<T>(&self, user_id: &UserId, f: impl FnOnce() -> T) -> T {
        let lock = self.entry(user_id);
        let out = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(user_id, lock);
        out
    }

    fn map(&self) -> MutexGuard<'_, HashMap<UserId, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        self.map().entry(user_id.clone()).or_default().clone()
    }

    fn release(&self, user_id: &UserId, lock: Arc<Mutex<()>>) {
        let mut map = self.map();
        // One reference in the map plus ours: nobody else is waiting
        if Arc::strong_count(&lock) == 2 {
            map.remove(user_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_entries_released_after_use() {
        let locks = UserLocks::default();
        let user = UserId::from("u1");

        let value = locks.with_user(&user, || 7);
        assert_eq!(value, 7);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_same_user_is_serialized() {
        let locks = Arc::new(UserLocks::default());
        let counter = Arc::new(Mutex::new(0u32));
        let user = UserId::from("u1");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let counter = Arc::clone(&counter);
                let user = user.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        locks.with_user(&user, || {
                            // Unsynchronized read-then-write, guarded only by the user lock
                            let current = *counter.lock().unwrap();
                            thread::yield_now();
                            *counter.lock().unwrap() = current + 1;
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*counter.lock().unwrap(), 800);
        assert_eq!(locks.len(), 0);
    }
}
