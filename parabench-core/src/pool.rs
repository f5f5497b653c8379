//! Task-Parallel Work Pool
//!
//! Workers claim task indices from a shared cursor, run the task outside the
//! cursor lock, then report completion. The coordinator blocks in
//! [`WorkPool::wait_all`] until every task has been completed. Claim order is
//! unspecified; dynamic claiming balances uneven task costs across workers.
//!
//! Each descriptor sits behind its own mutex. Only the worker that claimed an
//! index ever locks it during a run, so the lock is uncontended and exists to
//! give that worker `&mut` access to the task's output buffers.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Cursor {
    next_index: usize,
    completed: usize,
}

/// Fixed set of tasks shared by a group of workers
#[derive(Debug)]
pub struct WorkPool<T> {
    tasks: Vec<Mutex<T>>,
    cursor: Mutex<Cursor>,
    all_done: Condvar,
}

impl<T> WorkPool<T> {
    /// Create a pool over `tasks`; the set is fixed for the pool's lifetime
    pub fn new(tasks: Vec<T>) -> Self {
        Self {
            tasks: tasks.into_iter().map(Mutex::new).collect(),
            cursor: Mutex::new(Cursor {
                next_index: 0,
                completed: 0,
            }),
            all_done: Condvar::new(),
        }
    }

    /// Number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// `true` if the pool holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Claim the next unclaimed task index, or `None` once all are claimed
    pub fn claim(&self) -> Option<usize> {
        let mut cursor = self.lock_cursor();
        if cursor.next_index >= self.tasks.len() {
            return None;
        }
        let index = cursor.next_index;
        cursor.next_index += 1;
        Some(index)
    }

    /// Record one finished task. Returns `true` for the call that completed
    /// the whole pool, which also wakes every waiter.
    pub fn complete(&self) -> bool {
        let mut cursor = self.lock_cursor();
        cursor.completed += 1;
        if cursor.completed == self.tasks.len() {
            self.all_done.notify_all();
            true
        } else {
            false
        }
    }

    /// Worker loop: claim tasks and run `f` on each until none remain.
    ///
    /// Completion is recorded even if `f` unwinds. Returns the number of
    /// tasks this caller processed.
    pub fn drain<F>(&self, mut f: F) -> usize
    where
        F: FnMut(usize, &mut T),
    {
        let mut processed = 0;
        while let Some(index) = self.claim() {
            let _completion = CompletionGuard { pool: self };
            let mut task = self.tasks[index]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            f(index, &mut task);
            processed += 1;
        }
        processed
    }

    /// Block until every task has been completed
    pub fn wait_all(&self) {
        let mut cursor = self.lock_cursor();
        while cursor.completed < self.tasks.len() {
            cursor = self
                .all_done
                .wait(cursor)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Number of completed tasks
    pub fn completed(&self) -> usize {
        self.lock_cursor().completed
    }

    /// Consume the pool and return the task descriptors in index order
    pub fn into_tasks(self) -> Vec<T> {
        self.tasks
            .into_iter()
            .map(|task| task.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    fn lock_cursor(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct CompletionGuard<'a, T> {
    pool: &'a WorkPool<T>,
}

impl<T> Drop for CompletionGuard<'_, T> {
    fn drop(&mut self) {
        self.pool.complete();
    }
}
