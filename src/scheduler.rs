use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::AbortHandle;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Opaque handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(u64);

/// Abstract delayed-task scheduler. The driver never cancels individual
/// tasks; `cancel_all` is the only cancellation point (reconfiguration).
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
    fn cancel_all(&self);
}

/// Scheduler backed by spawned tokio tasks. Must be used inside a runtime.
#[derive(Default)]
pub struct TokioScheduler {
    next_id: AtomicU64,
    pending: Mutex<Vec<(TaskHandle, AbortHandle)>>,
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        let mut pending = self.pending.lock().unwrap();
        pending.retain(|(_, abort)| !abort.is_finished());
        pending.push((handle, join.abort_handle()));
        handle
    }

    fn cancel_all(&self) {
        for (_, abort) in self.pending.lock().unwrap().drain(..) {
            abort.abort();
        }
    }
}

struct QueuedTask {
    due: Duration,
    seq: u64,
    task: Task,
}

/// Virtual-clock scheduler for hosts that drive time themselves, and for
/// deterministic tests. Tasks run only when `run_next` is called.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    clock: Mutex<Duration>,
    queue: Mutex<Vec<QueuedTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Current virtual time, advanced by `run_next`.
    pub fn now(&self) -> Duration {
        *self.clock.lock().unwrap()
    }

    /// Run the earliest-due task (insertion order breaks ties), advancing
    /// the virtual clock to its deadline. Returns false when idle.
    pub fn run_next(&self) -> bool {
        let entry = {
            let mut queue = self.queue.lock().unwrap();
            let idx = match queue
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| (e.due, e.seq))
                .map(|(i, _)| i)
            {
                Some(i) => i,
                None => return false,
            };
            queue.remove(idx)
        };
        *self.clock.lock().unwrap() = entry.due;
        // run outside the locks: tasks schedule follow-ups
        (entry.task)();
        true
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        let due = *self.clock.lock().unwrap() + delay;
        self.queue.lock().unwrap().push(QueuedTask { due, seq, task });
        TaskHandle(seq)
    }

    fn cancel_all(&self) {
        self.queue.lock().unwrap().clear();
    }
}
