//! Work-stealing executor for independent sweep points.
//!
//! Implements Heijunka (load leveling) for tasks of uneven duration: all
//! tasks sit in a global injector, each worker drains it one task at a
//! time and steals from its peers when idle. Every result carries the index
//! of its input, and results are sorted back into input order on
//! collection, so completion order never leaks into the output.
//!
//! The first failure raises a shared abort flag. Workers finish the task in
//! hand but take no new ones, and the failure with the lowest input index
//! is reported.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crossbeam_deque::{Injector, Steal, Stealer, Worker};
use tracing::{debug, warn};

/// A task that failed, with the position of its input.
#[derive(Debug)]
pub struct TaskFailure<E> {
    /// Input index.
    pub index: usize,
    /// Error returned by the task.
    pub error: E,
}

/// Fixed-size pool of scoped worker threads.
#[derive(Debug, Clone)]
pub struct SweepExecutor {
    num_workers: usize,
}

impl Default for SweepExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepExecutor {
    /// Create with default number of workers (number of CPUs).
    #[must_use]
    pub fn new() -> Self {
        Self {
            num_workers: std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(4),
        }
    }

    /// Create with specified number of workers (at least one).
    #[must_use]
    pub fn with_workers(num_workers: usize) -> Self {
        Self {
            num_workers: num_workers.max(1),
        }
    }

    /// Get number of workers.
    #[must_use]
    pub const fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Run `task` on every item and return the outputs in input order.
    ///
    /// # Errors
    ///
    /// Returns the lowest-index [`TaskFailure`] once any task fails; tasks
    /// not yet started are skipped.
    pub fn execute<T, R, E, F>(&self, items: &[T], task: F) -> Result<Vec<R>, TaskFailure<E>>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(usize, &T) -> Result<R, E> + Sync,
    {
        let injector: Injector<usize> = Injector::new();
        for index in 0..items.len() {
            injector.push(index);
        }

        let n_workers = self.num_workers.min(items.len()).max(1);
        let workers: Vec<Worker<usize>> = (0..n_workers).map(|_| Worker::new_fifo()).collect();
        let stealers: Vec<Stealer<usize>> = workers.iter().map(Worker::stealer).collect();

        let abort = AtomicBool::new(false);
        let results: Mutex<Vec<(usize, R)>> = Mutex::new(Vec::with_capacity(items.len()));
        let failures: Mutex<Vec<TaskFailure<E>>> = Mutex::new(Vec::new());

        debug!(tasks = items.len(), workers = n_workers, "sweep dispatch");

        std::thread::scope(|s| {
            for (worker_id, worker) in workers.into_iter().enumerate() {
                let injector = &injector;
                let stealers = &stealers;
                let abort = &abort;
                let results = &results;
                let failures = &failures;
                let task = &task;

                s.spawn(move || {
                    while !abort.load(Ordering::Acquire) {
                        let Some(index) = next_task(worker_id, &worker, injector, stealers) else {
                            break;
                        };
                        match task(index, &items[index]) {
                            Ok(output) => {
                                if let Ok(mut guard) = results.lock() {
                                    guard.push((index, output));
                                }
                            }
                            Err(error) => {
                                abort.store(true, Ordering::Release);
                                warn!(index, "sweep task failed, aborting");
                                if let Ok(mut guard) = failures.lock() {
                                    guard.push(TaskFailure { index, error });
                                }
                            }
                        }
                    }
                });
            }
        });

        let failures = failures.into_inner().unwrap_or_default();
        if let Some(first) = failures.into_iter().min_by_key(|f| f.index) {
            return Err(first);
        }

        let mut indexed = results.into_inner().unwrap_or_default();
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, output)| output).collect())
    }
}

/// Local queue first, then the global injector, then peers round-robin.
fn next_task(
    worker_id: usize,
    worker: &Worker<usize>,
    injector: &Injector<usize>,
    stealers: &[Stealer<usize>],
) -> Option<usize> {
    worker
        .pop()
        .or_else(|| retry_steal(|| injector.steal()))
        .or_else(|| {
            (1..=stealers.len()).find_map(|offset| {
                let peer = (worker_id + offset) % stealers.len();
                retry_steal(|| stealers[peer].steal())
            })
        })
}

fn retry_steal(mut steal: impl FnMut() -> Steal<usize>) -> Option<usize> {
    loop {
        match steal() {
            Steal::Success(index) => return Some(index),
            Steal::Empty => return None,
            Steal::Retry => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::time::Duration;

    #[test]
    fn test_results_in_input_order() {
        let executor = SweepExecutor::with_workers(4);
        let items: Vec<u64> = (0..100).collect();
        let out: Result<Vec<u64>, TaskFailure<()>> =
            executor.execute(&items[..], |_, x| Ok(x * x));
        let out = out.unwrap();
        assert_eq!(out.len(), 100);
        for (i, v) in out.iter().enumerate() {
            assert_eq!(*v, (i * i) as u64);
        }
    }

    #[test]
    fn test_order_preserved_under_reverse_completion() {
        let executor = SweepExecutor::with_workers(3);
        let items = [0.05, 0.10, 0.15];
        let barrier = Barrier::new(3);
        let completed = Mutex::new(Vec::new());

        let out: Result<Vec<f64>, TaskFailure<()>> = executor.execute(&items[..], |index, alpha_s| {
            // All three run at once; the first input finishes last.
            barrier.wait();
            std::thread::sleep(Duration::from_millis(100 * (2 - index as u64)));
            completed.lock().unwrap().push(index);
            Ok(*alpha_s)
        });

        assert_eq!(out.unwrap(), vec![0.05, 0.10, 0.15]);
        assert_eq!(completed.into_inner().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_failure_aborts_and_reports_lowest_index() {
        let executor = SweepExecutor::with_workers(1);
        let items: Vec<usize> = (0..10).collect();
        let started = AtomicUsize::new(0);

        let out: Result<Vec<usize>, TaskFailure<String>> = executor.execute(&items[..], |i, _| {
            started.fetch_add(1, Ordering::SeqCst);
            if i >= 3 {
                Err(format!("point {i} diverged"))
            } else {
                Ok(i)
            }
        });

        let failure = out.unwrap_err();
        assert_eq!(failure.index, 3);
        assert_eq!(failure.error, "point 3 diverged");
        // A single worker stops right after the failing task.
        assert_eq!(started.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_empty_input() {
        let executor = SweepExecutor::with_workers(2);
        let items: [f64; 0] = [];
        let out: Result<Vec<f64>, TaskFailure<()>> = executor.execute(&items[..], |_, x| Ok(*x));
        assert!(out.unwrap().is_empty());
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(SweepExecutor::with_workers(0).num_workers(), 1);
        assert_eq!(SweepExecutor::with_workers(8).num_workers(), 8);
        assert!(SweepExecutor::new().num_workers() >= 1);
    }
}
