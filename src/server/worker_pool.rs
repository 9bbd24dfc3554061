//! The fixed-size worker pool used for `heavy` handlers and WebSocket
//! receive callbacks. The reactor (Tokio's own runtime threads) never
//! blocks on a job submitted here; it awaits a oneshot reply instead.
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tokio::sync::oneshot;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed set of dedicated OS threads draining an unbounded job
/// queue. Default size is 4, matching the fixed pool this component
/// is grounded on.
pub struct WorkerPool {
    sender: crossbeam::channel::Sender<Job>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(4)
    }
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = crossbeam::channel::unbounded::<Job>();
        for _ in 0..size {
            let receiver = receiver.clone();
            thread::spawn(move || {
                for job in receiver.iter() {
                    job();
                }
            });
        }
        Self { sender }
    }

    /// Fire-and-forget submission; used for WebSocket `on_receive`
    /// callbacks, which have no result to await.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.sender.send(Box::new(job));
    }

    /// Runs `job` on the pool and returns a receiver for its result.
    /// A panicking `job` is caught and reported as `Err` rather than
    /// silently losing the reply or taking down the worker thread.
    pub fn submit_for<R: Send + 'static>(
        &self,
        job: impl FnOnce() -> R + Send + 'static,
    ) -> oneshot::Receiver<thread::Result<R>> {
        let (tx, rx) = oneshot::channel();
        self.submit(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job));
            let _ = tx.send(result);
        });
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submit_for_returns_the_computed_value() {
        let pool = WorkerPool::new(2);
        let rx = pool.submit_for(|| 2 + 2);
        assert_eq!(rx.await.unwrap().unwrap(), 4);
    }

    #[tokio::test]
    async fn a_panicking_job_is_reported_as_err_not_lost() {
        let pool = WorkerPool::new(2);
        let rx = pool.submit_for(|| -> i32 { panic!("boom") });
        assert!(rx.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn two_one_second_jobs_complete_concurrently() {
        use std::time::{Duration, Instant};
        let pool = WorkerPool::new(4);
        let start = Instant::now();
        let a = pool.submit_for(|| std::thread::sleep(Duration::from_millis(300)));
        let b = pool.submit_for(|| std::thread::sleep(Duration::from_millis(300)));
        let _ = tokio::join!(a, b);
        assert!(start.elapsed() < Duration::from_millis(550));
    }
}
