//! Test case scheduling.
//!
//! Serial mode runs every case on the calling thread in discovery order.
//! Pooled mode spreads cases over scoped worker threads that pull from a
//! shared cursor; statuses are streamed back over a channel and reported in
//! completion order. Either way a case that errors or panics only produces a
//! failed status for itself.

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use tracing::{error, info};

use crate::discovery::TestCase;
use crate::executor::{run_test, ExecutionContext};
use crate::status::TestStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Single controller, deterministic order
    Serial,
    /// Worker threads, unordered completion
    Pooled { workers: NonZeroUsize },
}

impl ScheduleMode {
    /// Pool sized to the host's available parallelism.
    pub fn pooled() -> Self {
        let workers = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        ScheduleMode::Pooled { workers }
    }

    pub fn pooled_with(workers: usize) -> Self {
        match NonZeroUsize::new(workers) {
            Some(workers) => ScheduleMode::Pooled { workers },
            None => Self::pooled(),
        }
    }
}

pub struct Scheduler<'a> {
    ctx: ExecutionContext<'a>,
    mode: ScheduleMode,
}

impl<'a> Scheduler<'a> {
    pub fn new(ctx: ExecutionContext<'a>, mode: ScheduleMode) -> Self {
        Self { ctx, mode }
    }

    /// Run every case and return one status per case. `on_status` is called
    /// on the calling thread as each status becomes available.
    pub fn run<F>(&self, cases: &[TestCase], mut on_status: F) -> Vec<TestStatus>
    where
        F: FnMut(&TestStatus),
    {
        match self.mode {
            ScheduleMode::Serial => {
                let mut statuses = Vec::with_capacity(cases.len());
                for case in cases {
                    info!("Running {}", case.id());
                    let status = guarded_run(case, &self.ctx);
                    on_status(&status);
                    statuses.push(status);
                }
                statuses
            }
            ScheduleMode::Pooled { workers } => self.run_pooled(cases, workers, on_status),
        }
    }

    fn run_pooled<F>(
        &self,
        cases: &[TestCase],
        workers: NonZeroUsize,
        mut on_status: F,
    ) -> Vec<TestStatus>
    where
        F: FnMut(&TestStatus),
    {
        let worker_count = workers.get().min(cases.len());
        info!(workers = worker_count, cases = cases.len(), "starting worker pool");

        let cursor = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<TestStatus>();
        let mut statuses = Vec::with_capacity(cases.len());

        thread::scope(|scope| {
            for worker in 0..worker_count {
                let tx = tx.clone();
                let cursor = &cursor;
                let ctx = &self.ctx;
                let spawned = thread::Builder::new()
                    .name(format!("regress-worker-{worker}"))
                    .spawn_scoped(scope, move || loop {
                        let idx = cursor.fetch_add(1, Ordering::SeqCst);
                        let Some(case) = cases.get(idx) else {
                            break;
                        };
                        if tx.send(guarded_run(case, ctx)).is_err() {
                            break;
                        }
                    });
                if let Err(err) = spawned {
                    error!(worker, "failed to spawn worker thread: {err}");
                }
            }
            drop(tx);

            for status in rx {
                on_status(&status);
                statuses.push(status);
            }
        });

        // Workers that failed to spawn leave cases unclaimed; run them here.
        let claimed = cursor.load(Ordering::SeqCst).min(cases.len());
        if statuses.len() < cases.len() {
            for case in cases.iter().skip(claimed) {
                let status = guarded_run(case, &self.ctx);
                on_status(&status);
                statuses.push(status);
            }
        }

        statuses
    }
}

fn guarded_run(case: &TestCase, ctx: &ExecutionContext<'_>) -> TestStatus {
    match panic::catch_unwind(AssertUnwindSafe(|| run_test(case, ctx))) {
        Ok(status) => status,
        Err(payload) => {
            let detail = panic_detail(payload.as_ref());
            error!(case = %case.id(), "executor panicked: {detail}");
            TestStatus::panicked(case, &detail)
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests;
