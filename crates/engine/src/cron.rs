// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron scheduler: a thin wrapper over the `cron` crate's expression
//! parser. Jobs are added before `start`; `start` optionally fires every job
//! once immediately (`app.cron.on.service.start`), then spawns one task per
//! job that sleeps until its next scheduled occurrence, invokes the
//! callback, and reschedules. `stop` cancels every job task and waits for
//! them to drain.

use cron::Schedule;
use rt_session::Session;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub type CronFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;
pub type CronJob = Arc<dyn Fn(Arc<Session>) -> CronFuture + Send + Sync>;

struct RegisteredJob {
    schedule: Schedule,
    callback: CronJob,
}

/// Bound to a single service's session-scoped cron schedule.
pub struct Cron {
    jobs: Vec<RegisteredJob>,
    handles: Vec<JoinHandle<()>>,
    ctx: CancellationToken,
}

impl Cron {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            handles: Vec::new(),
            ctx: CancellationToken::new(),
        }
    }

    /// Register a job. Fails if `expr` does not parse as a cron expression.
    pub fn add_job(&mut self, expr: &str, callback: CronJob) -> Result<(), String> {
        let schedule = Schedule::from_str(expr).map_err(|e| e.to_string())?;
        self.jobs.push(RegisteredJob { schedule, callback });
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Start every registered job. If `run_immediately` is set, each job's
    /// callback fires once before the schedule-driven loop begins.
    pub async fn start(&mut self, session: Arc<Session>, run_immediately: bool) {
        for job in &self.jobs {
            if run_immediately {
                if let Err(err) = (job.callback)(session.clone()).await {
                    session
                        .logger()
                        .warn(&format!("cron job failed on immediate run: {err}"));
                }
            }
            let schedule = job.schedule.clone();
            let callback = job.callback.clone();
            let sess = session.clone();
            let ctx = self.ctx.clone();
            let handle = tokio::spawn(async move {
                loop {
                    let next = match schedule.upcoming(chrono::Utc).next() {
                        Some(next) => next,
                        None => return,
                    };
                    let now = chrono::Utc::now();
                    let delay = (next - now)
                        .to_std()
                        .unwrap_or(std::time::Duration::from_secs(0));
                    tokio::select! {
                        _ = ctx.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    if let Err(err) = (callback)(sess.clone()).await {
                        sess.logger().warn(&format!("cron job failed: {err}"));
                    }
                }
            });
            self.handles.push(handle);
        }
    }

    /// Cancel every job task and wait for them to drain. The drain is
    /// unbounded by design — jobs must complete.
    pub async fn stop(&mut self) {
        self.ctx.cancel();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}

impl Default for Cron {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
