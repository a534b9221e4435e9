// src/scheduler.rs
// Named periodic jobs with independent timers, failure tracking and
// auto-disable. Job state lives in explicit per-job records behind one
// mutex; timer tasks reach it only through a name lookup, never through
// captured state.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A job is disabled automatically after this many consecutive failures.
pub const FAILURE_DISABLE_THRESHOLD: u32 = 5;

type JobAction = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scheduler_job_success_total", "Completed job runs.");
        describe_counter!("scheduler_job_failure_total", "Failed job runs.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    pub enabled: bool,
    /// Fire immediately on `start()` instead of waiting one interval.
    pub run_on_start: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            run_on_start: false,
        }
    }
}

struct Job {
    action: JobAction,
    interval: Duration,
    enabled: bool,
    run_on_start: bool,
    /// In-flight guard: a job never runs concurrently with itself.
    running: bool,
    disabled_by_failures: bool,
    last_run_at: Option<DateTime<Utc>>,
    next_run_at: Option<DateTime<Utc>>,
    success_count: u64,
    /// Consecutive failures; reset on success.
    failure_count: u32,
    last_error: Option<String>,
}

/// Snapshot of one job's state for status queries.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub name: String,
    pub enabled: bool,
    pub running: bool,
    pub disabled_by_failures: bool,
    pub interval: Duration,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub success_count: u64,
    pub failure_count: u32,
    pub last_error: Option<String>,
}

struct SchedulerInner {
    jobs: HashMap<String, Job>,
    tickers: HashMap<String, JoinHandle<()>>,
    running: bool,
}

/// Periodic job scheduler. Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct JobScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl JobScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                jobs: HashMap::new(),
                tickers: HashMap::new(),
                running: false,
            })),
        }
    }

    /// Add a job definition. Duplicate names are a programmer error and are
    /// rejected rather than silently overwritten.
    pub fn register<F, Fut>(
        &self,
        name: &str,
        interval: Duration,
        opts: JobOptions,
        action: F,
    ) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        if inner.jobs.contains_key(name) {
            bail!("job already registered: {name}");
        }
        let action: JobAction = Arc::new(move || Box::pin(action()));
        inner.jobs.insert(
            name.to_string(),
            Job {
                action,
                interval,
                enabled: opts.enabled,
                run_on_start: opts.run_on_start,
                running: false,
                disabled_by_failures: false,
                last_run_at: None,
                next_run_at: None,
                success_count: 0,
                failure_count: 0,
                last_error: None,
            },
        );
        tracing::info!(job = name, interval_ms = interval.as_millis() as u64, "job registered");
        if inner.running && opts.enabled {
            self.spawn_ticker(&mut inner, name);
        }
        Ok(())
    }

    /// Begin firing every enabled job on its own timer.
    pub fn start(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.running {
            tracing::warn!("scheduler already running");
            return;
        }
        inner.running = true;
        let names: Vec<String> = inner
            .jobs
            .iter()
            .filter(|(_, j)| j.enabled)
            .map(|(n, _)| n.clone())
            .collect();
        for name in names {
            self.spawn_ticker(&mut inner, &name);
        }
        tracing::info!("scheduler started");
    }

    /// Halt all timers. In-flight runs complete; no new ones start.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        for (name, handle) in inner.tickers.drain() {
            handle.abort();
            tracing::debug!(job = %name, "ticker stopped");
        }
        inner.running = false;
        tracing::info!("scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().unwrap().running
    }

    /// Enable or disable one job without affecting the others. Re-enabling
    /// clears a failure-tripped disable.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        {
            let Some(job) = inner.jobs.get_mut(name) else {
                bail!("job not found: {name}");
            };
            job.enabled = enabled;
            if enabled {
                job.disabled_by_failures = false;
                job.failure_count = 0;
            }
        }
        if !enabled {
            if let Some(handle) = inner.tickers.remove(name) {
                handle.abort();
            }
        } else if inner.running && !inner.tickers.contains_key(name) {
            self.spawn_ticker(&mut inner, name);
        }
        tracing::info!(job = name, enabled, "job toggled");
        Ok(())
    }

    /// Execute a job once, recording timing and outcome. Skips silently when
    /// the job is disabled or already in flight.
    pub async fn run_job(&self, name: &str) {
        ensure_metrics_described();
        let action = {
            let mut inner = self.inner.lock().unwrap();
            let Some(job) = inner.jobs.get_mut(name) else {
                tracing::warn!(job = name, "job not found");
                return;
            };
            if !job.enabled {
                tracing::debug!(job = name, "job disabled, skipping run");
                return;
            }
            if job.running {
                tracing::debug!(job = name, "job already in flight, skipping run");
                return;
            }
            job.running = true;
            job.last_run_at = Some(Utc::now());
            job.action.clone()
        };

        let started = std::time::Instant::now();
        let result = (action)().await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let mut inner = self.inner.lock().unwrap();
        let mut tripped = false;
        if let Some(job) = inner.jobs.get_mut(name) {
            job.running = false;
            job.next_run_at =
                Some(Utc::now() + chrono::Duration::milliseconds(job.interval.as_millis() as i64));
            match result {
                Ok(()) => {
                    job.success_count += 1;
                    job.failure_count = 0;
                    job.last_error = None;
                    counter!("scheduler_job_success_total").increment(1);
                    tracing::info!(job = name, duration_ms, "job completed");
                }
                Err(e) => {
                    job.failure_count += 1;
                    job.last_error = Some(e.to_string());
                    counter!("scheduler_job_failure_total").increment(1);
                    tracing::warn!(
                        job = name,
                        duration_ms,
                        error = %e,
                        failures = job.failure_count,
                        "job failed"
                    );
                    if job.failure_count >= FAILURE_DISABLE_THRESHOLD {
                        job.enabled = false;
                        job.disabled_by_failures = true;
                        job.next_run_at = None;
                        tripped = true;
                        tracing::error!(job = name, "job disabled after repeated failures");
                    }
                }
            }
        }
        if tripped {
            if let Some(handle) = inner.tickers.remove(name) {
                handle.abort();
            }
        }
    }

    pub fn job_status(&self, name: &str) -> Option<JobStatus> {
        let inner = self.inner.lock().unwrap();
        inner.jobs.get(name).map(|job| snapshot(name, job))
    }

    /// Snapshot of every registered job, sorted by name.
    pub fn status(&self) -> Vec<JobStatus> {
        let inner = self.inner.lock().unwrap();
        let mut all: Vec<JobStatus> = inner
            .jobs
            .iter()
            .map(|(name, job)| snapshot(name, job))
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    fn is_enabled(&self, name: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .jobs
            .get(name)
            .map(|j| j.enabled)
            .unwrap_or(false)
    }

    /// Spawn the independent timer task for one job. Runs are spawned
    /// detached so that `stop()` never cancels an in-flight run.
    fn spawn_ticker(&self, inner: &mut SchedulerInner, name: &str) {
        let Some(job) = inner.jobs.get_mut(name) else {
            return;
        };
        let period = job.interval;
        let run_on_start = job.run_on_start;
        job.next_run_at =
            Some(Utc::now() + chrono::Duration::milliseconds(period.as_millis() as i64));

        let sched = self.clone();
        let job_name = name.to_string();
        let handle = tokio::spawn(async move {
            if run_on_start {
                let s = sched.clone();
                let n = job_name.clone();
                tokio::spawn(async move { s.run_job(&n).await });
            }
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval resolves immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !sched.is_enabled(&job_name) {
                    break;
                }
                let s = sched.clone();
                let n = job_name.clone();
                tokio::spawn(async move { s.run_job(&n).await });
            }
        });
        inner.tickers.insert(name.to_string(), handle);
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot(name: &str, job: &Job) -> JobStatus {
    JobStatus {
        name: name.to_string(),
        enabled: job.enabled,
        running: job.running,
        disabled_by_failures: job.disabled_by_failures,
        interval: job.interval,
        last_run_at: job.last_run_at,
        next_run_at: job.next_run_at,
        success_count: job.success_count,
        failure_count: job.failure_count,
        last_error: job.last_error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_is_rejected() {
        let sched = JobScheduler::new();
        sched
            .register("refresh", Duration::from_secs(60), JobOptions::default(), || async {
                Ok(())
            })
            .unwrap();
        let err = sched
            .register("refresh", Duration::from_secs(30), JobOptions::default(), || async {
                Ok(())
            })
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn unknown_job_cannot_be_toggled() {
        let sched = JobScheduler::new();
        assert!(sched.set_enabled("missing", true).is_err());
    }
}
