//! 异步任务轮询
//!
//! `job.status` is fetched once immediately, then every `interval` while the
//! job is unfinished. Attempts are grouped in cycles of `attempts_per_cycle`;
//! at most `max_cycles` cycles run. An overall deadline is checked before every
//! sleep (a sleep never ends past it) and again before every fetch. A fetch in
//! flight is bounded by the client's request timeout. A zero interval has no
//! deadline; only the attempt ceiling applies.

use std::time::Duration;

use memset_dns_provider::{ApiClient, Job};
use tokio::time::{sleep, Instant};

/// 默认轮询间隔（秒）
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// 默认每轮尝试次数
pub const DEFAULT_ATTEMPTS_PER_CYCLE: u32 = 6;
/// 默认最大轮数
pub const DEFAULT_MAX_CYCLES: u32 = 4;

/// Polling cadence and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub attempts_per_cycle: u32,
    pub max_cycles: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            attempts_per_cycle: DEFAULT_ATTEMPTS_PER_CYCLE,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

impl PollConfig {
    /// Most follow-up attempts a poll can make.
    pub fn max_attempts(&self) -> u32 {
        self.attempts_per_cycle.saturating_mul(self.max_cycles)
    }

    /// Overall time budget for follow-up attempts.
    pub fn deadline(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts())
    }
}

/// How a polled job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Finished without error.
    Converged(Job),
    /// Finished, but the job itself reports an error.
    RemoteJobError(Job),
    /// Still unfinished when the attempt budget or deadline ran out.
    TimedOut { last: Job, attempts: u32 },
}

impl JobOutcome {
    pub fn job(&self) -> &Job {
        match self {
            Self::Converged(job) | Self::RemoteJobError(job) | Self::TimedOut { last: job, .. } => {
                job
            }
        }
    }

    fn classify(job: Job, attempts: u32) -> Self {
        match (job.finished, job.error) {
            (true, true) => Self::RemoteJobError(job),
            (true, false) => Self::Converged(job),
            (false, _) => Self::TimedOut {
                last: job,
                attempts,
            },
        }
    }
}

pub struct JobPoller<'a> {
    client: &'a dyn ApiClient,
    config: PollConfig,
}

impl<'a> JobPoller<'a> {
    pub fn new(client: &'a dyn ApiClient, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// Poll `job_id` until it finishes or the budget runs out.
    ///
    /// A failing `job.status` call ends polling with that error.
    pub async fn poll(&self, job_id: &str) -> memset_dns_provider::Result<JobOutcome> {
        // 间隔为 0 时只受尝试次数限制
        let deadline = (!self.config.interval.is_zero())
            .then(|| Instant::now() + self.config.deadline());
        let mut job = self.client.job_status(job_id).await?;
        let mut attempts = 0u32;

        'cycles: for cycle in 0..self.config.max_cycles {
            if job.finished {
                break;
            }
            for _ in 0..self.config.attempts_per_cycle {
                if deadline.is_some_and(|d| Instant::now() + self.config.interval > d) {
                    break 'cycles;
                }
                sleep(self.config.interval).await;
                if deadline.is_some_and(|d| Instant::now() > d) {
                    break 'cycles;
                }
                job = self.client.job_status(job_id).await?;
                attempts += 1;
                if job.finished {
                    break 'cycles;
                }
            }
            log::debug!(
                "Job {job_id} still running after cycle {} ({attempts} attempts, status '{}')",
                cycle + 1,
                job.status
            );
        }

        Ok(JobOutcome::classify(job, attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{job, FakeMemset};
    use memset_dns_provider::{ApiMethod, ProviderError};

    #[test]
    fn default_budget_is_two_minutes() {
        let config = PollConfig::default();
        assert_eq!(config.max_attempts(), 24);
        assert_eq!(config.deadline(), Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_job_needs_single_fetch() {
        let fake = FakeMemset::new();
        fake.script_jobs(vec![job("j1", true, false)]).await;

        let outcome = JobPoller::new(&fake, PollConfig::default())
            .poll("j1")
            .await
            .unwrap();

        assert!(matches!(outcome, JobOutcome::Converged(_)));
        assert_eq!(fake.count(ApiMethod::JobStatus).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_as_soon_as_job_finishes() {
        let fake = FakeMemset::new();
        fake.script_jobs(vec![
            job("j1", false, false),
            job("j1", false, false),
            job("j1", true, false),
        ])
        .await;

        let start = Instant::now();
        let outcome = JobPoller::new(&fake, PollConfig::default())
            .poll("j1")
            .await
            .unwrap();

        assert_eq!(outcome.job().id, "j1");
        assert!(matches!(outcome, JobOutcome::Converged(_)));
        assert_eq!(fake.count(ApiMethod::JobStatus).await, 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn remote_error_is_distinct_from_convergence() {
        let fake = FakeMemset::new();
        fake.script_jobs(vec![job("j1", false, false), job("j1", true, true)])
            .await;

        let outcome = JobPoller::new(&fake, PollConfig::default())
            .poll("j1")
            .await
            .unwrap();

        assert!(matches!(outcome, JobOutcome::RemoteJobError(ref j) if j.error));
    }

    #[tokio::test(start_paused = true)]
    async fn never_finishing_job_times_out_within_budget() {
        let fake = FakeMemset::new();
        fake.script_jobs(vec![job("j1", false, false)]).await;

        let config = PollConfig::default();
        let start = Instant::now();
        let outcome = JobPoller::new(&fake, config).poll("j1").await.unwrap();

        match outcome {
            JobOutcome::TimedOut { last, attempts } => {
                assert!(!last.finished);
                assert_eq!(attempts, config.max_attempts());
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // 1 次立即查询 + 24 次后续查询
        assert_eq!(fake.count(ApiMethod::JobStatus).await, 25);
        assert!(start.elapsed() <= config.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_budget_is_respected() {
        let fake = FakeMemset::new();
        fake.script_jobs(vec![job("j1", false, false)]).await;

        let config = PollConfig {
            interval: Duration::from_millis(100),
            attempts_per_cycle: 2,
            max_cycles: 1,
        };
        let outcome = JobPoller::new(&fake, config).poll("j1").await.unwrap();

        assert!(matches!(outcome, JobOutcome::TimedOut { attempts: 2, .. }));
        assert_eq!(fake.count(ApiMethod::JobStatus).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_status_calls_end_polling_at_the_deadline() {
        let fake = FakeMemset::new();
        fake.script_jobs(vec![job("j1", false, false)]).await;
        fake.set_latency(Duration::from_secs(1)).await;

        let config = PollConfig::default();
        let start = Instant::now();
        let outcome = JobPoller::new(&fake, config).poll("j1").await.unwrap();

        // 每次尝试耗时 6s：第 21 次的 sleep 会越过 120s 截止时间
        assert!(matches!(outcome, JobOutcome::TimedOut { attempts: 20, .. }));
        assert_eq!(fake.count(ApiMethod::JobStatus).await, 21);
        assert!(start.elapsed() <= config.deadline() + Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_still_uses_attempt_budget() {
        let fake = FakeMemset::new();
        fake.script_jobs(vec![job("j1", false, false), job("j1", true, false)])
            .await;

        let config = PollConfig {
            interval: Duration::ZERO,
            ..PollConfig::default()
        };
        let outcome = JobPoller::new(&fake, config).poll("j1").await.unwrap();

        assert!(matches!(outcome, JobOutcome::Converged(_)));
        assert_eq!(fake.count(ApiMethod::JobStatus).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn status_failure_is_returned() {
        let fake = FakeMemset::new();
        fake.fail_on(
            ApiMethod::JobStatus,
            ProviderError::ServerError {
                method: "job.status".to_string(),
                status: 500,
                raw_message: None,
            },
        )
        .await;

        let result = JobPoller::new(&fake, PollConfig::default()).poll("j1").await;
        assert!(matches!(result, Err(ProviderError::ServerError { .. })));
    }
}
