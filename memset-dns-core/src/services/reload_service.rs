//! DNS 重新加载服务

use std::sync::Arc;

use crate::error::{CoreError, ErrorKind};
use crate::poller::{JobOutcome, JobPoller};
use crate::services::ServiceContext;
use crate::types::ReconcileResult;

/// Requests propagation of committed changes and optionally waits for it.
pub struct ReloadService {
    ctx: Arc<ServiceContext>,
}

impl ReloadService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Ask for a reload; with `poll`, wait for the job within the poll budget.
    ///
    /// Once the reload request is accepted the result is `changed` and never
    /// `failed`: problems with the job itself are reported as warnings.
    pub async fn request_reload(&self, poll: bool) -> ReconcileResult {
        if self.ctx.check_mode() {
            return ReconcileResult::changed("Reload would be requested");
        }

        let job = match self.ctx.client().reload().await {
            Ok(job) => job,
            Err(e) => return self.ctx.finish("Reload", Err(CoreError::from(e))),
        };
        log::info!("Reload job {} accepted", job.id);

        if !poll {
            return ReconcileResult::changed(format!("Reload job {} accepted", job.id))
                .with_resource(&job);
        }

        let poller = JobPoller::new(self.ctx.client(), self.ctx.options.poll);
        match poller.poll(&job.id).await {
            Ok(JobOutcome::Converged(done)) => {
                log::info!("Reload job {} finished", done.id);
                ReconcileResult::changed(format!("Reload job {} finished", done.id))
                    .with_resource(&done)
            }
            Ok(JobOutcome::RemoteJobError(failed)) => {
                let warning = format!(
                    "Reload job {} finished with an error (status '{}')",
                    failed.id, failed.status
                );
                log::warn!("{warning}");
                ReconcileResult::changed(format!("Reload job {} accepted", failed.id))
                    .with_resource(&failed)
                    .with_warning(warning, Some(ErrorKind::RemoteJobError))
            }
            Ok(JobOutcome::TimedOut { last, attempts }) => {
                let warning = format!(
                    "Reload job {} still unfinished after {attempts} status check(s) (status '{}')",
                    last.id, last.status
                );
                log::warn!("{warning}");
                ReconcileResult::changed(format!("Reload job {} accepted", last.id))
                    .with_resource(&last)
                    .with_warning(warning, None)
            }
            Err(e) => {
                let warning = format!("Reload job {} could not be polled: {e}", job.id);
                log::warn!("{warning}");
                ReconcileResult::changed(format!("Reload job {} accepted", job.id))
                    .with_resource(&job)
                    .with_warning(warning, Some(ErrorKind::of_provider(&e)))
            }
        }
    }
}
