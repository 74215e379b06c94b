//! Bounded worker pool for per-project repository work.
//!
//! Each job runs on tokio's blocking pool (libgit2 calls block), at most
//! `jobs` at a time, under a per-job timeout. Results come back in input
//! order. A failed job either aborts the batch or is replaced by the
//! result type's default, depending on the [`FailurePolicy`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::VcsError;
use crate::settings::{FailurePolicy, Settings};
use crate::vcs::VersionControl;

/// A unit of work against one project's repository.
pub struct Job<T> {
    pub project: String,
    pub run: Box<dyn FnOnce(&dyn VersionControl) -> Result<T, VcsError> + Send>,
}

impl<T> Job<T> {
    pub fn new<F>(project: impl Into<String>, run: F) -> Self
    where
        F: FnOnce(&dyn VersionControl) -> Result<T, VcsError> + Send + 'static,
    {
        Self {
            project: project.into(),
            run: Box::new(run),
        }
    }
}

/// Runs [`Job`]s against a shared backend.
#[derive(Clone)]
pub struct Runner {
    vcs: Arc<dyn VersionControl>,
    jobs: usize,
    timeout: Duration,
    policy: FailurePolicy,
}

impl Runner {
    pub fn new(
        vcs: Arc<dyn VersionControl>,
        jobs: usize,
        timeout: Duration,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            vcs,
            jobs: jobs.max(1),
            timeout,
            policy,
        }
    }

    pub fn from_settings(vcs: Arc<dyn VersionControl>, settings: &Settings) -> Self {
        Self::new(vcs, settings.jobs, settings.timeout, settings.policy)
    }

    /// Run all jobs and return their results in input order.
    pub async fn run<T>(&self, jobs: Vec<Job<T>>) -> Result<Vec<T>, VcsError>
    where
        T: Default + Send + 'static,
    {
        let mut results: Vec<T> = (0..jobs.len()).map(|_| T::default()).collect();
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut set = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let vcs = Arc::clone(&self.vcs);
            let semaphore = Arc::clone(&semaphore);
            let limit = self.timeout;

            set.spawn(async move {
                let Job { project, run } = job;
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => run_one(vcs, &project, run, limit).await,
                    Err(e) => Err(VcsError::WorkerFailed(e.to_string())),
                };
                (index, project, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            let (index, project, result) =
                joined.map_err(|e| VcsError::WorkerFailed(e.to_string()))?;

            match result {
                Ok(value) => results[index] = value,
                Err(e) => match self.policy {
                    FailurePolicy::Fail => {
                        set.abort_all();
                        return Err(e);
                    }
                    FailurePolicy::Skip => {
                        warn!(project = %project, error = %e, "Skipping project");
                    }
                },
            }
        }

        Ok(results)
    }
}

async fn run_one<T>(
    vcs: Arc<dyn VersionControl>,
    project: &str,
    run: Box<dyn FnOnce(&dyn VersionControl) -> Result<T, VcsError> + Send>,
    limit: Duration,
) -> Result<T, VcsError>
where
    T: Send + 'static,
{
    debug!(project, "Starting repository job");

    let handle = tokio::task::spawn_blocking(move || run(vcs.as_ref()));

    match timeout(limit, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(VcsError::WorkerFailed(e.to_string())),
        // The blocking thread cannot be interrupted; its result is discarded.
        Err(_) => Err(VcsError::Timeout {
            project: project.to_string(),
            secs: limit.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::vcs::MockVersionControl;

    fn runner(mock: MockVersionControl, jobs: usize, policy: FailurePolicy) -> Runner {
        Runner::new(Arc::new(mock), jobs, Duration::from_secs(5), policy)
    }

    fn tag_job(project: &str) -> Job<Vec<String>> {
        let path = PathBuf::from("/repos").join(project);
        Job::new(project, move |vcs| vcs.list_tags(&path))
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let mut mock = MockVersionControl::new();
        mock.expect_list_tags()
            .returning(|path| Ok(vec![path.file_name().unwrap().to_string_lossy().into_owned()]));

        let jobs = ["a", "b", "c", "d"].into_iter().map(tag_job).collect();
        let results = runner(mock, 3, FailurePolicy::Fail).run(jobs).await.unwrap();

        assert_eq!(
            results,
            vec![vec!["a"], vec!["b"], vec!["c"], vec!["d"]]
        );
    }

    #[tokio::test]
    async fn test_skip_policy_replaces_failure_with_default() {
        let mut mock = MockVersionControl::new();
        mock.expect_list_tags().returning(|path| {
            if path.ends_with("missing") {
                Err(VcsError::ProjectNotFound {
                    path: path.to_path_buf(),
                })
            } else {
                Ok(vec!["release/1.0.0".to_string()])
            }
        });

        let jobs = vec![tag_job("svc-a"), tag_job("missing")];
        let results = runner(mock, 1, FailurePolicy::Skip).run(jobs).await.unwrap();

        assert_eq!(results[0], vec!["release/1.0.0"]);
        assert!(results[1].is_empty());
    }

    #[tokio::test]
    async fn test_fail_policy_returns_error() {
        let mut mock = MockVersionControl::new();
        mock.expect_list_tags().returning(|path| {
            Err(VcsError::ProjectNotFound {
                path: path.to_path_buf(),
            })
        });

        let result = runner(mock, 2, FailurePolicy::Fail)
            .run(vec![tag_job("missing")])
            .await;

        assert!(matches!(result, Err(VcsError::ProjectNotFound { .. })));
    }

    #[tokio::test]
    async fn test_timeout_reports_project() {
        let mock = MockVersionControl::new();
        let runner = Runner::new(
            Arc::new(mock),
            1,
            Duration::from_millis(50),
            FailurePolicy::Fail,
        );

        let slow = Job::new("svc-slow", |_vcs: &dyn VersionControl| {
            std::thread::sleep(Duration::from_millis(500));
            Ok(vec!["late".to_string()])
        });

        let result = runner.run(vec![slow]).await;
        assert!(matches!(
            result,
            Err(VcsError::Timeout { ref project, .. }) if project == "svc-slow"
        ));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..6)
            .map(|i| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                Job::new(format!("p{}", i), move |_vcs: &dyn VersionControl| {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
            })
            .collect();

        let results = runner(MockVersionControl::new(), 2, FailurePolicy::Fail)
            .run(jobs)
            .await
            .unwrap();

        assert_eq!(results, vec![0, 1, 2, 3, 4, 5]);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_zero_jobs_clamped() {
        let runner = Runner::new(
            Arc::new(MockVersionControl::new()),
            0,
            Duration::from_secs(1),
            FailurePolicy::Skip,
        );
        assert_eq!(runner.jobs, 1);
        assert_eq!(runner.policy, FailurePolicy::Skip);
    }
}
