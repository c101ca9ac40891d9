//! Job - unit of work carried through the pool

use thiserror::Error;
use uuid::Uuid;

/// Failure of one job, set by the worker that ran it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job {job_id} failed: {message}")]
pub struct JobError {
    pub job_id: String,
    pub message: String,
}

/// A unit of work
///
/// Created by the submitter and filled in exactly once by a worker:
/// afterwards exactly one of `result` / `error` is set.
#[derive(Debug, Clone)]
pub struct Job<T, R> {
    pub id: String,
    pub input: T,
    pub result: Option<R>,
    pub error: Option<JobError>,
}

impl<T, R> Job<T, R> {
    /// Create a job with a random (v4 UUID) id
    pub fn new(input: T) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), input)
    }

    pub fn with_id(id: impl Into<String>, input: T) -> Self {
        Self {
            id: id.into(),
            input,
            result: None,
            error: None,
        }
    }

    /// Whether a worker has processed this job
    pub fn is_done(&self) -> bool {
        self.result.is_some() || self.error.is_some()
    }

    pub(crate) fn succeed(&mut self, result: R) {
        self.result = Some(result);
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(JobError {
            job_id: self.id.clone(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_has_uuid() {
        let a: Job<u32, u32> = Job::new(1);
        let b: Job<u32, u32> = Job::new(1);

        assert!(Uuid::parse_str(&a.id).is_ok());
        assert_ne!(a.id, b.id);
        assert!(!a.is_done());
    }

    #[test]
    fn test_fail_sets_error() {
        let mut job: Job<&str, ()> = Job::with_id("job-7", "payload");
        job.fail("disk full");

        assert!(job.is_done());
        assert!(job.result.is_none());
        assert_eq!(
            job.error.unwrap().to_string(),
            "job job-7 failed: disk full"
        );
    }
}
