//! Ordered compensation for multi-step workflows.
//!
//! A [`Saga`] records one compensation per completed step. On failure,
//! [`Saga::abort`] runs them newest first and hands back the error that
//! triggered the rollback. Compensation failures are logged and swallowed.

use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::AppError;

type Compensation = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), AppError>> + Send>;

pub struct Saga {
    name: &'static str,
    compensations: Vec<(&'static str, Compensation)>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
        }
    }

    /// Register the inverse of a step that has just succeeded.
    pub fn on_rollback<F, Fut>(&mut self, step: &'static str, compensation: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        self.compensations
            .push((step, Box::new(move || compensation().boxed())));
    }

    /// Unwind every recorded step in reverse order and return `cause`.
    pub async fn abort(self, cause: AppError) -> AppError {
        tracing::warn!(
            saga = self.name,
            steps = self.compensations.len(),
            error = %cause,
            "rolling back"
        );

        for (step, compensation) in self.compensations.into_iter().rev() {
            match compensation().await {
                Ok(()) => tracing::debug!(saga = self.name, step, "compensated"),
                Err(e) => tracing::error!(
                    saga = self.name,
                    step,
                    error = %e,
                    "compensation failed; manual cleanup required"
                ),
            }
        }

        cause
    }

    /// Keep every step; the recorded compensations are dropped unrun.
    pub fn commit(self) {
        tracing::debug!(saga = self.name, steps = self.compensations.len(), "committed");
    }
}
