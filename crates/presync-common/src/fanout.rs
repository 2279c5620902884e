//! Concurrent fan-out of independent tasks joined at a single barrier

use std::future::Future;
use tokio::task::JoinSet;

/// What happens to sibling tasks once one task has failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Every dispatched task runs to completion; the first error is
    /// reported after all of them finish.
    #[default]
    RunToCompletion,
    /// Abort the remaining tasks as soon as the first error is observed.
    ///
    /// Blocking tasks that already started cannot be interrupted and still
    /// finish.
    CancelSiblings,
}

/// A set of tasks, each producing its own `Result`, joined by [`FanOut::join`].
///
/// Tasks never share an output collection: each one returns its value and
/// the joiner merges them on a single task, in spawn order.
pub struct FanOut<T, E> {
    tasks: JoinSet<(usize, Result<T, E>)>,
    policy: ErrorPolicy,
    spawned: usize,
}

impl<T, E> FanOut<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create an empty fan-out with the given error policy
    #[must_use]
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            tasks: JoinSet::new(),
            policy,
            spawned: 0,
        }
    }

    /// Dispatch an async task
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let index = self.next_index();
        self.tasks.spawn(async move { (index, task.await) });
    }

    /// Dispatch a blocking task (filesystem I/O) on the blocking pool
    pub fn spawn_blocking<F>(&mut self, task: F)
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let index = self.next_index();
        self.tasks.spawn_blocking(move || (index, task()));
    }

    /// Number of tasks dispatched so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.spawned
    }

    /// `true` when no task has been dispatched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawned == 0
    }

    /// Wait for the dispatched tasks and return their values in spawn order,
    /// or the first error observed.
    ///
    /// A panicking task re-raises its panic here.
    pub async fn join(mut self) -> Result<Vec<T>, E> {
        let mut values = Vec::with_capacity(self.spawned);
        let mut first_error = None;

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((index, Ok(value))) => values.push((index, value)),
                Ok((_, Err(e))) => {
                    if first_error.is_none() {
                        if self.policy == ErrorPolicy::CancelSiblings {
                            self.tasks.abort_all();
                        }
                        first_error = Some(e);
                    }
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => std::panic::resume_unwind(e.into_panic()),
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        values.sort_by_key(|(index, _)| *index);
        Ok(values.into_iter().map(|(_, value)| value).collect())
    }

    fn next_index(&mut self) -> usize {
        let index = self.spawned;
        self.spawned += 1;
        index
    }
}
