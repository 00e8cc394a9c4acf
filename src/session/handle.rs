use tokio::task::JoinHandle;

/// Owned handle to a pending timer task.
///
/// Cancelling is idempotent: cancelling an empty handle, cancelling twice, or
/// cancelling a task that already finished is a no-op. Dropping the handle
/// cancels the task.
#[derive(Debug, Default)]
pub struct CancellableHandle {
    task: Option<JoinHandle<()>>,
}

impl CancellableHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `task`, cancelling whatever was tracked before
    pub fn arm(&mut self, task: JoinHandle<()>) {
        self.cancel();
        self.task = Some(task);
    }

    /// Abort the tracked task; returns whether one was still tracked
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Whether a task is tracked and still running
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for CancellableHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
