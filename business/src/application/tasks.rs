use crate::domain::tasks::{BackgroundTask, TaskSpawner};

/// Detaches tasks onto the ambient tokio runtime.
pub struct TokioTaskSpawner;

impl TaskSpawner for TokioTaskSpawner {
    fn spawn(&self, task: BackgroundTask) {
        tokio::spawn(task);
    }
}
