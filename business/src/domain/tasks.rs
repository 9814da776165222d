use std::future::Future;
use std::pin::Pin;

pub type BackgroundTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs detached work. No join handle is returned: callers get no completion or
/// delivery guarantee, and a task outliving the process is simply lost.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: BackgroundTask);
}
