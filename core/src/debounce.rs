use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Coalesces rapid calls: only the last value within `delay` is committed.
pub struct Debouncer<T> {
    delay: Duration,
    commit: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, commit: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            commit: Arc::new(commit),
            pending: Mutex::new(None),
        }
    }

    /// Restarts the timer with `value`. Must be called within a tokio runtime.
    pub fn call(&self, value: T) {
        let delay = self.delay;
        let commit = self.commit.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            commit(value);
        });

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(task) {
                previous.abort();
            }
        }
    }

    /// Drops the pending value, if any. Returns whether one was waiting.
    pub fn cancel(&self) -> bool {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(task) = pending.take() {
                let waiting = !task.is_finished();
                task.abort();
                return waiting;
            }
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        if let Ok(pending) = self.pending.lock() {
            pending.as_ref().is_some_and(|task| !task.is_finished())
        } else {
            false
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(task) = pending.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |value: String| sink.lock().unwrap().push(value))
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_call_in_the_window_commits() {
        let (seen, commit) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(50), commit);

        debouncer.call("p".to_string());
        tokio::time::sleep(Duration::from_millis(20)).await;
        debouncer.call("pa".to_string());
        tokio::time::sleep(Duration::from_millis(20)).await;
        debouncer.call("pat".to_string());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        assert_eq!(*seen.lock().unwrap(), vec!["pat".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_a_stray_commit() {
        let (seen, commit) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(50), commit);

        debouncer.call("late".to_string());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels_the_pending_commit() {
        let (seen, commit) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(50), commit);
        debouncer.call("gone".to_string());
        drop(debouncer);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(seen.lock().unwrap().is_empty());
    }
}
