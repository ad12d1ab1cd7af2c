//! Trailing-edge debouncing of editor input.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period before an edit is forwarded.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Forwards only the last value of each burst, once input has been quiet for
/// the configured delay.
///
/// Dropping the debouncer flushes the pending value, if any, and ends the task.
#[derive(Debug)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn a debouncer on the current tokio runtime.
    ///
    /// Returns the debouncer and the receiver of settled values.
    pub fn new(delay: Duration) -> (Self, mpsc::Receiver<T>) {
        let (input, mut rx) = mpsc::unbounded_channel::<T>();
        let (output, settled) = mpsc::channel(16);

        let task = tokio::spawn(async move {
            let mut pending: Option<T> = None;

            loop {
                match pending.take() {
                    None => match rx.recv().await {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    Some(value) => match tokio::time::timeout(delay, rx.recv()).await {
                        Ok(Some(newer)) => pending = Some(newer),
                        Ok(None) => {
                            let _ = output.send(value).await;
                            break;
                        }
                        Err(_) => {
                            if output.send(value).await.is_err() {
                                break;
                            }
                        }
                    },
                }
            }
        });

        (Self { input, task }, settled)
    }

    /// Queue a value. Returns `false` once the debouncer has shut down.
    pub fn push(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }

    /// Whether the forwarding task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(30);

    #[tokio::test]
    async fn forwards_last_value_of_a_burst() {
        let (debouncer, mut settled) = Debouncer::new(DELAY);

        for edit in ["a", "ab", "abc"] {
            assert!(debouncer.push(edit.to_string()));
        }

        let value = tokio::time::timeout(Duration::from_secs(2), settled.recv())
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("abc"));

        let nothing = tokio::time::timeout(DELAY * 3, settled.recv()).await;
        assert!(nothing.is_err(), "burst should settle once");
    }

    #[tokio::test]
    async fn separate_bursts_settle_separately() {
        let (debouncer, mut settled) = Debouncer::new(DELAY);

        debouncer.push(1);
        assert_eq!(settled.recv().await, Some(1));

        debouncer.push(2);
        debouncer.push(3);
        assert_eq!(settled.recv().await, Some(3));
    }

    #[tokio::test]
    async fn drop_flushes_pending_value() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_secs(60));

        debouncer.push("late");
        drop(debouncer);

        assert_eq!(settled.recv().await, Some("late"));
        assert_eq!(settled.recv().await, None);
    }
}
