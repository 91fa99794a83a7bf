//! Toast-style user notifications.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Default,
    Success,
    Error,
}

/// Presentation hook for one-off messages (the toast next to the table).
///
/// Called synchronously from the projector; implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// Routes notifications into the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Error => tracing::error!(text = message, "notification"),
            NotificationLevel::Success | NotificationLevel::Default => {
                tracing::info!(?level, text = message, "notification")
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingNotifier {
        seen: Mutex<Vec<(NotificationLevel, String)>>,
    }

    impl RecordingNotifier {
        pub(crate) fn take(&self) -> Vec<(NotificationLevel, String)> {
            std::mem::take(&mut *self.seen.lock().unwrap())
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NotificationLevel, message: &str) {
            self.seen.lock().unwrap().push((level, message.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_tracing_notifier_as_port() {
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
        notifier.notify(NotificationLevel::Default, "Servers filtered by ALL status");
        notifier.notify(NotificationLevel::Success, "Server created");
        notifier.notify(NotificationLevel::Error, "An error occurred - Error code: 500");
    }
}
