//! Recording notification sink for lifecycle tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::ports::{Notification, Notifier, NotifierError, NotifierResult};

/// In-memory notification sink.
///
/// Records every dispatched notification for assertions. A failing mode
/// can be switched on to exercise the fire-and-forget contract: the
/// triggering operation must still succeed when delivery fails.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    state: Arc<RwLock<RecordingNotifierState>>,
}

#[derive(Debug, Default)]
struct RecordingNotifierState {
    deliveries: Vec<Notification>,
    failure: Option<String>,
}

impl RecordingNotifier {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification delivered so far.
    ///
    /// # Errors
    ///
    /// Returns delivery errors when lock acquisition fails.
    pub fn deliveries(&self) -> NotifierResult<Vec<Notification>> {
        let state = self
            .state
            .read()
            .map_err(|err| NotifierError::delivery(std::io::Error::other(err.to_string())))?;
        Ok(state.deliveries.clone())
    }

    /// Makes every subsequent dispatch fail with the given message.
    ///
    /// # Errors
    ///
    /// Returns delivery errors when lock acquisition fails.
    pub fn set_failing(&self, message: impl Into<String>) -> NotifierResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| NotifierError::delivery(std::io::Error::other(err.to_string())))?;
        state.failure = Some(message.into());
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> NotifierResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| NotifierError::delivery(std::io::Error::other(err.to_string())))?;
        if let Some(message) = &state.failure {
            return Err(NotifierError::delivery(std::io::Error::other(
                message.clone(),
            )));
        }
        state.deliveries.push(notification);
        Ok(())
    }
}
