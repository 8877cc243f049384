use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Instant, Sleep};

/// Single-shot timer owned by one component.
///
/// Arming replaces whatever was pending, so at most one deadline is ever live.
#[derive(Debug, Default)]
pub struct Timer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Timer {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, after: Duration) {
        match self.sleep.as_mut() {
            Some(sleep) => sleep.as_mut().reset(Instant::now() + after),
            None => self.sleep = Some(Box::pin(time::sleep(after))),
        }
    }

    pub fn cancel(&mut self) {
        self.sleep = None;
    }

    /// Resolves when the armed deadline passes, then disarms.
    /// Pending forever while idle, so it can sit in a `select!` unconditionally.
    pub async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                sleep.await;
                self.sleep = None;
            }
            None => future::pending().await,
        }
    }
}
