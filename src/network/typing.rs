use std::time::Duration;

use super::timer::Timer;

pub const TYPING_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Tracks whether the local user is typing, from raw input events.
///
/// `on_input` says when a `typing: true` must go out; a submit or an expired
/// debounce window always means `typing: false`.
#[derive(Debug)]
pub struct TypingTracker {
    is_typing: bool,
    debounce: Duration,
    timer: Timer,
}

impl TypingTracker {
    pub fn new(debounce: Duration) -> Self {
        Self {
            is_typing: false,
            debounce,
            timer: Timer::idle(),
        }
    }

    /// Input field changed. Returns `Some(true)` only on the first keystroke of a burst.
    pub fn on_input(&mut self) -> Option<bool> {
        self.timer.arm(self.debounce);
        if self.is_typing {
            return None;
        }
        self.is_typing = true;
        Some(true)
    }

    /// A message was sent: typing stops right away, whatever the previous state.
    pub fn on_submit(&mut self) {
        self.reset();
    }

    /// Resolves when the debounce window closes and the burst is over.
    pub async fn expired(&mut self) {
        self.timer.fired().await;
        self.is_typing = false;
    }

    /// Drop any burst in progress without notifying anyone.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.is_typing = false;
    }
}

impl Default for TypingTracker {
    fn default() -> Self {
        Self::new(TYPING_DEBOUNCE)
    }
}
