//! Clipboard polling loop.

use crate::clipboard::ClipboardAccess;
use crate::qa::{normalize, QaStore};
use anyhow::Result;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Source of the pause between polls
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Real wall-clock sleeping
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// What a single poll did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Clipboard text was empty after normalizing
    Empty,
    /// Same normalized text as the previous change
    Unchanged,
    /// New text with no known question; clipboard left alone
    NoMatch,
    /// New text matched a question; clipboard now holds the answer
    Replaced,
}

/// Monitor state for one process run. The store is loaded once and never reloaded.
pub struct Monitor {
    store: QaStore,
    interval: Duration,
    last_seen: String,
}

impl Monitor {
    pub fn new(store: QaStore, interval: Duration) -> Self {
        Self {
            store,
            interval,
            last_seen: String::new(),
        }
    }

    /// Normalized clipboard text from the most recent change
    #[cfg(test)]
    pub fn last_seen(&self) -> &str {
        &self.last_seen
    }

    /// Read the clipboard once and react if its text changed
    pub fn poll_once<C: ClipboardAccess>(&mut self, clipboard: &mut C) -> Result<PollOutcome> {
        let current = clipboard.read_text()?;
        let cleaned = normalize(&current);

        if cleaned.is_empty() {
            return Ok(PollOutcome::Empty);
        }
        if cleaned == self.last_seen {
            return Ok(PollOutcome::Unchanged);
        }

        let outcome = match self.store.find_answer(&current) {
            // An empty answer never clears what the user copied
            Some(answer) if !answer.is_empty() => {
                clipboard.write_text(answer)?;
                info!(question = %cleaned, "Replaced clipboard with answer");
                PollOutcome::Replaced
            }
            _ => {
                debug!("Clipboard changed, no matching question");
                PollOutcome::NoMatch
            }
        };
        self.last_seen = cleaned;
        Ok(outcome)
    }

    /// One cycle: poll, then wait out the interval
    pub fn tick<C: ClipboardAccess, K: Clock>(
        &mut self,
        clipboard: &mut C,
        clock: &mut K,
    ) -> Result<PollOutcome> {
        let outcome = self.poll_once(clipboard)?;
        clock.sleep(self.interval);
        Ok(outcome)
    }

    /// Poll forever. Returns only when clipboard access fails.
    pub fn run<C: ClipboardAccess, K: Clock>(
        &mut self,
        clipboard: &mut C,
        clock: &mut K,
    ) -> Result<()> {
        info!(
            pairs = self.store.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Clipboard monitor running"
        );
        loop {
            self.tick(clipboard, clock)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa::parse_store;
    use anyhow::bail;

    #[derive(Default)]
    struct FakeClipboard {
        text: String,
        writes: Vec<String>,
        fail_reads: bool,
    }

    impl FakeClipboard {
        fn with_text(text: &str) -> Self {
            Self {
                text: text.to_string(),
                ..Default::default()
            }
        }

        /// Simulate the user copying something
        fn copy(&mut self, text: &str) {
            self.text = text.to_string();
        }
    }

    impl ClipboardAccess for FakeClipboard {
        fn read_text(&mut self) -> Result<String> {
            if self.fail_reads {
                bail!("clipboard unavailable");
            }
            Ok(self.text.clone())
        }

        fn write_text(&mut self, text: &str) -> Result<()> {
            self.text = text.to_string();
            self.writes.push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeClock {
        sleeps: Vec<Duration>,
    }

    impl Clock for FakeClock {
        fn sleep(&mut self, duration: Duration) {
            self.sleeps.push(duration);
        }
    }

    fn monitor() -> Monitor {
        let store = parse_store("Q: What is 2+2? A: 4\n---\nQ: Capital of France? A: Paris");
        Monitor::new(store, Duration::from_secs(1))
    }

    #[test]
    fn test_match_replaces_clipboard() {
        let mut m = monitor();
        let mut clip = FakeClipboard::with_text("What   is 2+2?");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::Replaced);
        assert_eq!(clip.text, "4");
        assert_eq!(m.last_seen(), "what is 2+2?");
    }

    #[test]
    fn test_unmatched_change_leaves_clipboard() {
        let mut m = monitor();
        let mut clip = FakeClipboard::with_text("Some Other Text");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::NoMatch);
        assert_eq!(clip.text, "Some Other Text");
        assert!(clip.writes.is_empty());
        assert_eq!(m.last_seen(), "some other text");
    }

    #[test]
    fn test_empty_clipboard_does_nothing() {
        let mut m = monitor();
        let mut clip = FakeClipboard::with_text("  \n ");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::Empty);
        assert_eq!(m.last_seen(), "");
        assert!(clip.writes.is_empty());
    }

    #[test]
    fn test_unchanged_value_is_not_rewritten() {
        let mut m = Monitor::new(parse_store("Q: hello A: world"), Duration::from_secs(1));
        let mut clip = FakeClipboard::with_text("hello");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::Replaced);

        // Re-copied before the next poll: still a known question, but not a change
        clip.copy("HELLO");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::Unchanged);
        assert_eq!(clip.text, "HELLO");
        assert_eq!(clip.writes, vec!["world".to_string()]);
    }

    #[test]
    fn test_empty_answer_leaves_clipboard() {
        let store = parse_store("Q: todo A:\n---\nQ: x A: y");
        let mut m = Monitor::new(store, Duration::from_secs(1));
        let mut clip = FakeClipboard::with_text("todo");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::NoMatch);
        assert_eq!(clip.text, "todo");
        assert!(clip.writes.is_empty());
        assert_eq!(m.last_seen(), "todo");

        clip.copy("X");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::Replaced);
        assert_eq!(clip.text, "y");
    }

    #[test]
    fn test_cycle_after_replacement() {
        let mut m = monitor();
        let mut clip = FakeClipboard::with_text("capital of france?");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::Replaced);
        // The answer itself is the next change
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::NoMatch);
        assert_eq!(m.last_seen(), "paris");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::Unchanged);

        // Copying the question again triggers a fresh replacement
        clip.copy("Capital of France?");
        assert_eq!(m.poll_once(&mut clip).unwrap(), PollOutcome::Replaced);
        assert_eq!(clip.writes, vec!["Paris".to_string(), "Paris".to_string()]);
    }

    #[test]
    fn test_tick_sleeps_interval() {
        let mut m = monitor();
        let mut clip = FakeClipboard::with_text("what is 2+2?");
        let mut clock = FakeClock::default();
        assert_eq!(m.tick(&mut clip, &mut clock).unwrap(), PollOutcome::Replaced);
        assert_eq!(m.tick(&mut clip, &mut clock).unwrap(), PollOutcome::NoMatch);
        assert_eq!(clock.sleeps, vec![Duration::from_secs(1); 2]);
    }

    #[test]
    fn test_read_failure_ends_run() {
        let mut m = monitor();
        let mut clip = FakeClipboard {
            fail_reads: true,
            ..Default::default()
        };
        let mut clock = FakeClock::default();
        let err = m.run(&mut clip, &mut clock).unwrap_err();
        assert!(err.to_string().contains("clipboard unavailable"));
        assert!(clock.sleeps.is_empty());
    }
}
