//! Spoken output.
//!
//! The core never waits. Every line it produces carries a pacing hint and
//! lands in a queue that the presentation layer drains and voices (or
//! prints) at its own speed.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// How long the presenter should wait after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Pause {
    None,
    Short,
    #[default]
    Normal,
    Long,
}

impl Pause {
    /// Scale a base pace to this pause. `Normal` is the base pace itself.
    pub fn duration(&self, pace: Duration) -> Duration {
        match self {
            Pause::None => Duration::ZERO,
            Pause::Short => pace / 2,
            Pause::Normal => pace,
            Pause::Long => pace * 2,
        }
    }
}

/// One line of narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narration {
    pub text: String,
    pub pause: Pause,
}

impl Narration {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pause: Pause::Normal,
        }
    }

    pub fn with_pause(mut self, pause: Pause) -> Self {
        self.pause = pause;
        self
    }
}

impl std::fmt::Display for Narration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// FIFO of narration lines waiting to be presented.
#[derive(Debug, Clone, Default)]
pub struct NarrationQueue {
    lines: VecDeque<Narration>,
}

impl NarrationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Narration) {
        self.lines.push_back(line);
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = Narration>) {
        self.lines.extend(lines);
    }

    /// Take every queued line in order.
    pub fn drain(&mut self) -> Vec<Narration> {
        self.lines.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_scaling() {
        let pace = Duration::from_millis(1000);
        assert_eq!(Pause::None.duration(pace), Duration::ZERO);
        assert_eq!(Pause::Short.duration(pace), Duration::from_millis(500));
        assert_eq!(Pause::Normal.duration(pace), Duration::from_millis(1000));
        assert_eq!(Pause::Long.duration(pace), Duration::from_millis(2000));
        assert_eq!(Pause::Long.duration(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = NarrationQueue::new();
        queue.push(Narration::new("first"));
        queue.extend([Narration::new("second").with_pause(Pause::Long)]);
        assert_eq!(queue.len(), 2);

        let lines = queue.drain();
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].pause, Pause::Long);
        assert!(queue.is_empty());
    }
}
