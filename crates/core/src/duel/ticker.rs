//! Flavor progress while the narrative is pending.

/// Progress before the first tick; each tick adds one before emitting
pub const TICKER_START: u8 = 87;
/// Highest progress a tick emits, one below "commentary ready"
pub const TICKER_CEILING: u8 = 94;

const MESSAGES: [&str; 5] = [
    "Crafting savage roasts...",
    "Analyzing weak points...",
    "Loading comeback arsenal...",
    "Sharpening insults...",
    "Polishing the burns...",
];

/// Yields `(progress, message)` once per interval, rotating messages,
/// until [`TICKER_CEILING`] has been emitted
#[derive(Debug, Clone)]
pub struct CommentaryTicker {
    progress: u8,
    index: usize,
}

impl Default for CommentaryTicker {
    fn default() -> Self {
        Self {
            progress: TICKER_START,
            index: 0,
        }
    }
}

impl CommentaryTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next flavor update, `None` once exhausted
    pub fn tick(&mut self) -> Option<(u8, &'static str)> {
        if self.progress >= TICKER_CEILING {
            return None;
        }
        self.progress += 1;
        let message = MESSAGES[self.index % MESSAGES.len()];
        self.index += 1;
        Some((self.progress, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_rotates_and_caps() {
        let mut ticker = CommentaryTicker::new();
        let ticks: Vec<_> = std::iter::from_fn(|| ticker.tick()).collect();

        let progress: Vec<u8> = ticks.iter().map(|t| t.0).collect();
        assert_eq!(progress, (88..=94).collect::<Vec<u8>>());
        assert_eq!(ticks[0], (88, "Crafting savage roasts..."));
        assert_eq!(ticks[5], (93, "Crafting savage roasts..."));
        assert_eq!(ticks.last().map(|t| t.0), Some(TICKER_CEILING));
        assert!(ticker.tick().is_none());
    }
}
