use coarsetime::{Duration as CDuration, Instant as CInstant};
use std::time::Duration;

/// Decides when a [`DisplayLogger`][super::DisplayLogger] writes out its summaries.
///
/// Summaries are chunked into fixed wall-clock intervals.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ByTime {
    // The current time is checked on every log call so it is read from the coarse clock.
    // Millisecond accuracy is plenty for intervals on the order of seconds.
    pub chunk_duration: CDuration,
    coarse_chunk_start: CInstant,
}

impl ByTime {
    pub fn new(chunk_duration: Duration) -> Self {
        Self {
            chunk_duration: CDuration::new(chunk_duration.as_secs(), chunk_duration.subsec_nanos()),
            coarse_chunk_start: CInstant::now(),
        }
    }

    /// Whether the current chunk has run its full duration.
    #[inline]
    pub fn chunk_elapsed(&self) -> bool {
        self.coarse_chunk_start.elapsed() > self.chunk_duration
    }

    /// Start a new chunk.
    pub fn note_flush(&mut self) {
        self.coarse_chunk_start = CInstant::now();
    }
}

impl Default for ByTime {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
