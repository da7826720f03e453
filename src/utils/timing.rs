use log::info;
use std::time::{Duration, Instant};

/// Scoped elapsed-time reporter: logs `"<name> took <elapsed>"` at info level when dropped.
///
/// ```ignore
/// let _t = TimeTrack::new("digest");
/// // ... work ...
/// ```
pub struct TimeTrack {
    name: String,
    start: Instant,
}

impl TimeTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for TimeTrack {
    fn drop(&mut self) {
        info!("{} took {:?}", self.name, self.start.elapsed());
    }
}
