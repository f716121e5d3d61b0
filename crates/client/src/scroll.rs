//! Infinite-scroll offset emission.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollState {
    Idle,
    Requesting,
}

/// Decides when the viewport position warrants requesting the next batch
/// and when pagination is done.
///
/// One request is in flight at a time (`Idle -> Requesting -> Idle`);
/// offsets are emitted at most once and no sooner than `throttle` after
/// the previous emission, whatever the scroll event frequency.
#[derive(Debug)]
pub struct ScrollController {
    state: ScrollState,
    last_offset: Option<usize>,
    last_emitted_at: Option<Instant>,
    throttle: Duration,
}

impl ScrollController {
    pub fn new(throttle: Duration) -> Self {
        Self {
            state: ScrollState::Idle,
            last_offset: None,
            last_emitted_at: None,
            throttle,
        }
    }

    /// Returns the next offset to request, if any.
    ///
    /// A new offset is emitted only when the rendered range end equals the
    /// number of loaded items (the user reached the last loaded row), the
    /// controller is idle, the offset was not requested before, and the
    /// termination contract `offset + 1 >= total` does not hold yet.
    pub fn on_scroll(
        &mut self,
        range_end: usize,
        loaded: usize,
        total: usize,
        now: Instant,
    ) -> Option<usize> {
        if self.state == ScrollState::Requesting {
            return None;
        }
        if range_end != loaded {
            return None;
        }

        let offset = loaded;
        if self.last_offset.is_some_and(|last| offset <= last) {
            return None;
        }
        // `total == 0` means the catalog size is still unknown (nothing
        // fetched yet) and must not block the first request.
        if total > 0 && offset + 1 >= total {
            return None;
        }
        if self
            .last_emitted_at
            .is_some_and(|at| now.duration_since(at) < self.throttle)
        {
            return None;
        }

        self.state = ScrollState::Requesting;
        self.last_offset = Some(offset);
        self.last_emitted_at = Some(now);
        Some(offset)
    }

    /// The in-flight request resolved (successfully or not).
    pub fn complete(&mut self) {
        self.state = ScrollState::Idle;
    }

    /// Whether pagination has reached the end of the catalog.
    pub fn is_terminal(&self, total: usize) -> bool {
        total > 0 && self.last_offset.is_some_and(|o| o + 1 >= total)
    }
}
