use tokio::sync::watch;

use crate::accumulator::Status;
use crate::config::PaginationConfig;
use crate::fetch::PageFetcher;
use crate::loader::Loader;

/// Viewport geometry in arbitrary but consistent units (rows, pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollPosition {
    /// Distance scrolled from the top.
    pub offset: f64,
    /// Visible height.
    pub viewport: f64,
    /// Total content height.
    pub content: f64,
}

impl ScrollPosition {
    pub const fn new(offset: f64, viewport: f64, content: f64) -> Self {
        Self {
            offset,
            viewport,
            content,
        }
    }

    /// Fraction of the content seen so far: bottom edge of the viewport over content height.
    /// Content that fits in the viewport counts as fully seen.
    pub fn fraction(&self) -> f64 {
        if self.content <= 0.0 || self.content <= self.viewport {
            return 1.0;
        }
        ((self.offset + self.viewport) / self.content).clamp(0.0, 1.0)
    }
}

/// Fires a next-page request once the scrolled fraction reaches the threshold.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTrigger {
    threshold: f64,
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self { threshold: 0.9 }
    }
}

impl ScrollTrigger {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(config.scroll_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn should_fire(&self, position: ScrollPosition, status: &Status) -> bool {
        // Loading, Error, Exhausted and Idle never fire.
        if !status.can_load_more() {
            return false;
        }
        position.fraction() >= self.threshold
    }

    /// Evaluate one scroll change. Returns `true` if a fetch was issued.
    pub fn on_scroll<F: PageFetcher + 'static>(
        &self,
        position: ScrollPosition,
        loader: &mut Loader<F>,
    ) -> bool {
        if !self.should_fire(position, loader.status()) {
            return false;
        }
        tracing::debug!(
            fraction = position.fraction(),
            threshold = self.threshold,
            "scroll threshold crossed"
        );
        loader.request_next_page()
    }
}

/// Publisher side of the viewport scroll signal, owned by the view.
pub struct ScrollSignal {
    tx: watch::Sender<ScrollPosition>,
}

impl Default for ScrollSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ScrollPosition::default());
        Self { tx }
    }

    pub fn publish(&self, position: ScrollPosition) {
        // Stored even with no observer attached.
        self.tx.send_replace(position);
    }

    pub fn current(&self) -> ScrollPosition {
        *self.tx.borrow()
    }

    /// Attach an observer. It stays registered until dropped.
    pub fn observe(&self) -> ScrollObserver {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();
        tracing::debug!(observers = self.tx.receiver_count(), "scroll observer attached");
        ScrollObserver { rx }
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Scoped registration on a [`ScrollSignal`]; detaches on drop, whatever the exit path.
pub struct ScrollObserver {
    rx: watch::Receiver<ScrollPosition>,
}

impl ScrollObserver {
    /// Latest position if it changed since the last call, without waiting.
    pub fn poll_change(&mut self) -> Option<ScrollPosition> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }

    /// Wait for the next change. `None` once the signal is gone.
    pub async fn changed(&mut self) -> Option<ScrollPosition> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

impl Drop for ScrollObserver {
    fn drop(&mut self) {
        tracing::debug!("scroll observer detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        assert!((ScrollPosition::new(0.0, 10.0, 100.0).fraction() - 0.1).abs() < 1e-9);
        assert!((ScrollPosition::new(80.0, 10.0, 100.0).fraction() - 0.9).abs() < 1e-9);
        assert_eq!(ScrollPosition::new(95.0, 10.0, 100.0).fraction(), 1.0);
    }

    #[test]
    fn test_content_that_fits_counts_as_fully_scrolled() {
        assert_eq!(ScrollPosition::new(0.0, 50.0, 20.0).fraction(), 1.0);
        assert_eq!(ScrollPosition::new(0.0, 50.0, 0.0).fraction(), 1.0);
    }

    #[test]
    fn test_fires_only_when_more_is_available() {
        let trigger = ScrollTrigger::default();
        let bottom = ScrollPosition::new(90.0, 10.0, 100.0);
        assert!(trigger.should_fire(bottom, &Status::LoadedWithMore));
        for status in [Status::Idle, Status::Loading, Status::Exhausted] {
            assert!(!trigger.should_fire(bottom, &status), "{status}");
        }
    }

    #[test]
    fn test_threshold_boundary() {
        let trigger = ScrollTrigger::new(0.9);
        let status = Status::LoadedWithMore;
        assert!(!trigger.should_fire(ScrollPosition::new(79.0, 10.0, 100.0), &status));
        assert!(trigger.should_fire(ScrollPosition::new(80.0, 10.0, 100.0), &status));
    }

    #[test]
    fn test_observer_detaches_on_drop() {
        let signal = ScrollSignal::new();
        assert_eq!(signal.observer_count(), 0);
        {
            let _observer = signal.observe();
            assert_eq!(signal.observer_count(), 1);
        }
        assert_eq!(signal.observer_count(), 0);
    }

    #[test]
    fn test_observer_detaches_on_panic_unwind() {
        let signal = ScrollSignal::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _observer = signal.observe();
            panic!("view crashed");
        }));
        assert!(result.is_err());
        assert_eq!(signal.observer_count(), 0);
    }

    #[test]
    fn test_poll_change_sees_latest_only() {
        let signal = ScrollSignal::new();
        let mut observer = signal.observe();
        // Attaching reports the current position once.
        assert_eq!(observer.poll_change(), Some(ScrollPosition::default()));
        assert_eq!(observer.poll_change(), None);

        signal.publish(ScrollPosition::new(1.0, 10.0, 100.0));
        signal.publish(ScrollPosition::new(2.0, 10.0, 100.0));
        assert_eq!(observer.poll_change(), Some(ScrollPosition::new(2.0, 10.0, 100.0)));
        assert_eq!(observer.poll_change(), None);
    }

    #[tokio::test]
    async fn test_changed_ends_when_signal_dropped() {
        let signal = ScrollSignal::new();
        let mut observer = signal.observe();
        observer.poll_change();
        drop(signal);
        assert_eq!(observer.changed().await, None);
    }
}
