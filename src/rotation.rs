//! Timed cycling through a fixed list of content items, exactly one visible.

use std::time::Duration;

use thiserror::Error;

pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    #[error("no content item at index {index} ({len} configured)")]
    InvalidIndex { index: usize, len: usize },
}

pub struct ContentRotator {
    items: Vec<String>,
    current: usize,
    interval: Duration,
    running: bool,
    elapsed: Duration,
}

impl ContentRotator {
    /// Creates a stopped rotator showing the first item.
    pub fn new(items: Vec<String>, interval: Duration) -> Self {
        Self {
            items,
            current: 0,
            interval: interval.max(MIN_INTERVAL),
            running: false,
            elapsed: Duration::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Index of the visible item, `None` when there is nothing to show.
    pub fn current(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.current)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.items.get(self.current).map(String::as_str)
    }

    pub fn visible(&self, index: usize) -> bool {
        index < self.items.len() && index == self.current
    }

    pub fn start(&mut self) {
        if self.items.len() < 2 {
            log::warn!(
                "Content rotation needs at least two items, found {}",
                self.items.len()
            );
            return;
        }
        self.running = true;
        self.elapsed = Duration::ZERO;
        log::info!(
            "Content rotation started: {} items every {:?}",
            self.items.len(),
            self.interval
        );
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("Content rotation stopped");
        }
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    /// Feeds elapsed time; switches once per full interval while running.
    pub fn advance(&mut self, dt: Duration) {
        if !self.running {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.next();
        }
    }

    pub fn next(&mut self) {
        if self.items.len() <= 1 {
            return;
        }
        self.show((self.current + 1) % self.items.len());
    }

    pub fn prev(&mut self) {
        if self.items.len() <= 1 {
            return;
        }
        self.show((self.current + self.items.len() - 1) % self.items.len());
    }

    pub fn select(&mut self, index: usize) -> Result<(), RotationError> {
        if index >= self.items.len() {
            return Err(RotationError::InvalidIndex {
                index,
                len: self.items.len(),
            });
        }
        self.show(index);
        Ok(())
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_INTERVAL);
        if self.running {
            self.elapsed = Duration::ZERO;
        }
    }

    fn show(&mut self, index: usize) {
        self.current = index;
        log::debug!(
            "Showing content item {}/{}: {}",
            index + 1,
            self.items.len(),
            self.items[index]
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotator(n: usize) -> ContentRotator {
        let items = (0..n).map(|i| format!("item{}", i)).collect();
        ContentRotator::new(items, Duration::from_secs(2))
    }

    fn visible_count(r: &ContentRotator) -> usize {
        (0..r.len()).filter(|&i| r.visible(i)).count()
    }

    #[test]
    fn test_only_first_item_visible_initially() {
        let r = rotator(3);
        assert_eq!(r.current(), Some(0));
        assert!(r.visible(0));
        assert_eq!(visible_count(&r), 1);
        assert!(!r.is_running());
    }

    #[test]
    fn test_advance_switches_per_full_interval() {
        let mut r = rotator(3);
        r.start();

        r.advance(Duration::from_millis(1999));
        assert_eq!(r.current(), Some(0));
        r.advance(Duration::from_millis(1));
        assert_eq!(r.current(), Some(1));
        r.advance(Duration::from_secs(4));
        assert_eq!(r.current(), Some(0));
        assert_eq!(visible_count(&r), 1);
    }

    #[test]
    fn test_stopped_rotator_does_not_advance() {
        let mut r = rotator(3);
        r.advance(Duration::from_secs(10));
        assert_eq!(r.current(), Some(0));

        r.start();
        r.stop();
        r.advance(Duration::from_secs(10));
        assert_eq!(r.current(), Some(0));
    }

    #[test]
    fn test_start_needs_two_items() {
        let mut r = rotator(1);
        r.start();
        assert!(!r.is_running());
        r.next();
        r.prev();
        assert_eq!(r.current(), Some(0));
    }

    #[test]
    fn test_next_and_prev_wrap() {
        let mut r = rotator(3);
        r.prev();
        assert_eq!(r.current(), Some(2));
        r.next();
        assert_eq!(r.current(), Some(0));
        assert_eq!(r.current_name(), Some("item0"));
    }

    #[test]
    fn test_select() {
        let mut r = rotator(3);
        assert_eq!(r.select(2), Ok(()));
        assert!(r.visible(2));
        assert_eq!(
            r.select(3),
            Err(RotationError::InvalidIndex { index: 3, len: 3 })
        );
        assert_eq!(r.current(), Some(2));
    }

    #[test]
    fn test_interval_is_clamped_and_restarts_timer() {
        let mut r = rotator(2);
        r.start();
        r.advance(Duration::from_millis(1500));
        r.set_interval(Duration::from_millis(10));
        assert_eq!(r.interval(), MIN_INTERVAL);

        r.advance(Duration::from_millis(99));
        assert_eq!(r.current(), Some(0));
        r.advance(Duration::from_millis(1));
        assert_eq!(r.current(), Some(1));
    }

    #[test]
    fn test_empty_rotator() {
        let mut r = rotator(0);
        assert!(r.is_empty());
        assert_eq!(r.current(), None);
        assert!(!r.visible(0));
        assert!(r.select(0).is_err());
    }
}
