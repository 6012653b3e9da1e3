//! # GPS smoothing
//!
//! A moving average filter over the most recent fixes. Averaging trades a little lag for
//! resistance to the jitter of consumer GPS receivers.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use nav_if::{Coordinate, PositionFix};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Moving average over the last `window_size` positions.
#[derive(Debug, Clone)]
pub struct GpsSmoother {
    window_size: usize,
    history: VecDeque<Coordinate>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for GpsSmoother {
    fn default() -> Self {
        Self::new(5)
    }
}

impl GpsSmoother {
    /// Create a new smoother. A window size of zero is treated as one, i.e. no smoothing.
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);

        Self {
            window_size,
            history: VecDeque::with_capacity(window_size),
        }
    }

    /// Add a fix to the window and return the smoothed position.
    pub fn smooth(&mut self, fix: &PositionFix) -> Coordinate {
        self.push(fix.coordinate())
    }

    /// Add a position to the window and return the mean of the window.
    pub fn push(&mut self, position: Coordinate) -> Coordinate {
        while self.history.len() >= self.window_size {
            self.history.pop_front();
        }
        self.history.push_back(position);

        let n = self.history.len() as f64;
        let (lat_sum, lon_sum) = self
            .history
            .iter()
            .fold((0.0, 0.0), |(lat, lon), c| (lat + c.lat_deg, lon + c.lon_deg));

        Coordinate::new(lat_sum / n, lon_sum / n)
    }

    /// Empty the window.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_fix_unchanged() {
        let mut s = GpsSmoother::new(5);
        let fix = PositionFix::new(43.7853, -79.1884);
        assert_eq!(s.smooth(&fix), fix.coordinate());
    }

    #[test]
    fn test_window_is_fifo() {
        let mut s = GpsSmoother::new(3);

        s.push(Coordinate::new(0.0, 0.0));
        s.push(Coordinate::new(3.0, 3.0));
        let mean = s.push(Coordinate::new(6.0, 6.0));
        assert!((mean.lat_deg - 3.0).abs() < 1e-12);

        // The first position is evicted
        let mean = s.push(Coordinate::new(9.0, 9.0));
        assert_eq!(s.len(), 3);
        assert!((mean.lat_deg - 6.0).abs() < 1e-12);
        assert!((mean.lon_deg - 6.0).abs() < 1e-12);

        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn test_zero_window() {
        let mut s = GpsSmoother::new(0);
        assert_eq!(s.window_size(), 1);

        s.push(Coordinate::new(1.0, 1.0));
        assert_eq!(s.push(Coordinate::new(2.0, 2.0)), Coordinate::new(2.0, 2.0));
    }

    #[test]
    fn test_outlier_bounded_influence() {
        let window = 5;
        let delta = 0.01;
        let mut s = GpsSmoother::new(window);

        for _ in 0..window {
            s.push(Coordinate::new(10.0, 20.0));
        }

        let mean = s.push(Coordinate::new(10.0 + delta, 20.0));
        let moved = (mean.lat_deg - 10.0).abs();

        assert!(moved <= delta / window as f64 + 1e-12);
        assert_eq!(mean.lon_deg, 20.0);
    }
}
