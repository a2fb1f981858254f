use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Listener contract
// ---------------------------------------------------------------------------

/// Snapshot of a running transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
    /// Average speed over the recent window, 0.0 until measurable.
    pub bytes_per_second: f64,
}

impl UploadProgress {
    /// Progress in percent, between 0.0 and 100.0.
    ///
    /// An empty file is complete from the start.
    pub fn percent(&self) -> f32 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        (self.bytes_sent as f64 / self.total_bytes as f64 * 100.0) as f32
    }

    /// Estimated time until the transfer completes.
    pub fn eta(&self) -> Option<Duration> {
        if self.bytes_per_second <= 0.0 {
            return None;
        }
        let remaining = self.total_bytes.saturating_sub(self.bytes_sent);
        Some(Duration::from_secs_f64(remaining as f64 / self.bytes_per_second))
    }
}

/// Receives progress ticks of a transfer.
///
/// Invoked synchronously on the task that drives the upload, so an
/// implementation must return quickly. Returning `ControlFlow::Break(())`
/// cancels the transfer.
pub trait UploadProgressListener: Sync {
    fn updated_progress(&self, progress: &UploadProgress) -> ControlFlow<()>;
}

impl<F> UploadProgressListener for F
where
    F: Fn(&UploadProgress) -> ControlFlow<()> + Sync,
{
    fn updated_progress(&self, progress: &UploadProgress) -> ControlFlow<()> {
        self(progress)
    }
}

/// Listener for callers that do not track progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreProgress;

impl UploadProgressListener for IgnoreProgress {
    fn updated_progress(&self, _progress: &UploadProgress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

// ---------------------------------------------------------------------------
// SpeedCalculator
// ---------------------------------------------------------------------------

/// Transfer rate over a sliding time window.
///
/// Owned by the task driving one transfer.
#[derive(Debug)]
pub struct SpeedCalculator {
    /// `(bytes since previous sample, sampled at)`, oldest first.
    samples: VecDeque<(u64, Instant)>,
    max_samples: usize,
    window: Duration,
}

impl Default for SpeedCalculator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 100)
    }
}

impl SpeedCalculator {
    pub fn new(window: Duration, max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples.min(128)),
            max_samples: max_samples.max(2),
            window,
        }
    }

    /// Records `bytes` sent since the previous sample.
    pub fn add_sample(&mut self, bytes: u64) {
        let now = Instant::now();
        self.samples.push_back((bytes, now));

        while self
            .samples
            .front()
            .is_some_and(|&(_, at)| now.duration_since(at) > self.window)
        {
            self.samples.pop_front();
        }
        while self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }

    /// Average bytes per second within the window, 0.0 until two samples
    /// with distinct timestamps exist.
    pub fn bytes_per_second(&self) -> f64 {
        let (Some(&(_, first)), Some(&(_, last))) = (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        let elapsed = last.duration_since(first);
        if elapsed.is_zero() {
            return 0.0;
        }
        let bytes: u64 = self.samples.iter().map(|&(b, _)| b).sum();
        bytes as f64 / elapsed.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_partial_transfer() {
        let p = UploadProgress {
            bytes_sent: 25,
            total_bytes: 100,
            bytes_per_second: 0.0,
        };
        assert_eq!(p.percent(), 25.0);
        assert!(p.eta().is_none());
    }

    #[test]
    fn empty_file_is_complete() {
        let p = UploadProgress {
            bytes_sent: 0,
            total_bytes: 0,
            bytes_per_second: 0.0,
        };
        assert_eq!(p.percent(), 100.0);
    }

    #[test]
    fn eta_from_speed() {
        let p = UploadProgress {
            bytes_sent: 500,
            total_bytes: 1500,
            bytes_per_second: 100.0,
        };
        assert_eq!(p.eta(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn closure_listener_can_cancel() {
        let listener = |p: &UploadProgress| {
            if p.percent() >= 50.0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        let half = UploadProgress {
            bytes_sent: 50,
            total_bytes: 100,
            bytes_per_second: 0.0,
        };
        assert!(listener.updated_progress(&half).is_break());
        assert!(IgnoreProgress.updated_progress(&half).is_continue());
    }

    #[test]
    fn speed_is_zero_until_measurable() {
        let mut calc = SpeedCalculator::default();
        assert_eq!(calc.bytes_per_second(), 0.0);
        calc.add_sample(100);
        assert_eq!(calc.bytes_per_second(), 0.0);
    }

    #[test]
    fn speed_from_spaced_samples() {
        let mut calc = SpeedCalculator::new(Duration::from_secs(10), 100);
        calc.add_sample(500);
        std::thread::sleep(Duration::from_millis(50));
        calc.add_sample(500);
        assert!(calc.bytes_per_second() > 0.0);
    }

    #[test]
    fn window_keeps_newest_samples() {
        let mut calc = SpeedCalculator::new(Duration::from_secs(60), 5);
        for i in 0..20 {
            calc.add_sample(i * 10);
        }
        assert_eq!(calc.samples.len(), 5);
        assert_eq!(calc.samples.back().map(|&(b, _)| b), Some(190));
    }

    #[test]
    fn expired_samples_are_dropped() {
        let mut calc = SpeedCalculator::new(Duration::from_millis(20), 100);
        calc.add_sample(1_000);
        std::thread::sleep(Duration::from_millis(40));
        calc.add_sample(10);
        assert_eq!(calc.samples.len(), 1);
        assert_eq!(calc.bytes_per_second(), 0.0);
    }
}
