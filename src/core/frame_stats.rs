use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Throughput and device latency over one reporting window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsReport {
    pub frames: u32,
    pub fps: f32,
    /// Mean submission-to-completion time; `None` if nothing completed yet
    pub mean_gpu_latency: Option<Duration>,
}

/// Frame timing gathered from queue completion callbacks.
///
/// Callbacks only feed this collector; nothing waits on them.
pub struct FrameStats {
    sender: Sender<Duration>,
    receiver: Receiver<Duration>,
    interval: Duration,
    window_start: Instant,
    frames: u32,
    latency_total: Duration,
    latency_samples: u32,
}

impl FrameStats {
    /// `interval` of zero disables reporting
    pub fn new(interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            interval,
            window_start: Instant::now(),
            frames: 0,
            latency_total: Duration::ZERO,
            latency_samples: 0,
        }
    }

    /// Time the most recent submission on `queue`
    pub fn track_submission(&self, queue: &wgpu::Queue) {
        let sender = self.sender.clone();
        let submitted = Instant::now();
        queue.on_submitted_work_done(move || {
            sender.send(submitted.elapsed()).ok();
        });
    }

    pub fn record_latency(&mut self, latency: Duration) {
        self.latency_total += latency;
        self.latency_samples += 1;
    }

    /// Count a presented frame; logs and returns a report once per interval
    pub fn frame_presented(&mut self) -> Option<StatsReport> {
        self.frame_presented_at(Instant::now())
    }

    pub fn frame_presented_at(&mut self, now: Instant) -> Option<StatsReport> {
        while let Ok(latency) = self.receiver.try_recv() {
            self.record_latency(latency);
        }
        self.frames += 1;

        if self.interval.is_zero() {
            return None;
        }

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval {
            return None;
        }

        let report = StatsReport {
            frames: self.frames,
            fps: self.frames as f32 / elapsed.as_secs_f32(),
            mean_gpu_latency: (self.latency_samples > 0)
                .then(|| self.latency_total / self.latency_samples),
        };

        match report.mean_gpu_latency {
            Some(latency) => log::info!(
                "{:.1} fps, gpu {:.2} ms",
                report.fps,
                latency.as_secs_f64() * 1000.0
            ),
            None => log::info!("{:.1} fps", report.fps),
        }

        self.window_start = now;
        self.frames = 0;
        self.latency_total = Duration::ZERO;
        self.latency_samples = 0;

        Some(report)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_report_before_interval() {
        let mut stats = FrameStats::new(Duration::from_secs(60));
        let start = stats.window_start;

        assert!(stats.frame_presented_at(start + Duration::from_secs(1)).is_none());
        assert!(stats.frame_presented_at(start + Duration::from_secs(2)).is_none());
    }

    #[test]
    fn test_report_after_interval() {
        let mut stats = FrameStats::new(Duration::from_secs(1));
        let start = stats.window_start;

        for i in 1..10 {
            assert!(stats
                .frame_presented_at(start + Duration::from_millis(i * 100))
                .is_none());
        }
        stats.record_latency(Duration::from_millis(2));
        stats.record_latency(Duration::from_millis(4));

        let report = stats
            .frame_presented_at(start + Duration::from_secs(1))
            .expect("interval elapsed");
        assert_eq!(report.frames, 10);
        assert!((report.fps - 10.0).abs() < 1e-3);
        assert_eq!(report.mean_gpu_latency, Some(Duration::from_millis(3)));
    }

    #[test]
    fn test_window_resets_after_report() {
        let mut stats = FrameStats::new(Duration::from_secs(1));
        let start = stats.window_start;

        stats.record_latency(Duration::from_millis(5));
        assert!(stats.frame_presented_at(start + Duration::from_secs(1)).is_some());

        let report = stats
            .frame_presented_at(start + Duration::from_secs(2))
            .expect("second interval elapsed");
        assert_eq!(report.frames, 1);
        assert_eq!(report.mean_gpu_latency, None);
    }

    #[test]
    fn test_zero_interval_disables_reports() {
        let mut stats = FrameStats::new(Duration::ZERO);
        let start = stats.window_start;
        assert!(stats.frame_presented_at(start + Duration::from_secs(100)).is_none());
    }

    #[test]
    fn test_latencies_arrive_through_channel() {
        let mut stats = FrameStats::new(Duration::from_secs(1));
        let start = stats.window_start;

        stats.sender.send(Duration::from_millis(8)).unwrap();
        let report = stats
            .frame_presented_at(start + Duration::from_secs(1))
            .expect("interval elapsed");
        assert_eq!(report.mean_gpu_latency, Some(Duration::from_millis(8)));
    }
}
