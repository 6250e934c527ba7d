use std::sync::Mutex;

#[derive(Debug)]
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Counters accumulated over one interactive session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub frames_composed: usize,
    pub cache_hits: usize,
    pub degraded_frames: usize,
    pub exports: usize,
    pub export_failures: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    fn bump(&self, update: impl FnOnce(&mut Metrics)) {
        if let Ok(mut metrics) = self.inner.lock() {
            update(&mut metrics);
        }
    }

    pub fn record_frame(&self) {
        self.bump(|m| m.frames_composed += 1);
    }

    pub fn record_cache_hit(&self) {
        self.bump(|m| m.cache_hits += 1);
    }

    pub fn record_degraded(&self) {
        self.bump(|m| m.degraded_frames += 1);
    }

    pub fn record_export(&self, succeeded: bool) {
        self.bump(|m| {
            if succeeded {
                m.exports += 1;
            } else {
                m.export_failures += 1;
            }
        });
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

/// A clone starts from the current counters and then diverges.
impl Clone for MetricsRecorder {
    fn clone(&self) -> Self {
        Self {
            inner: Mutex::new(self.snapshot()),
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_frame();
        metrics.record_frame();
        metrics.record_cache_hit();
        metrics.record_degraded();
        metrics.record_export(true);
        metrics.record_export(false);
        assert_eq!(
            metrics.snapshot(),
            Metrics {
                frames_composed: 2,
                cache_hits: 1,
                degraded_frames: 1,
                exports: 1,
                export_failures: 1,
            }
        );
    }
}
