use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Observer for detection-pass events.
///
/// Lets the CLI report timings while the GUI and tests stay silent, without
/// the use case knowing which.
pub trait PipelineLogger: Send {
    /// Report that `completed` passes have finished so far.
    fn pass(&mut self, completed: usize);

    /// Record how long a named stage took in one pass.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. faces found).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn pass(&mut self, _completed: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Lets a caller keep a handle on a logger it has handed to a use case.
impl<L: PipelineLogger> PipelineLogger for Arc<Mutex<L>> {
    fn pass(&mut self, completed: usize) {
        self.lock().unwrap().pass(completed);
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.lock().unwrap().timing(stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.lock().unwrap().metric(name, value);
    }

    fn info(&mut self, message: &str) {
        self.lock().unwrap().info(message);
    }

    fn summary(&self) {
        self.lock().unwrap().summary();
    }
}

/// Tracks per-stage timing and metrics for a summary at the end of a run.
///
/// Pass counts are logged every `throttle_passes` passes.
pub struct StdoutPipelineLogger {
    throttle_passes: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    passes: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_passes: usize) -> Self {
        Self {
            throttle_passes: throttle_passes.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            passes: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let passes = self.passes;
        let mut lines = vec![format!(
            "Detection summary ({passes} passes, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  max {max_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        if passes > 0 && elapsed_ms > 0.0 {
            let rate = passes as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Rate: {rate:.1} passes/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn passes(&self) -> usize {
        self.passes
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn pass(&mut self, completed: usize) {
        self.passes = completed;
        if completed % self.throttle_passes == 0 {
            log::info!("Detection passes: {completed}");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.pass(1);
        logger.timing("analyze", 5.0);
        logger.metric("faces", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("analyze", 20.0);
        logger.timing("analyze", 30.0);
        logger.timing("paint", 5.0);

        assert_eq!(logger.timings_for("analyze").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("paint").unwrap(), &[5.0]);
        assert!(logger.timings_for("missing").is_none());
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.pass(2);
        logger.timing("analyze", 20.0);
        logger.timing("paint", 2.0);
        logger.metric("faces", 1.0);
        logger.metric("faces", 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Detection summary (2 passes"));
        assert!(summary.contains("analyze"));
        assert!(summary.contains("paint"));
        assert!(summary.contains("faces: avg 1.5"));
        assert!(summary.contains("passes/s"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_pass_tracks_count() {
        let mut logger = StdoutPipelineLogger::new(3);
        for i in 1..=7 {
            logger.pass(i);
        }
        assert_eq!(logger.passes(), 7);
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutPipelineLogger::default();
        logger.info("hello world");
        assert_eq!(logger.messages, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_shared_logger_records_through_handle() {
        let shared = Arc::new(Mutex::new(StdoutPipelineLogger::new(10)));
        let mut boxed: Box<dyn PipelineLogger> = Box::new(shared.clone());
        boxed.timing("analyze", 12.0);
        boxed.pass(1);
        let logger = shared.lock().unwrap();
        assert_eq!(logger.timings_for("analyze").unwrap(), &[12.0]);
        assert_eq!(logger.passes(), 1);
    }

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[10.0, 20.0, 30.0]), 20.0);
        assert_eq!(mean(&[]), 0.0);
    }
}
