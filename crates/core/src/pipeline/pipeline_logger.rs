use std::collections::HashMap;
use std::time::Instant;

/// Observability hooks for the inference loop.
///
/// The loop reports what happened each tick; the implementation decides
/// whether that goes to the log, a summary report or nowhere.
pub trait PipelineLogger: Send {
    /// Called once per tick that attempted a read, rendered or not.
    fn tick(&mut self, rendered: bool);

    /// Record how long a named stage took for one tick.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-tick metric (e.g. faces found).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. Used by the desktop app and tests.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn tick(&mut self, _rendered: bool) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Accumulates per-stage timings and metrics for a session report.
///
/// A progress line is logged every `report_every` ticks.
pub struct StdoutPipelineLogger {
    report_every: u64,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    ticks: u64,
    rendered: u64,
}

impl StdoutPipelineLogger {
    pub fn new(report_every: u64) -> Self {
        Self {
            report_every: report_every.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            ticks: 0,
            rendered: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Returns the formatted summary string, or `None` if no tick ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.ticks == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Pipeline summary ({} ticks, {} rendered, {:.1}s total):",
            self.ticks,
            self.rendered,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.iter().collect();
        stages.sort_by(|a, b| a.0.cmp(b.0));
        for (stage, durations) in stages {
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut metrics: Vec<_> = self.metrics.iter().collect();
        metrics.sort_by(|a, b| a.0.cmp(b.0));
        for (name, values) in metrics {
            lines.push(format!("  {name}: avg {:.1}", mean(values)));
        }

        if elapsed_ms > 0.0 {
            let fps = self.rendered as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        // ~5 s at the default tick period
        Self::new(100)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn tick(&mut self, rendered: bool) {
        self.ticks += 1;
        if rendered {
            self.rendered += 1;
        }
        if self.ticks % self.report_every == 0 {
            log::info!(
                "{} ticks ({} rendered, {} skipped)",
                self.ticks,
                self.rendered,
                self.ticks - self.rendered
            );
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
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.tick(true);
        logger.timing("detect", 5.0);
        logger.metric("faces", 1.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_tick_counts_rendered_and_skipped() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.tick(true);
        logger.tick(false);
        logger.tick(true);
        assert_eq!(logger.ticks(), 3);
        assert_eq!(logger.rendered(), 2);
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("read", 5.0);

        assert_eq!(logger.timings_for("detect").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("read").unwrap(), &[5.0]);
        assert!(logger.timings_for("flip").is_none());
    }

    #[test]
    fn test_metric_average_in_summary() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.tick(true);
        logger.metric("faces", 1.0);
        logger.metric("faces", 2.0);

        assert_relative_eq!(mean(logger.metrics_for("faces").unwrap()), 1.5);
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("faces: avg 1.5"));
    }

    #[test]
    fn test_summary_lists_stages_and_throughput() {
        let mut logger = StdoutPipelineLogger::new(10);
        for _ in 0..4 {
            logger.tick(true);
            logger.timing("read", 2.0);
            logger.timing("detect", 30.0);
        }

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Pipeline summary (4 ticks, 4 rendered"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("read"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_report_interval_is_at_least_one() {
        let mut logger = StdoutPipelineLogger::new(0);
        logger.tick(false);
        assert_eq!(logger.report_every, 1);
    }
}
