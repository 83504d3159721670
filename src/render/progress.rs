/// Receiver for render progress.
///
/// Ordering contract: `init_total` is called once per render, then `advance` with
/// non-decreasing step numbers up to the announced total.
pub trait ProgressSink {
    /// Name the work about to start (e.g. the flame file and tile).
    fn begin(&mut self, _label: &str) {}

    fn init_total(&mut self, total_steps: u64);

    fn advance(&mut self, step: u64);
}

/// Discards all progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn init_total(&mut self, _total_steps: u64) {}

    fn advance(&mut self, _step: u64) {}
}
