// crates/darkcut-core/src/progress.rs
//
// Whole-percent progress for the scan pass.

/// Emits a percentage only when it differs from the last one reported.
///
/// `last` starts as `None` ("nothing reported yet"), so the first call always
/// reports, including 0%.
#[derive(Debug)]
pub struct ProgressTracker {
    total: Option<u64>,
    last:  Option<u8>,
}

impl ProgressTracker {
    pub fn new(total: Option<u64>) -> Self {
        Self { total: total.filter(|&t| t > 0), last: None }
    }

    /// `done` frames processed so far. Returns the new percentage, if any.
    ///
    /// Containers can under-report their frame count, so the value is
    /// clamped to 100.
    pub fn update(&mut self, done: u64) -> Option<u8> {
        let total = self.total?;
        let pct = ((done.saturating_mul(100)) / total).min(100) as u8;
        if self.last == Some(pct) {
            return None;
        }
        self.last = Some(pct);
        Some(pct)
    }

    pub fn last_reported(&self) -> Option<u8> { self.last }
}
