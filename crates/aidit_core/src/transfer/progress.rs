//! Upload progress accounting.

use super::ProgressCallback;
use std::sync::Mutex;

/// Rounded upload percentage, clamped to 100. `None` when the total is unknown.
pub fn upload_percent(sent: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let sent = sent.min(total) as u128;
    let total = total as u128;
    let percent = (sent * 100 + total / 2) / total;
    Some(percent.min(100) as u8)
}

#[derive(Debug, Default)]
struct Counters {
    sent: u64,
    last_reported: Option<u8>,
}

/// Accumulates bytes handed to the transport and forwards increasing
/// percentages to a [`ProgressCallback`].
///
/// Reports are non-decreasing and never repeat a value.
pub struct ProgressTracker {
    total: u64,
    counters: Mutex<Counters>,
    callback: ProgressCallback,
}

impl ProgressTracker {
    pub fn new(total: u64, callback: ProgressCallback) -> Self {
        Self {
            total,
            counters: Mutex::new(Counters::default()),
            callback,
        }
    }

    /// Record `bytes` more sent and report if the percentage went up.
    pub fn advance(&self, bytes: usize) {
        let report = {
            let Ok(mut counters) = self.counters.lock() else {
                return;
            };
            counters.sent = counters.sent.saturating_add(bytes as u64);
            match upload_percent(counters.sent, self.total) {
                Some(percent) if counters.last_reported.map_or(true, |last| percent > last) => {
                    counters.last_reported = Some(percent);
                    Some(percent)
                }
                _ => None,
            }
        };
        if let Some(percent) = report {
            (self.callback)(percent);
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
