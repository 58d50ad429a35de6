//! Per-parser diagnostic counters.
//!
//! [`ParseStats`] is owned by each parser handle and reset at the start of
//! every parse call, so two parsers never observe each other's counts.

use serde::{Deserialize, Serialize};

/// Counters collected during the most recent parse call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Number of windows handed to the scanner
    pub refills: usize,
    /// Number of times a pending tail was moved to the buffer start
    pub compactions: usize,
    /// Typed tokens delivered to the writer
    pub tokens: usize,
    /// Text runs delivered to the writer
    pub text_runs: usize,
}

impl ParseStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Total writer callbacks made.
    pub fn callbacks(&self) -> usize {
        self.tokens + self.text_runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset() {
        let mut stats = ParseStats::new();
        stats.refills = 4;
        stats.tokens = 2;
        stats.text_runs = 3;
        assert_eq!(stats.callbacks(), 5);

        stats.reset();
        assert_eq!(stats, ParseStats::default());
    }
}
