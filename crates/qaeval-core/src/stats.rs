//! Per-client usage accounting.

use serde::Serialize;
use std::time::Duration;

/// Latency, token and error counters of one completion client.
#[derive(Debug, Default, Clone)]
pub struct UsageStats {
    call_secs: Vec<f64>,
    tokens: Vec<u64>,
    num_errors: u64,
}

/// Snapshot of [`UsageStats`]. Means are `None` until a call succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub mean_call_secs: Option<f64>,
    pub std_call_secs: Option<f64>,
    pub num_calls: u64,
    pub num_errors: u64,
    pub total_tokens: u64,
    pub avg_tokens: Option<f64>,
}

impl UsageStats {
    /// A successful call. Missing token usage counts as zero.
    pub fn record_call(&mut self, elapsed: Duration, total_tokens: Option<u64>) {
        self.call_secs.push(elapsed.as_secs_f64());
        self.tokens.push(total_tokens.unwrap_or(0));
    }

    /// A failed attempt, whether or not a later retry succeeds.
    pub fn record_error(&mut self) {
        self.num_errors += 1;
    }

    pub fn num_calls(&self) -> u64 {
        self.call_secs.len() as u64
    }

    pub fn num_errors(&self) -> u64 {
        self.num_errors
    }

    pub fn summary(&mut self, reset: bool) -> UsageSummary {
        let summary = UsageSummary {
            mean_call_secs: mean(&self.call_secs),
            std_call_secs: population_std(&self.call_secs),
            num_calls: self.num_calls(),
            num_errors: self.num_errors,
            total_tokens: self.tokens.iter().sum(),
            avg_tokens: mean(&self.tokens.iter().map(|&t| t as f64).collect::<Vec<_>>()),
        };
        if reset {
            *self = Self::default();
        }
        summary
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

impl std::fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |s| format!("{:.3}s", s));
        write!(
            f,
            "calls={} errors={} mean={} std={} tokens={} avg_tokens={}",
            self.num_calls,
            self.num_errors,
            secs(self.mean_call_secs),
            secs(self.std_call_secs),
            self.total_tokens,
            self.avg_tokens
                .map_or_else(|| "n/a".to_string(), |t| format!("{:.1}", t)),
        )
    }
}
