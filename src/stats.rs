// WHY: Process-wide counters live in one owned aggregator behind a mutex so each
// record is a single atomic update. Readers get copies, never live references.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::pipeline::{AbbreviationResult, Method};

/// Point-in-time copy of the aggregated counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStatistics {
    pub processed_count: u64,
    pub success_count: u64,
    /// success_count / processed_count, 0 when nothing was processed
    pub success_rate: f64,
    /// Mean reduction_percentage over processed results
    pub avg_reduction: f64,
    pub method_counts: BTreeMap<Method, u64>,
    /// Occurrences of each rule kind across rules_applied
    pub pattern_counts: BTreeMap<String, u64>,
    pub elapsed_ms: u64,
}

impl RunStatistics {
    /// Most frequent method; earlier variants win ties
    pub fn dominant_method(&self) -> Option<Method> {
        let mut best: Option<(Method, u64)> = None;
        for (method, count) in &self.method_counts {
            if best.map_or(true, |(_, c)| *count > c) {
                best = Some((*method, *count));
            }
        }
        best.map(|(method, _)| method)
    }
}

#[derive(Debug)]
struct Counters {
    processed: u64,
    succeeded: u64,
    reduction_sum: f64,
    methods: BTreeMap<Method, u64>,
    patterns: BTreeMap<String, u64>,
    started: Instant,
}

impl Counters {
    fn new() -> Self {
        Self {
            processed: 0,
            succeeded: 0,
            reduction_sum: 0.0,
            methods: BTreeMap::new(),
            patterns: BTreeMap::new(),
            started: Instant::now(),
        }
    }
}

/// Thread-safe statistics sink, constructed once and shared by reference
#[derive(Debug)]
pub struct StatisticsAggregator {
    counters: Mutex<Counters>,
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self { counters: Mutex::new(Counters::new()) }
    }

    // each update completes under one guard, so a poisoned lock still holds consistent counters
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, result: &AbbreviationResult) {
        let mut counters = self.lock();
        counters.processed += 1;
        if result.success() {
            counters.succeeded += 1;
        }
        counters.reduction_sum += result.reduction_percentage();
        *counters.methods.entry(result.method_used()).or_insert(0) += 1;
        for rule in result.rules_applied() {
            *counters.patterns.entry(rule.kind.name().to_string()).or_insert(0) += 1;
        }
    }

    pub fn snapshot(&self) -> RunStatistics {
        let counters = self.lock();
        let (success_rate, avg_reduction) = if counters.processed == 0 {
            (0.0, 0.0)
        } else {
            let processed = counters.processed as f64;
            (counters.succeeded as f64 / processed, counters.reduction_sum / processed)
        };
        RunStatistics {
            processed_count: counters.processed,
            success_count: counters.succeeded,
            success_rate,
            avg_reduction,
            method_counts: counters.methods.clone(),
            pattern_counts: counters.patterns.clone(),
            elapsed_ms: counters.started.elapsed().as_millis() as u64,
        }
    }

    /// Zero every counter and restart the clock
    pub fn reset(&self) {
        *self.lock() = Counters::new();
    }
}
