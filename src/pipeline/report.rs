// src/pipeline/report.rs

use crate::error::{RestockError, Result};
use crate::model::recommendation::{Recommendation, Report, SkippedSegment};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs a per-segment recommendation function over every segment.
///
/// Segments are processed on a bounded rayon pool and collected in input order. A
/// segment whose function fails is recorded in [`Report::skipped`], so every input
/// segment appears exactly once in the report.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    pool: Arc<ThreadPool>,
}

impl ReportAssembler {
    /// Builds the worker pool. `None` uses one thread per core.
    pub fn new(workers: Option<usize>) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.unwrap_or(0))
            .build()
            .map_err(|e| RestockError::ThreadPool(e.to_string()))?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Runs `op` on the worker pool; nested parallel work stays inside it.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    pub fn assemble<F>(&self, segments: &[String], recommend: F) -> Result<Report>
    where
        F: Fn(&str) -> Result<Recommendation> + Send + Sync,
    {
        let outcomes: Vec<Result<Recommendation>> = self.install(|| {
            segments
                .par_iter()
                .map(|segment| recommend(segment))
                .collect()
        });

        let mut report = Report::default();
        for (segment, outcome) in segments.iter().zip(outcomes) {
            match outcome {
                Ok(recommendation) => report.recommendations.push(recommendation),
                Err(e) => {
                    warn!(segment = %segment, error = %e, "segment skipped");
                    report.skipped.push(SkippedSegment {
                        segment: segment.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        info!(
            recommended = report.recommendations.len(),
            skipped = report.skipped.len(),
            "report assembled"
        );
        Ok(report)
    }
}
