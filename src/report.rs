use std::{fmt::Display, path::Path, time::Duration};

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateAuthor,
    GetAuthor,
    ListAuthors,
    UpdateAuthor,
    GetAuthorsByBirthdateRange,
    DeleteAuthor,
}

impl Operation {
    /// Execution order of one backend run.
    pub const ALL: [Operation; 6] = [
        Operation::CreateAuthor,
        Operation::GetAuthor,
        Operation::ListAuthors,
        Operation::UpdateAuthor,
        Operation::GetAuthorsByBirthdateRange,
        Operation::DeleteAuthor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateAuthor => "CreateAuthor",
            Operation::GetAuthor => "GetAuthor",
            Operation::ListAuthors => "ListAuthors",
            Operation::UpdateAuthor => "UpdateAuthor",
            Operation::GetAuthorsByBirthdateRange => "GetAuthorsByBirthdateRange",
            Operation::DeleteAuthor => "DeleteAuthor",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timings of every call one backend made for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStats {
    pub operation: Operation,
    pub calls:     usize,
    /// Probe calls that hit a missing row.
    pub misses:    usize,
    pub total:     Duration,
    pub min:       Duration,
    pub max:       Duration,
    pub mean:      Duration,
    pub p95:       Duration,
}

impl OperationStats {
    pub fn from_samples(operation: Operation, samples: &[Duration], misses: usize) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let total: Duration = sorted.iter().sum();
        let calls = sorted.len();
        let mean = match u32::try_from(calls) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => total / n,
        };
        Self {
            operation,
            calls,
            misses,
            total,
            min: sorted.first().copied().unwrap_or_default(),
            max: sorted.last().copied().unwrap_or_default(),
            mean,
            p95: percentile(&sorted, 95),
        }
    }
}

/// Nearest-rank percentile over already sorted samples.
fn percentile(sorted: &[Duration], pct: usize) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = (pct * sorted.len()).div_ceil(100).max(1);
    sorted[rank - 1]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReport {
    pub backend:     &'static str,
    pub operations:  Vec<OperationStats>,
    /// Rows returned by the last `list()` call.
    pub listed_rows: usize,
}

impl BackendReport {
    pub fn total(&self) -> Duration {
        self.operations.iter().map(|x| x.total).sum()
    }

    pub fn stats(&self, operation: Operation) -> Option<&OperationStats> {
        self.operations.iter().find(|x| x.operation == operation)
    }
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub run_id:     Uuid,
    pub iterations: usize,
    pub reports:    Vec<BackendReport>,
}

impl Comparison {
    pub fn new(iterations: usize, reports: Vec<BackendReport>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            iterations,
            reports,
        }
    }

    /// The backend with the smallest total; the earlier one wins a tie.
    pub fn winner(&self) -> Option<&BackendReport> {
        self.reports.iter().min_by_key(|x| x.total())
    }

    pub fn fastest(&self, operation: Operation) -> Option<&'static str> {
        self.reports
            .iter()
            .filter_map(|r| r.stats(operation).map(|s| (r.backend, s.total)))
            .min_by_key(|(_, total)| *total)
            .map(|(backend, _)| backend)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut header = format!("{:<28}", "Operation");
        for report in &self.reports {
            header.push_str(&format!("{:>14}", report.backend));
        }
        header.push_str(&format!("{:>10}", "Fastest"));
        lines.push(header);

        for operation in Operation::ALL {
            let mut line = format!("{:<28}", operation.as_str());
            for report in &self.reports {
                let cell = report
                    .stats(operation)
                    .map(|s| fmt_duration(s.total))
                    .unwrap_or_else(|| "-".into());
                line.push_str(&format!("{cell:>14}"));
            }
            line.push_str(&format!("{:>10}", self.fastest(operation).unwrap_or("-")));
            lines.push(line);
        }

        let mut total = format!("{:<28}", "Total");
        for report in &self.reports {
            total.push_str(&format!("{:>14}", fmt_duration(report.total())));
        }
        lines.push(total);

        if let Some(winner) = self.winner() {
            lines.push(format!(
                "Winner: {} with {} total over {} iterations",
                winner.backend,
                fmt_duration(winner.total()),
                self.iterations
            ));
        }
        lines
    }

    pub fn log_summary(&self) {
        info!("Benchmark run {} finished.", self.run_id);
        for report in &self.reports {
            info!(
                "[{}] total {} ({} rows listed)",
                report.backend,
                fmt_duration(report.total()),
                report.listed_rows
            );
        }
        for line in self.summary_lines() {
            info!("{line}");
        }
    }

    pub fn records(&self) -> Vec<ResultRecord> {
        self.reports
            .iter()
            .flat_map(|report| {
                report.operations.iter().map(|s| ResultRecord {
                    run_id:    self.run_id.to_string(),
                    backend:   report.backend,
                    operation: s.operation.as_str(),
                    calls:     s.calls,
                    misses:    s.misses,
                    total_us:  micros(s.total),
                    mean_us:   micros(s.mean),
                    min_us:    micros(s.min),
                    max_us:    micros(s.max),
                    p95_us:    micros(s.p95),
                })
            })
            .collect()
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|x| !x.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(path)?;
        for record in self.records() {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        info!("Results written to {}.", path.display());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ResultRecord {
    #[serde(rename = "Run Id")]
    run_id:    String,
    #[serde(rename = "Backend")]
    backend:   &'static str,
    #[serde(rename = "Operation")]
    operation: &'static str,
    #[serde(rename = "Calls")]
    calls:     usize,
    #[serde(rename = "Misses")]
    misses:    usize,
    #[serde(rename = "Total (us)")]
    total_us:  u64,
    #[serde(rename = "Mean (us)")]
    mean_us:   u64,
    #[serde(rename = "Min (us)")]
    min_us:    u64,
    #[serde(rename = "Max (us)")]
    max_us:    u64,
    #[serde(rename = "P95 (us)")]
    p95_us:    u64,
}

/// Whole microseconds, saturating at `u64::MAX`.
fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

pub fn fmt_duration(d: Duration) -> String {
    format!("{d:.3?}")
}
