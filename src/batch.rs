// WHY: Batch runs split rows into contiguous chunks, one per worker, and join the
// chunks back in order, so output row i always answers input row i. A bad row
// becomes a failed output row; it never aborts the file.

use indicatif::ProgressBar;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{AbbrevError, Result};
use crate::pipeline::{AbbreviationPipeline, AbbreviationRequest, AbbreviationResult, Method};
use crate::quality::{self, QualityReport};
use crate::stats::{RunStatistics, StatisticsAggregator};

pub const PART_NUMBER: &str = "Part Number";
pub const PART_DEFINITION: &str = "Part Definition";
pub const ABBREVIATION: &str = "Abbreviation";

/// Columns written after the input columns, reused when already present
pub const RESULT_COLUMNS: [&str; 9] = [
    ABBREVIATION,
    "Original Length",
    "Final Length",
    "Length Reduction",
    "Applied Rules",
    "Method Used",
    "Confidence",
    "Is Standard",
    "Suggestions",
];

const PROGRESS_LOG_INTERVAL: usize = 100;

/// Header row plus string records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv_reader
            .headers()?
            .iter()
            .enumerate()
            // spreadsheet exports often lead with a byte-order mark
            .map(|(idx, h)| if idx == 0 { h.trim_start_matches('\u{feff}') } else { h })
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::read(BufReader::new(File::open(path)?))
    }

    /// Case-insensitive column lookup
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| AbbrevError::MissingColumn(name.to_string()))
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_path(&self, path: &Path) -> Result<()> {
        self.write(BufWriter::new(File::create(path)?))
    }
}

/// Read reviewed (description, abbreviation) pairs for model training
pub fn read_training_pairs<R: Read>(reader: R) -> Result<Vec<(String, String)>> {
    let table = Table::read(reader)?;
    let definition = table.require(PART_DEFINITION)?;
    let abbreviation = table.require(ABBREVIATION)?;

    Ok(table
        .rows
        .iter()
        .filter_map(|row| Some((row.get(definition)?.clone(), row.get(abbreviation)?.clone())))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub target_length: usize,
    pub use_ml: bool,
    pub workers: usize,
}

impl BatchOptions {
    pub fn new(target_length: usize) -> Self {
        Self {
            target_length,
            use_ml: true,
            workers: num_cpus::get(),
        }
    }

    pub fn with_ml(mut self, use_ml: bool) -> Self {
        self.use_ml = use_ml;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Abbreviated {
        result: AbbreviationResult,
        quality: QualityReport,
    },
    Failed {
        label: String,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub processed_count: usize,
    pub failed_count: usize,
    pub success_count: usize,
    /// success_count / processed_count
    pub success_rate: f64,
    pub avg_reduction: f64,
    pub processing_time_ms: u64,
    /// Most frequent method across abbreviated rows
    pub method_used: Option<Method>,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub table: Table,
    pub outcomes: Vec<RowOutcome>,
    pub summary: BatchSummary,
    pub statistics: RunStatistics,
}

/// Per-run state shared by the worker threads
struct RowContext<'r> {
    definition: usize,
    part_number: Option<usize>,
    total: usize,
    stats: &'r StatisticsAggregator,
    progress: Option<&'r ProgressBar>,
    completed: &'r AtomicUsize,
}

pub struct BatchProcessor<'a> {
    pipeline: &'a AbbreviationPipeline,
    options: BatchOptions,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(pipeline: &'a AbbreviationPipeline, options: BatchOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn process(&self, input: &Table, progress: Option<&ProgressBar>) -> Result<BatchReport> {
        let started = Instant::now();
        let definition = input.require(PART_DEFINITION)?;
        if let Some(progress) = progress {
            progress.set_length(input.rows.len() as u64);
        }
        let stats = StatisticsAggregator::new();
        let completed = AtomicUsize::new(0);
        let context = RowContext {
            definition,
            part_number: input.column(PART_NUMBER),
            total: input.rows.len(),
            stats: &stats,
            progress,
            completed: &completed,
        };

        let workers = self.options.workers.max(1);
        let chunk_size = input.rows.len().div_ceil(workers).max(1);
        info!(
            "Processing {} rows on {} workers (target length {})",
            input.rows.len(),
            workers.min(input.rows.len().max(1)),
            self.options.target_length
        );

        let outcomes: Vec<RowOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = input
                .rows
                .chunks(chunk_size)
                .enumerate()
                .map(|(chunk_idx, chunk)| {
                    let context = &context;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .enumerate()
                            .map(|(offset, row)| self.process_row(chunk_idx * chunk_size + offset, row, context))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let table = self.render(input, &outcomes);
        let statistics = stats.snapshot();
        let processed_count = outcomes.len();
        let failed_count = outcomes.iter().filter(|o| matches!(o, RowOutcome::Failed { .. })).count();
        let success_count = statistics.success_count as usize;
        let summary = BatchSummary {
            processed_count,
            failed_count,
            success_count,
            success_rate: if processed_count == 0 {
                0.0
            } else {
                success_count as f64 / processed_count as f64
            },
            avg_reduction: statistics.avg_reduction,
            processing_time_ms: started.elapsed().as_millis() as u64,
            method_used: statistics.dominant_method(),
        };

        info!(
            "Batch complete: {} processed, {} failed, {:.1}% success",
            summary.processed_count,
            summary.failed_count,
            summary.success_rate * 100.0
        );
        Ok(BatchReport { table, outcomes, summary, statistics })
    }

    fn process_row(&self, row_number: usize, row: &[String], context: &RowContext<'_>) -> RowOutcome {
        let label = context
            .part_number
            .and_then(|idx| row.get(idx))
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| format!("row {}", row_number + 1));
        let description = row.get(context.definition).map(String::as_str).unwrap_or("");

        let request = AbbreviationRequest::new(description)
            .with_target_length(self.options.target_length)
            .with_ml(self.options.use_ml);

        let outcome = match self.pipeline.abbreviate(&request) {
            Ok(result) => {
                context.stats.record(&result);
                let quality = quality::verify(&result, self.options.target_length);
                RowOutcome::Abbreviated { result, quality }
            }
            Err(e) => {
                warn!("Failed to process {}: {}", label, e);
                RowOutcome::Failed { label, error: e.to_string() }
            }
        };

        if let Some(progress) = context.progress {
            progress.inc(1);
        }
        let done = context.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_LOG_INTERVAL == 0 {
            info!("Processed {}/{} rows", done, context.total);
        }
        outcome
    }

    /// Input columns followed by result columns, in input order
    fn render(&self, input: &Table, outcomes: &[RowOutcome]) -> Table {
        let mut headers = input.headers.clone();
        let columns: Vec<usize> = RESULT_COLUMNS
            .iter()
            .map(|name| match input.column(name) {
                Some(idx) => idx,
                None => {
                    headers.push(name.to_string());
                    headers.len() - 1
                }
            })
            .collect();

        let rows = input
            .rows
            .iter()
            .zip(outcomes)
            .map(|(row, outcome)| {
                let mut out = row.clone();
                out.resize(headers.len(), String::new());
                for (column, value) in columns.iter().zip(result_values(outcome)) {
                    out[*column] = value;
                }
                out
            })
            .collect();

        Table { headers, rows }
    }
}

fn result_values(outcome: &RowOutcome) -> [String; 9] {
    match outcome {
        RowOutcome::Abbreviated { result, quality } => [
            result.abbreviated().to_string(),
            result.original_length().to_string(),
            result.abbreviated_length().to_string(),
            format!("{:.1}%", result.reduction_percentage()),
            result
                .rules_applied()
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; "),
            result.method_used().to_string(),
            format!("{:.2}", quality.confidence),
            if quality.is_standard { "Yes" } else { "No" }.to_string(),
            quality.suggestions.join("; "),
        ],
        RowOutcome::Failed { error, .. } => [
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            error.clone(),
            "error".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ],
    }
}

/// Read, process and write a CSV file
pub fn process_file(
    processor: &BatchProcessor<'_>,
    input: &Path,
    output: &Path,
    progress: Option<&ProgressBar>,
) -> Result<BatchReport> {
    let table = Table::from_path(input)?;
    let report = processor.process(&table, progress)?;
    report.table.write_path(output)?;
    info!("Wrote {} rows to {}", report.table.rows.len(), output.display());
    Ok(report)
}
