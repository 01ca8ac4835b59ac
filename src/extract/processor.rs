//! Concurrent processing of every sheet in a workbook.

use super::sheet::extract_sheet;
use super::source::SheetSource;
use crate::model::{SheetResult, SkipReason, WorkbookRecords};
use crate::options::ParseOptions;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

/// Outcome of a single sheet worker.
type SheetOutcome = std::result::Result<SheetResult, SkipReason>;

/// Counting gate bounding how many sheets are read at once.
///
/// A limit of 0 disables the gate and every sheet is admitted immediately.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Option<Arc<Semaphore>>,
    limit: usize,
}

impl AdmissionGate {
    /// Create a gate admitting at most `limit` sheets (0 = unbounded).
    pub fn new(limit: usize) -> Self {
        let limit = limit.min(Semaphore::MAX_PERMITS);
        let semaphore = (limit > 0).then(|| Arc::new(Semaphore::new(limit)));
        Self { semaphore, limit }
    }

    /// Check if the gate bounds concurrency.
    pub fn is_bounded(&self) -> bool {
        self.semaphore.is_some()
    }

    /// Wait for a slot. The slot is released when the permit is dropped.
    ///
    /// Returns `None` for an unbounded gate.
    pub async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        let semaphore = self.semaphore.as_ref()?;

        if semaphore.available_permits() == 0 {
            log::debug!("admission gate full ({} in use), waiting", self.limit);
        }

        // The semaphore is never closed.
        semaphore.clone().acquire_owned().await.ok()
    }
}

/// Extract records from every requested sheet of a source.
///
/// Sheets come from `options.sheet_names`, or from the source when that list
/// is empty. Each sheet runs as its own task on the blocking pool, behind an
/// [`AdmissionGate`] sized by `options.max_concurrent_sheets`. Results are
/// merged by a single collector as tasks finish.
///
/// A sheet that fails to read, is empty, or whose worker panics is left out
/// of [`WorkbookRecords::sheets`] and listed in [`WorkbookRecords::skipped`];
/// the other sheets are unaffected.
///
/// Must be called from within a multi-threaded Tokio runtime.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use unsheet::extract::{process_workbook, InMemorySource};
/// use unsheet::ParseOptions;
///
/// # #[tokio::main]
/// # async fn main() {
/// let source = InMemorySource::new().with_sheet(
///     "People",
///     vec![
///         vec!["Name".to_string(), "Age".to_string()],
///         vec!["Bob".to_string(), "41".to_string()],
///     ],
/// );
///
/// let options = ParseOptions::new().with_max_concurrent_sheets(2);
/// let records = process_workbook(Arc::new(source), &options).await;
/// assert_eq!(records.sheets["People"].record_count, 1);
/// # }
/// ```
pub async fn process_workbook<S>(source: Arc<S>, options: &ParseOptions) -> WorkbookRecords
where
    S: SheetSource + ?Sized,
{
    let sheets = if options.sheet_names.is_empty() {
        source.sheet_names()
    } else {
        options.sheet_names.clone()
    };

    let gate = AdmissionGate::new(options.max_concurrent_sheets);
    let options = Arc::new(options.clone());
    let mut tasks = JoinSet::new();

    log::debug!(
        "processing {} sheets (concurrency limit: {})",
        sheets.len(),
        if gate.is_bounded() {
            options.max_concurrent_sheets.to_string()
        } else {
            "none".to_string()
        }
    );

    for sheet in sheets {
        let source = Arc::clone(&source);
        let options = Arc::clone(&options);
        let gate = gate.clone();

        tasks.spawn(async move {
            let _permit = gate.admit().await;

            let worker_sheet = sheet.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                run_sheet(source.as_ref(), &worker_sheet, &options)
            })
            .await
            .unwrap_or_else(|err| Err(SkipReason::WorkerFailed(err.to_string())));

            (sheet, outcome)
        });
    }

    let mut records = WorkbookRecords::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((sheet, Ok(result))) => records.insert(sheet, result),
            Ok((sheet, Err(reason))) => {
                match &reason {
                    SkipReason::Empty => log::debug!("sheet {} is empty, skipping", sheet),
                    _ => log::warn!("failed to process sheet {}: {}", sheet, reason),
                }
                records.skip(sheet, reason);
            }
            Err(err) => log::error!("sheet task did not complete: {}", err),
        }
    }

    records
}

/// Read and extract one sheet.
fn run_sheet<S>(source: &S, sheet: &str, options: &ParseOptions) -> SheetOutcome
where
    S: SheetSource + ?Sized,
{
    let rows = source
        .read_rows(sheet)
        .map_err(|err| SkipReason::ReadFailed(err.to_string()))?;
    extract_sheet(sheet, &rows, options).ok_or(SkipReason::Empty)
}
