use crate::artifact::ImageArtifact;
use crate::compress::savings_percent;
use crate::constants::PROGRESS_BAR_TEMPLATE;
use crate::error::{MinikyuError, Result};
use crate::export::{dedupe_name, ArchiveEntry};
use crate::pipeline::{Pipeline, ProcessedImage, ProcessingRequest};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl ItemStatus {
    /// Whether a run picks the item up. Only `done` items are skipped;
    /// errored items are retried with the same request.
    pub fn is_runnable(&self) -> bool {
        matches!(self, ItemStatus::Pending | ItemStatus::Error)
    }

    /// Allowed moves: {pending, error} -> processing -> {done, error}. A
    /// processing item may fall back to pending when its run is cancelled.
    fn can_move_to(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Pending, ItemStatus::Processing)
                | (ItemStatus::Error, ItemStatus::Processing)
                | (ItemStatus::Processing, ItemStatus::Done)
                | (ItemStatus::Processing, ItemStatus::Error)
                | (ItemStatus::Processing, ItemStatus::Pending)
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Done => "done",
            ItemStatus::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct BatchItem {
    id: ItemId,
    source: ImageArtifact,
    status: ItemStatus,
    result: Option<ProcessedImage>,
    /// Position in completion order, set when the item reaches `Done`.
    completed_seq: Option<u64>,
}

impl BatchItem {
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn source(&self) -> &ImageArtifact {
        &self.source
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn result(&self) -> Option<&ProcessedImage> {
        self.result.as_ref()
    }

    pub fn result_artifact(&self) -> Option<&ImageArtifact> {
        self.result.as_ref().map(|r| &r.artifact)
    }

    pub fn result_name(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.artifact.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub done: usize,
    pub error: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    /// Items already `done` when the run started.
    pub skipped: usize,
    /// Items put back to pending by a cancellation.
    pub cancelled: usize,
    pub original_bytes: u64,
    pub output_bytes: u64,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn savings_percent(&self) -> i64 {
        savings_percent(self.original_bytes, self.output_bytes)
    }

    pub fn print(&self) {
        crate::info!("\n📊 Batch Summary:");
        crate::info!("  ✅ Processed: {}", self.processed);
        if self.failed > 0 {
            crate::info!("  ❌ Failed: {}", self.failed);
        }
        if self.skipped > 0 {
            crate::info!("  ⏭️  Skipped (already finished): {}", self.skipped);
        }
        if self.cancelled > 0 {
            crate::info!("  ⏸️  Cancelled: {}", self.cancelled);
        }
        crate::info!(
            "  📊 Total size: {} -> {}",
            crate::utils::format_file_size(self.original_bytes),
            crate::utils::format_file_size(self.output_bytes)
        );
        crate::info!("  🎯 Overall savings: {}%", self.savings_percent());
        crate::info!("  ⏱️  Total time: {:.2?}", self.elapsed);
    }
}

/// Ordered collection of batch items.
///
/// Status lives in an explicit id -> item map and only changes through the
/// transition methods below, driven by `process_all`.
#[derive(Debug, Default)]
pub struct Batch {
    order: Vec<ItemId>,
    items: HashMap<ItemId, BatchItem>,
    next_id: u64,
    next_completion: u64,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `source` as a new pending item.
    pub fn add(&mut self, source: ImageArtifact) -> ItemId {
        let id = ItemId(self.next_id.to_string());
        self.next_id += 1;

        self.items.insert(
            id.clone(),
            BatchItem {
                id: id.clone(),
                source,
                status: ItemStatus::Pending,
                result: None,
                completed_seq: None,
            },
        );
        self.order.push(id.clone());
        id
    }

    pub fn extend<I: IntoIterator<Item = ImageArtifact>>(&mut self, sources: I) -> Vec<ItemId> {
        sources.into_iter().map(|source| self.add(source)).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&BatchItem> {
        self.items.get(id)
    }

    pub fn status(&self, id: &ItemId) -> Option<ItemStatus> {
        self.items.get(id).map(|item| item.status)
    }

    /// Items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &BatchItem> + '_ {
        self.order.iter().filter_map(move |id| self.items.get(id))
    }

    pub fn counts(&self) -> StatusCounts {
        self.items().fold(StatusCounts::default(), |mut acc, item| {
            match item.status {
                ItemStatus::Pending => acc.pending += 1,
                ItemStatus::Processing => acc.processing += 1,
                ItemStatus::Done => acc.done += 1,
                ItemStatus::Error => acc.error += 1,
            }
            acc
        })
    }

    /// Put an item back to pending, dropping any result.
    pub fn reset(&mut self, id: &ItemId) -> Result<()> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| MinikyuError::Validation(format!("unknown batch item {}", id)))?;
        item.status = ItemStatus::Pending;
        item.result = None;
        item.completed_seq = None;
        Ok(())
    }

    /// Re-queue every errored item. Returns how many were reset.
    pub fn reset_failed(&mut self) -> usize {
        let failed: Vec<ItemId> = self
            .items()
            .filter(|item| item.status == ItemStatus::Error)
            .map(|item| item.id.clone())
            .collect();
        for id in &failed {
            // ids come from the map itself
            let _ = self.reset(id);
        }
        failed.len()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.items.clear();
    }

    fn transition(&mut self, id: &ItemId, next: ItemStatus) -> Result<&mut BatchItem> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| MinikyuError::Validation(format!("unknown batch item {}", id)))?;
        if !item.status.can_move_to(next) {
            return Err(MinikyuError::Validation(format!(
                "item {} cannot move from {} to {}",
                id, item.status, next
            )));
        }
        item.status = next;
        Ok(item)
    }

    fn mark_processing(&mut self, id: &ItemId) -> Result<()> {
        self.transition(id, ItemStatus::Processing).map(|_| ())
    }

    fn mark_done(&mut self, id: &ItemId, processed: ProcessedImage) -> Result<()> {
        let seq = self.next_completion;
        let item = self.transition(id, ItemStatus::Done)?;
        item.result = Some(processed);
        item.completed_seq = Some(seq);
        self.next_completion += 1;
        Ok(())
    }

    fn mark_error(&mut self, id: &ItemId) -> Result<()> {
        let item = self.transition(id, ItemStatus::Error)?;
        item.result = None;
        Ok(())
    }

    fn revert_to_pending(&mut self, id: &ItemId) -> Result<()> {
        self.transition(id, ItemStatus::Pending).map(|_| ())
    }

    /// Ids of items that a run would pick up, in input order.
    fn runnable(&self) -> (Vec<ItemId>, usize) {
        let mut runnable = Vec::new();
        let mut skipped = 0;
        for item in self.items() {
            if item.status.is_runnable() {
                runnable.push(item.id.clone());
            } else {
                skipped += 1;
            }
        }
        (runnable, skipped)
    }

    /// Apply one item's outcome. Exactly one terminal write per item.
    fn record(
        &mut self,
        id: &ItemId,
        outcome: Result<ProcessedImage>,
        summary: &mut BatchSummary,
    ) -> Result<()> {
        match outcome {
            Ok(processed) => {
                summary.processed += 1;
                summary.original_bytes += processed.original_size;
                summary.output_bytes += processed.output_size();
                self.mark_done(id, processed)
            }
            Err(MinikyuError::Cancelled) => {
                summary.cancelled += 1;
                self.revert_to_pending(id)
            }
            Err(e) => {
                let name = self
                    .get(id)
                    .map(|item| item.source.name().to_string())
                    .unwrap_or_default();
                crate::error!("Failed to process {}: {}", name, e);
                summary.failed += 1;
                self.mark_error(id)
            }
        }
    }

    /// Process every pending or errored item in input order, one at a time.
    ///
    /// Items already `done` are left untouched; errored items are retried. A
    /// failing item is marked `error` and the loop moves on. Only an invalid `request` makes
    /// the call itself fail.
    pub fn process_all(
        &mut self,
        pipeline: &Pipeline,
        request: &ProcessingRequest,
    ) -> Result<BatchSummary> {
        self.process_all_with_progress(pipeline, request, &ProgressBar::hidden())
    }

    pub fn process_all_with_progress(
        &mut self,
        pipeline: &Pipeline,
        request: &ProcessingRequest,
        progress: &ProgressBar,
    ) -> Result<BatchSummary> {
        request.validate()?;
        let start = Instant::now();

        let (runnable, skipped) = self.runnable();
        let mut summary = BatchSummary {
            skipped,
            ..BatchSummary::default()
        };
        progress.set_length(runnable.len() as u64);

        for (index, id) in runnable.iter().enumerate() {
            if pipeline.is_cancelled() {
                // everything not yet started stays pending
                summary.cancelled += runnable.len() - index;
                break;
            }

            self.mark_processing(id)?;
            let source = match self.get(id) {
                Some(item) => item.source.clone(),
                None => continue,
            };
            progress.set_message(source.name().to_string());

            let outcome = pipeline.process(&source, request);
            let stop = matches!(outcome, Err(MinikyuError::Cancelled));
            self.record(id, outcome, &mut summary)?;
            progress.inc(1);

            if stop {
                summary.cancelled += runnable.len() - index - 1;
                break;
            }
        }

        progress.finish_and_clear();
        summary.elapsed = start.elapsed();
        Ok(summary)
    }

    /// Like `process_all`, but runs up to `threads` items at once.
    ///
    /// Workers only compute; every status change is applied here, on the
    /// calling thread, in input order once the workers finish.
    pub fn process_all_parallel(
        &mut self,
        pipeline: &Pipeline,
        request: &ProcessingRequest,
        threads: usize,
        progress: &ProgressBar,
    ) -> Result<BatchSummary> {
        request.validate()?;
        let start = Instant::now();

        let (runnable, skipped) = self.runnable();
        let mut summary = BatchSummary {
            skipped,
            ..BatchSummary::default()
        };
        progress.set_length(runnable.len() as u64);

        let mut work = Vec::with_capacity(runnable.len());
        for id in &runnable {
            self.mark_processing(id)?;
            if let Some(item) = self.get(id) {
                work.push((id.clone(), item.source.clone()));
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build()
            .map_err(|e| MinikyuError::Validation(format!("cannot start worker pool: {}", e)))?;

        let outcomes: Vec<(ItemId, Result<ProcessedImage>)> = pool.install(|| {
            work.into_par_iter()
                .map(|(id, source)| {
                    let outcome = pipeline.process(&source, request);
                    progress.inc(1);
                    (id, outcome)
                })
                .collect()
        });

        for (id, outcome) in outcomes {
            self.record(&id, outcome, &mut summary)?;
        }

        progress.finish_and_clear();
        summary.elapsed = start.elapsed();
        Ok(summary)
    }

    /// Named outputs of every `done` item, in completion order, with
    /// colliding names made unique.
    pub fn export_entries(&self) -> Vec<ArchiveEntry> {
        let mut done: Vec<&BatchItem> = self
            .items()
            .filter(|item| item.status == ItemStatus::Done)
            .collect();
        done.sort_by_key(|item| item.completed_seq);

        let mut taken = HashSet::new();
        done.into_iter()
            .filter_map(|item| item.result.as_ref())
            .map(|processed| {
                let name = dedupe_name(processed.artifact.name(), &mut taken);
                ArchiveEntry::new(name, processed.artifact.shared_bytes())
            })
            .collect()
    }
}

/// Progress bar styled for batch runs; hidden in quiet mode.
pub fn batch_progress_bar(total: u64) -> ProgressBar {
    if crate::logger::is_quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
