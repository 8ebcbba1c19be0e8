// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document compositor — turns a snapshot of the working set plus a page
// configuration into one PDF, one image per page.
//
// Each image is freshly decoded on the blocking pool and must finish loading
// before its placement is computed and its page appended. Pages go into a
// single accumulator strictly in snapshot order. Any failure (decode, layout,
// cancellation) abandons the accumulator, so no partial document escapes.
//
// State: Idle -> Composing -> Idle. A trigger while Composing is a no-op that
// reports `AlreadyComposing`; success and failure are the returned value.

use std::sync::Arc;

use chrono::Utc;
use folio_core::error::{FolioError, Result};
use folio_core::{DocumentMetadata, FolioConfig, PageConfig, suggested_file_name};
use folio_document::{ImageDecoder, LayoutEngine, PdfWriter};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::working_set::ImageAsset;

/// Observable compositor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeState {
    Idle,
    /// A composition is running; `completed` of `total` pages are placed.
    Composing { completed: usize, total: usize },
}

/// A finished PDF handed to the output consumer.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub suggested_file_name: String,
    pub metadata: DocumentMetadata,
}

impl ComposedDocument {
    /// Write the PDF to `path`.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        info!(path = %path.as_ref().display(), pages = self.page_count, "PDF written");
        Ok(())
    }
}

/// Result of a composition trigger that did not fail.
#[derive(Debug)]
pub enum ComposeOutcome {
    Completed(ComposedDocument),
    /// The snapshot was empty; nothing was produced.
    NothingToCompose,
    /// Another composition was already running; this trigger was ignored.
    AlreadyComposing,
}

/// Builds image-per-page PDFs from working-set snapshots.
pub struct Compositor {
    decoder: Arc<dyn ImageDecoder>,
    layout: LayoutEngine,
    metadata: DocumentMetadata,
    file_name_prefix: String,
    state: watch::Sender<ComposeState>,
}

/// Returns the compositor to `Idle` however the composition ends.
struct ComposingGuard<'a> {
    state: &'a watch::Sender<ComposeState>,
}

impl Drop for ComposingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(ComposeState::Idle);
    }
}

impl Compositor {
    pub fn new(config: &FolioConfig, decoder: Arc<dyn ImageDecoder>) -> Self {
        let (state, _) = watch::channel(ComposeState::Idle);
        Self {
            decoder,
            layout: LayoutEngine::new(config.margin_mm),
            metadata: DocumentMetadata::STANDARD,
            file_name_prefix: config.file_name_prefix.clone(),
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> ComposeState {
        *self.state.borrow()
    }

    pub fn is_composing(&self) -> bool {
        matches!(self.state(), ComposeState::Composing { .. })
    }

    /// Watch state changes (progress for a UI).
    pub fn subscribe(&self) -> watch::Receiver<ComposeState> {
        self.state.subscribe()
    }

    /// Compose `snapshot` into a PDF laid out on `page`.
    ///
    /// The snapshot is owned, so later edits to the working set cannot affect
    /// a running composition. `cancel` is honoured before and during every
    /// per-image load.
    #[instrument(skip_all, fields(images = snapshot.len(), format = ?page.format, orientation = ?page.orientation))]
    pub async fn compose(
        &self,
        snapshot: Vec<ImageAsset>,
        page: PageConfig,
        cancel: &CancellationToken,
    ) -> Result<ComposeOutcome> {
        if snapshot.is_empty() {
            debug!("Nothing to compose");
            return Ok(ComposeOutcome::NothingToCompose);
        }

        let Some(_guard) = self.begin(snapshot.len()) else {
            debug!("Composition already running; trigger ignored");
            return Ok(ComposeOutcome::AlreadyComposing);
        };

        match self.compose_pages(&snapshot, page, cancel).await {
            Ok(document) => {
                info!(
                    pages = document.page_count,
                    bytes = document.bytes.len(),
                    file = %document.suggested_file_name,
                    "Composition complete"
                );
                Ok(ComposeOutcome::Completed(document))
            }
            Err(err) => {
                warn!(%err, asset = err.asset_name().unwrap_or("-"), "Composition failed");
                Err(err)
            }
        }
    }

    /// Idle -> Composing, or `None` if a composition is already running.
    fn begin(&self, total: usize) -> Option<ComposingGuard<'_>> {
        let started = self.state.send_if_modified(|state| match state {
            ComposeState::Idle => {
                *state = ComposeState::Composing {
                    completed: 0,
                    total,
                };
                true
            }
            ComposeState::Composing { .. } => false,
        });
        started.then(|| ComposingGuard { state: &self.state })
    }

    async fn compose_pages(
        &self,
        snapshot: &[ImageAsset],
        page: PageConfig,
        cancel: &CancellationToken,
    ) -> Result<ComposedDocument> {
        let total = snapshot.len();
        let geometry = self.layout.geometry(&page)?;
        let mut writer = PdfWriter::new(&self.metadata);

        for (index, asset) in snapshot.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(FolioError::Cancelled);
            }

            let decoder = Arc::clone(&self.decoder);
            let name = asset.name.clone();
            let payload = Arc::clone(&asset.payload);
            let load = tokio::task::spawn_blocking(move || decoder.decode(&name, &payload));

            let decoded = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FolioError::Cancelled),
                joined = load => joined
                    .map_err(|err| FolioError::Task(format!("image load task for {}: {err}", asset.name)))??,
            };

            let placement = self.layout.place(decoded.dimensions(), &page)?;
            writer.push_image_page(&geometry, &decoded, &placement)?;

            self.state.send_replace(ComposeState::Composing {
                completed: index + 1,
                total,
            });
            debug!(page = index + 1, total, name = %asset.name, "Page composed");
        }

        let page_count = writer.page_count();
        let bytes = writer.finish()?;

        Ok(ComposedDocument {
            bytes,
            page_count,
            suggested_file_name: suggested_file_name(&self.file_name_prefix, Utc::now()),
            metadata: self.metadata,
        })
    }
}
