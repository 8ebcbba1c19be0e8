// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Working set — the caller-owned, ordered, capped collection of images that a
// composition turns into pages.
//
// Position in the sequence is the only page order there is; reordering moves
// assets within the sequence. Add-time header probing runs on the blocking
// pool concurrently, but results are appended in submission order so the page
// order always matches what the user picked.

use std::path::Path;
use std::sync::Arc;

use folio_core::error::{FolioError, Result};
use folio_core::human_errors::{HumanError, capacity_full_notice, capacity_notice};
use folio_core::{AssetId, FolioConfig, content_type_from_extension, is_image_content_type};
use folio_document::ImageDecoder;
use tracing::{debug, info, instrument, warn};

/// A file offered to the working set by an input provider.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(content_type_from_extension)
            .unwrap_or("application/octet-stream");
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, content_type, bytes))
    }

    pub fn is_image(&self) -> bool {
        is_image_content_type(&self.content_type)
    }
}

/// One image in the working set.
///
/// Cloning is cheap: the payload is shared.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub id: AssetId,
    pub name: String,
    pub content_type: String,
    pub byte_len: usize,
    pub payload: Arc<[u8]>,
    /// Intrinsic (width, height) from the header probe; `None` if the header
    /// could not be read. Such an asset fails when composed.
    pub dimensions: Option<(u32, u32)>,
}

impl ImageAsset {
    /// Size for display, e.g. "1.25 MB".
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.byte_len as f64 / 1024.0 / 1024.0)
    }
}

/// Direction for [`WorkingSet::move_adjacent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards index 0.
    Up,
    /// Towards the end.
    Down,
}

/// Outcome of one [`WorkingSet::add`] batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddReport {
    /// Ids of the accepted assets, in the order they were appended.
    pub accepted: Vec<AssetId>,
    /// Images left out because the working set reached its cap.
    pub skipped: usize,
    /// Candidates dropped because their declared type is not an image.
    pub unsupported: usize,
    cap: usize,
    was_full: bool,
}

impl AddReport {
    /// The single aggregate notice to show for this batch, if any images were
    /// left out for capacity.
    pub fn capacity_notice(&self) -> Option<HumanError> {
        if self.skipped == 0 {
            None
        } else if self.was_full {
            Some(capacity_full_notice(self.cap))
        } else {
            Some(capacity_notice(self.cap, self.skipped))
        }
    }

    /// The capacity overflow as an error value, for callers that log it.
    pub fn capacity_error(&self) -> Option<FolioError> {
        (self.skipped > 0).then_some(FolioError::CapacityExceeded {
            cap: self.cap,
            skipped: self.skipped,
        })
    }
}

/// Ordered, capped set of images awaiting composition.
pub struct WorkingSet {
    assets: Vec<ImageAsset>,
    cap: usize,
    decoder: Arc<dyn ImageDecoder>,
}

impl WorkingSet {
    pub fn new(cap: usize, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            assets: Vec::new(),
            cap,
            decoder,
        }
    }

    pub fn from_config(config: &FolioConfig, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self::new(config.max_images, decoder)
    }

    // -- Queries --------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Free slots before the cap is reached.
    pub fn remaining(&self) -> usize {
        self.cap.saturating_sub(self.assets.len())
    }

    pub fn get(&self, id: AssetId) -> Option<&ImageAsset> {
        self.assets.iter().find(|asset| asset.id == id)
    }

    pub fn position(&self, id: AssetId) -> Option<usize> {
        self.assets.iter().position(|asset| asset.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
        self.assets.iter()
    }

    pub fn as_slice(&self) -> &[ImageAsset] {
        &self.assets
    }

    /// Copy of the current order, to hand to a composition.
    pub fn snapshot(&self) -> Vec<ImageAsset> {
        self.assets.clone()
    }

    // -- Mutation -------------------------------------------------------------

    /// Accept a batch of candidate files.
    ///
    /// Non-image candidates are dropped silently (counted in
    /// `unsupported`). Of the images, only the prefix that fits under the cap
    /// is accepted; the rest are counted in `skipped`. Accepted files are
    /// probed concurrently and appended in submission order.
    #[instrument(skip_all, fields(batch = files.len(), current = self.assets.len()))]
    pub async fn add(&mut self, files: Vec<CandidateFile>) -> Result<AddReport> {
        let batch_len = files.len();
        let (images, rejected): (Vec<CandidateFile>, Vec<CandidateFile>) =
            files.into_iter().partition(CandidateFile::is_image);
        for file in &rejected {
            let reason = FolioError::UnsupportedFile {
                name: file.name.clone(),
                content_type: file.content_type.clone(),
            };
            debug!(%reason, "Candidate ignored");
        }

        let remaining = self.remaining();
        let was_full = remaining == 0;
        let skipped = images.len().saturating_sub(remaining);
        let accepted_files: Vec<CandidateFile> = images.into_iter().take(remaining).collect();

        // Start every probe first, then await them in submission order.
        let handles: Vec<_> = accepted_files
            .into_iter()
            .map(|file| {
                let decoder = Arc::clone(&self.decoder);
                tokio::task::spawn_blocking(move || {
                    let dimensions = decoder.probe(&file.name, &file.bytes);
                    (file, dimensions)
                })
            })
            .collect();

        let mut new_assets = Vec::with_capacity(handles.len());
        for handle in handles {
            let (file, probed) = handle
                .await
                .map_err(|err| FolioError::Task(format!("image probe task: {err}")))?;
            let dimensions = match probed {
                Ok(dims) => Some(dims),
                Err(err) => {
                    warn!(name = %file.name, %err, "Image header unreadable; it will fail at composition");
                    None
                }
            };
            new_assets.push(ImageAsset {
                id: AssetId::new(),
                name: file.name,
                content_type: file.content_type,
                byte_len: file.bytes.len(),
                payload: Arc::from(file.bytes),
                dimensions,
            });
        }

        let accepted: Vec<AssetId> = new_assets.iter().map(|asset| asset.id).collect();
        self.assets.extend(new_assets);

        info!(
            batch = batch_len,
            accepted = accepted.len(),
            skipped,
            unsupported = rejected.len(),
            total = self.assets.len(),
            "Images added"
        );

        Ok(AddReport {
            accepted,
            skipped,
            unsupported: rejected.len(),
            cap: self.cap,
            was_full,
        })
    }

    /// Remove the asset with `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: AssetId) -> Option<ImageAsset> {
        let index = self.position(id)?;
        let removed = self.assets.remove(index);
        debug!(id = %id, name = %removed.name, index, "Image removed");
        Some(removed)
    }

    /// Swap the asset at `index` with its neighbour in `direction`.
    ///
    /// Returns `false` (and changes nothing) when there is no such neighbour.
    pub fn move_adjacent(&mut self, index: usize, direction: MoveDirection) -> bool {
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        };
        match target {
            Some(target) if index < self.assets.len() && target < self.assets.len() => {
                self.assets.swap(index, target);
                debug!(from = index, to = target, "Image moved");
                true
            }
            _ => false,
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        let dropped = self.assets.len();
        self.assets.clear();
        debug!(dropped, "Working set cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SlowFirstDecoder, png, png_candidate, raster};

    fn names(set: &WorkingSet) -> Vec<&str> {
        set.iter().map(|asset| asset.name.as_str()).collect()
    }

    async fn filled(count: usize) -> WorkingSet {
        let mut set = WorkingSet::new(20, raster());
        let batch = (0..count)
            .map(|i| png_candidate(&format!("img{i}.png"), 4, 3))
            .collect();
        set.add(batch).await.expect("add");
        set
    }

    #[tokio::test]
    async fn twenty_five_into_empty_accepts_twenty() {
        let mut set = WorkingSet::new(20, raster());
        let batch = (0..25)
            .map(|i| png_candidate(&format!("img{i}.png"), 2, 2))
            .collect();

        let report = set.add(batch).await.expect("add");
        assert_eq!(report.accepted.len(), 20);
        assert_eq!(report.skipped, 5);
        assert_eq!(set.len(), 20);
        assert_eq!(set.remaining(), 0);

        let notice = report.capacity_notice().expect("notice");
        assert!(notice.message.contains('5'));
        assert!(matches!(
            report.capacity_error(),
            Some(FolioError::CapacityExceeded { cap: 20, skipped: 5 })
        ));
        // The accepted prefix is the first twenty submitted.
        assert_eq!(set.as_slice()[19].name, "img19.png");
    }

    #[tokio::test]
    async fn partial_room_accepts_prefix() {
        let mut set = filled(18).await;
        let batch = (0..5)
            .map(|i| png_candidate(&format!("extra{i}.png"), 2, 2))
            .collect();

        let report = set.add(batch).await.expect("add");
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.skipped, 3);
        assert_eq!(set.len(), 20);
        assert_eq!(&names(&set)[18..], &["extra0.png", "extra1.png"]);
    }

    #[tokio::test]
    async fn full_set_reports_full_notice() {
        let mut set = filled(20).await;
        let report = set
            .add(vec![png_candidate("late.png", 2, 2)])
            .await
            .expect("add");
        assert!(report.accepted.is_empty());
        assert_eq!(report.skipped, 1);
        let notice = report.capacity_notice().expect("notice");
        assert!(notice.message.contains("20"));
        assert_eq!(set.len(), 20);
    }

    #[tokio::test]
    async fn batch_within_capacity_has_no_notice() {
        let mut set = WorkingSet::new(20, raster());
        let report = set
            .add(vec![png_candidate("a.png", 2, 2)])
            .await
            .expect("add");
        assert!(report.capacity_notice().is_none());
        assert!(report.capacity_error().is_none());
    }

    #[tokio::test]
    async fn non_images_are_dropped_silently() {
        let mut set = WorkingSet::new(20, raster());
        let batch = vec![
            png_candidate("a.png", 2, 2),
            CandidateFile::new("notes.txt", "text/plain", b"hello".to_vec()),
            CandidateFile::new("doc.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
            png_candidate("b.png", 2, 2),
        ];
        let report = set.add(batch).await.expect("add");
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.unsupported, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(names(&set), ["a.png", "b.png"]);
    }

    #[tokio::test]
    async fn append_order_is_submission_order() {
        // The first file's probe is the slowest; it must still land first.
        let mut set = WorkingSet::new(20, Arc::new(SlowFirstDecoder::default()));
        let batch = vec![
            png_candidate("slow.png", 2, 2),
            png_candidate("second.png", 2, 2),
            png_candidate("third.png", 2, 2),
        ];
        let report = set.add(batch).await.expect("add");
        assert_eq!(names(&set), ["slow.png", "second.png", "third.png"]);
        let ids: Vec<AssetId> = set.iter().map(|asset| asset.id).collect();
        assert_eq!(report.accepted, ids);
    }

    #[tokio::test]
    async fn probe_records_dimensions_and_size() {
        let mut set = WorkingSet::new(20, raster());
        set.add(vec![png_candidate("wide.png", 8, 6)])
            .await
            .expect("add");
        let asset = &set.as_slice()[0];
        assert_eq!(asset.dimensions, Some((8, 6)));
        assert_eq!(asset.byte_len, png(8, 6).len());
        assert!(asset.size_label().ends_with(" MB"));
    }

    #[tokio::test]
    async fn unreadable_image_is_kept_without_dimensions() {
        let mut set = WorkingSet::new(20, raster());
        let report = set
            .add(vec![CandidateFile::new(
                "corrupt.jpg",
                "image/jpeg",
                b"garbage".to_vec(),
            )])
            .await
            .expect("add");
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(set.as_slice()[0].dimensions, None);
    }

    #[tokio::test]
    async fn remove_by_id_and_missing_id_is_noop() {
        let mut set = filled(3).await;
        let middle = set.as_slice()[1].id;

        assert_eq!(set.position(middle), Some(1));
        assert_eq!(set.get(middle).map(|a| a.name.as_str()), Some("img1.png"));

        let removed = set.remove(middle).expect("removed");
        assert_eq!(removed.name, "img1.png");
        assert_eq!(names(&set), ["img0.png", "img2.png"]);

        assert!(set.remove(middle).is_none());
        assert!(set.remove(AssetId::new()).is_none());
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn move_adjacent_swaps_neighbours() {
        let mut set = filled(3).await;
        assert!(set.move_adjacent(0, MoveDirection::Down));
        assert_eq!(names(&set), ["img1.png", "img0.png", "img2.png"]);
        assert!(set.move_adjacent(2, MoveDirection::Up));
        assert_eq!(names(&set), ["img1.png", "img2.png", "img0.png"]);
    }

    #[tokio::test]
    async fn move_at_boundaries_is_noop() {
        let mut set = filled(3).await;
        let before: Vec<String> = set.iter().map(|a| a.name.clone()).collect();

        assert!(!set.move_adjacent(0, MoveDirection::Up));
        assert!(!set.move_adjacent(2, MoveDirection::Down));
        assert!(!set.move_adjacent(7, MoveDirection::Up));
        assert!(!set.move_adjacent(usize::MAX, MoveDirection::Down));

        let after: Vec<String> = set.iter().map(|a| a.name.clone()).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn clear_empties_and_frees_capacity() {
        let mut set = filled(20).await;
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.remaining(), 20);
    }

    #[tokio::test]
    async fn ids_stay_unique_across_batches_and_clears() {
        let mut set = filled(5).await;
        let before_clear: Vec<AssetId> = set.iter().map(|a| a.id).collect();
        set.clear();
        set.add(vec![png_candidate("again.png", 2, 2)]).await.expect("add");
        set.add(vec![png_candidate("again.png", 2, 2)]).await.expect("add");

        let mut ids: Vec<AssetId> = set.iter().map(|a| a.id).collect();
        assert!(ids.iter().all(|id| !before_clear.contains(id)));
        ids.extend(before_clear);
        let total = ids.len();
        ids.sort_by_key(|id| id.0);
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn candidate_from_path_infers_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("photo.PNG");
        std::fs::write(&path, png(2, 2)).expect("write");

        let candidate = CandidateFile::from_path(&path).expect("read");
        assert_eq!(candidate.name, "photo.PNG");
        assert_eq!(candidate.content_type, "image/png");
        assert!(candidate.is_image());
    }
}
