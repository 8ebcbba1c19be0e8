// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-session — The caller-owned working set of images and the compositor
// that binds a snapshot of it into a PDF.

pub mod compositor;
pub mod working_set;

#[cfg(test)]
mod test_support;

pub use compositor::{ComposeOutcome, ComposeState, ComposedDocument, Compositor};
pub use working_set::{AddReport, CandidateFile, ImageAsset, MoveDirection, WorkingSet};
